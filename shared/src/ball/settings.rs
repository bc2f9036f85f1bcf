//! Tuning for the ball controller, grouped by concern.
//!
//! Every field defaults to the matching value in [`crate::constants`]. With the
//! `serde` feature each group deserializes with missing fields filled from the
//! defaults, so a config file only needs to name what it changes.

use crate::constants::*;

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BallSettings {
    pub body: BodySettings,
    pub grounding: GroundingSettings,
    pub movement: MovementSettings,
    pub hop: HopSettings,
    pub landing: LandingSettings,
    pub camera: CameraSettings,
    pub audio: RollAudioSettings,
    pub countdown: CountdownSettings,
}

impl Default for BallSettings {
    fn default() -> Self {
        Self {
            body: BodySettings::default(),
            grounding: GroundingSettings::default(),
            movement: MovementSettings::default(),
            hop: HopSettings::default(),
            landing: LandingSettings::default(),
            camera: CameraSettings::default(),
            audio: RollAudioSettings::default(),
            countdown: CountdownSettings::default(),
        }
    }
}

impl BallSettings {
    /// Sanity check. Returns one message per unusable value.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();

        if self.body.radius <= 0.0 {
            problems.push("body.radius must be positive".to_string());
        }
        if self.body.mass <= 0.0 {
            problems.push("body.mass must be positive".to_string());
        }
        if self.movement.max_speed <= 0.0 {
            problems.push("movement.max_speed must be positive".to_string());
        }
        if self.grounding.sweep_distance <= 0.0 {
            problems.push("grounding.sweep_distance must be positive".to_string());
        }
        if !(0.0..=1.0).contains(&self.grounding.walkable_normal_y) {
            problems.push("grounding.walkable_normal_y must be within [0, 1]".to_string());
        }
        if self.camera.min_distance > self.camera.max_distance {
            problems.push("camera.min_distance exceeds camera.max_distance".to_string());
        }
        if self.camera.fov_min_deg > self.camera.fov_max_deg {
            problems.push("camera.fov_min_deg exceeds camera.fov_max_deg".to_string());
        }
        if self.countdown.duration < 0.0 {
            problems.push("countdown.duration must not be negative".to_string());
        }

        problems
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BodySettings {
    pub radius: f32,
    pub mass: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
}

impl Default for BodySettings {
    fn default() -> Self {
        Self {
            radius: BALL_RADIUS,
            mass: BALL_MASS_KG,
            linear_damping: BALL_LINEAR_DAMPING,
            angular_damping: BALL_ANGULAR_DAMPING,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GroundingSettings {
    pub sweep_distance: f32,
    pub sweep_radius_scale: f32,
    pub walkable_normal_y: f32,
    pub confirm_time: f32,
    pub coyote_time: f32,
    pub spawn_snap_distance: f32,
}

impl Default for GroundingSettings {
    fn default() -> Self {
        Self {
            sweep_distance: GROUND_SWEEP_DISTANCE,
            sweep_radius_scale: GROUND_SWEEP_RADIUS_SCALE,
            walkable_normal_y: WALKABLE_NORMAL_Y,
            confirm_time: GROUND_CONFIRM_S,
            coyote_time: COYOTE_TIME_S,
            spawn_snap_distance: SPAWN_SNAP_DISTANCE,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MovementSettings {
    pub move_force: f32,
    pub max_speed: f32,
    pub air_control: f32,
    pub input_interp: f32,
    pub input_drift_eps_sq: f32,
    pub force_scale_at_rest: f32,
    pub max_steering_reduction: f32,
    pub slope_full_force_dot: f32,
    pub slope_min_force_dot: f32,
    pub slope_min_multiplier: f32,
    pub slope_downhill_boost: f32,
    pub roll_sync_min_speed_sq: f32,
    pub roll_sync_interp: f32,
}

impl Default for MovementSettings {
    fn default() -> Self {
        Self {
            move_force: MOVE_FORCE_N,
            max_speed: MAX_SPEED_MPS,
            air_control: AIR_CONTROL_MULTIPLIER,
            input_interp: INPUT_DIR_INTERP,
            input_drift_eps_sq: INPUT_DRIFT_EPS_SQ,
            force_scale_at_rest: FORCE_SCALE_AT_REST,
            max_steering_reduction: MAX_STEERING_REDUCTION,
            slope_full_force_dot: SLOPE_FULL_FORCE_DOT,
            slope_min_force_dot: SLOPE_MIN_FORCE_DOT,
            slope_min_multiplier: SLOPE_MIN_MULTIPLIER,
            slope_downhill_boost: SLOPE_DOWNHILL_BOOST,
            roll_sync_min_speed_sq: ROLL_SYNC_MIN_SPEED_SQ,
            roll_sync_interp: ROLL_SYNC_INTERP,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HopSettings {
    pub velocity_change: f32,
    pub cooldown: f32,
}

impl Default for HopSettings {
    fn default() -> Self {
        Self {
            velocity_change: HOP_VELOCITY_CHANGE_MPS,
            cooldown: HOP_COOLDOWN_S,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LandingSettings {
    pub impact_min_vertical_speed: f32,
    pub impact_ground_normal_y: f32,
    pub hard_landing_down_speed: f32,
    pub hard_landing_impulse: f32,
    pub assist_strength: f32,
    pub camera_lock_time: f32,
    pub damp_time: f32,
    pub damp_multiplier: f32,
    pub feedback_min_speed: f32,
    pub feedback_reference_speed: f32,
}

impl Default for LandingSettings {
    fn default() -> Self {
        Self {
            impact_min_vertical_speed: IMPACT_MIN_VERTICAL_SPEED,
            impact_ground_normal_y: IMPACT_GROUND_NORMAL_Y,
            hard_landing_down_speed: HARD_LANDING_DOWN_SPEED,
            hard_landing_impulse: HARD_LANDING_IMPULSE,
            assist_strength: LANDING_ASSIST_STRENGTH,
            camera_lock_time: LANDING_CAMERA_LOCK_S,
            damp_time: LANDING_DAMP_S,
            damp_multiplier: LANDING_DAMP_MULTIPLIER,
            feedback_min_speed: LANDING_FEEDBACK_MIN_SPEED,
            feedback_reference_speed: LANDING_FEEDBACK_REFERENCE_SPEED,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CameraSettings {
    pub height_offset: f32,
    pub z_interp: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub distance_interp: f32,
    pub fov_min_deg: f32,
    pub fov_max_deg: f32,
    pub fov_interp: f32,
    pub speed_interp: f32,
    pub move_dir_interp: f32,
    pub look_at_height: f32,
    pub look_ahead_min: f32,
    pub look_ahead_max: f32,
    pub position_interp: f32,
    pub rotation_interp: f32,
    pub airborne_follow_delay: f32,
    pub airborne_z_interp: f32,
    pub max_vertical_lag: f32,
    pub max_below_ball: f32,
    pub max_above_ball: f32,
    pub max_bank_deg: f32,
    pub bank_interp: f32,
    pub bank_min_speed_sq: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            height_offset: CAMERA_HEIGHT_OFFSET,
            z_interp: CAMERA_Z_INTERP,
            min_distance: CAMERA_MIN_DISTANCE,
            max_distance: CAMERA_MAX_DISTANCE,
            distance_interp: CAMERA_DISTANCE_INTERP,
            fov_min_deg: CAMERA_FOV_MIN_DEG,
            fov_max_deg: CAMERA_FOV_MAX_DEG,
            fov_interp: CAMERA_FOV_INTERP,
            speed_interp: CAMERA_SPEED_INTERP,
            move_dir_interp: CAMERA_MOVE_DIR_INTERP,
            look_at_height: CAMERA_LOOK_AT_HEIGHT,
            look_ahead_min: CAMERA_LOOK_AHEAD_MIN,
            look_ahead_max: CAMERA_LOOK_AHEAD_MAX,
            position_interp: CAMERA_POSITION_INTERP,
            rotation_interp: CAMERA_ROTATION_INTERP,
            airborne_follow_delay: CAMERA_AIRBORNE_FOLLOW_DELAY_S,
            airborne_z_interp: CAMERA_AIRBORNE_Z_INTERP,
            max_vertical_lag: CAMERA_MAX_VERTICAL_LAG,
            max_below_ball: CAMERA_MAX_BELOW_BALL,
            max_above_ball: CAMERA_MAX_ABOVE_BALL,
            max_bank_deg: CAMERA_MAX_BANK_DEG,
            bank_interp: CAMERA_BANK_INTERP,
            bank_min_speed_sq: CAMERA_BANK_MIN_SPEED_SQ,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RollAudioSettings {
    pub pitch_min: f32,
    pub pitch_max: f32,
    pub volume_min: f32,
    pub volume_max: f32,
    pub speed_exponent: f32,
    pub air_interp: f32,
    pub air_pitch: f32,
    pub air_volume: f32,
    pub smooth_interp: f32,
}

impl Default for RollAudioSettings {
    fn default() -> Self {
        Self {
            pitch_min: ROLL_PITCH_MIN,
            pitch_max: ROLL_PITCH_MAX,
            volume_min: ROLL_VOLUME_MIN,
            volume_max: ROLL_VOLUME_MAX,
            speed_exponent: ROLL_SPEED_EXPONENT,
            air_interp: ROLL_AIR_INTERP,
            air_pitch: ROLL_AIR_PITCH,
            air_volume: ROLL_AIR_VOLUME,
            smooth_interp: ROLL_SMOOTH_INTERP,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CountdownSettings {
    pub enabled: bool,
    pub duration: f32,
    pub launch_speed: f32,
    pub go_display_time: f32,
}

impl Default for CountdownSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            duration: COUNTDOWN_S,
            launch_speed: START_LAUNCH_MPS,
            go_display_time: GO_DISPLAY_S,
        }
    }
}
