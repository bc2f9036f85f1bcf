//! Speed-reactive chase camera.
//!
//! The camera trails the ball along a smoothed travel direction. Speed drives the
//! pull-back distance, the look-ahead and the field of view. Vertical motion is
//! anchored to the ground while grounded so small bumps and hops do not bob the view.

use super::settings::CameraSettings;
use crate::types::{Iso, Quat, Vec3, flat_forward, up};
use crate::utils::{
    direction_from_yaw_pitch, horizontal, interp_angle_to, interp_to, is_nearly_zero, lerp,
    pitch_from_direction, right_from_yaw, safe_normal, signed_turn, vinterp_to,
    yaw_from_direction,
};

/// Final camera placement for a tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraView {
    pub position: Vec3,
    /// Radians about world up; zero looks down `-Z`.
    pub yaw: f32,
    /// Radians above the horizon.
    pub pitch: f32,
    /// Bank in radians; positive dips the right side.
    pub roll: f32,
    /// Horizontal field of view.
    pub fov_degrees: f32,
}

impl CameraView {
    pub fn forward(&self) -> Vec3 {
        direction_from_yaw_pitch(self.yaw, self.pitch)
    }

    pub fn right(&self) -> Vec3 {
        right_from_yaw(self.yaw)
    }

    /// Orientation of a `-Z` forward camera.
    pub fn rotation(&self) -> Quat {
        Quat::from_axis_angle(&Vec3::y_axis(), self.yaw)
            * Quat::from_axis_angle(&Vec3::x_axis(), self.pitch)
            * Quat::from_axis_angle(&Vec3::z_axis(), -self.roll)
    }
}

/// Per-tick inputs for [`ChaseCamera::update`].
#[derive(Clone, Copy, Debug)]
pub struct CameraInput {
    pub ball_position: Vec3,
    pub velocity: Vec3,
    pub grounded: bool,
    /// Freeze the travel direction (set briefly after hard landings).
    pub direction_locked: bool,
    /// Speed treated as "full speed" for all speed-driven effects.
    pub max_speed: f32,
}

#[derive(Clone, Debug)]
pub struct ChaseCamera {
    move_dir: Vec3,
    smoothed_speed: f32,
    anchor_y: f32,
    smoothed_y: f32,
    distance: f32,
    position: Vec3,
    yaw: f32,
    pitch: f32,
    roll: f32,
    fov: f32,
    airborne_time: f32,
}

impl ChaseCamera {
    /// Camera settled behind a ball resting at `spawn`.
    pub fn new(spawn: &Iso, settings: &CameraSettings) -> Self {
        let mut camera = Self {
            move_dir: Vec3::new(0.0, 0.0, -1.0),
            smoothed_speed: 0.0,
            anchor_y: 0.0,
            smoothed_y: 0.0,
            distance: settings.min_distance,
            position: Vec3::zeros(),
            yaw: 0.0,
            pitch: 0.0,
            roll: 0.0,
            fov: settings.fov_min_deg,
            airborne_time: 0.0,
        };
        camera.reset(spawn, settings);
        camera
    }

    /// Snap back behind `spawn`, clearing all smoothing history.
    pub fn reset(&mut self, spawn: &Iso, settings: &CameraSettings) {
        let ball = spawn.translation.vector;

        self.move_dir = flat_forward(spawn);
        self.smoothed_speed = 0.0;
        self.anchor_y = ball.y;
        self.smoothed_y = ball.y + settings.height_offset;
        self.distance = settings.min_distance;
        self.position = Vec3::new(ball.x, self.smoothed_y, ball.z) - self.move_dir * self.distance;
        self.roll = 0.0;
        self.fov = settings.fov_min_deg;
        self.airborne_time = 0.0;

        let target = ball + self.move_dir * settings.look_ahead_min + up() * settings.look_at_height;
        let look = target - self.position;
        self.yaw = yaw_from_direction(look);
        self.pitch = pitch_from_direction(look);
    }

    pub fn update(&mut self, input: &CameraInput, settings: &CameraSettings, dt: f32) -> CameraView {
        let ball = input.ball_position;

        if input.grounded {
            self.airborne_time = 0.0;
        } else {
            self.airborne_time += dt;
        }

        // 1) Travel direction: follow velocity on the ground, hold it in the air.
        let flat_velocity = horizontal(input.velocity);
        let moving = !is_nearly_zero(flat_velocity, 1.0e-4);

        if input.grounded && !input.direction_locked && moving {
            if let Some(desired) = safe_normal(flat_velocity) {
                self.move_dir = vinterp_to(self.move_dir, desired, dt, settings.move_dir_interp);
            }
        }
        if is_nearly_zero(self.move_dir, 1.0e-4) && moving {
            self.move_dir = safe_normal(flat_velocity).unwrap_or(self.move_dir);
        }

        // 2) Speed alpha, shaped so the camera reacts before max speed.
        self.smoothed_speed =
            interp_to(self.smoothed_speed, flat_velocity.norm(), dt, settings.speed_interp);

        let normalized = if input.max_speed > 1.0e-4 {
            self.smoothed_speed / input.max_speed
        } else {
            0.0
        };
        let speed_alpha = normalized.clamp(0.0, 1.0).sqrt();

        // 3) Vertical anchoring.
        if input.grounded {
            self.anchor_y = ball.y;
        } else if self.airborne_time > settings.airborne_follow_delay {
            self.anchor_y = interp_to(self.anchor_y, ball.y, dt, settings.airborne_z_interp);
        }
        self.anchor_y = self.anchor_y.max(ball.y - settings.max_vertical_lag);

        let desired_y = self.anchor_y + settings.height_offset;
        self.smoothed_y = interp_to(self.smoothed_y, desired_y, dt, settings.z_interp).clamp(
            ball.y - settings.max_below_ball,
            ball.y + settings.max_above_ball,
        );

        // 4) Pull back with speed.
        let target_distance = lerp(settings.min_distance, settings.max_distance, speed_alpha);
        self.distance = interp_to(self.distance, target_distance, dt, settings.distance_interp);

        let desired = Vec3::new(ball.x, self.smoothed_y, ball.z) - self.move_dir * self.distance;
        self.position = vinterp_to(self.position, desired, dt, settings.position_interp);

        // 5) Look ahead of the ball.
        let look_ahead = lerp(
            settings.look_ahead_min,
            settings.look_ahead_max,
            speed_alpha.powf(0.8),
        );
        let target = ball + self.move_dir * look_ahead + up() * settings.look_at_height;
        let look = target - self.position;

        let rotation_interp = if settings.rotation_interp > 0.0 {
            settings.rotation_interp
        } else {
            settings.position_interp
        };
        if let Some(look) = safe_normal(look) {
            self.yaw = interp_angle_to(self.yaw, yaw_from_direction(look), dt, rotation_interp);
            self.pitch =
                interp_angle_to(self.pitch, pitch_from_direction(look), dt, rotation_interp);
        }

        // 6) Bank into turns.
        let target_roll = match safe_normal(flat_velocity) {
            Some(dir) if flat_velocity.norm_squared() > settings.bank_min_speed_sq => {
                signed_turn(self.move_dir, dir) * settings.max_bank_deg.to_radians()
            }
            _ => 0.0,
        };
        self.roll = interp_to(self.roll, target_roll, dt, settings.bank_interp);

        // 7) Field of view.
        let target_fov = lerp(settings.fov_min_deg, settings.fov_max_deg, speed_alpha);
        self.fov = interp_to(self.fov, target_fov, dt, settings.fov_interp);

        self.view()
    }

    pub fn view(&self) -> CameraView {
        CameraView {
            position: self.position,
            yaw: self.yaw,
            pitch: self.pitch,
            roll: self.roll,
            fov_degrees: self.fov,
        }
    }

    /// Smoothed horizontal travel direction (not necessarily unit length).
    pub fn move_direction(&self) -> Vec3 {
        self.move_dir
    }

    pub fn anchor_height(&self) -> f32 {
        self.anchor_y
    }

    pub fn smoothed_height(&self) -> f32 {
        self.smoothed_y
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }
}
