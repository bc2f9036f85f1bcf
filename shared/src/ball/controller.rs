use super::audio::{RollAudio, RollAudioState};
use super::body::BallBody;
use super::camera::{CameraInput, CameraView, ChaseCamera};
use super::countdown::{Countdown, CountdownDisplay, CountdownEvent};
use super::grounding::GroundingState;
use super::landing::{Impact, LandingFeedback, LandingState, landing_feedback};
use super::movement::{
    ForceContext, HopState, MovementState, clamp_horizontal_speed, input_direction,
    movement_force, rolling_angular_velocity,
};
use super::settings::BallSettings;
use crate::types::{Iso, Vec3, flat_forward, up};

/// Player intent for one tick. Axes are in `[-1, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BallInput {
    pub forward: f32,
    pub right: f32,
    /// Hop was pressed since the last tick.
    pub hop: bool,
}

/// Everything the presentation layer needs from one controller tick.
#[derive(Clone, Copy, Debug)]
pub struct BallFrame {
    pub grounded: bool,
    pub camera: CameraView,
    pub roll_audio: Option<RollAudio>,
    /// Set on the tick the ball touched down hard enough to be felt.
    pub landing: Option<LandingFeedback>,
    pub countdown: Option<CountdownEvent>,
    pub hopped: bool,
}

/// Drives a [`BallBody`] from player input and produces the chase camera view.
///
/// Call [`BallController::tick`] once per fixed step before stepping physics, and
/// forward contact reports to [`BallController::on_impact`].
#[derive(Clone, Debug)]
pub struct BallController {
    settings: BallSettings,
    spawn: Iso,

    grounding: GroundingState,
    movement: MovementState,
    hop: HopState,
    landing: LandingState,
    camera: ChaseCamera,
    audio: RollAudioState,
    countdown: Countdown,

    /// Stable grounded state at the end of the previous tick.
    was_grounded: bool,
    /// Vertical speed last seen before raw ground contact.
    fall_speed: f32,
}

impl BallController {
    /// Place the ball at `spawn`, settle it on the track and arm the countdown.
    pub fn new(body: &mut impl BallBody, spawn: Iso, settings: BallSettings) -> Self {
        let countdown = Countdown::new(&settings.countdown);

        body.teleport(spawn);
        let spawn = Self::snap_to_ground(body, &settings).unwrap_or(spawn);

        body.set_simulating(!countdown.is_active());

        Self {
            camera: ChaseCamera::new(&spawn, &settings.camera),
            audio: RollAudioState::new(&settings.audio),
            countdown,
            grounding: GroundingState::default(),
            movement: MovementState::default(),
            hop: HopState::default(),
            landing: LandingState::default(),
            was_grounded: false,
            fall_speed: 0.0,
            settings,
            spawn,
        }
    }

    /// Drop the ball onto whatever is below it. Returns the settled pose.
    fn snap_to_ground(body: &mut impl BallBody, settings: &BallSettings) -> Option<Iso> {
        let origin = body.position();
        let hit = body.sweep_down(
            origin,
            settings.grounding.spawn_snap_distance,
            body.radius(),
        )?;

        let mut pose = body.pose();
        pose.translation.vector = origin - up() * hit.distance;
        body.teleport(pose);

        log::debug!("Snapped ball to ground at {:?}", pose.translation.vector);
        Some(pose)
    }

    pub fn tick(&mut self, body: &mut impl BallBody, input: BallInput, now: f32, dt: f32) -> BallFrame {
        // 1) Countdown.
        let countdown = self.countdown.tick(&self.settings.countdown, dt);
        if countdown == Some(CountdownEvent::Go) {
            self.start_race_physics(body);
        }
        let racing = !self.countdown.is_active();

        // 2) Hop, gated on last tick's stable ground.
        let mut hopped = false;
        if input.hop && racing {
            if let Some(v) = self.hop.try_hop(
                self.was_grounded,
                body.linear_velocity(),
                now,
                &self.settings.hop,
            ) {
                body.set_linear_velocity(v);
                hopped = true;
            }
        }

        // 3) Ground contact.
        let hit = GroundingState::probe(body, &self.settings.grounding);
        let grounded = self.grounding.update(hit, &self.settings.grounding, dt);
        self.hop.observe_grounded(self.was_grounded, grounded);

        let ground_normal = if grounded {
            self.grounding.ground_normal()
        } else {
            up()
        };

        // 4) Camera.
        let camera = self.camera.update(
            &CameraInput {
                ball_position: body.position(),
                velocity: body.linear_velocity(),
                grounded,
                direction_locked: self.landing.is_camera_locked(),
                max_speed: self.settings.movement.max_speed,
            },
            &self.settings.camera,
            dt,
        );

        // 5) Movement.
        if racing {
            self.apply_movement(body, input, &camera, grounded, ground_normal, dt);
        }

        // 6) Landing timers.
        self.landing.tick(dt);

        // 7) Rolling sound.
        let velocity = body.linear_velocity();
        let roll_audio = self.audio.update(
            velocity.norm(),
            self.settings.movement.max_speed,
            grounded,
            &self.settings.audio,
            dt,
        );

        // 8) Landing feedback.
        if !self.grounding.is_raw_grounded() {
            self.fall_speed = velocity.y.abs();
        }
        let landing = if !self.was_grounded && grounded {
            landing_feedback(self.fall_speed, &self.settings.landing)
        } else {
            None
        };

        self.was_grounded = grounded;

        BallFrame {
            grounded,
            camera,
            roll_audio,
            landing,
            countdown,
            hopped,
        }
    }

    fn apply_movement(
        &mut self,
        body: &mut impl BallBody,
        input: BallInput,
        camera: &CameraView,
        grounded: bool,
        ground_normal: Vec3,
        dt: f32,
    ) {
        let movement = &self.settings.movement;

        let target = input_direction(
            input.forward,
            input.right,
            camera.forward(),
            camera.right(),
            ground_normal,
        );
        let dir = self.movement.smooth_input(target, movement, dt);

        let ctx = ForceContext {
            velocity: body.linear_velocity(),
            grounded,
            ground_normal,
            landing_damp: self.landing.damp_multiplier(&self.settings.landing),
        };
        if let Some(force) = movement_force(dir, ctx, movement) {
            body.add_force(force);
        }

        if let Some(v) = clamp_horizontal_speed(body.linear_velocity(), movement.max_speed) {
            body.set_linear_velocity(v);
        }

        if grounded {
            if let Some(w) = rolling_angular_velocity(
                body.angular_velocity(),
                body.linear_velocity(),
                ground_normal,
                body.radius(),
                movement,
                dt,
            ) {
                body.set_angular_velocity(w);
            }
        }
    }

    fn start_race_physics(&mut self, body: &mut impl BallBody) {
        body.set_simulating(true);
        body.set_linear_velocity(Vec3::zeros());
        body.set_angular_velocity(Vec3::zeros());
        body.add_velocity_change(flat_forward(&self.spawn) * self.settings.countdown.launch_speed);
    }

    /// Contact reported by the physics backend.
    pub fn on_impact(&mut self, body: &mut impl BallBody, impact: &Impact) {
        if let Some(assist) = self.landing.on_impact(impact, &self.settings.landing) {
            body.add_velocity_change(assist);
        }
    }

    /// Put the ball back at the spawn with all transient state cleared.
    pub fn reset_run(&mut self, body: &mut impl BallBody) {
        let spawn = self.spawn;
        self.reset_to(body, &spawn);
        log::info!("Run reset");
    }

    /// Put the ball at `pose` (a checkpoint) with all transient state cleared.
    pub fn respawn_at(&mut self, body: &mut impl BallBody, pose: &Iso) {
        self.reset_to(body, pose);
        log::info!("Respawned at {:?}", pose.translation.vector);
    }

    fn reset_to(&mut self, body: &mut impl BallBody, pose: &Iso) {
        body.set_linear_velocity(Vec3::zeros());
        body.set_angular_velocity(Vec3::zeros());
        body.teleport(*pose);

        self.camera.reset(pose, &self.settings.camera);
        self.movement.reset();
        self.landing.reset();
        self.fall_speed = 0.0;
    }

    pub fn settings(&self) -> &BallSettings {
        &self.settings
    }

    pub fn spawn(&self) -> &Iso {
        &self.spawn
    }

    pub fn is_grounded(&self) -> bool {
        self.grounding.is_grounded()
    }

    pub fn grounding(&self) -> &GroundingState {
        &self.grounding
    }

    pub fn camera(&self) -> &ChaseCamera {
        &self.camera
    }

    pub fn countdown_display(&self) -> CountdownDisplay {
        self.countdown.display()
    }

    pub fn is_counting_down(&self) -> bool {
        self.countdown.is_active()
    }
}
