//! Fixed-step driving of the ball controller and the physics world.
//!
//! Each fixed step runs, in order:
//! 1) latched resets (run reset or checkpoint respawn),
//! 2) the controller tick (forces, hop, camera),
//! 3) the Rapier step, with impacts fed back to the controller,
//! 4) publishing of poses, camera view and feedback messages.
//!
//! Rendering happens between steps, so the marble and camera are interpolated
//! from the last two fixed results using the fixed clock's overstep.

use bevy::prelude::*;
use leafwing_input_manager::prelude::ActionState;
use shared::{
    BallFrame, CameraView, Iso, TrackEvent,
    ball::{CountdownEvent, LandingFeedback},
};

use crate::{
    convert,
    input::{InputAction, PendingInput, ball_input},
    race::Race,
    track::{Simulation, build_simulation},
};

pub(super) fn plugin(app: &mut App) {
    app.add_message::<TrackMessage>();
    app.add_message::<BallLanded>();
    app.add_message::<CountdownChanged>();

    app.add_systems(Startup, spawn_marble.after(build_simulation));
    app.add_systems(FixedUpdate, step_simulation);
    app.add_systems(Update, interpolate_marble);
}

#[derive(Component)]
pub struct Marble;

/// Trigger or contact reported by the last physics step.
#[derive(Message, Clone, Copy, Debug)]
pub struct TrackMessage(pub TrackEvent);

#[derive(Message, Clone, Copy, Debug)]
pub struct BallLanded(pub LandingFeedback);

#[derive(Message, Clone, Copy, Debug, PartialEq)]
pub struct CountdownChanged(pub CountdownEvent);

/// Ball pose after the previous and the latest fixed step.
#[derive(Resource, Debug, Clone, Copy)]
pub struct BallPoses {
    pub previous: Iso,
    pub current: Iso,
}

impl BallPoses {
    fn new(pose: Iso) -> Self {
        Self {
            previous: pose,
            current: pose,
        }
    }

    fn advance(&mut self, pose: Iso) {
        self.previous = self.current;
        self.current = pose;
    }

    /// Drop the history so the next frames do not sweep across a teleport.
    fn snap(&mut self, pose: Iso) {
        *self = Self::new(pose);
    }

    pub fn interpolated(&self, alpha: f32) -> Transform {
        let from = convert::transform(&self.previous);
        let to = convert::transform(&self.current);
        let alpha = alpha.clamp(0.0, 1.0);
        Transform {
            translation: from.translation.lerp(to.translation, alpha),
            rotation: from.rotation.slerp(to.rotation, alpha),
            ..default()
        }
    }
}

/// Chase camera view after the previous and the latest fixed step.
#[derive(Resource, Debug, Clone, Copy)]
pub struct ChaseView {
    pub previous: CameraView,
    pub current: CameraView,
}

impl ChaseView {
    fn advance(&mut self, view: CameraView) {
        self.previous = self.current;
        self.current = view;
    }
}

/// Controller output of the latest fixed step.
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct LatestFrame(pub Option<BallFrame>);

pub(crate) fn spawn_marble(
    mut commands: Commands,
    sim: Res<Simulation>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let pose = sim.world.ball_pose();
    let view = sim.ball.camera().view();

    commands.spawn((
        Marble,
        Mesh3d(meshes.add(Sphere::new(sim.world.ball_radius()).mesh().uv(32, 18))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.85, 0.2, 0.15),
            metallic: 0.3,
            perceptual_roughness: 0.25,
            ..default()
        })),
        convert::transform(&pose),
    ));

    commands.insert_resource(BallPoses::new(pose));
    commands.insert_resource(ChaseView {
        previous: view,
        current: view,
    });
    commands.insert_resource(LatestFrame::default());
}

pub(crate) fn step_simulation(
    mut sim: ResMut<Simulation>,
    race: Res<Race>,
    actions: Res<ActionState<InputAction>>,
    mut pending: ResMut<PendingInput>,
    time: Res<Time>,
    mut poses: ResMut<BallPoses>,
    mut chase: ResMut<ChaseView>,
    mut latest: ResMut<LatestFrame>,
    mut track_events: MessageWriter<TrackMessage>,
    mut landed: MessageWriter<BallLanded>,
    mut countdown: MessageWriter<CountdownChanged>,
) {
    let now = time.elapsed_secs();
    let dt = time.delta_secs();
    let pending = pending.take();
    let Simulation { world, ball } = &mut *sim;

    // 1) Resets.
    let respawn_pose = race.0.last_checkpoint_pose().copied();
    let teleported = if pending.reset_run {
        ball.reset_run(&mut world.ball_body());
        true
    } else if pending.respawn {
        match respawn_pose {
            Some(pose) => ball.respawn_at(&mut world.ball_body(), &pose),
            None => ball.reset_run(&mut world.ball_body()),
        }
        true
    } else {
        false
    };

    // 2) Controller.
    let frame = ball.tick(&mut world.ball_body(), ball_input(&actions, &pending), now, dt);

    // 3) Physics.
    for event in world.step(dt) {
        if let TrackEvent::BallImpact(impact) = &event {
            ball.on_impact(&mut world.ball_body(), impact);
        }
        track_events.write(TrackMessage(event));
    }

    // 4) Publish.
    if teleported {
        poses.snap(world.ball_pose());
        chase.previous = frame.camera;
        chase.current = frame.camera;
    } else {
        poses.advance(world.ball_pose());
        chase.advance(frame.camera);
    }
    latest.0 = Some(frame);

    if let Some(feedback) = frame.landing {
        landed.write(BallLanded(feedback));
    }
    if let Some(event) = frame.countdown {
        countdown.write(CountdownChanged(event));
    }
}

fn interpolate_marble(
    poses: Res<BallPoses>,
    fixed: Res<Time<Fixed>>,
    mut marble: Single<&mut Transform, With<Marble>>,
) {
    let alpha = fixed.overstep_fraction();
    let target = poses.interpolated(alpha);
    marble.translation = target.translation;
    marble.rotation = target.rotation;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpolation_blends_between_steps() {
        let mut poses = BallPoses::new(Iso::translation(0.0, 1.0, 0.0));
        poses.advance(Iso::translation(0.0, 1.0, -2.0));

        let halfway = poses.interpolated(0.5);
        assert!(halfway.translation.abs_diff_eq(Vec3::new(0.0, 1.0, -1.0), 1.0e-6));
        assert_eq!(poses.interpolated(0.0).translation, Vec3::new(0.0, 1.0, 0.0));
        // Overstep beyond a full step does not extrapolate.
        assert_eq!(poses.interpolated(1.7).translation, Vec3::new(0.0, 1.0, -2.0));
    }

    #[test]
    fn snap_discards_history() {
        let mut poses = BallPoses::new(Iso::translation(5.0, 1.0, 5.0));
        poses.advance(Iso::translation(6.0, 1.0, 5.0));
        poses.snap(Iso::translation(-18.0, 0.5, -6.0));

        let expected = Vec3::new(-18.0, 0.5, -6.0);
        assert_eq!(poses.interpolated(0.0).translation, expected);
        assert_eq!(poses.interpolated(1.0).translation, expected);
    }
}
