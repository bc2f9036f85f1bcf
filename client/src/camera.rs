use bevy::{
    camera::Exposure,
    pbr::{AtmosphereMode, AtmosphereSettings},
    prelude::*,
};
use rand::Rng;

use crate::{
    ball::{BallLanded, ChaseView, spawn_marble},
    convert,
};

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<CameraShake>();

    app.add_systems(Startup, add_camera.after(spawn_marble));
    app.add_systems(Update, trigger_shake);
    app.add_systems(PostUpdate, follow_ball);
}

/// Peak shake offset (meters) for the hardest landing.
const SHAKE_AMPLITUDE: f32 = 0.12;
const SHAKE_DURATION_S: f32 = 0.25;

#[derive(Component)]
pub struct ChaseCamera;

/// Decaying camera jitter after a landing.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq)]
pub struct CameraShake {
    remaining: f32,
    strength: f32,
}

impl CameraShake {
    /// A stronger landing replaces a weaker shake still in progress.
    pub fn trigger(&mut self, scale: f32) {
        let strength = scale.clamp(0.0, 1.0) * SHAKE_AMPLITUDE;
        if self.remaining <= 0.0 || strength >= self.current_amplitude() {
            self.strength = strength;
            self.remaining = SHAKE_DURATION_S;
        }
    }

    pub fn current_amplitude(&self) -> f32 {
        if self.remaining <= 0.0 {
            return 0.0;
        }
        self.strength * (self.remaining / SHAKE_DURATION_S)
    }

    pub fn tick(&mut self, dt: f32) {
        self.remaining = (self.remaining - dt).max(0.0);
    }
}

/// Vertical FOV (radians) for a horizontal FOV in degrees at `aspect` (width / height).
pub fn vertical_fov(horizontal_degrees: f32, aspect: f32) -> f32 {
    let half = horizontal_degrees.to_radians() * 0.5;
    2.0 * (half.tan() / aspect.max(1.0e-3)).atan()
}

pub(crate) fn add_camera(mut commands: Commands, chase: Res<ChaseView>) {
    let view = chase.current;
    commands.spawn((
        ChaseCamera,
        Exposure { ev100: 16.0 },
        bevy::core_pipeline::tonemapping::Tonemapping::AcesFitted,
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: vertical_fov(view.fov_degrees, 16.0 / 9.0),
            ..default()
        }),
        Transform {
            translation: convert::vec3(&view.position),
            rotation: convert::quat(&view.rotation()),
            ..default()
        },
        DistanceFog {
            color: Color::srgba(0.35, 0.48, 0.66, 1.0),
            directional_light_color: Color::srgba(1.0, 0.95, 0.85, 0.5),
            directional_light_exponent: 30.0,
            falloff: FogFalloff::from_visibility_colors(
                400.0, // Fog distance
                Color::srgb(0.35, 0.5, 0.66),
                Color::srgb(0.8, 0.8, 0.7),
            ),
        },
        AtmosphereSettings {
            rendering_method: AtmosphereMode::Raymarched,
            ..default()
        },
    ));
}

fn trigger_shake(mut landed: MessageReader<BallLanded>, mut shake: ResMut<CameraShake>) {
    for BallLanded(feedback) in landed.read() {
        shake.trigger(feedback.shake);
    }
}

fn follow_ball(
    chase: Res<ChaseView>,
    fixed: Res<Time<Fixed>>,
    time: Res<Time>,
    mut shake: ResMut<CameraShake>,
    camera: Single<(&mut Transform, &mut Projection), With<ChaseCamera>>,
) {
    let (mut cam_tf, mut projection) = camera.into_inner();
    let alpha = fixed.overstep_fraction().clamp(0.0, 1.0);
    let (from, to) = (chase.previous, chase.current);

    let position = convert::vec3(&from.position).lerp(convert::vec3(&to.position), alpha);
    let rotation = convert::quat(&from.rotation()).slerp(convert::quat(&to.rotation()), alpha);

    shake.tick(time.delta_secs());
    let amplitude = shake.current_amplitude();
    let jitter = if amplitude > 0.0 {
        let mut rng = rand::thread_rng();
        Vec3::new(
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
        ) * amplitude
    } else {
        Vec3::ZERO
    };

    cam_tf.translation = position + jitter;
    cam_tf.rotation = rotation;

    if let Projection::Perspective(perspective) = &mut *projection {
        let fov = from.fov_degrees + (to.fov_degrees - from.fov_degrees) * alpha;
        perspective.fov = vertical_fov(fov, perspective.aspect_ratio);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_viewport_keeps_the_fov() {
        assert!((vertical_fov(90.0, 1.0) - 90f32.to_radians()).abs() < 1.0e-5);
    }

    #[test]
    fn widescreen_narrows_the_vertical_fov() {
        let v = vertical_fov(90.0, 16.0 / 9.0);
        // tan(45°) / (16/9) = 0.5625
        assert!((v - 2.0 * 0.5625f32.atan()).abs() < 1.0e-5);
        assert!(v < 90f32.to_radians());
    }

    #[test]
    fn shake_decays_to_nothing() {
        let mut shake = CameraShake::default();
        assert_eq!(shake.current_amplitude(), 0.0);

        shake.trigger(1.0);
        assert!((shake.current_amplitude() - SHAKE_AMPLITUDE).abs() < 1.0e-6);

        shake.tick(SHAKE_DURATION_S * 0.5);
        assert!((shake.current_amplitude() - SHAKE_AMPLITUDE * 0.5).abs() < 1.0e-6);

        shake.tick(SHAKE_DURATION_S);
        assert_eq!(shake.current_amplitude(), 0.0);
    }

    #[test]
    fn weak_landing_does_not_cut_a_strong_shake() {
        let mut shake = CameraShake::default();
        shake.trigger(1.0);
        shake.tick(0.05);
        let before = shake.current_amplitude();

        shake.trigger(0.1);
        assert_eq!(shake.current_amplitude(), before);
    }
}
