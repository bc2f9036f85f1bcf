//! Force-based rolling control.
//!
//! All functions here are pure; the controller reads the body, calls these and
//! writes the results back.

use super::settings::{HopSettings, MovementSettings};
use crate::types::{Vec3, up};
use crate::utils::{
    horizontal, is_nearly_zero, lerp, map_range_clamped, project_on_plane, safe_normal,
    vinterp_to,
};

/// Camera-relative input direction, flattened onto the ground plane.
///
/// Returns zero when the stick is centered or the camera basis collapses onto the normal.
pub fn input_direction(
    forward_axis: f32,
    right_axis: f32,
    cam_forward: Vec3,
    cam_right: Vec3,
    ground_normal: Vec3,
) -> Vec3 {
    let forward = safe_normal(project_on_plane(cam_forward, ground_normal)).unwrap_or_else(Vec3::zeros);
    let right = safe_normal(project_on_plane(cam_right, ground_normal)).unwrap_or_else(Vec3::zeros);

    let dir = forward * forward_axis + right * right_axis;
    if is_nearly_zero(dir, 1.0e-4) {
        return Vec3::zeros();
    }
    safe_normal(dir).unwrap_or_else(Vec3::zeros)
}

/// Smoothed input intent carried between ticks.
#[derive(Clone, Debug, Default)]
pub struct MovementState {
    smoothed_input: Vec3,
}

impl MovementState {
    /// Ease toward `target` and drop residual drift. Returns the smoothed direction.
    pub fn smooth_input(&mut self, target: Vec3, settings: &MovementSettings, dt: f32) -> Vec3 {
        self.smoothed_input = vinterp_to(self.smoothed_input, target, dt, settings.input_interp);

        if self.smoothed_input.norm_squared() < settings.input_drift_eps_sq {
            self.smoothed_input = Vec3::zeros();
        }

        self.smoothed_input
    }

    pub fn smoothed_input(&self) -> Vec3 {
        self.smoothed_input
    }

    pub fn reset(&mut self) {
        self.smoothed_input = Vec3::zeros();
    }
}

/// Force attenuation for the ground slope: 1.0 on gentle slopes, down to the
/// configured minimum on steep ones.
pub fn slope_force_multiplier(ground_normal: Vec3, settings: &MovementSettings) -> f32 {
    let slope_dot = ground_normal.dot(&up());
    map_range_clamped(
        slope_dot,
        settings.slope_full_force_dot,
        settings.slope_min_force_dot,
        1.0,
        settings.slope_min_multiplier,
    )
    .clamp(settings.slope_min_multiplier.min(1.0), 1.0)
}

/// Inputs to [`movement_force`] for one tick.
#[derive(Clone, Copy, Debug)]
pub struct ForceContext {
    pub velocity: Vec3,
    pub grounded: bool,
    pub ground_normal: Vec3,
    /// Extra force multiplier, below 1.0 while a hard landing damp is active.
    pub landing_damp: f32,
}

/// Steering force for this tick, or `None` when nothing should be applied.
///
/// Behavior
/// - No force without input, or at max speed while pushing along the velocity.
/// - Force ramps from `force_scale_at_rest` to full with speed, while the
///   steering contribution shrinks by up to `max_steering_reduction`.
/// - Grounded force follows the ground plane and is scaled by the slope.
/// - Airborne force is scaled by `air_control`.
pub fn movement_force(input: Vec3, ctx: ForceContext, settings: &MovementSettings) -> Option<Vec3> {
    if input == Vec3::zeros() || settings.max_speed <= 0.0 {
        return None;
    }

    let speed = ctx.velocity.norm();
    let speed_alpha = (speed / settings.max_speed).clamp(0.0, 1.0);
    if speed >= settings.max_speed && ctx.velocity.dot(&input) > 0.0 {
        return None;
    }

    let force_scale = lerp(settings.force_scale_at_rest, 1.0, speed_alpha);
    let steering = 1.0 - speed_alpha * settings.max_steering_reduction;
    let damp = ctx.landing_damp;

    let dir = input * steering;

    if ctx.grounded {
        let normal = safe_normal(ctx.ground_normal).unwrap_or_else(up);
        let dir = safe_normal(project_on_plane(dir, normal))?;

        let flatness = normal.dot(&up());
        let boost = lerp(settings.slope_downhill_boost, 1.0, flatness);
        let slope = slope_force_multiplier(normal, settings) * boost;

        return Some(dir * settings.move_force * slope * force_scale * damp);
    }

    Some(dir * settings.move_force * settings.air_control * force_scale * damp)
}

/// Cap horizontal speed, keeping vertical velocity. `None` if already within the cap.
pub fn clamp_horizontal_speed(velocity: Vec3, max_speed: f32) -> Option<Vec3> {
    let flat = horizontal(velocity);
    let speed = flat.norm();
    if speed <= max_speed {
        return None;
    }

    let capped = flat / speed * max_speed;
    Some(Vec3::new(capped.x, velocity.y, capped.z))
}

/// Angular velocity that makes the ball roll without slipping along `velocity`.
///
/// Only meaningful on the ground; returns `None` for negligible motion or when the
/// velocity is parallel to the normal.
pub fn rolling_angular_velocity(
    current: Vec3,
    velocity: Vec3,
    ground_normal: Vec3,
    radius: f32,
    settings: &MovementSettings,
    dt: f32,
) -> Option<Vec3> {
    if velocity.norm_squared() < settings.roll_sync_min_speed_sq || radius <= 0.0 {
        return None;
    }

    let dir = safe_normal(velocity)?;
    let normal = safe_normal(ground_normal).unwrap_or_else(up);
    let axis = safe_normal(normal.cross(&dir))?;

    let target = axis * (velocity.norm() / radius);
    Some(vinterp_to(current, target, dt, settings.roll_sync_interp))
}

/// Hop gating: once per landing, rate limited.
#[derive(Clone, Debug)]
pub struct HopState {
    can_hop: bool,
    last_hop_time: Option<f32>,
}

impl Default for HopState {
    fn default() -> Self {
        Self {
            can_hop: true,
            last_hop_time: None,
        }
    }
}

impl HopState {
    /// Re-arm on an airborne to grounded transition of the stable state.
    pub fn observe_grounded(&mut self, was_grounded: bool, grounded: bool) {
        if !was_grounded && grounded {
            self.can_hop = true;
        }
    }

    /// Consume the hop if allowed. Returns the new linear velocity on success.
    pub fn try_hop(
        &mut self,
        grounded: bool,
        velocity: Vec3,
        now: f32,
        settings: &HopSettings,
    ) -> Option<Vec3> {
        if !self.can_hop || !grounded {
            return None;
        }
        if self
            .last_hop_time
            .is_some_and(|last| now - last < settings.cooldown)
        {
            return None;
        }

        self.can_hop = false;
        self.last_hop_time = Some(now);

        let mut v = velocity;
        if v.y < 0.0 {
            v.y = 0.0;
        }
        v.y += settings.velocity_change;
        Some(v)
    }

    pub fn can_hop(&self) -> bool {
        self.can_hop
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1.0e-4;

    fn ctx(velocity: Vec3, grounded: bool, normal: Vec3) -> ForceContext {
        ForceContext {
            velocity,
            grounded,
            ground_normal: normal,
            landing_damp: 1.0,
        }
    }

    #[test]
    fn input_follows_camera_basis() {
        let fwd = Vec3::new(0.0, -0.5, -1.0);
        let right = Vec3::x();
        let dir = input_direction(1.0, 0.0, fwd, right, Vec3::y());
        assert!((dir - Vec3::new(0.0, 0.0, -1.0)).norm() < EPS);

        let diag = input_direction(1.0, 1.0, fwd, right, Vec3::y());
        assert!((diag.norm() - 1.0).abs() < EPS);
        assert!(diag.x > 0.0 && diag.z < 0.0);

        assert_eq!(input_direction(0.0, 0.0, fwd, right, Vec3::y()), Vec3::zeros());
    }

    #[test]
    fn smoothing_ramps_and_kills_drift() {
        let settings = MovementSettings::default();
        let mut state = MovementState::default();

        let first = state.smooth_input(Vec3::x(), &settings, 1.0 / 60.0);
        assert!((first.x - 0.2).abs() < EPS);

        // Release: decays until below the drift threshold, then snaps to zero.
        let mut ticks = 0;
        while state.smooth_input(Vec3::zeros(), &settings, 1.0 / 60.0) != Vec3::zeros() {
            ticks += 1;
            assert!(ticks < 100);
        }
    }

    #[test]
    fn no_force_at_max_speed_along_velocity() {
        let settings = MovementSettings::default();
        let v = Vec3::new(settings.max_speed, 0.0, 0.0);
        assert!(movement_force(Vec3::x(), ctx(v, true, Vec3::y()), &settings).is_none());
        // Braking against the velocity still works.
        assert!(movement_force(-Vec3::x(), ctx(v, true, Vec3::y()), &settings).is_some());
    }

    #[test]
    fn flat_ground_force_at_rest() {
        let settings = MovementSettings::default();
        let f = movement_force(Vec3::x(), ctx(Vec3::zeros(), true, Vec3::y()), &settings).unwrap();
        let expected = settings.move_force * settings.force_scale_at_rest;
        assert!((f.norm() - expected).abs() < EPS, "{}", f.norm());
    }

    #[test]
    fn air_force_is_reduced() {
        let settings = MovementSettings::default();
        let ground = movement_force(Vec3::x(), ctx(Vec3::zeros(), true, Vec3::y()), &settings)
            .unwrap()
            .norm();
        let air = movement_force(Vec3::x(), ctx(Vec3::zeros(), false, Vec3::y()), &settings)
            .unwrap()
            .norm();
        assert!((air / ground - settings.air_control).abs() < EPS);
    }

    #[test]
    fn landing_damp_scales_force() {
        let settings = MovementSettings::default();
        let mut c = ctx(Vec3::zeros(), true, Vec3::y());
        let full = movement_force(Vec3::x(), c, &settings).unwrap().norm();
        c.landing_damp = 0.25;
        let damped = movement_force(Vec3::x(), c, &settings).unwrap().norm();
        assert!((damped / full - 0.25).abs() < EPS);
    }

    #[test]
    fn slope_multiplier_band() {
        let settings = MovementSettings::default();
        assert!((slope_force_multiplier(Vec3::y(), &settings) - 1.0).abs() < EPS);

        let steep = Vec3::new(0.8, 0.6, 0.0).normalize();
        assert!((slope_force_multiplier(steep, &settings) - 0.1).abs() < EPS);

        let mid = Vec3::new((1.0f32 - 0.8 * 0.8).sqrt(), 0.8, 0.0);
        assert!((slope_force_multiplier(mid, &settings) - 0.55).abs() < EPS);
    }

    #[test]
    fn grounded_force_follows_the_slope() {
        let settings = MovementSettings::default();
        let normal = Vec3::new(0.0, 0.9, 0.3).normalize();
        let f = movement_force(
            Vec3::new(0.0, 0.0, -1.0),
            ctx(Vec3::zeros(), true, normal),
            &settings,
        )
        .unwrap();
        assert!(f.dot(&normal).abs() < EPS);
    }

    #[test]
    fn clamp_keeps_vertical_velocity() {
        let v = Vec3::new(30.0, -7.0, 40.0);
        let clamped = clamp_horizontal_speed(v, 18.0).unwrap();
        assert!((horizontal(clamped).norm() - 18.0).abs() < EPS);
        assert_eq!(clamped.y, -7.0);
        assert!(clamp_horizontal_speed(Vec3::new(1.0, -50.0, 0.0), 18.0).is_none());
    }

    #[test]
    fn rolling_axis_matches_no_slip_contact() {
        let settings = MovementSettings::default();
        let v = Vec3::new(5.0, 0.0, 0.0);
        // Large dt snaps to the target.
        let w = rolling_angular_velocity(Vec3::zeros(), v, Vec3::y(), 0.5, &settings, 1.0).unwrap();
        let contact = Vec3::new(0.0, -0.5, 0.0);
        let contact_velocity = v + w.cross(&contact);
        assert!(contact_velocity.norm() < EPS, "{contact_velocity:?}");

        assert!(
            rolling_angular_velocity(Vec3::zeros(), Vec3::new(0.01, 0.0, 0.0), Vec3::y(), 0.5, &settings, 1.0)
                .is_none()
        );
    }

    #[test]
    fn hop_is_single_use_until_landing() {
        let settings = HopSettings::default();
        let mut hop = HopState::default();

        let v = hop.try_hop(true, Vec3::new(1.0, -3.0, 0.0), 1.0, &settings).unwrap();
        assert_eq!(v, Vec3::new(1.0, settings.velocity_change, 0.0));

        // Still grounded, long after the cooldown: not re-armed yet.
        assert!(hop.try_hop(true, Vec3::zeros(), 5.0, &settings).is_none());

        hop.observe_grounded(false, true);
        assert!(hop.try_hop(true, Vec3::zeros(), 5.0, &settings).is_some());
    }

    #[test]
    fn hop_respects_cooldown_and_ground() {
        let settings = HopSettings::default();
        let mut hop = HopState::default();
        assert!(hop.try_hop(false, Vec3::zeros(), 0.0, &settings).is_none());

        hop.try_hop(true, Vec3::zeros(), 1.0, &settings);
        hop.observe_grounded(false, true);
        assert!(hop.try_hop(true, Vec3::zeros(), 1.1, &settings).is_none());
        assert!(hop.try_hop(true, Vec3::zeros(), 1.25, &settings).is_some());
    }

    #[test]
    fn hop_keeps_upward_velocity() {
        let settings = HopSettings::default();
        let mut hop = HopState::default();
        let v = hop.try_hop(true, Vec3::new(0.0, 2.0, 0.0), 0.0, &settings).unwrap();
        assert!((v.y - (2.0 + settings.velocity_change)).abs() < EPS);
    }
}
