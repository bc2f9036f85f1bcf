use super::settings::LandingSettings;
use crate::types::{Vec3, up};
use crate::utils::lerp;

/// A contact between the ball and the track, as reported by the physics backend.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Impact {
    /// Ball velocity just before the contact resolved.
    pub velocity: Vec3,
    /// Contact normal pointing away from the track.
    pub normal: Vec3,
    /// Magnitude of the contact impulse (N·s).
    pub impulse: f32,
}

/// Short-lived effects triggered by hard landings.
#[derive(Clone, Debug, Default)]
pub struct LandingState {
    damp_remaining: f32,
    camera_lock_remaining: f32,
}

impl LandingState {
    /// React to an impact. Returns an upward velocity change to apply, if any.
    ///
    /// Behavior
    /// - Impacts with a small vertical speed are ignored.
    /// - A fast downward hit on ground-like geometry locks the camera direction
    ///   briefly and adds a small upward assist proportional to the speed.
    /// - If that hit also carried a big impulse, steering force is damped briefly.
    pub fn on_impact(&mut self, impact: &Impact, settings: &LandingSettings) -> Option<Vec3> {
        let v = impact.velocity;
        if v.y.abs() < settings.impact_min_vertical_speed {
            return None;
        }

        let ground_hit = impact.normal.y.abs() > settings.impact_ground_normal_y;
        let fast_down = v.y < -settings.hard_landing_down_speed;
        if !(ground_hit && fast_down) {
            return None;
        }

        self.camera_lock_remaining = settings.camera_lock_time;

        if impact.impulse > settings.hard_landing_impulse {
            self.damp_remaining = settings.damp_time;
        }

        log::debug!(
            "Hard landing at {:.1} m/s (impulse {:.1})",
            v.norm(),
            impact.impulse
        );

        Some(up() * v.norm() * settings.assist_strength)
    }

    /// Count both timers down, floored at zero.
    pub fn tick(&mut self, dt: f32) {
        self.damp_remaining = (self.damp_remaining - dt).max(0.0);
        self.camera_lock_remaining = (self.camera_lock_remaining - dt).max(0.0);
    }

    pub fn is_damping(&self) -> bool {
        self.damp_remaining > 0.0
    }

    pub fn is_camera_locked(&self) -> bool {
        self.camera_lock_remaining > 0.0
    }

    /// Force multiplier for this tick.
    pub fn damp_multiplier(&self, settings: &LandingSettings) -> f32 {
        if self.is_damping() {
            settings.damp_multiplier
        } else {
            1.0
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Sound and shake parameters for a landing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LandingFeedback {
    pub volume: f32,
    pub pitch: f32,
    /// Camera shake scale in `[0, 1]`.
    pub shake: f32,
}

/// Feedback for touching down with `vertical_speed`, or `None` for soft landings.
pub fn landing_feedback(vertical_speed: f32, settings: &LandingSettings) -> Option<LandingFeedback> {
    let speed = vertical_speed.abs();
    if speed <= settings.feedback_min_speed || settings.feedback_reference_speed <= 0.0 {
        return None;
    }

    let alpha = (speed / settings.feedback_reference_speed).clamp(0.0, 1.0);
    Some(LandingFeedback {
        volume: lerp(0.3, 1.0, alpha),
        pitch: lerp(0.9, 1.2, alpha),
        shake: alpha,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn impact(vy: f32, normal_y: f32, impulse: f32) -> Impact {
        Impact {
            velocity: Vec3::new(0.0, vy, 0.0),
            normal: Vec3::new(0.0, normal_y, (1.0 - normal_y * normal_y).max(0.0).sqrt()),
            impulse,
        }
    }

    #[test]
    fn slow_impacts_are_ignored() {
        let settings = LandingSettings::default();
        let mut state = LandingState::default();
        assert!(state.on_impact(&impact(-5.0, 1.0, 100.0), &settings).is_none());
        assert!(!state.is_camera_locked());
        assert!(!state.is_damping());
    }

    #[test]
    fn fast_ground_hit_locks_camera_and_assists() {
        let settings = LandingSettings::default();
        let mut state = LandingState::default();

        let assist = state.on_impact(&impact(-20.0, 1.0, 5.0), &settings).unwrap();
        assert!((assist.y - 20.0 * 0.04).abs() < 1.0e-5);
        assert!(state.is_camera_locked());
        assert!(!state.is_damping());
    }

    #[test]
    fn big_impulse_adds_damp() {
        let settings = LandingSettings::default();
        let mut state = LandingState::default();
        state.on_impact(&impact(-20.0, 1.0, 50.0), &settings);
        assert!(state.is_damping());
        assert_eq!(state.damp_multiplier(&settings), 0.25);

        state.tick(0.05);
        assert!(state.is_damping());
        state.tick(0.05);
        assert!(!state.is_damping());
        assert!(state.is_camera_locked());
        state.tick(0.05);
        assert!(!state.is_camera_locked());
    }

    #[test]
    fn wall_hits_do_not_count_as_landings() {
        let settings = LandingSettings::default();
        let mut state = LandingState::default();
        assert!(state.on_impact(&impact(-20.0, 0.3, 50.0), &settings).is_none());
        assert!(!state.is_camera_locked());
    }

    #[test]
    fn feedback_scales_with_vertical_speed() {
        let settings = LandingSettings::default();
        assert!(landing_feedback(2.0, &settings).is_none());

        let mid = landing_feedback(-10.0, &settings).unwrap();
        assert!((mid.shake - 0.5).abs() < 1.0e-5);
        assert!((mid.volume - 0.65).abs() < 1.0e-5);
        assert!((mid.pitch - 1.05).abs() < 1.0e-5);

        let max = landing_feedback(40.0, &settings).unwrap();
        assert_eq!(max.shake, 1.0);
    }
}
