use super::body::{BallBody, GroundHit};
use super::settings::GroundingSettings;
use crate::types::Vec3;

/// Debounced ground contact.
///
/// The raw state is whatever the sweep saw this tick. The stable state only turns
/// on after `confirm_time` of continuous contact and only turns off after
/// `coyote_time` without contact, so single-frame flickers never reach gameplay.
#[derive(Clone, Debug)]
pub struct GroundingState {
    raw_grounded: bool,
    stable_grounded: bool,
    confirm_timer: f32,
    coyote_timer: f32,
    last_hit: Option<GroundHit>,
}

impl Default for GroundingState {
    fn default() -> Self {
        Self {
            raw_grounded: false,
            stable_grounded: false,
            confirm_timer: 0.0,
            coyote_timer: 0.0,
            last_hit: None,
        }
    }
}

impl GroundingState {
    /// Sweep below `body` and keep the hit only if the surface is walkable.
    pub fn probe(body: &impl BallBody, settings: &GroundingSettings) -> Option<GroundHit> {
        let radius = body.radius() * settings.sweep_radius_scale;
        body.sweep_down(body.position(), settings.sweep_distance, radius)
            .filter(|hit| hit.normal.y > settings.walkable_normal_y)
    }

    /// Feed one tick of raw contact. Returns the stable state.
    pub fn update(&mut self, hit: Option<GroundHit>, settings: &GroundingSettings, dt: f32) -> bool {
        self.raw_grounded = hit.is_some();

        if let Some(hit) = hit {
            self.last_hit = Some(hit);
            self.confirm_timer += dt;
            self.coyote_timer = settings.coyote_time;

            if self.confirm_timer >= settings.confirm_time {
                self.stable_grounded = true;
            }
        } else {
            self.confirm_timer = 0.0;
            self.coyote_timer = (self.coyote_timer - dt).max(0.0);

            if self.coyote_timer <= 0.0 {
                self.stable_grounded = false;
            }
        }

        self.stable_grounded
    }

    pub fn is_grounded(&self) -> bool {
        self.stable_grounded
    }

    pub fn is_raw_grounded(&self) -> bool {
        self.raw_grounded
    }

    pub fn last_hit(&self) -> Option<&GroundHit> {
        self.last_hit.as_ref()
    }

    /// Normal of the last accepted ground, or world up if there never was one.
    pub fn ground_normal(&self) -> Vec3 {
        self.last_hit.map(|h| h.normal).unwrap_or_else(crate::types::up)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 0.01;

    fn hit() -> Option<GroundHit> {
        Some(GroundHit {
            point: Vec3::zeros(),
            normal: Vec3::y(),
            distance: 0.2,
        })
    }

    #[test]
    fn stable_turns_on_after_confirm_window() {
        let settings = GroundingSettings::default();
        let mut state = GroundingState::default();

        // 0.01, 0.02 -> not yet; 0.03 -> confirmed.
        assert!(!state.update(hit(), &settings, DT));
        assert!(!state.update(hit(), &settings, DT));
        assert!(state.update(hit(), &settings, 0.0101));
        assert!(state.is_raw_grounded());
    }

    #[test]
    fn one_frame_flicker_does_not_change_stable_state() {
        let settings = GroundingSettings::default();
        let mut state = GroundingState::default();
        for _ in 0..10 {
            state.update(hit(), &settings, DT);
        }
        assert!(state.is_grounded());

        assert!(state.update(None, &settings, DT));
        assert!(!state.is_raw_grounded());
        assert!(state.update(hit(), &settings, DT));
    }

    #[test]
    fn stable_turns_off_after_coyote_window() {
        let settings = GroundingSettings::default();
        let mut state = GroundingState::default();
        for _ in 0..10 {
            state.update(hit(), &settings, DT);
        }

        let mut airborne_after = None;
        for i in 1..=20 {
            if !state.update(None, &settings, DT) {
                airborne_after = Some(i);
                break;
            }
        }
        // 0.08 s of coyote time at 0.01 s per tick.
        let ticks = airborne_after.unwrap();
        assert!((8..=9).contains(&ticks), "{ticks}");
        assert_eq!(state.ground_normal(), Vec3::y());
    }

    #[test]
    fn contact_loss_resets_confirmation() {
        let settings = GroundingSettings::default();
        let mut state = GroundingState::default();
        state.update(hit(), &settings, 0.02);
        state.update(None, &settings, DT);
        assert!(!state.update(hit(), &settings, 0.02));
    }
}
