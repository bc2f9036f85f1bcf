use crate::types::{Iso, Vec3};

/// Result of a downward sphere sweep.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroundHit {
    /// Contact point on the surface.
    pub point: Vec3,
    /// Surface normal at the contact, unit length.
    pub normal: Vec3,
    /// Distance the sweep traveled before touching.
    pub distance: f32,
}

/// The simulated sphere the controller drives.
///
/// Implemented by the physics backend. Forces added through [`BallBody::add_force`]
/// apply to the next physics step only.
pub trait BallBody {
    fn position(&self) -> Vec3;
    fn pose(&self) -> Iso;

    fn linear_velocity(&self) -> Vec3;
    fn set_linear_velocity(&mut self, velocity: Vec3);

    fn angular_velocity(&self) -> Vec3;
    fn set_angular_velocity(&mut self, velocity: Vec3);

    fn add_force(&mut self, force: Vec3);
    fn apply_impulse(&mut self, impulse: Vec3);

    fn mass(&self) -> f32;
    fn radius(&self) -> f32;

    /// Sweep a sphere of `radius` from `origin` straight down by `distance`.
    ///
    /// Ignores the ball itself and trigger volumes.
    fn sweep_down(&self, origin: Vec3, distance: f32, radius: f32) -> Option<GroundHit>;

    /// Freeze (`false`) or release (`true`) the body.
    fn set_simulating(&mut self, simulating: bool);

    /// Move the body without sweeping.
    fn teleport(&mut self, pose: Iso);

    /// Instant velocity change, independent of mass.
    fn add_velocity_change(&mut self, delta: Vec3) {
        let v = self.linear_velocity();
        self.set_linear_velocity(v + delta);
    }
}
