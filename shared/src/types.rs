/*!
Math aliases shared by the race and ball modules.

The world is Y-up. Yaw zero faces `-Z`, matching the Bevy client.
*/

use nalgebra as na;

pub type Vec3 = na::Vector3<f32>;
pub type Quat = na::UnitQuaternion<f32>;
pub type Iso = na::Isometry3<f32>;

/// World up.
#[inline]
pub fn up() -> Vec3 {
    Vec3::y()
}

/// Forward vector (`-Z` rotated by `pose`), flattened onto the horizontal plane.
///
/// Returns `-Z` when the pose looks straight up or down.
#[inline]
pub fn flat_forward(pose: &Iso) -> Vec3 {
    let forward = pose.rotation * Vec3::new(0.0, 0.0, -1.0);
    let flat = Vec3::new(forward.x, 0.0, forward.z);
    crate::utils::safe_normal(flat).unwrap_or_else(|| Vec3::new(0.0, 0.0, -1.0))
}
