//! nalgebra (simulation) to glam (Bevy) conversions.

use bevy::prelude::*;

#[inline]
pub fn vec3(v: &shared::Vec3) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

#[inline]
pub fn quat(q: &shared::Quat) -> Quat {
    let c = q.quaternion().coords;
    Quat::from_xyzw(c.x, c.y, c.z, c.w)
}

#[inline]
pub fn transform(iso: &shared::Iso) -> Transform {
    Transform {
        translation: vec3(&iso.translation.vector),
        rotation: quat(&iso.rotation),
        ..default()
    }
}
