use crate::types::{Vec3, up};

/// Squared lengths below this are treated as zero vectors.
pub const SAFE_NORMAL_EPS_SQ: f32 = 1.0e-8;

/// Frame-rate independent approach of `current` toward `target`.
///
/// Moves by `(target - current) * clamp(dt * speed, 0, 1)`. A non-positive speed
/// snaps straight to the target, as does a remaining distance that is negligible.
#[inline]
pub fn interp_to(current: f32, target: f32, dt: f32, speed: f32) -> f32 {
    if speed <= 0.0 {
        return target;
    }
    let dist = target - current;
    if dist * dist < SAFE_NORMAL_EPS_SQ {
        return target;
    }
    current + dist * (dt * speed).clamp(0.0, 1.0)
}

/// Vector version of [`interp_to`].
#[inline]
pub fn vinterp_to(current: Vec3, target: Vec3, dt: f32, speed: f32) -> Vec3 {
    if speed <= 0.0 {
        return target;
    }
    let dist = target - current;
    if dist.norm_squared() < SAFE_NORMAL_EPS_SQ {
        return target;
    }
    current + dist * (dt * speed).clamp(0.0, 1.0)
}

/// Wrap an angle into `(-PI, PI]`.
#[inline]
pub fn wrap_angle(radians: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    let wrapped = (radians + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI { wrapped + TAU } else { wrapped }
}

/// [`interp_to`] for angles, always travelling the shorter way around.
#[inline]
pub fn interp_angle_to(current: f32, target: f32, dt: f32, speed: f32) -> f32 {
    let delta = wrap_angle(target - current);
    wrap_angle(interp_to(0.0, delta, dt, speed) + current)
}

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Map `value` from `[in_a, in_b]` onto `[out_a, out_b]`, clamping to the output range.
///
/// The input range may be reversed (`in_a > in_b`).
#[inline]
pub fn map_range_clamped(value: f32, in_a: f32, in_b: f32, out_a: f32, out_b: f32) -> f32 {
    let span = in_b - in_a;
    if span.abs() <= f32::EPSILON {
        return out_a;
    }
    let t = ((value - in_a) / span).clamp(0.0, 1.0);
    lerp(out_a, out_b, t)
}

/// Normalized copy of `v`, or `None` when it is too short to have a direction.
#[inline]
pub fn safe_normal(v: Vec3) -> Option<Vec3> {
    let len_sq = v.norm_squared();
    if len_sq < SAFE_NORMAL_EPS_SQ || !len_sq.is_finite() {
        return None;
    }
    Some(v / len_sq.sqrt())
}

/// Remove the component of `v` along `normal` (which must be unit length).
#[inline]
pub fn project_on_plane(v: Vec3, normal: Vec3) -> Vec3 {
    v - normal * v.dot(&normal)
}

/// Horizontal (XZ) part of `v`.
#[inline]
pub fn horizontal(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// True if every component is within `tolerance` of zero.
#[inline]
pub fn is_nearly_zero(v: Vec3, tolerance: f32) -> bool {
    v.x.abs() <= tolerance && v.y.abs() <= tolerance && v.z.abs() <= tolerance
}

/// Yaw (about +Y) that faces along `dir`. Yaw zero faces `-Z`.
#[inline]
pub fn yaw_from_direction(dir: Vec3) -> f32 {
    (-dir.x).atan2(-dir.z)
}

/// Pitch of `dir` above the horizontal plane.
#[inline]
pub fn pitch_from_direction(dir: Vec3) -> f32 {
    let flat = (dir.x * dir.x + dir.z * dir.z).sqrt();
    dir.y.atan2(flat)
}

/// Unit forward vector for a yaw/pitch pair.
#[inline]
pub fn direction_from_yaw_pitch(yaw: f32, pitch: f32) -> Vec3 {
    let (sy, cy) = yaw.sin_cos();
    let (sp, cp) = pitch.sin_cos();
    Vec3::new(-sy * cp, sp, -cy * cp)
}

/// Unit right vector for a yaw (roll ignored).
#[inline]
pub fn right_from_yaw(yaw: f32) -> Vec3 {
    let (sy, cy) = yaw.sin_cos();
    Vec3::new(cy, 0.0, -sy)
}

/// Signed turn of `to` relative to `from` about world up: positive when turning right.
#[inline]
pub fn signed_turn(from: Vec3, to: Vec3) -> f32 {
    -from.cross(&to).dot(&up())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    const EPS: f32 = 1.0e-5;

    #[test]
    fn interp_to_moves_by_clamped_fraction() {
        assert!((interp_to(0.0, 10.0, 0.1, 5.0) - 5.0).abs() < EPS);
        // dt * speed beyond 1 snaps
        assert_eq!(interp_to(0.0, 10.0, 1.0, 5.0), 10.0);
        // non-positive speed snaps
        assert_eq!(interp_to(3.0, 7.0, 0.016, 0.0), 7.0);
    }

    #[test]
    fn vinterp_to_snaps_when_remaining_distance_is_negligible() {
        let v = vinterp_to(Vec3::new(1.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 1.0e-5), 0.01, 1.0);
        assert_eq!(v, Vec3::new(1.0, 0.0, 1.0e-5));
    }

    #[test]
    fn interp_angle_takes_the_short_way_round() {
        // From +170 deg to -170 deg should travel through 180, not through 0.
        let from = 170f32.to_radians();
        let to = -170f32.to_radians();
        let next = interp_angle_to(from, to, 0.25, 2.0);
        assert!(next.abs() > from.abs() - EPS, "moved toward zero: {next}");
    }

    #[test]
    fn wrap_angle_stays_in_range() {
        for raw in [-4.0 * PI, -PI, -0.5, 0.0, 0.5, PI, 3.0 * PI, 7.5] {
            let w = wrap_angle(raw);
            assert!(w > -PI - EPS && w <= PI + EPS, "{raw} -> {w}");
        }
    }

    #[test]
    fn map_range_clamped_handles_reversed_input() {
        assert!((map_range_clamped(0.95, 0.95, 0.65, 1.0, 0.1) - 1.0).abs() < EPS);
        assert!((map_range_clamped(0.65, 0.95, 0.65, 1.0, 0.1) - 0.1).abs() < EPS);
        assert!((map_range_clamped(0.80, 0.95, 0.65, 1.0, 0.1) - 0.55).abs() < EPS);
        assert!((map_range_clamped(1.0, 0.95, 0.65, 1.0, 0.1) - 1.0).abs() < EPS);
        assert!((map_range_clamped(0.0, 0.95, 0.65, 1.0, 0.1) - 0.1).abs() < EPS);
    }

    #[test]
    fn yaw_pitch_direction_agree() {
        let forward = direction_from_yaw_pitch(0.0, 0.0);
        assert!((forward - Vec3::new(0.0, 0.0, -1.0)).norm() < EPS);
        assert!((right_from_yaw(0.0) - Vec3::x()).norm() < EPS);

        let dir = direction_from_yaw_pitch(FRAC_PI_2, 0.3);
        assert!((yaw_from_direction(dir) - FRAC_PI_2).abs() < EPS);
        assert!((pitch_from_direction(dir) - 0.3).abs() < EPS);
    }

    #[test]
    fn signed_turn_is_positive_to_the_right() {
        let forward = Vec3::new(0.0, 0.0, -1.0);
        assert!(signed_turn(forward, Vec3::x()) > 0.0);
        assert!(signed_turn(forward, -Vec3::x()) < 0.0);
    }

    #[test]
    fn safe_normal_rejects_tiny_vectors() {
        assert!(safe_normal(Vec3::new(1.0e-6, 0.0, 0.0)).is_none());
        assert_eq!(safe_normal(Vec3::new(0.0, 3.0, 0.0)), Some(Vec3::y()));
    }
}
