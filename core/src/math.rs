//! Scalar easing and angle helpers shared by the world and adapters.

use std::{f32::consts::PI, time::Duration};

use glam::{Mat3, Quat, Vec3};

use crate::Direction;

/// Clamps the value into `0.0..=1.0`, mapping NaN to zero.
#[must_use]
pub fn clamp01(value: f32) -> f32 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

/// Quadratic ease-in-out over `0.0..=1.0`.
#[must_use]
pub fn ease_in_out(t: f32) -> f32 {
    let t = t * 2.0;
    if t < 1.0 {
        return 0.5 * t * t;
    }
    let t = t - 1.0;
    -0.5 * (t * (t - 2.0) - 1.0)
}

/// Normalised progress of a mode that began at `start` and lasts `duration`.
///
/// A zero duration is treated as already complete.
#[must_use]
pub fn progress(now: Duration, start: Duration, duration: Duration) -> f32 {
    if duration.is_zero() {
        return 1.0;
    }
    let elapsed = now.saturating_sub(start);
    clamp01(elapsed.as_secs_f32() / duration.as_secs_f32())
}

/// Yaw angle in radians for the facing.
#[must_use]
pub fn angle_for_direction(direction: Direction) -> f32 {
    f32::from(direction.index()) * PI / 2.0
}

/// Adjusts `to` by a full turn so that interpolating from `from` takes the short way round.
#[must_use]
pub fn shortest_arc_target(from: f32, to: f32) -> f32 {
    let delta = to - from;
    if delta > PI {
        to - 2.0 * PI
    } else if delta < -PI {
        to + 2.0 * PI
    } else {
        to
    }
}

/// Linear interpolation between two scalars.
#[must_use]
pub fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}

/// Rotation composed as roll(z) · yaw(y) · pitch(x).
#[must_use]
pub fn rotation_from_angles(angles: Vec3) -> Quat {
    Quat::from_rotation_z(angles.z) * Quat::from_rotation_y(angles.y) * Quat::from_rotation_x(angles.x)
}

/// Forward (+Z) vector rotated by pitch, then yaw, then roll.
#[must_use]
pub fn forward_from_angles(angles: Vec3) -> Vec3 {
    Mat3::from_rotation_z(angles.z)
        * (Mat3::from_rotation_y(angles.y) * (Mat3::from_rotation_x(angles.x) * Vec3::Z))
}

/// Converts degrees triples into radians.
#[must_use]
pub fn degrees(x: f32, y: f32, z: f32) -> Vec3 {
    Vec3::new(x.to_radians(), y.to_radians(), z.to_radians())
}
