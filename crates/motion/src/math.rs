//! Small vector helpers shared by the abilities.
//!
//! Conventions: +Y is up, local forward is -Z, local right is +X. A planar
//! move input `(x, y)` (strafe, forward) maps to `Vec3(x, 0, -y)`. Yaw is
//! measured in radians, positive turning right.

use glam::{Quat, Vec2, Vec3};

/// Move `current` toward `target` by at most `max_delta`.
#[inline]
pub fn move_towards(current: f32, target: f32, max_delta: f32) -> f32 {
    let delta = target - current;
    if delta.abs() <= max_delta {
        target
    } else {
        current + delta.signum() * max_delta
    }
}

/// Move `current` toward `target` by at most `max_delta` in distance.
#[inline]
pub fn move_towards_vec3(current: Vec3, target: Vec3, max_delta: f32) -> Vec3 {
    let delta = target - current;
    let distance = delta.length();
    if distance <= max_delta || distance < 1e-6 {
        target
    } else {
        current + delta / distance * max_delta
    }
}

/// Component of `v` along `axis` (axis need not be normalized).
#[inline]
pub fn project(v: Vec3, axis: Vec3) -> Vec3 {
    let len_sq = axis.length_squared();
    if len_sq < 1e-12 {
        Vec3::ZERO
    } else {
        axis * (v.dot(axis) / len_sq)
    }
}

/// `v` with its component along `normal` removed.
#[inline]
pub fn project_on_plane(v: Vec3, normal: Vec3) -> Vec3 {
    v - project(v, normal)
}

/// Planar local move input to a local-space 3D direction.
#[inline]
pub fn local_move_direction(input: Vec2) -> Vec3 {
    Vec3::new(input.x, 0.0, -input.y)
}

/// Body rotation for a yaw angle (radians, positive turns right).
#[inline]
pub fn yaw_rotation(yaw: f32) -> Quat {
    Quat::from_rotation_y(-yaw)
}

/// Yaw angle that faces along `direction` (vertical component ignored).
#[inline]
pub fn yaw_of(direction: Vec3) -> f32 {
    direction.x.atan2(-direction.z)
}

/// Wrap an angle into `(-PI, PI]`.
pub fn wrap_angle(angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    let mut a = angle % TAU;
    if a > PI {
        a -= TAU;
    } else if a <= -PI {
        a += TAU;
    }
    a
}
