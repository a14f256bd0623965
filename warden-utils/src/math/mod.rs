//! Vector/AABB math, angle helpers and engine-accurate trigonometry.
//!
//! # Key Types
//!
//! - [`Vector3`] - generic three-component vector
//! - [`Aabb`] - axis-aligned box with per-axis collision clipping
//! - [`TrigTables`] - the client's 65536-entry sine table

mod aabb;
mod trig;
mod vector;

pub use aabb::Aabb;
pub use trig::{TRIG_TABLES, TrigTables};
pub use vector::Vector3;

/// Wraps an angle in degrees to `[-180, 180)`.
#[must_use]
pub fn wrap_degrees(mut degrees: f32) -> f32 {
    degrees %= 360.0;
    if degrees >= 180.0 {
        degrees -= 360.0;
    }
    if degrees < -180.0 {
        degrees += 360.0;
    }
    degrees
}

/// Linear interpolation between two scalars.
#[must_use]
pub fn lerp(t: f64, from: f64, to: f64) -> f64 {
    from + t * (to - from)
}

/// Linear interpolation between two points.
#[must_use]
pub fn lerp_vec(t: f64, from: &Vector3<f64>, to: &Vector3<f64>) -> Vector3<f64> {
    Vector3::new(
        lerp(t, from.x, to.x),
        lerp(t, from.y, to.y),
        lerp(t, from.z, to.z),
    )
}

/// Interpolates a rotation angle along the shortest wrapped path, so lerping
/// from 179 to -179 degrees crosses the seam instead of sweeping the circle.
#[must_use]
pub fn lerp_rotation(t: f32, from: f32, to: f32) -> f32 {
    wrap_degrees(from + t * wrap_degrees(to - from))
}

/// `floor` to `i32`, the engine's block-coordinate conversion.
#[must_use]
pub fn floor(value: f64) -> i32 {
    value.floor() as i32
}
