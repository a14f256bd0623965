//! Generic three-component vector used for positions, velocities and extents.

use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

/// A three-component vector. Physics uses `Vector3<f64>`; rotations are
/// carried separately as `(yaw, pitch)` pairs of `f32`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3<T> {
    /// X component.
    pub x: T,
    /// Y component.
    pub y: T,
    /// Z component.
    pub z: T,
}

impl<T> Vector3<T> {
    /// Creates a new vector from its components.
    #[must_use]
    pub const fn new(x: T, y: T, z: T) -> Self {
        Self { x, y, z }
    }
}

impl<T: Copy + Mul<Output = T> + Add<Output = T>> Vector3<T> {
    /// Squared length of the vector.
    #[must_use]
    pub fn length_sq(&self) -> T {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    /// Dot product with another vector.
    #[must_use]
    pub fn dot(&self, other: &Self) -> T {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Squared length of the horizontal (X/Z) components.
    #[must_use]
    pub fn horizontal_length_sq(&self) -> T {
        self.x * self.x + self.z * self.z
    }
}

impl Vector3<f64> {
    /// The zero vector.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Euclidean length.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.length_sq().sqrt()
    }

    /// Horizontal (X/Z) Euclidean length.
    #[must_use]
    pub fn horizontal_length(&self) -> f64 {
        self.horizontal_length_sq().sqrt()
    }

    /// Squared distance to another point.
    #[must_use]
    pub fn distance_sq(&self, other: &Self) -> f64 {
        (*self - *other).length_sq()
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(&self, other: &Self) -> f64 {
        self.distance_sq(other).sqrt()
    }

    /// Returns the vector scaled to unit length, or zero if shorter than `1e-4`.
    #[must_use]
    pub fn normalized(&self) -> Self {
        let len = self.length();
        if len < 1.0e-4 {
            Self::ZERO
        } else {
            Self::new(self.x / len, self.y / len, self.z / len)
        }
    }

    /// Component-wise multiplication.
    #[must_use]
    pub fn scale(&self, x: f64, y: f64, z: f64) -> Self {
        Self::new(self.x * x, self.y * y, self.z * z)
    }

    /// Whether every component is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl<T: Add<Output = T>> Add for Vector3<T> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl<T: Sub<Output = T>> Sub for Vector3<T> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl<T: Copy + Mul<Output = T>> Mul<T> for Vector3<T> {
    type Output = Self;

    fn mul(self, rhs: T) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl<T: Copy + Div<Output = T>> Div<T> for Vector3<T> {
    type Output = Self;

    fn div(self, rhs: T) -> Self {
        Self::new(self.x / rhs, self.y / rhs, self.z / rhs)
    }
}

impl<T: Neg<Output = T>> Neg for Vector3<T> {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl<T: Copy + Add<Output = T>> AddAssign for Vector3<T> {
    fn add_assign(&mut self, rhs: Self) {
        *self = Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z);
    }
}

impl<T: Copy + Sub<Output = T>> SubAssign for Vector3<T> {
    fn sub_assign(&mut self, rhs: Self) {
        *self = Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z);
    }
}

#[cfg(test)]
mod tests {
    use super::Vector3;

    #[test]
    fn length_and_distance() {
        let v = Vector3::new(3.0, 4.0, 0.0);
        assert!((v.length() - 5.0).abs() < 1e-12);
        assert!((v.distance(&Vector3::ZERO) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn normalized_zero_stays_zero() {
        assert_eq!(Vector3::ZERO.normalized(), Vector3::ZERO);
        let unit = Vector3::new(0.0, 2.0, 0.0).normalized();
        assert!((unit.length() - 1.0).abs() < 1e-12);
    }
}
