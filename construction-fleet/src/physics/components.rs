// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Vector and pose components
//!
//! [`ForceVector`] is the single three-component type used for velocity,
//! acceleration, net force and the individual force contributions. Units are
//! SI-like (meters, seconds, kilograms, Newtons) and are not validated.
//! [`Position`] carries a linear location plus an orientation that the
//! physics model passes through untouched.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

/// Magnitude below which a vector has no usable direction
const DIRECTION_EPSILON: f64 = 1e-12;

/// 3D vector with double-precision components
///
/// # Examples
///
/// ```
/// use construction_fleet::physics::ForceVector;
///
/// let v = ForceVector::new(3.0, 4.0, 0.0);
/// assert_eq!(v.magnitude(), 5.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ForceVector {
    /// X component
    pub x: f64,
    /// Y component
    pub y: f64,
    /// Z component
    pub z: f64,
}

impl ForceVector {
    /// Create a new vector
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        ForceVector { x, y, z }
    }

    /// The zero vector
    pub fn zero() -> Self {
        ForceVector::new(0.0, 0.0, 0.0)
    }

    /// Euclidean length
    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Dot product
    pub fn dot(&self, other: &ForceVector) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Unit vector in the same direction, or `None` for a (near) zero vector
    pub fn normalized(&self) -> Option<ForceVector> {
        let mag = self.magnitude();
        if mag < DIRECTION_EPSILON || !mag.is_finite() {
            None
        } else {
            Some(*self * (1.0 / mag))
        }
    }

    /// Scale the vector down so its magnitude does not exceed `limit`
    ///
    /// Vectors already within the limit are returned unchanged.
    pub fn clamp_magnitude(&self, limit: f64) -> ForceVector {
        let mag = self.magnitude();
        if mag > limit && mag > 0.0 {
            *self * (limit / mag)
        } else {
            *self
        }
    }

    /// Check that every component is finite
    pub fn is_valid(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl Add for ForceVector {
    type Output = ForceVector;

    fn add(self, rhs: ForceVector) -> ForceVector {
        ForceVector::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for ForceVector {
    fn add_assign(&mut self, rhs: ForceVector) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

impl Sub for ForceVector {
    type Output = ForceVector;

    fn sub(self, rhs: ForceVector) -> ForceVector {
        ForceVector::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for ForceVector {
    type Output = ForceVector;

    fn mul(self, rhs: f64) -> ForceVector {
        ForceVector::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Neg for ForceVector {
    type Output = ForceVector;

    fn neg(self) -> ForceVector {
        ForceVector::new(-self.x, -self.y, -self.z)
    }
}

/// Location in space plus pitch/yaw/roll orientation
///
/// Orientation angles are carried for telemetry but never read by the
/// physics model.
///
/// # Examples
///
/// ```
/// use construction_fleet::physics::{ForceVector, Position};
///
/// let site = Position::new(10.0, 0.0, 50.0);
/// let slot = site.translated(&ForceVector::new(0.0, 2.0, 0.0));
/// assert_eq!(slot.y, 2.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// X coordinate (longitude in degrees under spherical geometry)
    pub x: f64,
    /// Y coordinate (latitude in degrees under spherical geometry)
    pub y: f64,
    /// Z coordinate
    pub z: f64,
    /// Pitch angle
    #[serde(default)]
    pub pitch: f64,
    /// Yaw angle
    #[serde(default)]
    pub yaw: f64,
    /// Roll angle
    #[serde(default)]
    pub roll: f64,
}

impl Position {
    /// Create a position with level orientation
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Position {
            x,
            y,
            z,
            pitch: 0.0,
            yaw: 0.0,
            roll: 0.0,
        }
    }

    /// The origin with level orientation
    pub fn zero() -> Self {
        Position::new(0.0, 0.0, 0.0)
    }

    /// Replace the orientation angles
    pub fn with_orientation(mut self, pitch: f64, yaw: f64, roll: f64) -> Self {
        self.pitch = pitch;
        self.yaw = yaw;
        self.roll = roll;
        self
    }

    /// Linear coordinates as a vector
    pub fn linear(&self) -> ForceVector {
        ForceVector::new(self.x, self.y, self.z)
    }

    /// Replace the linear coordinates, keeping orientation
    pub fn set_linear(&mut self, v: ForceVector) {
        self.x = v.x;
        self.y = v.y;
        self.z = v.z;
    }

    /// A copy moved by `offset`, keeping orientation
    pub fn translated(&self, offset: &ForceVector) -> Position {
        let mut moved = *self;
        moved.set_linear(self.linear() + *offset);
        moved
    }

    /// Check that every coordinate and angle is finite
    pub fn is_valid(&self) -> bool {
        self.linear().is_valid()
            && self.pitch.is_finite()
            && self.yaw.is_finite()
            && self.roll.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_magnitude() {
        assert_eq!(ForceVector::new(3.0, 4.0, 0.0).magnitude(), 5.0);
        assert_eq!(ForceVector::zero().magnitude(), 0.0);
    }

    #[test]
    fn test_vector_arithmetic() {
        let a = ForceVector::new(1.0, 2.0, 3.0);
        let b = ForceVector::new(4.0, 5.0, 6.0);
        assert_eq!(a + b, ForceVector::new(5.0, 7.0, 9.0));
        assert_eq!(b - a, ForceVector::new(3.0, 3.0, 3.0));
        assert_eq!(a * 2.0, ForceVector::new(2.0, 4.0, 6.0));
        assert_eq!(-a, ForceVector::new(-1.0, -2.0, -3.0));
        assert_eq!(a.dot(&b), 32.0);

        let mut c = a;
        c += b;
        assert_eq!(c, a + b);
    }

    #[test]
    fn test_normalized() {
        let unit = ForceVector::new(0.0, 0.0, 7.0).normalized().unwrap();
        assert_eq!(unit, ForceVector::new(0.0, 0.0, 1.0));
        assert!(ForceVector::zero().normalized().is_none());
        assert!(ForceVector::new(1e-13, 0.0, 0.0).normalized().is_none());
    }

    #[test]
    fn test_clamp_magnitude() {
        let v = ForceVector::new(30.0, 40.0, 0.0);
        let clamped = v.clamp_magnitude(10.0);
        assert!((clamped.magnitude() - 10.0).abs() < 1e-12);
        assert!((clamped.x - 6.0).abs() < 1e-12);

        let small = ForceVector::new(1.0, 0.0, 0.0);
        assert_eq!(small.clamp_magnitude(10.0), small);
        assert_eq!(ForceVector::zero().clamp_magnitude(0.0), ForceVector::zero());
    }

    #[test]
    fn test_vector_validation() {
        assert!(ForceVector::new(1.0, 2.0, 3.0).is_valid());
        assert!(!ForceVector::new(f64::NAN, 0.0, 0.0).is_valid());
        assert!(!ForceVector::new(0.0, f64::INFINITY, 0.0).is_valid());
    }

    #[test]
    fn test_position_translation_keeps_orientation() {
        let pos = Position::new(1.0, 1.0, 1.0).with_orientation(0.1, 0.2, 0.3);
        let moved = pos.translated(&ForceVector::new(1.0, -1.0, 2.0));
        assert_eq!(moved.linear(), ForceVector::new(2.0, 0.0, 3.0));
        assert_eq!((moved.pitch, moved.yaw, moved.roll), (0.1, 0.2, 0.3));
    }

    #[test]
    fn test_position_validation() {
        assert!(Position::new(1.0, 2.0, 3.0).is_valid());
        assert!(!Position::new(f64::NAN, 2.0, 3.0).is_valid());
        assert!(!Position::zero().with_orientation(f64::INFINITY, 0.0, 0.0).is_valid());
    }

    #[test]
    fn test_defaults() {
        assert_eq!(Position::default(), Position::zero());
        assert_eq!(ForceVector::default(), ForceVector::zero());
    }
}
