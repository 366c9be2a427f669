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
//! Kinematic state of a single drone

use serde::{Deserialize, Serialize};
use std::fmt;

use super::components::{ForceVector, Position};
use super::properties::PhysicsProperties;

/// Standard gravitational constant in SI units (m³/(kg⋅s²))
pub const GRAVITATIONAL_CONSTANT: f64 = 6.67430e-11;

/// Operating environment, selects which forces apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    /// Deep space: no gravity
    #[default]
    Vacuum,
    /// Near a planetary body
    PlanetarySurface,
    /// In orbit around a body
    Orbital,
    /// Inside an asteroid field
    AsteroidField,
}

impl Environment {
    /// Whether gravity from the reference body acts in this environment
    pub fn has_gravity(&self) -> bool {
        !matches!(self, Environment::Vacuum)
    }
}

/// Distance formula used for navigation and thrust shaping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GeometryMode {
    /// Flat 2D surface, the z coordinate is ignored
    #[serde(rename = "planar")]
    Planar,
    /// Unit sphere, x/y are longitude/latitude in degrees
    #[serde(rename = "spherical")]
    Spherical,
    /// Free 3D space
    #[default]
    #[serde(rename = "euclidean_3d")]
    Euclidean3d,
}

impl fmt::Display for GeometryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GeometryMode::Planar => "planar",
            GeometryMode::Spherical => "spherical",
            GeometryMode::Euclidean3d => "euclidean_3d",
        };
        f.write_str(name)
    }
}

/// Body whose gravity acts on the drone outside a vacuum
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceBody {
    /// Center of mass
    pub position: Position,
    /// Mass in kilograms
    pub mass: f64,
}

impl Default for ReferenceBody {
    /// An Earth-mass body at the origin
    fn default() -> Self {
        ReferenceBody {
            position: Position::zero(),
            mass: 5.972e24,
        }
    }
}

/// Position, velocity, acceleration and force for one drone
///
/// Owned by the drone and synchronized with its reported position by
/// explicit assignment each tick. Construction is always explicit; there is
/// no lazily initialized default state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsState {
    /// Current pose
    pub position: Position,
    /// Velocity in m/s
    pub velocity: ForceVector,
    /// Acceleration applied during the last step in m/s²
    pub acceleration: ForceVector,
    /// Net force computed during the last step in Newtons
    pub net_force: ForceVector,
    /// Operating environment
    pub environment: Environment,
    /// Navigation geometry
    pub geometry: GeometryMode,
    /// Physical tuning
    pub properties: PhysicsProperties,
    /// Optional standard gravitational parameter (GM) of the reference body
    pub gravitational_parameter: Option<f64>,
}

impl PhysicsState {
    /// Create a state at rest at the origin
    pub fn new(
        properties: PhysicsProperties,
        environment: Environment,
        geometry: GeometryMode,
    ) -> Self {
        PhysicsState {
            position: Position::zero(),
            velocity: ForceVector::zero(),
            acceleration: ForceVector::zero(),
            net_force: ForceVector::zero(),
            environment,
            geometry,
            properties,
            gravitational_parameter: None,
        }
    }

    /// Use a gravitational parameter instead of `G * body mass`
    pub fn with_gravitational_parameter(mut self, mu: f64) -> Self {
        self.gravitational_parameter = Some(mu);
        self
    }

    /// Place the state at a position
    pub fn at(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    /// Current speed
    pub fn speed(&self) -> f64 {
        self.velocity.magnitude()
    }

    /// Stop all motion, keeping position
    pub fn hold(&mut self) {
        self.velocity = ForceVector::zero();
        self.acceleration = ForceVector::zero();
        self.net_force = ForceVector::zero();
    }

    /// Check that all kinematic quantities are finite
    pub fn is_valid(&self) -> bool {
        self.position.is_valid()
            && self.velocity.is_valid()
            && self.acceleration.is_valid()
            && self.net_force.is_valid()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_at_rest() {
        let state = PhysicsState::new(
            PhysicsProperties::default(),
            Environment::Vacuum,
            GeometryMode::Euclidean3d,
        );
        assert_eq!(state.position, Position::zero());
        assert_eq!(state.speed(), 0.0);
        assert_eq!(state.net_force, ForceVector::zero());
        assert!(state.gravitational_parameter.is_none());
        assert!(state.is_valid());
    }

    #[test]
    fn test_hold_keeps_position() {
        let mut state = PhysicsState::new(
            PhysicsProperties::default(),
            Environment::Orbital,
            GeometryMode::Planar,
        )
        .at(Position::new(1.0, 2.0, 3.0));
        state.velocity = ForceVector::new(4.0, 0.0, 0.0);
        state.acceleration = ForceVector::new(1.0, 0.0, 0.0);
        state.hold();
        assert_eq!(state.position, Position::new(1.0, 2.0, 3.0));
        assert_eq!(state.velocity, ForceVector::zero());
        assert_eq!(state.acceleration, ForceVector::zero());
    }

    #[test]
    fn test_environment_gravity() {
        assert!(!Environment::Vacuum.has_gravity());
        assert!(Environment::PlanetarySurface.has_gravity());
        assert!(Environment::Orbital.has_gravity());
        assert!(Environment::AsteroidField.has_gravity());
    }

    #[test]
    fn test_geometry_display() {
        assert_eq!(GeometryMode::Euclidean3d.to_string(), "euclidean_3d");
        assert_eq!(GeometryMode::default(), GeometryMode::Euclidean3d);
    }
}
