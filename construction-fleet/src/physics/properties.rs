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
//! Per-mission tuning values for a drone's physics model

use serde::{Deserialize, Serialize};

use crate::error::FleetError;

/// Immutable physical tuning for one drone
///
/// All strictly positive quantities are checked at construction so the force
/// model and integrator never divide by zero.
///
/// # Examples
///
/// ```
/// use construction_fleet::physics::PhysicsProperties;
///
/// let props = PhysicsProperties::new(50.0, 100.0, 0.1, 0.5, 50.0, 10.0, 0.95).unwrap();
/// assert_eq!(props.mass(), 50.0);
///
/// assert!(PhysicsProperties::new(0.0, 100.0, 0.1, 0.5, 50.0, 10.0, 0.95).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawProperties", into = "RawProperties")]
pub struct PhysicsProperties {
    mass: f64,
    thrust_force: f64,
    drag_coefficient: f64,
    cross_sectional_area: f64,
    max_velocity: f64,
    acceleration_limit: f64,
    precision_level: f64,
}

impl PhysicsProperties {
    /// Create validated properties
    ///
    /// # Errors
    ///
    /// Returns [`FleetError::InvalidProperty`] when any value is non-finite,
    /// when mass, thrust, maximum velocity or acceleration limit is not
    /// strictly positive, when drag coefficient or area is negative, or when
    /// the precision level lies outside `[0, 1]`.
    pub fn new(
        mass: f64,
        thrust_force: f64,
        drag_coefficient: f64,
        cross_sectional_area: f64,
        max_velocity: f64,
        acceleration_limit: f64,
        precision_level: f64,
    ) -> Result<Self, FleetError> {
        positive("mass", mass)?;
        positive("thrust_force", thrust_force)?;
        non_negative("drag_coefficient", drag_coefficient)?;
        non_negative("cross_sectional_area", cross_sectional_area)?;
        positive("max_velocity", max_velocity)?;
        positive("acceleration_limit", acceleration_limit)?;
        unit_interval("precision_level", precision_level)?;

        Ok(PhysicsProperties {
            mass,
            thrust_force,
            drag_coefficient,
            cross_sectional_area,
            max_velocity,
            acceleration_limit,
            precision_level,
        })
    }

    /// Copy with a different precision level
    ///
    /// # Errors
    ///
    /// Returns [`FleetError::InvalidProperty`] if `level` is outside `[0, 1]`.
    pub fn with_precision_level(mut self, level: f64) -> Result<Self, FleetError> {
        unit_interval("precision_level", level)?;
        self.precision_level = level;
        Ok(self)
    }

    /// Drone mass in kilograms
    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Maximum thrust in Newtons
    pub fn thrust_force(&self) -> f64 {
        self.thrust_force
    }

    /// Drag coefficient
    pub fn drag_coefficient(&self) -> f64 {
        self.drag_coefficient
    }

    /// Cross-sectional area in square meters
    pub fn cross_sectional_area(&self) -> f64 {
        self.cross_sectional_area
    }

    /// Speed limit in meters per second
    pub fn max_velocity(&self) -> f64 {
        self.max_velocity
    }

    /// Acceleration limit in meters per second squared
    pub fn acceleration_limit(&self) -> f64 {
        self.acceleration_limit
    }

    /// Navigation precision in `[0, 1]`, scales applied thrust
    pub fn precision_level(&self) -> f64 {
        self.precision_level
    }
}

impl Default for PhysicsProperties {
    fn default() -> Self {
        PhysicsProperties {
            mass: 50.0,
            thrust_force: 100.0,
            drag_coefficient: 0.1,
            cross_sectional_area: 0.5,
            max_velocity: 50.0,
            acceleration_limit: 10.0,
            precision_level: 0.95,
        }
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), FleetError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(FleetError::property(field, value, "must be positive and finite"))
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), FleetError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(FleetError::property(field, value, "must be non-negative and finite"))
    }
}

fn unit_interval(field: &'static str, value: f64) -> Result<(), FleetError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(FleetError::property(field, value, "must lie within [0, 1]"))
    }
}

/// Unvalidated wire form used for (de)serialization
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
struct RawProperties {
    mass: f64,
    thrust_force: f64,
    drag_coefficient: f64,
    cross_sectional_area: f64,
    max_velocity: f64,
    acceleration_limit: f64,
    precision_level: f64,
}

impl Default for RawProperties {
    fn default() -> Self {
        PhysicsProperties::default().into()
    }
}

impl TryFrom<RawProperties> for PhysicsProperties {
    type Error = FleetError;

    fn try_from(raw: RawProperties) -> Result<Self, Self::Error> {
        PhysicsProperties::new(
            raw.mass,
            raw.thrust_force,
            raw.drag_coefficient,
            raw.cross_sectional_area,
            raw.max_velocity,
            raw.acceleration_limit,
            raw.precision_level,
        )
    }
}

impl From<PhysicsProperties> for RawProperties {
    fn from(props: PhysicsProperties) -> Self {
        RawProperties {
            mass: props.mass,
            thrust_force: props.thrust_force,
            drag_coefficient: props.drag_coefficient,
            cross_sectional_area: props.cross_sectional_area,
            max_velocity: props.max_velocity,
            acceleration_limit: props.acceleration_limit,
            precision_level: props.precision_level,
        }
    }
}
