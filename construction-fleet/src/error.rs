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
//! Error types shared across the crate
//!
//! Configuration problems are rejected when values are constructed. Runtime
//! commands that do not apply to a drone's current state report an error
//! without mutating anything. Battery exhaustion and numerical degeneracy are
//! not errors: the first is a state transition, the second is handled by
//! explicit floors inside the force model and integrator.

use thiserror::Error;

use crate::config::ConfigError;
use crate::drone::{DroneId, DroneState};

/// Errors reported by fleet, drone and physics operations
#[derive(Debug, Error)]
pub enum FleetError {
    /// A physics property is non-finite or outside its allowed range
    #[error("invalid physics property `{field}`: {value} ({reason})")]
    InvalidProperty {
        /// Name of the offending field
        field: &'static str,
        /// Rejected value
        value: f64,
        /// Constraint that was violated
        reason: &'static str,
    },

    /// Timestep outside the stable integration range
    #[error("invalid timestep {dt}: must be finite and within [{min}, {max}] seconds")]
    InvalidTimestep {
        /// Rejected timestep
        dt: f64,
        /// Smallest accepted timestep
        min: f64,
        /// Largest accepted timestep
        max: f64,
    },

    /// A mission target contains NaN or infinite coordinates
    #[error("mission target for {drone} is not a finite position")]
    InvalidTarget {
        /// Drone the mission was addressed to
        drone: DroneId,
    },

    /// A building plan exceeds the per-drone component cap
    #[error("building plan for {drone} has {len} components, limit is {max}")]
    PlanTooLarge {
        /// Drone the plan was addressed to
        drone: DroneId,
        /// Number of blueprints supplied
        len: usize,
        /// Per-drone component cap
        max: usize,
    },

    /// Construction was requested on a component index outside the plan
    #[error("component index {index} out of range for {drone} ({len} components assigned)")]
    InvalidComponentIndex {
        /// Drone that owns the plan
        drone: DroneId,
        /// Requested index
        index: usize,
        /// Number of assigned components
        len: usize,
    },

    /// A command does not apply to the drone's current lifecycle state
    #[error("{command} rejected for {drone}: drone is {state}")]
    InvalidCommand {
        /// Drone the command was addressed to
        drone: DroneId,
        /// Command name
        command: &'static str,
        /// State the drone was in
        state: DroneState,
    },

    /// No drone with the given identifier exists in the fleet
    #[error("unknown drone {0}")]
    UnknownDrone(DroneId),

    /// Requested fleet size is zero or above the supported maximum
    #[error("fleet size {size} out of range (1..={max})")]
    InvalidFleetSize {
        /// Requested size
        size: usize,
        /// Supported maximum
        max: usize,
    },

    /// The fleet was asked to deploy without a building-plan template
    #[error("no building plan template loaded")]
    MissingTemplate,

    /// A drone worker thread could not be started
    #[error("failed to start worker thread: {0}")]
    Spawn(#[source] std::io::Error),

    /// Configuration could not be loaded or validated
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl FleetError {
    pub(crate) fn property(field: &'static str, value: f64, reason: &'static str) -> Self {
        FleetError::InvalidProperty { field, value, reason }
    }
}
