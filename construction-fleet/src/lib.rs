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
//! # Construction Fleet
//!
//! Physics-driven simulation of a fleet of autonomous construction drones.
//! Each drone runs a lifecycle state machine (fly to a building site, scan,
//! build its assigned components in order, return home) on top of a
//! Newtonian force model and a semi-implicit Euler integrator.
//!
//! ## Features
//!
//! - **Lifecycle**: closed state machine with battery-driven emergency landing and rescue
//! - **Navigation**: planar, great-circle and 3D distance metrics
//! - **Forces**: gravity, quadratic drag and zoned thrust behind one provider trait
//! - **Fleet**: bounded drone set with single-writer ticking and read-only snapshots
//! - **Parallelization**: optional Rayon integration for fleet-wide ticks
//!
//! ## Example
//!
//! ```rust
//! use construction_fleet::config::FleetConfig;
//! use construction_fleet::drone::{DroneId, DroneState};
//! use construction_fleet::fleet::Fleet;
//! use construction_fleet::physics::Position;
//!
//! let config = FleetConfig { fleet_size: 1, ..FleetConfig::default() };
//! let fleet = Fleet::new(&config).unwrap();
//! let id = DroneId::for_index(0);
//!
//! fleet.assign_mission(&id, Position::new(10.0, 0.0, 0.0), &[]).unwrap();
//! for _ in 0..500 {
//!     fleet.tick_all(config.timestep).unwrap();
//! }
//! assert_eq!(fleet.inspect(&id, |d| d.state()).unwrap(), DroneState::Idle);
//! ```

#![warn(missing_docs)]

/// Configuration loading and validation
pub mod config;

/// Construction drones and their lifecycle
pub mod drone;

/// Error types
pub mod error;

/// Fleet coordinator
pub mod fleet;

/// Force providers and the combined force model
pub mod forces;

/// Timestep validation and motion integration
pub mod integration;

/// Distance metrics and steering
pub mod navigation;

/// Physics types
pub mod physics;

/// Building plans and components
pub mod plan;

/// Threaded tick driver
pub mod runtime;

/// Status snapshots
pub mod telemetry;

pub use config::FleetConfig;
pub use drone::{Drone, DroneId, DroneState};
pub use error::FleetError;
pub use fleet::Fleet;
pub use runtime::FleetRunner;
