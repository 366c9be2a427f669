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
//! Drone lifecycle state machine
//!
//! Guards are evaluated once per tick, highest priority first:
//!
//! 1. battery at or below the critical threshold (any state but
//!    `EmergencyLanding`) → `EmergencyLanding`
//! 2. `Idle` waits for a mission assignment (see [`Drone::assign_mission`])
//! 3. `FlyingToSite` → `ScanningTerrain` once within `nav_epsilon` of the site
//! 4. `ScanningTerrain` → `Constructing` unconditionally
//! 5. `Constructing` works through the first unconstructed component in list
//!    order: fly to it, then add progress each tick while there; with nothing
//!    left it moves to `ReturningHome`
//! 6. `ReturningHome` → `Idle` once within `nav_epsilon` of home
//! 7. otherwise the state is unchanged
//!
//! `EmergencyLanding` is left only through [`Drone::rescue`]. `Repairing` has
//! no automatic entry or exit and holds position.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::Drone;
use crate::error::FleetError;
use crate::integration::{integrate_step, validate_timestep};
use crate::navigation::{converged, wrap_longitude};
use crate::physics::{GeometryMode, Position};
use crate::plan::ConstructionOutcome;

/// Lifecycle states of a construction drone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DroneState {
    /// Waiting at home for a mission
    Idle,
    /// Flying to the building site
    FlyingToSite,
    /// Surveying the site before construction
    ScanningTerrain,
    /// Working through assigned components
    Constructing,
    /// Under repair, holding position
    Repairing,
    /// Flying back to the home position
    ReturningHome,
    /// Landed after battery exhaustion, awaiting rescue
    EmergencyLanding,
}

impl DroneState {
    /// Whether the drone is moving or working on a mission
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            DroneState::FlyingToSite
                | DroneState::ScanningTerrain
                | DroneState::Constructing
                | DroneState::ReturningHome
        )
    }
}

impl fmt::Display for DroneState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DroneState::Idle => "Idle",
            DroneState::FlyingToSite => "FlyingToSite",
            DroneState::ScanningTerrain => "ScanningTerrain",
            DroneState::Constructing => "Constructing",
            DroneState::Repairing => "Repairing",
            DroneState::ReturningHome => "ReturningHome",
            DroneState::EmergencyLanding => "EmergencyLanding",
        };
        f.write_str(name)
    }
}

/// A state change produced by a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// State before the tick
    pub from: DroneState,
    /// State after the tick
    pub to: DroneState,
}

impl Drone {
    /// Advance the state machine and physics by one tick of `dt` seconds
    ///
    /// Returns the transition taken, if any.
    ///
    /// # Errors
    ///
    /// Returns [`FleetError::InvalidTimestep`] for an unusable `dt`; the drone
    /// is left untouched in that case.
    pub fn tick(&mut self, dt: f64) -> Result<Option<Transition>, FleetError> {
        validate_timestep(dt)?;
        let from = self.state;

        if from != DroneState::EmergencyLanding && self.battery_level <= self.tuning.critical_battery {
            self.enter_emergency();
        } else {
            match from {
                DroneState::Idle | DroneState::Repairing | DroneState::EmergencyLanding => {}
                DroneState::FlyingToSite => {
                    let site = self.target;
                    if self.navigate_to(&site, dt) {
                        self.state = DroneState::ScanningTerrain;
                    }
                }
                DroneState::ScanningTerrain => self.state = DroneState::Constructing,
                DroneState::Constructing => match self.next_component() {
                    None => self.state = DroneState::ReturningHome,
                    Some(index) => {
                        let slot = *self.components[index].position();
                        if self.navigate_to(&slot, dt) {
                            self.construct_component(index)?;
                        }
                    }
                },
                DroneState::ReturningHome => {
                    let home = self.home;
                    if self.navigate_to(&home, dt) {
                        self.state = DroneState::Idle;
                    }
                }
            }
        }

        if self.state == from {
            return Ok(None);
        }
        log::info!(
            "{}: {} -> {} (battery {:.2}%, {}/{} components)",
            self.id,
            from,
            self.state,
            self.battery_level,
            self.completed_components(),
            self.total_components()
        );
        Ok(Some(Transition { from, to: self.state }))
    }

    /// Add one tick of work to the component at `index`
    ///
    /// Construction drains the battery at the construction rate. A component
    /// that is already finished is left unchanged and costs nothing.
    ///
    /// # Errors
    ///
    /// Returns [`FleetError::InvalidComponentIndex`] when `index` is outside
    /// the assigned list; nothing is modified.
    pub fn construct_component(&mut self, index: usize) -> Result<ConstructionOutcome, FleetError> {
        let len = self.components.len();
        let component = self
            .components
            .get_mut(index)
            .ok_or_else(|| FleetError::InvalidComponentIndex {
                drone: self.id.clone(),
                index,
                len,
            })?;

        if component.is_constructed() {
            return Ok(ConstructionOutcome::AlreadyConstructed);
        }

        let finished = component.advance(self.tuning.progress_increment);
        let progress = component.progress();
        let material = component.material().to_owned();
        let component_id = component.id().to_owned();

        self.drain(self.tuning.construction_drain_per_tick);

        if finished {
            if !self.inventory.consume(&material) {
                log::warn!("{}: finished {} without {} on board", self.id, component_id, material);
            }
            log::debug!("{}: component {} constructed", self.id, component_id);
            Ok(ConstructionOutcome::Completed)
        } else {
            Ok(ConstructionOutcome::InProgress { progress })
        }
    }

    /// Index of the first component not yet constructed
    pub fn next_component(&self) -> Option<usize> {
        self.components.iter().position(|c| !c.is_constructed())
    }

    /// Move one step toward `goal`, returning true once it has been reached
    ///
    /// On arrival the drone holds station. Thrust is refused with an empty
    /// battery.
    fn navigate_to(&mut self, goal: &Position, dt: f64) -> bool {
        self.physics.position = self.position;

        if converged(&self.physics, goal, self.tuning.nav_epsilon) {
            self.physics.hold();
            return true;
        }
        if self.battery_level <= 0.0 {
            self.physics.hold();
            return false;
        }

        self.apply_precision_profile();
        let report = integrate_step(&mut self.physics, goal, dt, &self.forces);
        if self.physics.geometry == GeometryMode::Spherical {
            self.physics.position.x = wrap_longitude(self.physics.position.x);
        }
        self.position = self.physics.position;
        self.drain(report.displacement * self.tuning.transit_drain_per_meter);

        log::trace!(
            "{}: moved {:.4} m toward ({:.2}, {:.2}, {:.2}), speed {:.3} m/s",
            self.id,
            report.displacement,
            goal.x,
            goal.y,
            goal.z,
            self.physics.speed()
        );
        false
    }

    fn apply_precision_profile(&mut self) {
        let override_level = if self.state == DroneState::Constructing {
            self.tuning.construction_precision
        } else {
            self.tuning.transit_precision
        };
        let level = override_level.unwrap_or_else(|| self.base_properties.precision_level());
        match self.base_properties.with_precision_level(level) {
            Ok(props) => self.physics.properties = props,
            Err(err) => log::warn!("{}: keeping precision level: {}", self.id, err),
        }
    }

    fn drain(&mut self, amount: f64) {
        self.battery_level = (self.battery_level - amount).clamp(0.0, super::FULL_BATTERY);
    }

    fn enter_emergency(&mut self) {
        self.physics.hold();
        self.state = DroneState::EmergencyLanding;
        log::warn!(
            "{}: battery at {:.2}%, emergency landing at ({:.2}, {:.2}, {:.2})",
            self.id,
            self.battery_level,
            self.position.x,
            self.position.y,
            self.position.z
        );
    }
}
