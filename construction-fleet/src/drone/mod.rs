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
//! Construction drones
//!
//! A [`Drone`] exclusively owns its pose, its [`PhysicsState`], its material
//! inventory and its slice of the building plan. It is mutated only by its
//! own tick and by the mission/rescue commands, never by another drone.

mod lifecycle;

pub use lifecycle::{DroneState, Transition};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::FleetError;
use crate::forces::ForceModel;
use crate::physics::{PhysicsProperties, PhysicsState, Position};
use crate::plan::{BuildingComponent, ComponentBlueprint, MAX_COMPONENTS_PER_DRONE};
use crate::telemetry::DroneStatus;

/// Battery level of a freshly charged drone
pub const FULL_BATTERY: f64 = 100.0;

/// Unique drone identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DroneId(String);

impl DroneId {
    /// Create an identifier from any string
    pub fn new(id: impl Into<String>) -> Self {
        DroneId(id.into())
    }

    /// Identifier used for the drone at `index` in a fleet
    pub fn for_index(index: usize) -> Self {
        DroneId(format!("CONSTRUCT_{:02}", index))
    }

    /// The identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DroneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Behavior tuning for the lifecycle state machine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DroneTuning {
    /// Distance below which a navigation goal counts as reached
    pub nav_epsilon: f64,
    /// Progress added to a component per construction tick
    pub progress_increment: f64,
    /// Battery percent consumed per meter flown
    pub transit_drain_per_meter: f64,
    /// Battery percent consumed per construction tick
    pub construction_drain_per_tick: f64,
    /// At or below this battery percent the drone makes an emergency landing
    pub critical_battery: f64,
    /// Precision level used while flying, if different from the configured one
    pub transit_precision: Option<f64>,
    /// Precision level used while constructing, if different from the configured one
    pub construction_precision: Option<f64>,
}

impl Default for DroneTuning {
    fn default() -> Self {
        DroneTuning {
            nav_epsilon: 0.5,
            progress_increment: 0.1,
            transit_drain_per_meter: 0.01,
            construction_drain_per_tick: 0.05,
            critical_battery: 5.0,
            transit_precision: None,
            construction_precision: None,
        }
    }
}

impl DroneTuning {
    /// Check every tuning value
    ///
    /// # Errors
    ///
    /// Returns [`FleetError::InvalidProperty`] naming the first bad field.
    pub fn validate(&self) -> Result<(), FleetError> {
        if !(self.nav_epsilon.is_finite() && self.nav_epsilon > 0.0) {
            return Err(FleetError::property("nav_epsilon", self.nav_epsilon, "must be positive and finite"));
        }
        if !(self.progress_increment.is_finite() && self.progress_increment > 0.0 && self.progress_increment <= 1.0) {
            return Err(FleetError::property(
                "progress_increment",
                self.progress_increment,
                "must lie within (0, 1]",
            ));
        }
        for (field, value) in [
            ("transit_drain_per_meter", self.transit_drain_per_meter),
            ("construction_drain_per_tick", self.construction_drain_per_tick),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(FleetError::property(field, value, "must be non-negative and finite"));
            }
        }
        if !(0.0..FULL_BATTERY).contains(&self.critical_battery) {
            return Err(FleetError::property(
                "critical_battery",
                self.critical_battery,
                "must lie within [0, 100)",
            ));
        }
        for (field, value) in [
            ("transit_precision", self.transit_precision),
            ("construction_precision", self.construction_precision),
        ] {
            if let Some(level) = value {
                if !(0.0..=1.0).contains(&level) {
                    return Err(FleetError::property(field, level, "must lie within [0, 1]"));
                }
            }
        }
        Ok(())
    }
}

/// Construction materials carried by a drone, counted per material tag
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct MaterialInventory {
    counts: BTreeMap<String, u32>,
}

impl MaterialInventory {
    /// Load exactly the materials a plan needs
    pub fn stocked_for(blueprints: &[ComponentBlueprint]) -> Self {
        let mut counts = BTreeMap::new();
        for bp in blueprints {
            *counts.entry(bp.material.clone()).or_insert(0) += 1;
        }
        MaterialInventory { counts }
    }

    /// Units of `material` on board
    pub fn count(&self, material: &str) -> u32 {
        self.counts.get(material).copied().unwrap_or(0)
    }

    /// Total units on board
    pub fn total(&self) -> u32 {
        self.counts.values().sum()
    }

    /// Whether nothing is on board
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Use one unit of `material`, returning false if none was on board
    pub fn consume(&mut self, material: &str) -> bool {
        match self.counts.get_mut(material) {
            Some(n) if *n > 0 => {
                *n -= 1;
                if *n == 0 {
                    self.counts.remove(material);
                }
                true
            }
            _ => false,
        }
    }
}

/// Check that a mission can be assigned to `drone` regardless of its state
///
/// # Errors
///
/// - [`FleetError::InvalidTarget`] if `target` is not finite
/// - [`FleetError::PlanTooLarge`] above [`MAX_COMPONENTS_PER_DRONE`]
pub(crate) fn check_mission(
    drone: &DroneId,
    target: &Position,
    blueprints: &[ComponentBlueprint],
) -> Result<(), FleetError> {
    if !target.is_valid() {
        return Err(FleetError::InvalidTarget { drone: drone.clone() });
    }
    if blueprints.len() > MAX_COMPONENTS_PER_DRONE {
        return Err(FleetError::PlanTooLarge {
            drone: drone.clone(),
            len: blueprints.len(),
            max: MAX_COMPONENTS_PER_DRONE,
        });
    }
    Ok(())
}

/// A construction drone and its assigned work
#[derive(Debug, Clone)]
pub struct Drone {
    id: DroneId,
    position: Position,
    target: Position,
    home: Position,
    battery_level: f64,
    state: DroneState,
    inventory: MaterialInventory,
    components: Vec<BuildingComponent>,
    physics: PhysicsState,
    base_properties: PhysicsProperties,
    forces: ForceModel,
    tuning: DroneTuning,
}

impl Drone {
    /// Create an idle, fully charged drone at the physics state's position
    ///
    /// That position becomes the drone's home.
    pub fn new(id: DroneId, physics: PhysicsState, forces: ForceModel, tuning: DroneTuning) -> Self {
        Drone {
            id,
            position: physics.position,
            target: physics.position,
            home: physics.position,
            battery_level: FULL_BATTERY,
            state: DroneState::Idle,
            inventory: MaterialInventory::default(),
            components: Vec::new(),
            base_properties: physics.properties,
            physics,
            forces,
            tuning,
        }
    }

    /// Send an idle drone to `target` with an ordered list of components
    ///
    /// Component positions are relative to `target`. The drone is loaded with
    /// the materials the plan needs. An empty plan is allowed: the drone
    /// flies to the site and returns.
    ///
    /// # Errors
    ///
    /// - [`FleetError::InvalidCommand`] if the drone is not idle
    /// - [`FleetError::InvalidTarget`] if `target` is not finite
    /// - [`FleetError::PlanTooLarge`] above [`MAX_COMPONENTS_PER_DRONE`]
    pub fn assign_mission(
        &mut self,
        target: Position,
        blueprints: &[ComponentBlueprint],
    ) -> Result<(), FleetError> {
        if self.state != DroneState::Idle {
            return Err(self.rejected("assign_mission"));
        }
        check_mission(&self.id, &target, blueprints)?;

        self.components = blueprints
            .iter()
            .map(|bp| BuildingComponent::from_blueprint(bp, &target))
            .collect();
        self.inventory = MaterialInventory::stocked_for(blueprints);
        self.target = target;
        self.state = DroneState::FlyingToSite;

        log::info!(
            "{}: mission assigned, {} components at ({:.2}, {:.2}, {:.2})",
            self.id,
            self.components.len(),
            target.x,
            target.y,
            target.z
        );
        Ok(())
    }

    /// Recover a drone from an emergency landing
    ///
    /// The drone is recharged, returned to its home position at rest and
    /// becomes idle. Its component list is kept as-is.
    ///
    /// # Errors
    ///
    /// Returns [`FleetError::InvalidCommand`] unless the drone is in
    /// [`DroneState::EmergencyLanding`].
    pub fn rescue(&mut self) -> Result<(), FleetError> {
        if self.state != DroneState::EmergencyLanding {
            return Err(self.rejected("rescue"));
        }
        self.battery_level = FULL_BATTERY;
        self.position = self.home;
        self.physics.position = self.home;
        self.physics.hold();
        self.state = DroneState::Idle;
        log::info!("{}: rescued and recharged at home", self.id);
        Ok(())
    }

    fn rejected(&self, command: &'static str) -> FleetError {
        log::warn!("{}: {} rejected in state {}", self.id, command, self.state);
        FleetError::InvalidCommand {
            drone: self.id.clone(),
            command,
            state: self.state,
        }
    }

    /// Drone identifier
    pub fn id(&self) -> &DroneId {
        &self.id
    }

    /// Current lifecycle state
    pub fn state(&self) -> DroneState {
        self.state
    }

    /// Current pose
    pub fn position(&self) -> &Position {
        &self.position
    }

    /// Building site of the current mission
    pub fn target(&self) -> &Position {
        &self.target
    }

    /// Where the drone returns after a mission
    pub fn home(&self) -> &Position {
        &self.home
    }

    /// Battery percent in `[0, 100]`
    pub fn battery_level(&self) -> f64 {
        self.battery_level
    }

    /// Whether any construction material is on board
    pub fn has_payload(&self) -> bool {
        !self.inventory.is_empty()
    }

    /// Materials on board
    pub fn inventory(&self) -> &MaterialInventory {
        &self.inventory
    }

    /// Assigned components in construction order
    pub fn components(&self) -> &[BuildingComponent] {
        &self.components
    }

    /// Number of finished components, derived from the component list
    pub fn completed_components(&self) -> usize {
        self.components.iter().filter(|c| c.is_constructed()).count()
    }

    /// Number of assigned components
    pub fn total_components(&self) -> usize {
        self.components.len()
    }

    /// Physics state
    pub fn physics(&self) -> &PhysicsState {
        &self.physics
    }

    /// Lifecycle tuning
    pub fn tuning(&self) -> &DroneTuning {
        &self.tuning
    }

    /// Snapshot for telemetry
    pub fn status(&self) -> DroneStatus {
        DroneStatus {
            id: self.id.clone(),
            position: self.position,
            battery_level: self.battery_level,
            state: self.state,
            completed_components: self.completed_components(),
            total_components: self.total_components(),
        }
    }
}
