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
//! Fleet coordinator
//!
//! A [`Fleet`] exclusively owns its drones, each behind its own mutex so that
//! a drone has a single writer while different drones tick without any shared
//! lock. The building-plan template is read-only once loaded.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::FleetConfig;
use crate::drone::{check_mission, Drone, DroneId, DroneState, Transition};
use crate::error::FleetError;
use crate::integration::validate_timestep;
use crate::physics::Position;
use crate::plan::{ComponentBlueprint, PlanTemplate};
use crate::telemetry::FleetStatus;

/// Largest supported fleet
pub const MAX_FLEET_SIZE: usize = 50;

/// A bounded set of independently ticking drones
#[derive(Debug)]
pub struct Fleet {
    drones: Vec<Mutex<Drone>>,
    index: HashMap<DroneId, usize>,
    template: Option<PlanTemplate>,
}

impl Fleet {
    /// Build `config.fleet_size` idle drones named `CONSTRUCT_00`, `CONSTRUCT_01`, ...
    ///
    /// # Errors
    ///
    /// Returns the first validation error in `config`.
    pub fn new(config: &FleetConfig) -> Result<Self, FleetError> {
        config.validate()?;

        let forces = config.force_model();
        let mut drones = Vec::with_capacity(config.fleet_size);
        let mut index = HashMap::with_capacity(config.fleet_size);
        for i in 0..config.fleet_size {
            let id = DroneId::for_index(i);
            index.insert(id.clone(), i);
            drones.push(Mutex::new(Drone::new(id, config.physics_for(i), forces, config.tuning)));
        }

        log::info!(
            "fleet of {} drones ready ({} geometry, {:?})",
            config.fleet_size,
            config.geometry,
            config.environment
        );
        Ok(Fleet {
            drones,
            index,
            template: None,
        })
    }

    /// Attach the building-plan template used by [`Fleet::deploy`]
    pub fn with_template(mut self, template: PlanTemplate) -> Self {
        if template.len() > self.drones.len() {
            log::warn!(
                "plan template has {} lineups for {} drones; the extra lineups are never deployed",
                template.len(),
                self.drones.len()
            );
        }
        self.template = Some(template);
        self
    }

    /// The attached building-plan template
    pub fn template(&self) -> Option<&PlanTemplate> {
        self.template.as_ref()
    }

    /// Number of drones
    pub fn len(&self) -> usize {
        self.drones.len()
    }

    /// Whether the fleet has no drones
    pub fn is_empty(&self) -> bool {
        self.drones.is_empty()
    }

    /// Drone identifiers in fleet order
    pub fn drone_ids(&self) -> Vec<DroneId> {
        self.drones.iter().map(|slot| lock(slot).id().clone()).collect()
    }

    /// Assign lineup *i* of the template to drone *i*
    ///
    /// Every lineup is checked before any drone is touched. Drones without a
    /// lineup, and drones that are not idle, are skipped. Returns the number
    /// of missions assigned.
    ///
    /// # Errors
    ///
    /// [`FleetError::MissingTemplate`] when no template is attached, or the
    /// first lineup that cannot be assigned; no drone is changed in either
    /// case.
    pub fn deploy(&self) -> Result<usize, FleetError> {
        let template = self.template.as_ref().ok_or(FleetError::MissingTemplate)?;

        for (slot, lineup) in self.drones.iter().zip(&template.lineups) {
            check_mission(lock(slot).id(), &lineup.site, &lineup.blueprints)?;
        }

        let mut assigned = 0;
        for (slot, lineup) in self.drones.iter().zip(&template.lineups) {
            let mut drone = lock(slot);
            if drone.state() != DroneState::Idle {
                log::debug!("{}: busy in {}, not deployed", drone.id(), drone.state());
                continue;
            }
            drone.assign_mission(lineup.site, &lineup.blueprints)?;
            assigned += 1;
        }
        log::info!("deployed {} of {} drones", assigned, self.drones.len());
        Ok(assigned)
    }

    /// Send one drone to `target` with its own component list
    ///
    /// # Errors
    ///
    /// [`FleetError::UnknownDrone`] or any error from [`Drone::assign_mission`].
    pub fn assign_mission(
        &self,
        id: &DroneId,
        target: Position,
        blueprints: &[ComponentBlueprint],
    ) -> Result<(), FleetError> {
        lock(self.slot(id)?).assign_mission(target, blueprints)
    }

    /// Recover one drone from an emergency landing
    ///
    /// # Errors
    ///
    /// [`FleetError::UnknownDrone`] or any error from [`Drone::rescue`].
    pub fn rescue(&self, id: &DroneId) -> Result<(), FleetError> {
        lock(self.slot(id)?).rescue()
    }

    /// Advance one drone by one tick
    ///
    /// # Errors
    ///
    /// [`FleetError::UnknownDrone`] or any error from [`Drone::tick`].
    pub fn tick_drone(&self, id: &DroneId, dt: f64) -> Result<Option<Transition>, FleetError> {
        lock(self.slot(id)?).tick(dt)
    }

    /// Advance every drone by exactly one tick
    ///
    /// Drones tick in parallel when the `parallel` feature is enabled. Returns
    /// the transitions taken, in fleet order.
    ///
    /// # Errors
    ///
    /// [`FleetError::InvalidTimestep`] before any drone is touched.
    pub fn tick_all(&self, dt: f64) -> Result<Vec<(DroneId, Transition)>, FleetError> {
        validate_timestep(dt)?;

        #[cfg(feature = "parallel")]
        let results: Vec<_> = self.drones.par_iter().map(|slot| tick_slot(slot, dt)).collect();
        #[cfg(not(feature = "parallel"))]
        let results: Vec<_> = self.drones.iter().map(|slot| tick_slot(slot, dt)).collect();

        let mut transitions = Vec::new();
        for result in results {
            if let Some(entry) = result? {
                transitions.push(entry);
            }
        }
        Ok(transitions)
    }

    /// Read every drone's reportable state without mutating anything
    pub fn status_snapshot(&self) -> FleetStatus {
        FleetStatus {
            drones: self.drones.iter().map(|slot| lock(slot).status()).collect(),
        }
    }

    /// Run `f` with read-only access to one drone
    ///
    /// # Errors
    ///
    /// [`FleetError::UnknownDrone`].
    pub fn inspect<R>(&self, id: &DroneId, f: impl FnOnce(&Drone) -> R) -> Result<R, FleetError> {
        Ok(f(&*lock(self.slot(id)?)))
    }

    pub(crate) fn tick_at(&self, index: usize, dt: f64) -> Result<Option<Transition>, FleetError> {
        match self.drones.get(index) {
            Some(slot) => lock(slot).tick(dt),
            None => Ok(None),
        }
    }

    fn slot(&self, id: &DroneId) -> Result<&Mutex<Drone>, FleetError> {
        self.index
            .get(id)
            .map(|&i| &self.drones[i])
            .ok_or_else(|| FleetError::UnknownDrone(id.clone()))
    }
}

fn tick_slot(slot: &Mutex<Drone>, dt: f64) -> Result<Option<(DroneId, Transition)>, FleetError> {
    let mut drone = lock(slot);
    Ok(drone.tick(dt)?.map(|t| (drone.id().clone(), t)))
}

// A poisoned slot still holds a readable drone.
fn lock(slot: &Mutex<Drone>) -> MutexGuard<'_, Drone> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}
