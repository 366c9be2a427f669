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
//! Read-only fleet status for the telemetry collaborator
//!
//! Snapshots are plain values. A snapshot taken while drones are ticking
//! reflects each drone at some tick boundary, not necessarily the same one.

use serde::Serialize;

use crate::drone::{DroneId, DroneState};
use crate::physics::Position;

/// One drone's reportable state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DroneStatus {
    /// Drone identifier
    pub id: DroneId,
    /// Current pose
    pub position: Position,
    /// Battery percent
    pub battery_level: f64,
    /// Lifecycle state
    pub state: DroneState,
    /// Finished components
    pub completed_components: usize,
    /// Assigned components
    pub total_components: usize,
}

impl DroneStatus {
    /// Whether the drone is idle with all of its work done
    pub fn is_finished(&self) -> bool {
        self.state == DroneState::Idle && self.completed_components == self.total_components
    }
}

/// Status of every drone in fleet order
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct FleetStatus {
    /// Per-drone entries
    pub drones: Vec<DroneStatus>,
}

impl FleetStatus {
    /// Number of drones idle with all assigned components built
    pub fn finished_count(&self) -> usize {
        self.drones.iter().filter(|d| d.is_finished()).count()
    }

    /// Completed and total components across the fleet
    pub fn component_progress(&self) -> (usize, usize) {
        self.drones.iter().fold((0, 0), |(done, total), d| {
            (done + d.completed_components, total + d.total_components)
        })
    }

    /// Number of drones currently in `state`
    pub fn count_in(&self, state: DroneState) -> usize {
        self.drones.iter().filter(|d| d.state == state).count()
    }

    /// Entry for `id`, if present
    pub fn get(&self, id: &DroneId) -> Option<&DroneStatus> {
        self.drones.iter().find(|d| &d.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(index: usize, state: DroneState, done: usize, total: usize) -> DroneStatus {
        DroneStatus {
            id: DroneId::for_index(index),
            position: Position::zero(),
            battery_level: 80.0,
            state,
            completed_components: done,
            total_components: total,
        }
    }

    #[test]
    fn test_finished_count() {
        let fleet = FleetStatus {
            drones: vec![
                status(0, DroneState::Idle, 3, 3),
                status(1, DroneState::Idle, 1, 3),
                status(2, DroneState::ReturningHome, 2, 2),
                status(3, DroneState::Idle, 0, 0),
            ],
        };
        assert_eq!(fleet.finished_count(), 2);
        assert_eq!(fleet.component_progress(), (6, 8));
        assert_eq!(fleet.count_in(DroneState::Idle), 3);
        assert!(fleet.get(&DroneId::for_index(2)).is_some());
        assert!(fleet.get(&DroneId::for_index(9)).is_none());
    }
}
