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
//! Building plans and the components drones assemble
//!
//! Layout generation (which building type maps to which component positions)
//! happens outside this crate. The fleet receives a [`PlanTemplate`] holding
//! one [`Lineup`] per drone index; each drone turns its lineup into an owned,
//! ordered list of [`BuildingComponent`]s and works through it strictly in
//! list order.

use serde::{Deserialize, Serialize};

use crate::physics::{ForceVector, Position};

/// Maximum number of components a single drone may be assigned
pub const MAX_COMPONENTS_PER_DRONE: usize = 1000;

/// Progress within this distance of 1.0 counts as complete
const PROGRESS_TOLERANCE: f64 = 1e-9;

/// Blueprint for one component, positioned relative to the building site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentBlueprint {
    /// Component identifier
    pub id: String,
    /// Offset from the site position
    pub offset: ForceVector,
    /// Material tag
    pub material: String,
}

impl ComponentBlueprint {
    /// Create a blueprint
    pub fn new(id: impl Into<String>, offset: ForceVector, material: impl Into<String>) -> Self {
        ComponentBlueprint {
            id: id.into(),
            offset,
            material: material.into(),
        }
    }
}

/// Result of one construction step on a component
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConstructionOutcome {
    /// Work was done but the component is not finished
    InProgress {
        /// Progress after this step
        progress: f64,
    },
    /// This step finished the component
    Completed,
    /// The component was already finished; nothing changed
    AlreadyConstructed,
}

/// A component assigned to a drone
///
/// Once constructed, a component stays constructed with progress 1.0.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildingComponent {
    id: String,
    position: Position,
    material: String,
    is_constructed: bool,
    construction_progress: f64,
}

impl BuildingComponent {
    /// Materialize a blueprint at a building site
    pub fn from_blueprint(blueprint: &ComponentBlueprint, site: &Position) -> Self {
        BuildingComponent {
            id: blueprint.id.clone(),
            position: site.translated(&blueprint.offset),
            material: blueprint.material.clone(),
            is_constructed: false,
            construction_progress: 0.0,
        }
    }

    /// Component identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Where the component is built
    pub fn position(&self) -> &Position {
        &self.position
    }

    /// Material tag
    pub fn material(&self) -> &str {
        &self.material
    }

    /// Whether construction has finished
    pub fn is_constructed(&self) -> bool {
        self.is_constructed
    }

    /// Construction progress in `[0, 1]`
    pub fn progress(&self) -> f64 {
        self.construction_progress
    }

    /// Add `increment` to the progress, returning whether the component is
    /// now constructed
    ///
    /// Progress saturates at 1.0. A constructed component is left untouched.
    pub fn advance(&mut self, increment: f64) -> bool {
        if self.is_constructed {
            return true;
        }
        self.construction_progress = (self.construction_progress + increment).clamp(0.0, 1.0);
        if self.construction_progress >= 1.0 - PROGRESS_TOLERANCE {
            self.construction_progress = 1.0;
            self.is_constructed = true;
        }
        self.is_constructed
    }
}

/// Blueprints for one drone at one building site
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Lineup {
    /// Site the drone flies to first; component offsets are relative to it
    pub site: Position,
    /// Components in construction order
    #[serde(default)]
    pub blueprints: Vec<ComponentBlueprint>,
}

/// Read-only building plan shared by a fleet, one lineup per drone index
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlanTemplate {
    /// Lineups indexed by drone position in the fleet
    pub lineups: Vec<Lineup>,
}

impl PlanTemplate {
    /// Create a template from lineups
    pub fn new(lineups: Vec<Lineup>) -> Self {
        PlanTemplate { lineups }
    }

    /// Lineup for the drone at `index`
    pub fn lineup(&self, index: usize) -> Option<&Lineup> {
        self.lineups.get(index)
    }

    /// Number of lineups
    pub fn len(&self) -> usize {
        self.lineups.len()
    }

    /// Whether the template has no lineups
    pub fn is_empty(&self) -> bool {
        self.lineups.is_empty()
    }

    /// Components across every lineup
    pub fn total_components(&self) -> usize {
        self.lineups.iter().map(|l| l.blueprints.len()).sum()
    }
}
