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
//! Fleet configuration
//!
//! A [`FleetConfig`] is read from TOML. Every field has a default, so an
//! empty document describes the stock fleet: 50 drones at the origin in a
//! vacuum with Euclidean navigation, ticking every 100 ms with `dt = 0.1 s`.
//!
//! ```toml
//! schema_version = "1.0.0"
//! fleet_size = 4
//! environment = "planetary_surface"
//! geometry = "planar"
//!
//! [properties]
//! mass = 40.0
//!
//! [tuning]
//! nav_epsilon = 0.25
//!
//! [[drone_overrides]]
//! index = 2
//! properties = { mass = 80.0, thrust_force = 160.0 }
//! ```

use semver::Version;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::drone::DroneTuning;
use crate::error::FleetError;
use crate::fleet::MAX_FLEET_SIZE;
use crate::forces::{ForceModel, ThrustEnvelope, DEFAULT_ARRIVAL_THRESHOLD};
use crate::integration::validate_timestep;
use crate::physics::{Environment, GeometryMode, PhysicsProperties, PhysicsState, Position, ReferenceBody};

/// Configuration schema version understood by this crate
///
/// Format: MAJOR.MINOR.PATCH following semantic versioning.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";

/// Errors raised while loading a configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// The document is not valid TOML for a [`FleetConfig`]
    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),

    /// `schema_version` is not a semantic version
    #[error("schema version `{version}` is not a semantic version: {source}")]
    InvalidVersion {
        /// Version string found in the document
        version: String,
        /// Parser error
        source: semver::Error,
    },

    /// `schema_version` is not compatible with [`CONFIG_SCHEMA_VERSION`]
    #[error("schema version {found} is not compatible with supported version {supported}")]
    IncompatibleVersion {
        /// Version found in the document
        found: String,
        /// Version understood by this crate
        supported: &'static str,
    },

    /// A value is out of range in a way no other error describes
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Physics properties for one drone in place of the fleet-wide ones
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DroneOverride {
    /// Fleet index of the drone
    pub index: usize,
    /// Properties used for that drone
    pub properties: PhysicsProperties,
}

/// Everything needed to build a [`Fleet`](crate::fleet::Fleet)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FleetConfig {
    /// Version of the configuration schema the document was written for
    pub schema_version: String,
    /// Number of drones
    pub fleet_size: usize,
    /// Pause between ticks of one drone, in milliseconds
    pub tick_interval_ms: u64,
    /// Simulated time per tick, in seconds
    pub timestep: f64,
    /// Interval between fleet status reports, in milliseconds
    pub report_interval_ms: u64,
    /// Where every drone starts and returns to
    pub home: Position,
    /// Physics properties shared by all drones without an override
    pub properties: PhysicsProperties,
    /// Per-drone property overrides
    pub drone_overrides: Vec<DroneOverride>,
    /// Surrounding medium
    pub environment: Environment,
    /// Distance metric used for navigation
    pub geometry: GeometryMode,
    /// Body whose gravity acts on drones outside a vacuum
    pub reference_body: ReferenceBody,
    /// Standard gravitational parameter replacing `G * reference_body.mass`
    pub gravitational_parameter: Option<f64>,
    /// Thrust zone factors
    pub thrust_envelope: ThrustEnvelope,
    /// Steering distance below which thrust cuts out
    pub arrival_threshold: f64,
    /// Lifecycle tuning
    pub tuning: DroneTuning,
}

impl Default for FleetConfig {
    fn default() -> Self {
        FleetConfig {
            schema_version: CONFIG_SCHEMA_VERSION.to_string(),
            fleet_size: MAX_FLEET_SIZE,
            tick_interval_ms: 100,
            timestep: 0.1,
            report_interval_ms: 5000,
            home: Position::zero(),
            properties: PhysicsProperties::default(),
            drone_overrides: Vec::new(),
            environment: Environment::default(),
            geometry: GeometryMode::default(),
            reference_body: ReferenceBody::default(),
            gravitational_parameter: None,
            thrust_envelope: ThrustEnvelope::default(),
            arrival_threshold: DEFAULT_ARRIVAL_THRESHOLD,
            tuning: DroneTuning::default(),
        }
    }
}

impl FleetConfig {
    /// Parse and validate a TOML document
    ///
    /// # Errors
    ///
    /// Returns [`FleetError::Config`] for unparsable documents or schema
    /// versions, and the matching validation error otherwise.
    pub fn from_toml_str(contents: &str) -> Result<Self, FleetError> {
        let config: FleetConfig = toml::from_str(contents).map_err(ConfigError::from)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    ///
    /// # Errors
    ///
    /// As [`FleetConfig::from_toml_str`], plus [`ConfigError::Io`] when the
    /// file cannot be read.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, FleetError> {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::from)?;
        Self::from_toml_str(&contents)
    }

    /// Check every value
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), FleetError> {
        check_schema_version(&self.schema_version)?;

        if self.fleet_size == 0 || self.fleet_size > MAX_FLEET_SIZE {
            return Err(FleetError::InvalidFleetSize {
                size: self.fleet_size,
                max: MAX_FLEET_SIZE,
            });
        }
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid("tick_interval_ms must be positive".into()).into());
        }
        validate_timestep(self.timestep)?;

        if !self.home.is_valid() {
            return Err(ConfigError::Invalid("home position must be finite".into()).into());
        }
        for entry in &self.drone_overrides {
            if entry.index >= self.fleet_size {
                return Err(ConfigError::Invalid(format!(
                    "drone override index {} is outside a fleet of {}",
                    entry.index, self.fleet_size
                ))
                .into());
            }
        }

        if !(self.reference_body.mass.is_finite() && self.reference_body.mass > 0.0) {
            return Err(FleetError::property(
                "reference_body.mass",
                self.reference_body.mass,
                "must be positive and finite",
            ));
        }
        if !self.reference_body.position.is_valid() {
            return Err(ConfigError::Invalid("reference body position must be finite".into()).into());
        }
        if let Some(mu) = self.gravitational_parameter {
            if !(mu.is_finite() && mu > 0.0) {
                return Err(FleetError::property(
                    "gravitational_parameter",
                    mu,
                    "must be positive and finite",
                ));
            }
        }

        self.thrust_envelope.validate()?;
        if !(self.arrival_threshold.is_finite() && self.arrival_threshold >= 0.0) {
            return Err(FleetError::property(
                "arrival_threshold",
                self.arrival_threshold,
                "must be non-negative and finite",
            ));
        }
        self.tuning.validate()?;

        if self.tuning.nav_epsilon <= self.arrival_threshold {
            log::warn!(
                "nav_epsilon {} does not exceed arrival_threshold {}: drones coast toward goals without thrust",
                self.tuning.nav_epsilon,
                self.arrival_threshold
            );
        }
        Ok(())
    }

    /// Force model shared by every drone
    pub fn force_model(&self) -> ForceModel {
        ForceModel::new(self.reference_body, self.thrust_envelope, self.arrival_threshold)
    }

    /// Physics properties for the drone at `index`, the last override winning
    pub fn properties_for(&self, index: usize) -> PhysicsProperties {
        self.drone_overrides
            .iter()
            .rev()
            .find(|entry| entry.index == index)
            .map(|entry| entry.properties)
            .unwrap_or(self.properties)
    }

    /// Fresh physics state for the drone at `index`, at rest at home
    pub fn physics_for(&self, index: usize) -> PhysicsState {
        let state = PhysicsState::new(self.properties_for(index), self.environment, self.geometry).at(self.home);
        match self.gravitational_parameter {
            Some(mu) => state.with_gravitational_parameter(mu),
            None => state,
        }
    }

    /// Pause between ticks
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Interval between status reports
    pub fn report_interval(&self) -> Duration {
        Duration::from_millis(self.report_interval_ms)
    }
}

/// Check that a schema version can be read by this crate
///
/// The major version must match. Before 1.0 the minor version must match
/// too; from 1.0 on, documents from an older or equal minor version are
/// accepted.
///
/// # Errors
///
/// [`ConfigError::InvalidVersion`] or [`ConfigError::IncompatibleVersion`].
pub fn check_schema_version(version: &str) -> Result<(), ConfigError> {
    let found = Version::parse(version).map_err(|source| ConfigError::InvalidVersion {
        version: version.to_string(),
        source,
    })?;
    let supported = Version::parse(CONFIG_SCHEMA_VERSION).map_err(|source| ConfigError::InvalidVersion {
        version: CONFIG_SCHEMA_VERSION.to_string(),
        source,
    })?;

    let compatible = if found.major != supported.major {
        false
    } else if found.major != 0 {
        found.minor <= supported.minor
    } else {
        found.minor == supported.minor
    };

    if compatible {
        Ok(())
    } else {
        Err(ConfigError::IncompatibleVersion {
            found: version.to_string(),
            supported: CONFIG_SCHEMA_VERSION,
        })
    }
}
