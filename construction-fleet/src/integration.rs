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
//! Semi-implicit Euler integration with clamped acceleration and velocity
//!
//! One step advances a [`PhysicsState`] by `dt` seconds:
//!
//! ```text
//! a  = clamp(F_net / m, acceleration_limit)
//! v' = clamp(v + a*dt, max_velocity)
//! p' = p + v'*dt
//! ```
//!
//! Updating position with the new velocity makes the scheme symplectic and
//! more stable than explicit Euler. The step is a pure function of the state,
//! the target, the timestep and the force model: there is no hidden
//! per-process initialization.
//!
//! # Timestep Guidelines
//!
//! The tick driver supplies `dt` per tick. Values between 0.01 s and 1.0 s keep
//! the deceleration envelope well behaved; [`validate_timestep`] rejects
//! anything outside `[MIN_TIMESTEP, MAX_TIMESTEP]`.

use crate::error::FleetError;
use crate::forces::{ForceBreakdown, ForceModel};
use crate::physics::{PhysicsState, Position};

/// Smallest accepted timestep in seconds
pub const MIN_TIMESTEP: f64 = 1e-3;

/// Largest accepted timestep in seconds
pub const MAX_TIMESTEP: f64 = 1.0;

/// Result of a single integration step
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StepReport {
    /// Forces that drove the step
    pub forces: ForceBreakdown,
    /// Straight-line distance moved during the step
    pub displacement: f64,
}

/// Check a timestep is usable by the integrator
///
/// # Errors
///
/// Returns [`FleetError::InvalidTimestep`] when `dt` is NaN, infinite or
/// outside `[MIN_TIMESTEP, MAX_TIMESTEP]`.
pub fn validate_timestep(dt: f64) -> Result<(), FleetError> {
    if dt.is_finite() && (MIN_TIMESTEP..=MAX_TIMESTEP).contains(&dt) {
        Ok(())
    } else {
        Err(FleetError::InvalidTimestep {
            dt,
            min: MIN_TIMESTEP,
            max: MAX_TIMESTEP,
        })
    }
}

/// Advance `state` one step toward `target`
///
/// After the step `|velocity| <= max_velocity` and
/// `|acceleration| <= acceleration_limit`. If the update produces a
/// non-finite state the previous state is restored and the returned report
/// has zero displacement.
///
/// The caller is responsible for validating `dt` (see [`validate_timestep`]).
///
/// # Examples
///
/// ```
/// use construction_fleet::forces::ForceModel;
/// use construction_fleet::integration::integrate_step;
/// use construction_fleet::physics::{Environment, GeometryMode, PhysicsProperties, PhysicsState, Position};
///
/// let mut state = PhysicsState::new(
///     PhysicsProperties::default(),
///     Environment::Vacuum,
///     GeometryMode::Euclidean3d,
/// );
/// let report = integrate_step(&mut state, &Position::new(100.0, 0.0, 0.0), 0.1, &ForceModel::default());
/// assert!(report.displacement > 0.0);
/// assert!(state.velocity.x > 0.0);
/// ```
pub fn integrate_step(
    state: &mut PhysicsState,
    target: &Position,
    dt: f64,
    model: &ForceModel,
) -> StepReport {
    let previous = *state;
    let forces = model.net_force(state, target);
    let props = state.properties;

    state.net_force = forces.net;
    state.acceleration = (forces.net * (1.0 / props.mass())).clamp_magnitude(props.acceleration_limit());

    state.velocity = (state.velocity + state.acceleration * dt).clamp_magnitude(props.max_velocity());

    let start = state.position.linear();
    state.position.set_linear(start + state.velocity * dt);

    if !state.is_valid() {
        log::warn!(
            "integration produced a non-finite state (net force {:?}), reverting step",
            forces.net
        );
        *state = previous;
        return StepReport {
            forces,
            displacement: 0.0,
        };
    }

    StepReport {
        forces,
        displacement: (state.position.linear() - start).magnitude(),
    }
}
