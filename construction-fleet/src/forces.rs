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
//! Force contributions acting on a drone
//!
//! Three independent providers are summed each step:
//!
//! - **Gravity**: inverse-square attraction toward a [`ReferenceBody`], zero in
//!   a vacuum. The distance is floored at [`MIN_GRAVITY_DISTANCE`].
//! - **Drag**: `0.5 * Cd * A * |v|²` opposing the velocity, zero below
//!   [`DRAG_SPEED_THRESHOLD`].
//! - **Thrust**: along the steering vector, shaped by a three-zone
//!   [`ThrustEnvelope`] and scaled by the precision level, then clamped to the
//!   drone's maximum thrust.
//!
//! The net force is not clamped here; the integrator clamps the resulting
//! acceleration.

use serde::{Deserialize, Serialize};

use crate::error::FleetError;
use crate::navigation::{arrival_distance, steering_vector};
use crate::physics::{ForceVector, PhysicsState, Position, ReferenceBody, GRAVITATIONAL_CONSTANT};

/// Distance floor for the gravity calculation (meters)
pub const MIN_GRAVITY_DISTANCE: f64 = 1.0;

/// Speed below which drag is treated as zero (m/s)
pub const DRAG_SPEED_THRESHOLD: f64 = 0.001;

/// Default distance below which thrust stops because the drone has arrived
pub const DEFAULT_ARRIVAL_THRESHOLD: f64 = 0.1;

/// A source of force acting on a drone
///
/// Providers are pure functions of the drone's physics state and its current
/// navigation target.
pub trait ForceProvider: Send + Sync {
    /// Compute this provider's contribution
    fn compute_force(&self, state: &PhysicsState, target: &Position) -> ForceVector;

    /// Descriptive name used in diagnostics
    fn name(&self) -> &str;
}

/// Newtonian gravity toward a single reference body
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GravityForce {
    /// Attracting body
    pub body: ReferenceBody,
}

impl GravityForce {
    /// Create a gravity provider for the given body
    pub fn new(body: ReferenceBody) -> Self {
        GravityForce { body }
    }
}

impl ForceProvider for GravityForce {
    fn compute_force(&self, state: &PhysicsState, _target: &Position) -> ForceVector {
        if !state.environment.has_gravity() {
            return ForceVector::zero();
        }

        let offset = self.body.position.linear() - state.position.linear();
        let direction = match offset.normalized() {
            Some(dir) => dir,
            None => return ForceVector::zero(),
        };
        let d = offset.magnitude().max(MIN_GRAVITY_DISTANCE);

        let mu = state
            .gravitational_parameter
            .unwrap_or(GRAVITATIONAL_CONSTANT * self.body.mass);
        let magnitude = mu * state.properties.mass() / (d * d);

        direction * magnitude
    }

    fn name(&self) -> &str {
        "Gravity"
    }
}

/// Quadratic aerodynamic drag
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DragForce;

impl ForceProvider for DragForce {
    fn compute_force(&self, state: &PhysicsState, _target: &Position) -> ForceVector {
        let speed = state.speed();
        if speed < DRAG_SPEED_THRESHOLD {
            return ForceVector::zero();
        }

        let props = &state.properties;
        let magnitude =
            0.5 * props.drag_coefficient() * props.cross_sectional_area() * speed * speed;

        -(state.velocity * (1.0 / speed)) * magnitude
    }

    fn name(&self) -> &str {
        "Drag"
    }
}

/// Three-zone deceleration envelope for thrust
///
/// The safety distance is the stopping distance at the acceleration limit,
/// inflated by `safety_margin`:
///
/// ```text
/// safety = speed² / (2 * acceleration_limit) * safety_margin
/// distance <  safety        -> decelerate
/// distance <  2 * safety    -> moderate
/// otherwise                 -> full
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThrustEnvelope {
    /// Factor inside the safety distance (negative brakes)
    pub decelerate: f64,
    /// Factor between one and two safety distances
    pub moderate: f64,
    /// Factor beyond two safety distances
    pub full: f64,
    /// Multiplier on the ideal stopping distance
    pub safety_margin: f64,
}

impl ThrustEnvelope {
    /// Stopping distance at `speed` with the given deceleration, plus margin
    pub fn safety_distance(&self, speed: f64, acceleration_limit: f64) -> f64 {
        speed * speed / (2.0 * acceleration_limit) * self.safety_margin
    }

    /// Thrust factor for the current distance and speed
    pub fn factor(&self, distance: f64, speed: f64, acceleration_limit: f64) -> f64 {
        let safety = self.safety_distance(speed, acceleration_limit);
        if distance < safety {
            self.decelerate
        } else if distance < 2.0 * safety {
            self.moderate
        } else {
            self.full
        }
    }

    /// Check the envelope can be used by the thrust model
    ///
    /// # Errors
    ///
    /// Returns [`FleetError::InvalidProperty`] if a factor is non-finite or the
    /// safety margin is not positive.
    pub fn validate(&self) -> Result<(), FleetError> {
        for (field, value) in [
            ("thrust_envelope.decelerate", self.decelerate),
            ("thrust_envelope.moderate", self.moderate),
            ("thrust_envelope.full", self.full),
        ] {
            if !value.is_finite() {
                return Err(FleetError::property(field, value, "must be finite"));
            }
        }
        if !(self.safety_margin.is_finite() && self.safety_margin > 0.0) {
            return Err(FleetError::property(
                "thrust_envelope.safety_margin",
                self.safety_margin,
                "must be positive and finite",
            ));
        }
        Ok(())
    }
}

impl Default for ThrustEnvelope {
    fn default() -> Self {
        ThrustEnvelope {
            decelerate: -0.8,
            moderate: 0.5,
            full: 1.0,
            safety_margin: 1.2,
        }
    }
}

/// Thrust toward the navigation target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThrustForce {
    /// Zone factors
    pub envelope: ThrustEnvelope,
    /// Steering distance below which no thrust is produced
    pub arrival_threshold: f64,
}

impl Default for ThrustForce {
    fn default() -> Self {
        ThrustForce {
            envelope: ThrustEnvelope::default(),
            arrival_threshold: DEFAULT_ARRIVAL_THRESHOLD,
        }
    }
}

impl ForceProvider for ThrustForce {
    fn compute_force(&self, state: &PhysicsState, target: &Position) -> ForceVector {
        let steer = steering_vector(state, target);
        let d = steer.magnitude();
        if d < self.arrival_threshold {
            return ForceVector::zero();
        }
        let direction = match steer.normalized() {
            Some(dir) => dir,
            None => return ForceVector::zero(),
        };

        let props = &state.properties;
        let factor = self
            .envelope
            .factor(d, state.speed(), props.acceleration_limit())
            * props.precision_level();

        (direction * (props.thrust_force() * factor)).clamp_magnitude(props.thrust_force())
    }

    fn name(&self) -> &str {
        "Thrust"
    }
}

/// Individual contributions and their sum for one step
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ForceBreakdown {
    /// Gravity contribution
    pub gravity: ForceVector,
    /// Drag contribution
    pub drag: ForceVector,
    /// Thrust contribution
    pub thrust: ForceVector,
    /// Sum of all contributions
    pub net: ForceVector,
}

/// The full set of force providers for one drone
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ForceModel {
    /// Gravity provider
    pub gravity: GravityForce,
    /// Drag provider
    pub drag: DragForce,
    /// Thrust provider
    pub thrust: ThrustForce,
}

impl ForceModel {
    /// Create a model from its configurable parts
    pub fn new(body: ReferenceBody, envelope: ThrustEnvelope, arrival_threshold: f64) -> Self {
        ForceModel {
            gravity: GravityForce::new(body),
            drag: DragForce,
            thrust: ThrustForce {
                envelope,
                arrival_threshold,
            },
        }
    }

    /// Distance below which thrust cuts out
    pub fn arrival_threshold(&self) -> f64 {
        self.thrust.arrival_threshold
    }

    /// Compute every contribution and their sum
    ///
    /// A provider that yields a non-finite vector is dropped from the sum
    /// with a warning.
    pub fn net_force(&self, state: &PhysicsState, target: &Position) -> ForceBreakdown {
        let gravity = checked(&self.gravity, state, target);
        let drag = checked(&self.drag, state, target);
        let thrust = checked(&self.thrust, state, target);

        ForceBreakdown {
            gravity,
            drag,
            thrust,
            net: gravity + drag + thrust,
        }
    }
}

fn checked(provider: &dyn ForceProvider, state: &PhysicsState, target: &Position) -> ForceVector {
    let force = provider.compute_force(state, target);
    if force.is_valid() {
        force
    } else {
        log::warn!(
            "{} produced a non-finite force {:?}, ignoring it this step",
            provider.name(),
            force
        );
        ForceVector::zero()
    }
}

/// Deceleration needed to stop at `target` from the current speed
///
/// Scaled by `2 - precision_level` so higher precision brakes harder.
/// Returns a negative value, or zero when the drone is not moving or is
/// already within `arrival_threshold` of the target.
pub fn required_deceleration(state: &PhysicsState, target: &Position, arrival_threshold: f64) -> f64 {
    let speed = state.speed();
    if speed < DRAG_SPEED_THRESHOLD {
        return 0.0;
    }
    let d = arrival_distance(state, target);
    if d < arrival_threshold {
        return 0.0;
    }

    let time_to_target = d / speed;
    let deceleration = speed / time_to_target * (2.0 - state.properties.precision_level());
    -deceleration
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{Environment, GeometryMode, PhysicsProperties};

    fn vacuum_state() -> PhysicsState {
        PhysicsState::new(
            PhysicsProperties::default(),
            Environment::Vacuum,
            GeometryMode::Euclidean3d,
        )
    }

    #[test]
    fn test_gravity_zero_in_vacuum() {
        let gravity = GravityForce::default();
        let mut state = vacuum_state();
        for d in [0.0, 0.5, 10.0, 1e6] {
            state.position = Position::new(d, 0.0, 0.0);
            assert_eq!(gravity.compute_force(&state, &Position::zero()), ForceVector::zero());
        }
    }

    #[test]
    fn test_gravity_inverse_square() {
        let body = ReferenceBody {
            position: Position::zero(),
            mass: 1e12,
        };
        let gravity = GravityForce::new(body);
        let mut state = vacuum_state();
        state.environment = Environment::PlanetarySurface;

        state.position = Position::new(10.0, 0.0, 0.0);
        let near = gravity.compute_force(&state, &Position::zero());
        state.position = Position::new(20.0, 0.0, 0.0);
        let far = gravity.compute_force(&state, &Position::zero());

        // Points toward the body
        assert!(near.x < 0.0);
        assert!((near.magnitude() / far.magnitude() - 4.0).abs() < 1e-9);

        let expected = GRAVITATIONAL_CONSTANT * 50.0 * 1e12 / 100.0;
        assert!((near.magnitude() - expected).abs() / expected < 1e-12);
    }

    #[test]
    fn test_gravity_distance_floor() {
        let body = ReferenceBody {
            position: Position::zero(),
            mass: 1e12,
        };
        let gravity = GravityForce::new(body);
        let mut state = vacuum_state();
        state.environment = Environment::AsteroidField;

        state.position = Position::new(0.01, 0.0, 0.0);
        let close = gravity.compute_force(&state, &Position::zero());
        state.position = Position::new(1.0, 0.0, 0.0);
        let floor = gravity.compute_force(&state, &Position::zero());
        assert!((close.magnitude() - floor.magnitude()).abs() < 1e-9);

        // Coincident with the body: no direction, no force
        state.position = Position::zero();
        assert_eq!(gravity.compute_force(&state, &Position::zero()), ForceVector::zero());
    }

    #[test]
    fn test_gravity_uses_gravitational_parameter() {
        let gravity = GravityForce::default();
        let mut state = vacuum_state().with_gravitational_parameter(2.0);
        state.environment = Environment::Orbital;
        state.position = Position::new(0.0, 0.0, 2.0);
        let force = gravity.compute_force(&state, &Position::zero());
        // mu * m / d² = 2 * 50 / 4
        assert!((force.z + 25.0).abs() < 1e-12);
    }

    #[test]
    fn test_drag_opposes_velocity() {
        let drag = DragForce;
        let mut state = vacuum_state();
        state.velocity = ForceVector::new(10.0, -5.0, 2.0);
        let force = drag.compute_force(&state, &Position::zero());
        assert!(force.dot(&state.velocity) <= 0.0);

        let speed = state.speed();
        let expected = 0.5 * 0.1 * 0.5 * speed * speed;
        assert!((force.magnitude() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_drag_zero_when_still() {
        let mut state = vacuum_state();
        assert_eq!(DragForce.compute_force(&state, &Position::zero()), ForceVector::zero());
        state.velocity = ForceVector::new(0.0005, 0.0, 0.0);
        assert_eq!(DragForce.compute_force(&state, &Position::zero()), ForceVector::zero());
    }

    #[test]
    fn test_envelope_zones() {
        let env = ThrustEnvelope::default();
        // speed 10, limit 10 -> stopping 5 m, safety 6 m
        assert!((env.safety_distance(10.0, 10.0) - 6.0).abs() < 1e-12);
        assert_eq!(env.factor(5.9, 10.0, 10.0), -0.8);
        assert_eq!(env.factor(6.0, 10.0, 10.0), 0.5);
        assert_eq!(env.factor(11.9, 10.0, 10.0), 0.5);
        assert_eq!(env.factor(12.0, 10.0, 10.0), 1.0);
        // at rest everything is full thrust
        assert_eq!(env.factor(0.2, 0.0, 10.0), 1.0);
    }

    #[test]
    fn test_envelope_validation() {
        assert!(ThrustEnvelope::default().validate().is_ok());
        let bad = ThrustEnvelope {
            safety_margin: 0.0,
            ..ThrustEnvelope::default()
        };
        assert!(bad.validate().is_err());
        let bad = ThrustEnvelope {
            moderate: f64::NAN,
            ..ThrustEnvelope::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_thrust_full_zone() {
        let thrust = ThrustForce::default();
        let state = vacuum_state();
        let force = thrust.compute_force(&state, &Position::new(100.0, 0.0, 0.0));
        // 100 N * 1.0 * 0.95
        assert!((force.x - 95.0).abs() < 1e-12);
        assert_eq!(force.y, 0.0);
        assert!(force.magnitude() <= state.properties.thrust_force());
    }

    #[test]
    fn test_thrust_decelerates_near_target() {
        let thrust = ThrustForce::default();
        let mut state = vacuum_state();
        state.velocity = ForceVector::new(20.0, 0.0, 0.0);
        // safety = 400 / 20 * 1.2 = 24 m
        let force = thrust.compute_force(&state, &Position::new(10.0, 0.0, 0.0));
        assert!(force.x < 0.0);
        assert!((force.x + 76.0).abs() < 1e-12);
    }

    #[test]
    fn test_thrust_stops_at_arrival_threshold() {
        let thrust = ThrustForce::default();
        let state = vacuum_state();
        let force = thrust.compute_force(&state, &Position::new(0.05, 0.0, 0.0));
        assert_eq!(force, ForceVector::zero());
    }

    #[test]
    fn test_thrust_clamped_to_max() {
        let thrust = ThrustForce {
            envelope: ThrustEnvelope {
                full: 3.0,
                ..ThrustEnvelope::default()
            },
            arrival_threshold: DEFAULT_ARRIVAL_THRESHOLD,
        };
        let state = vacuum_state();
        let force = thrust.compute_force(&state, &Position::new(0.0, 500.0, 0.0));
        assert!((force.magnitude() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_net_force_sums_contributions() {
        let model = ForceModel::default();
        let mut state = vacuum_state();
        state.velocity = ForceVector::new(1.0, 0.0, 0.0);
        let breakdown = model.net_force(&state, &Position::new(100.0, 0.0, 0.0));
        assert_eq!(breakdown.gravity, ForceVector::zero());
        assert_eq!(breakdown.net, breakdown.gravity + breakdown.drag + breakdown.thrust);
        assert!(breakdown.drag.x < 0.0);
        assert!(breakdown.thrust.x > 0.0);
    }

    #[test]
    fn test_net_force_drops_non_finite_contribution() {
        let model = ForceModel::default();
        let mut state = vacuum_state();
        state.velocity = ForceVector::new(f64::INFINITY, 0.0, 0.0);
        let breakdown = model.net_force(&state, &Position::new(100.0, 0.0, 0.0));
        assert_eq!(breakdown.drag, ForceVector::zero());
        assert!(breakdown.net.is_valid());
    }

    #[test]
    fn test_required_deceleration() {
        let mut state = vacuum_state();
        let target = Position::new(10.0, 0.0, 0.0);
        assert_eq!(required_deceleration(&state, &target, DEFAULT_ARRIVAL_THRESHOLD), 0.0);

        state.velocity = ForceVector::new(5.0, 0.0, 0.0);
        let decel = required_deceleration(&state, &target, DEFAULT_ARRIVAL_THRESHOLD);
        // speed² / d * (2 - 0.95) = 25 / 10 * 1.05
        assert!((decel + 2.625).abs() < 1e-12);

        state.position = Position::new(9.95, 0.0, 0.0);
        assert_eq!(required_deceleration(&state, &target, DEFAULT_ARRIVAL_THRESHOLD), 0.0);
    }

    #[test]
    fn test_provider_names() {
        let model = ForceModel::default();
        assert_eq!(model.gravity.name(), "Gravity");
        assert_eq!(model.drag.name(), "Drag");
        assert_eq!(model.thrust.name(), "Thrust");
        assert_eq!(model.arrival_threshold(), DEFAULT_ARRIVAL_THRESHOLD);
    }
}
