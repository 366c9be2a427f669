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
//! Physics model types
//!
//! - [`PhysicsProperties`]: validated, immutable tuning (mass, thrust, limits)
//! - [`PhysicsState`]: pose, velocity, acceleration and net force
//! - [`ForceVector`] / [`Position`]: the vector and pose components

mod components;
mod properties;
mod state;

pub use components::{ForceVector, Position};
pub use properties::PhysicsProperties;
pub use state::{Environment, GeometryMode, PhysicsState, ReferenceBody, GRAVITATIONAL_CONSTANT};
