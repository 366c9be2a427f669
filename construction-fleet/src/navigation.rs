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
//! Geometry-aware distance and steering
//!
//! Distances follow the state's [`GeometryMode`]:
//!
//! - **planar**: 2D distance, the z coordinate is ignored
//! - **spherical**: great-circle angle on a unit sphere (haversine), with x/y
//!   read as longitude/latitude in degrees; the result is in radians
//! - **euclidean_3d**: straight-line 3D distance
//!
//! Arrival checks use [`arrival_distance`], which reports spherical arcs in
//! degrees so that they share units with the coordinates a drone moves in,
//! its steering vector and its thrust cut-off.
//!
//! The steering vector is what the thrust model follows. Under planar
//! geometry altitude is held; under spherical geometry the drone aims at the
//! great-circle waypoint halfway to the target, taking the short way across
//! the ±180° meridian.

use crate::physics::{ForceVector, GeometryMode, PhysicsState, Position};

/// Fraction of the great-circle arc used as the steering waypoint
pub const GREAT_CIRCLE_STEERING_FRACTION: f64 = 0.5;

/// Distance between two positions under the given geometry
///
/// # Examples
///
/// ```
/// use construction_fleet::navigation::distance_between;
/// use construction_fleet::physics::{GeometryMode, Position};
///
/// let d = distance_between(
///     GeometryMode::Planar,
///     &Position::new(0.0, 0.0, 5.0),
///     &Position::new(3.0, 4.0, 99.0),
/// );
/// assert_eq!(d, 5.0);
/// ```
pub fn distance_between(mode: GeometryMode, from: &Position, to: &Position) -> f64 {
    match mode {
        GeometryMode::Planar => {
            let dx = to.x - from.x;
            let dy = to.y - from.y;
            (dx * dx + dy * dy).sqrt()
        }
        GeometryMode::Spherical => haversine(from, to),
        GeometryMode::Euclidean3d => (to.linear() - from.linear()).magnitude(),
    }
}

/// Distance from the state's position to `target`
pub fn distance(state: &PhysicsState, target: &Position) -> f64 {
    distance_between(state.geometry, &state.position, target)
}

/// Distance to `target` in position-coordinate units
///
/// Same as [`distance`] except under spherical geometry, where the
/// great-circle angle is given in degrees of arc.
pub fn arrival_distance(state: &PhysicsState, target: &Position) -> f64 {
    match state.geometry {
        GeometryMode::Spherical => distance(state, target).to_degrees(),
        GeometryMode::Planar | GeometryMode::Euclidean3d => distance(state, target),
    }
}

/// Whether the state is strictly closer than `epsilon` to `target`, measured
/// by [`arrival_distance`]
pub fn converged(state: &PhysicsState, target: &Position, epsilon: f64) -> bool {
    arrival_distance(state, target) < epsilon
}

/// Longitude in degrees folded into `(-180, 180]`
pub fn wrap_longitude(degrees: f64) -> f64 {
    let wrapped = (degrees + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 {
        180.0
    } else {
        wrapped
    }
}

/// Vector the thrust model should follow from the current position
pub fn steering_vector(state: &PhysicsState, target: &Position) -> ForceVector {
    let here = state.position;
    match state.geometry {
        GeometryMode::Planar => ForceVector::new(target.x - here.x, target.y - here.y, 0.0),
        GeometryMode::Spherical => {
            let waypoint = great_circle_waypoint(&here, target, GREAT_CIRCLE_STEERING_FRACTION);
            ForceVector::new(wrap_longitude(waypoint.x - here.x), waypoint.y - here.y, 0.0)
        }
        GeometryMode::Euclidean3d => target.linear() - here.linear(),
    }
}

/// Point at `fraction` of the way along the great circle from `from` to `to`
///
/// Coordinates are longitude (x) and latitude (y) in degrees. The altitude and
/// orientation of `from` are kept. Coincident or antipodal endpoints have no
/// unique great circle, in which case `to` is returned.
pub fn great_circle_waypoint(from: &Position, to: &Position, fraction: f64) -> Position {
    let d = haversine(from, to);
    let sin_d = d.sin();
    if d < 1e-12 || sin_d.abs() < 1e-12 {
        return *to;
    }

    let (lat1, lon1) = (from.y.to_radians(), from.x.to_radians());
    let (lat2, lon2) = (to.y.to_radians(), to.x.to_radians());

    let a = ((1.0 - fraction) * d).sin() / sin_d;
    let b = (fraction * d).sin() / sin_d;

    let x = a * lat1.cos() * lon1.cos() + b * lat2.cos() * lon2.cos();
    let y = a * lat1.cos() * lon1.sin() + b * lat2.cos() * lon2.sin();
    let z = a * lat1.sin() + b * lat2.sin();

    let mut waypoint = *from;
    waypoint.y = z.atan2((x * x + y * y).sqrt()).to_degrees();
    waypoint.x = y.atan2(x).to_degrees();
    waypoint
}

fn haversine(from: &Position, to: &Position) -> f64 {
    let lat1 = from.y.to_radians();
    let lat2 = to.y.to_radians();
    let delta_lat = (to.y - from.y).to_radians();
    let delta_lon = (to.x - from.x).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
    // rounding can push h a hair outside [0, 1] near antipodes
    let h = h.clamp(0.0, 1.0);
    2.0 * h.sqrt().atan2((1.0 - h).sqrt())
}
