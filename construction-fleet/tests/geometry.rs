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
//! Distance metrics and navigation under each geometry mode

use std::f64::consts::{FRAC_PI_2, PI};

use construction_fleet::drone::{Drone, DroneId, DroneState, DroneTuning};
use construction_fleet::forces::ForceModel;
use construction_fleet::navigation::{distance_between, great_circle_waypoint};
use construction_fleet::physics::{Environment, ForceVector, GeometryMode, PhysicsProperties, PhysicsState, Position};
use construction_fleet::plan::ComponentBlueprint;

const TOLERANCE: f64 = 1e-12;

fn drone(geometry: GeometryMode, start: Position, tuning: DroneTuning) -> Drone {
    let physics = PhysicsState::new(PhysicsProperties::default(), Environment::Vacuum, geometry).at(start);
    Drone::new(DroneId::new("NAV"), physics, ForceModel::default(), tuning)
}

fn fly_to_site(drone: &mut Drone, max_ticks: usize) -> usize {
    for tick in 1..=max_ticks {
        drone.tick(0.1).unwrap();
        if drone.state() == DroneState::ScanningTerrain {
            return tick;
        }
    }
    panic!("never reached the site, stopped at {:?}", drone.position());
}

#[test]
fn test_euclidean_distance() {
    let d = distance_between(
        GeometryMode::Euclidean3d,
        &Position::new(0.0, 0.0, 0.0),
        &Position::new(3.0, 4.0, 0.0),
    );
    assert_eq!(d, 5.0);
}

#[test]
fn test_planar_distance_ignores_altitude() {
    let d = distance_between(
        GeometryMode::Planar,
        &Position::new(0.0, 0.0, 5.0),
        &Position::new(3.0, 4.0, 99.0),
    );
    assert_eq!(d, 5.0);
}

#[test]
fn test_spherical_distance() {
    let p = Position::new(12.5, -33.0, 0.0);
    assert_eq!(distance_between(GeometryMode::Spherical, &p, &p), 0.0);

    let antipodal = distance_between(
        GeometryMode::Spherical,
        &Position::new(0.0, 0.0, 0.0),
        &Position::new(180.0, 0.0, 0.0),
    );
    assert!((antipodal - PI).abs() < TOLERANCE);

    let pole = distance_between(
        GeometryMode::Spherical,
        &Position::new(0.0, 0.0, 0.0),
        &Position::new(0.0, 90.0, 0.0),
    );
    assert!((pole - FRAC_PI_2).abs() < TOLERANCE);
}

#[test]
fn test_waypoint_lies_on_the_great_circle() {
    let from = Position::new(0.0, 0.0, 7.0);
    let to = Position::new(40.0, 30.0, 0.0);
    let total = distance_between(GeometryMode::Spherical, &from, &to);
    let mid = great_circle_waypoint(&from, &to, 0.5);

    let first = distance_between(GeometryMode::Spherical, &from, &mid);
    let second = distance_between(GeometryMode::Spherical, &mid, &to);
    assert!((first - total / 2.0).abs() < 1e-9);
    assert!((second - total / 2.0).abs() < 1e-9);
    assert_eq!(mid.z, 7.0);
}

#[test]
fn test_euclidean_drone_reaches_site() {
    let mut d = drone(GeometryMode::Euclidean3d, Position::zero(), DroneTuning::default());
    let site = Position::new(-6.0, 8.0, 3.0);
    d.assign_mission(site, &[]).unwrap();
    fly_to_site(&mut d, 500);
    let gap = distance_between(GeometryMode::Euclidean3d, d.position(), &site);
    assert!(gap < d.tuning().nav_epsilon);
}

#[test]
fn test_planar_drone_holds_altitude() {
    let mut d = drone(GeometryMode::Planar, Position::new(0.0, 0.0, 5.0), DroneTuning::default());
    d.assign_mission(Position::new(3.0, 4.0, 99.0), &[]).unwrap();
    fly_to_site(&mut d, 500);
    assert_eq!(d.position().z, 5.0);
}

#[test]
fn test_spherical_drone_follows_great_circle() {
    let mut d = drone(GeometryMode::Spherical, Position::zero(), DroneTuning::default());
    let site = Position::new(10.0, 10.0, 0.0);
    d.assign_mission(site, &[]).unwrap();
    fly_to_site(&mut d, 1000);
    let arc = distance_between(GeometryMode::Spherical, d.position(), &site).to_degrees();
    assert!(arc < d.tuning().nav_epsilon);
    assert_eq!(d.position().z, 0.0);
}

#[test]
fn test_spherical_mission_moves_with_stock_tuning() {
    let mut d = drone(GeometryMode::Spherical, Position::zero(), DroneTuning::default());
    let site = Position::new(20.0, 15.0, 0.0);
    d.assign_mission(site, &[]).unwrap();

    d.tick(0.1).unwrap();
    assert_eq!(d.state(), DroneState::FlyingToSite);
    assert!(d.position().x > 0.0 && d.position().y > 0.0);

    let ticks = fly_to_site(&mut d, 1000);
    assert!(ticks > 10, "arrived after only {} ticks", ticks);
}

#[test]
fn test_spherical_drone_crosses_antimeridian() {
    let mut d = drone(GeometryMode::Spherical, Position::new(170.0, 0.0, 0.0), DroneTuning::default());
    let site = Position::new(-150.0, 0.0, 0.0);
    d.assign_mission(site, &[]).unwrap();

    d.tick(0.1).unwrap();
    assert!(d.position().x > 170.0, "moved west to {}", d.position().x);

    fly_to_site(&mut d, 1000);
    let arc = distance_between(GeometryMode::Spherical, d.position(), &site).to_degrees();
    assert!(arc < d.tuning().nav_epsilon);
    assert!((-180.0..=180.0).contains(&d.position().x));
    assert!(d.battery_level() > 99.0);
}

#[test]
fn test_spherical_components_are_built_apart() {
    let mut d = drone(GeometryMode::Spherical, Position::zero(), DroneTuning::default());
    let plan = vec![
        ComponentBlueprint::new("west", ForceVector::zero(), "steel"),
        ComponentBlueprint::new("east", ForceVector::new(2.0, 0.0, 0.0), "steel"),
    ];
    d.assign_mission(Position::new(10.0, 0.0, 0.0), &plan).unwrap();
    fly_to_site(&mut d, 1000);

    let mut visited_east = false;
    for _ in 0..1000 {
        d.tick(0.1).unwrap();
        if d.components()[0].is_constructed() && !d.components()[1].is_constructed() {
            visited_east |= d.position().x > 11.0;
        }
        if d.state() == DroneState::ReturningHome {
            break;
        }
    }
    assert_eq!(d.completed_components(), 2);
    assert!(visited_east);
}
