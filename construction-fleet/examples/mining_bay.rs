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
//! Mining bay construction demo
//!
//! Deploys a fleet that builds a mining bay spread along the x axis, one bay
//! section per drone, and prints progress until every drone is home.
//!
//! Run with `RUST_LOG=info cargo run --example mining_bay [config.toml]`.

use std::error::Error;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use construction_fleet::config::FleetConfig;
use construction_fleet::physics::{ForceVector, Position};
use construction_fleet::plan::{ComponentBlueprint, Lineup, PlanTemplate};
use construction_fleet::{DroneState, Fleet, FleetRunner};

const SECTION_SPACING: f64 = 10.0;

fn mining_bay(sections: usize) -> PlanTemplate {
    let lineup = |i: usize| Lineup {
        site: Position::new(i as f64 * SECTION_SPACING, 0.0, 0.0),
        blueprints: vec![
            ComponentBlueprint::new(format!("bay-{i:02}-pad"), ForceVector::zero(), "regolith"),
            ComponentBlueprint::new(format!("bay-{i:02}-frame"), ForceVector::new(0.0, 2.0, 0.0), "steel"),
            ComponentBlueprint::new(format!("bay-{i:02}-drill"), ForceVector::new(0.0, 2.0, 3.0), "steel"),
            ComponentBlueprint::new(format!("bay-{i:02}-hopper"), ForceVector::new(2.0, 0.0, 1.0), "titanium"),
        ],
    };
    PlanTemplate::new((0..sections).map(lineup).collect())
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("Construction Fleet - Mining Bay");
    println!("===============================\n");

    let config = match std::env::args().nth(1) {
        Some(path) => FleetConfig::load(path)?,
        None => FleetConfig {
            fleet_size: 10,
            report_interval_ms: 1000,
            ..FleetConfig::default()
        },
    };
    println!(
        "{} drones, {} geometry, {:?}, tick every {:?} (dt = {} s)\n",
        config.fleet_size,
        config.geometry,
        config.environment,
        config.tick_interval(),
        config.timestep
    );

    let fleet = Arc::new(Fleet::new(&config)?.with_template(mining_bay(config.fleet_size)));
    let deployed = fleet.deploy()?;
    println!("Deployed {} drones", deployed);

    let mut runner = FleetRunner::start(Arc::clone(&fleet), config.tick_interval(), config.timestep)?;
    let started = Instant::now();

    loop {
        thread::sleep(config.report_interval());
        let status = fleet.status_snapshot();
        let (built, total) = status.component_progress();
        println!(
            "[{:>6.1}s] {}/{} drones completed, {}/{} components, {} stranded",
            started.elapsed().as_secs_f64(),
            status.finished_count(),
            status.drones.len(),
            built,
            total,
            status.count_in(DroneState::EmergencyLanding)
        );

        if status.finished_count() == status.drones.len() {
            println!("\nMining bay complete");
            break;
        }
        if status.finished_count() + status.count_in(DroneState::EmergencyLanding) == status.drones.len() {
            println!("\nConstruction halted: remaining drones need rescue");
            break;
        }
    }

    runner.stop();

    for drone in fleet.status_snapshot().drones {
        println!(
            "  {}: {:<16} battery {:>6.2}%  ({:.2}, {:.2}, {:.2})",
            drone.id,
            drone.state.to_string(),
            drone.battery_level,
            drone.position.x,
            drone.position.y,
            drone.position.z
        );
    }
    Ok(())
}
