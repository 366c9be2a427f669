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
//! Benchmarks for per-tick cost
//!
//! These benchmarks measure:
//! - A single force-model evaluation and integration step per geometry mode
//! - Fleet-wide ticks for increasing fleet sizes

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use construction_fleet::config::FleetConfig;
use construction_fleet::fleet::Fleet;
use construction_fleet::forces::ForceModel;
use construction_fleet::integration::integrate_step;
use construction_fleet::physics::{Environment, ForceVector, GeometryMode, PhysicsProperties, PhysicsState, Position};
use construction_fleet::plan::{ComponentBlueprint, Lineup, PlanTemplate};

fn bench_integrate_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("integrate_step");
    let model = ForceModel::default();
    let target = Position::new(40.0, 30.0, 10.0);

    for geometry in [GeometryMode::Planar, GeometryMode::Spherical, GeometryMode::Euclidean3d] {
        group.bench_with_input(BenchmarkId::from_parameter(geometry), &geometry, |b, &geometry| {
            let start = PhysicsState::new(PhysicsProperties::default(), Environment::Orbital, geometry)
                .at(Position::new(1.0e3, 0.0, 0.0));
            b.iter(|| {
                let mut state = start;
                integrate_step(&mut state, black_box(&target), 0.1, &model)
            });
        });
    }
    group.finish();
}

fn template(drones: usize) -> PlanTemplate {
    PlanTemplate::new(
        (0..drones)
            .map(|i| Lineup {
                site: Position::new(i as f64 * 10.0, 0.0, 0.0),
                blueprints: (0..20)
                    .map(|k| ComponentBlueprint::new(format!("{i}-{k}"), ForceVector::new(k as f64, 0.0, 0.0), "steel"))
                    .collect(),
            })
            .collect(),
    )
}

fn bench_fleet_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("fleet_tick_all");

    for size in [1, 10, 50] {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let config = FleetConfig {
                fleet_size: size,
                ..FleetConfig::default()
            };
            let fleet = Fleet::new(&config).unwrap().with_template(template(size));
            fleet.deploy().unwrap();
            b.iter(|| fleet.tick_all(black_box(0.1)).unwrap());
        });
    }
    group.finish();
}

criterion_group!(benches, bench_integrate_step, bench_fleet_tick);
criterion_main!(benches);
