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
//! Threaded tick driver
//!
//! [`FleetRunner`] gives every drone its own named thread that ticks the
//! drone, then parks for the tick interval. Stopping raises a shared flag and
//! wakes the parked threads; a tick already in progress always runs to
//! completion before its thread exits.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::config::ConfigError;
use crate::error::FleetError;
use crate::fleet::Fleet;
use crate::integration::validate_timestep;

/// One worker thread per drone, ticking until stopped
#[derive(Debug)]
pub struct FleetRunner {
    fleet: Arc<Fleet>,
    shutdown: Arc<AtomicBool>,
    workers: Vec<JoinHandle<()>>,
}

impl FleetRunner {
    /// Start ticking every drone of `fleet` by `dt` seconds each `interval`
    ///
    /// # Errors
    ///
    /// - [`FleetError::InvalidTimestep`] for an unusable `dt`
    /// - [`FleetError::Config`] for a zero `interval`
    /// - [`FleetError::Spawn`] if a thread cannot be created; threads already
    ///   started are stopped first
    pub fn start(fleet: Arc<Fleet>, interval: Duration, dt: f64) -> Result<Self, FleetError> {
        validate_timestep(dt)?;
        if interval.is_zero() {
            return Err(ConfigError::Invalid("tick interval must be positive".into()).into());
        }

        let mut runner = FleetRunner {
            fleet: Arc::clone(&fleet),
            shutdown: Arc::new(AtomicBool::new(false)),
            workers: Vec::with_capacity(fleet.len()),
        };

        for (index, id) in fleet.drone_ids().into_iter().enumerate() {
            let fleet = Arc::clone(&fleet);
            let shutdown = Arc::clone(&runner.shutdown);
            let spawned = thread::Builder::new()
                .name(id.to_string())
                .spawn(move || drive(&fleet, index, interval, dt, &shutdown));
            match spawned {
                Ok(handle) => runner.workers.push(handle),
                Err(err) => {
                    runner.stop();
                    return Err(FleetError::Spawn(err));
                }
            }
        }

        log::info!(
            "runner started: {} drones, {:?} interval, dt {}",
            runner.workers.len(),
            interval,
            dt
        );
        Ok(runner)
    }

    /// The fleet being driven
    pub fn fleet(&self) -> &Arc<Fleet> {
        &self.fleet
    }

    /// Whether worker threads are active
    pub fn is_running(&self) -> bool {
        !self.workers.is_empty()
    }

    /// Stop every worker at its next tick boundary and wait for it
    pub fn stop(&mut self) {
        if self.workers.is_empty() {
            return;
        }
        self.shutdown.store(true, Ordering::Release);
        for worker in &self.workers {
            worker.thread().unpark();
        }
        for worker in self.workers.drain(..) {
            let name = worker.thread().name().unwrap_or("drone").to_string();
            if worker.join().is_err() {
                log::error!("{}: worker panicked", name);
            }
        }
        log::info!("runner stopped");
    }
}

impl Drop for FleetRunner {
    fn drop(&mut self) {
        self.stop();
    }
}

fn drive(fleet: &Fleet, index: usize, interval: Duration, dt: f64, shutdown: &AtomicBool) {
    while !shutdown.load(Ordering::Acquire) {
        if let Err(err) = fleet.tick_at(index, dt) {
            log::error!("drone {} stopped ticking: {}", index, err);
            return;
        }
        thread::park_timeout(interval);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FleetConfig;
    use crate::drone::{DroneId, DroneState};
    use crate::physics::Position;

    fn fleet(size: usize) -> Arc<Fleet> {
        let config = FleetConfig {
            fleet_size: size,
            ..FleetConfig::default()
        };
        Arc::new(Fleet::new(&config).unwrap())
    }

    #[test]
    fn test_start_rejects_bad_arguments() {
        assert!(FleetRunner::start(fleet(1), Duration::from_millis(1), 0.0).is_err());
        assert!(FleetRunner::start(fleet(1), Duration::ZERO, 0.1).is_err());
    }

    #[test]
    fn test_stop_joins_workers() {
        let mut runner = FleetRunner::start(fleet(3), Duration::from_millis(1), 0.1).unwrap();
        assert!(runner.is_running());
        runner.stop();
        assert!(!runner.is_running());
        runner.stop();
    }

    #[test]
    fn test_runner_advances_drones() {
        let fleet = fleet(2);
        fleet
            .assign_mission(&DroneId::for_index(0), Position::new(50.0, 0.0, 0.0), &[])
            .unwrap();
        let mut runner = FleetRunner::start(Arc::clone(&fleet), Duration::from_millis(1), 0.1).unwrap();

        let deadline = std::time::Instant::now() + Duration::from_secs(10);
        while fleet.inspect(&DroneId::for_index(0), |d| d.position().x).unwrap() <= 0.0 {
            assert!(std::time::Instant::now() < deadline, "drone never moved");
            thread::sleep(Duration::from_millis(5));
        }
        runner.stop();

        let status = fleet.status_snapshot();
        assert_ne!(status.drones[0].state, DroneState::EmergencyLanding);
        assert_eq!(status.drones[1].state, DroneState::Idle);
    }
}
