//! Random memoryless control policy.
//!
//! Every tick is an independent draw; the policy keeps no history beyond its
//! RNG state. A moving vehicle accelerates or brakes with equal probability;
//! a stopped vehicle either stays put or pulls away.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use telemetrymodels::VehicleStatus;

/// Magnitude range for accelerate/brake while moving, km/h.
const MOVING_DELTA_KMH: std::ops::RangeInclusive<f64> = 3.0..=15.0;
/// Magnitude range for pulling away from a stop, km/h.
const PULL_AWAY_KMH: std::ops::RangeInclusive<f64> = 8.0..=25.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlAction {
    Accelerate(f64),
    Brake(f64),
    Idle,
}

/// Owns the simulation RNG. Seeded explicitly so runs are reproducible.
pub struct ControlPolicy {
    rng: SmallRng,
}

impl ControlPolicy {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Next action given the current motion state.
    pub fn decide(&mut self, status: VehicleStatus) -> ControlAction {
        match status {
            VehicleStatus::Moving => {
                let delta = self.rng.gen_range(MOVING_DELTA_KMH);
                if self.rng.gen_bool(0.5) {
                    ControlAction::Accelerate(delta)
                } else {
                    ControlAction::Brake(delta)
                }
            }
            VehicleStatus::Stopped => {
                if self.rng.gen_bool(0.5) {
                    ControlAction::Accelerate(self.rng.gen_range(PULL_AWAY_KMH))
                } else {
                    ControlAction::Idle
                }
            }
        }
    }

    /// Uniform thermal noise in [-0.4, 0.4] °C.
    pub fn thermal_noise(&mut self) -> f64 {
        self.rng.gen_range(-0.4..=0.4)
    }
}
