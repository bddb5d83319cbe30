//! Tick orchestration for one simulated vehicle.

use std::time::Duration;

use chrono::Utc;

use telemetrymodels::TelemetryRecord;

use crate::control::{ControlAction, ControlPolicy};
use crate::vehicle::VehicleState;

/// Simulator configuration, built in `main` and overridable via environment.
#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    pub vehicle_id: String,
    pub start_lat: f64,
    pub start_lon: f64,
    pub initial_battery_pct: f64,
    pub initial_temperature_c: f64,
    /// Wall-clock pause between ticks.
    pub tick: Duration,
    /// RNG seed; wall-clock derived when absent.
    pub seed: Option<u64>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            vehicle_id: "veh-001".to_string(),
            // Madrid
            start_lat: 40.4168,
            start_lon: -3.7038,
            initial_battery_pct: 40.0,
            initial_temperature_c: 20.0,
            tick: Duration::from_millis(500),
            seed: None,
        }
    }
}

/// Owns the vehicle state and the control policy; advances both one tick at
/// a time, strictly sequentially.
pub struct VehicleSimulator {
    state: VehicleState,
    policy: ControlPolicy,
}

impl VehicleSimulator {
    pub fn new(cfg: &SimulatorConfig) -> Self {
        let seed = cfg
            .seed
            .unwrap_or_else(|| Utc::now().timestamp_millis() as u64);
        Self {
            state: VehicleState::new(
                &cfg.vehicle_id,
                cfg.start_lat,
                cfg.start_lon,
                cfg.initial_battery_pct,
                cfg.initial_temperature_c,
            ),
            policy: ControlPolicy::new(seed),
        }
    }

    pub fn state(&self) -> &VehicleState {
        &self.state
    }

    /// Battery exhausted: the terminal condition of the simulation.
    pub fn is_depleted(&self) -> bool {
        self.state.is_depleted()
    }

    /// Advance the vehicle by one tick and emit the resulting snapshot.
    ///
    /// Order within the tick: control decision (branching on the status at
    /// tick start), then battery drain, then thermal update, then the
    /// timestamped snapshot, whose status is re-derived from the final
    /// speed.
    pub fn tick(&mut self) -> TelemetryRecord {
        match self.policy.decide(self.state.status()) {
            ControlAction::Accelerate(delta) => self.state.accelerate(delta),
            ControlAction::Brake(delta) => self.state.brake(delta),
            ControlAction::Idle => {}
        }

        self.state.drain_battery();
        let noise = self.policy.thermal_noise();
        self.state.update_temperature(noise);

        self.state.record()
    }
}
