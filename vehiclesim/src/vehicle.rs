//! Mutable physical state of the simulated vehicle.
//!
//! Status is derived from speed on demand and never stored, so the emitted
//! snapshot can never disagree with the speed it carries.

use chrono::{SecondsFormat, Utc};

use telemetrymodels::{Position, TelemetryRecord, VehicleStatus};

use crate::motion;

/// Hard speed cap, km/h. Acceleration at the cap is a no-op.
pub const MAX_SPEED_KMH: f64 = 220.0;

/// Idle battery drain per tick, percentage points (onboard systems).
const IDLE_DRAIN_PER_TICK: f64 = 0.005;

/// Ambient base temperature, °C.
const BASE_TEMPERATURE_C: f64 = 20.0;

/// Fraction of the gap to the target temperature closed each tick.
const THERMAL_SMOOTHING: f64 = 0.15;

pub struct VehicleState {
    pub vehicle_id: String,
    pub lat: f64,
    pub lon: f64,
    pub speed_kmh: f64,
    pub battery_pct: f64,
    pub temperature_c: f64,
}

impl VehicleState {
    pub fn new(
        vehicle_id: &str,
        lat: f64,
        lon: f64,
        battery_pct: f64,
        temperature_c: f64,
    ) -> Self {
        Self {
            vehicle_id: vehicle_id.to_string(),
            lat,
            lon,
            speed_kmh: 0.0,
            battery_pct,
            temperature_c,
        }
    }

    pub fn status(&self) -> VehicleStatus {
        VehicleStatus::from_speed(self.speed_kmh)
    }

    /// Speed up by `delta`, capped at `MAX_SPEED_KMH`. Position advances only
    /// if the speed actually changed.
    pub fn accelerate(&mut self, delta: f64) {
        let new_speed = (self.speed_kmh + delta).min(MAX_SPEED_KMH);
        if new_speed != self.speed_kmh {
            self.speed_kmh = new_speed;
            self.advance_position();
        }
    }

    /// Slow down by `delta`. Braking past zero clamps to a full stop with no
    /// position update for that tick.
    pub fn brake(&mut self, delta: f64) {
        if self.speed_kmh - delta > 0.0 {
            self.speed_kmh -= delta;
            self.advance_position();
        } else {
            self.speed_kmh = 0.0;
        }
    }

    fn advance_position(&mut self) {
        let (lat, lon) = motion::displace(self.lat, self.lon, self.speed_kmh);
        self.lat = lat;
        self.lon = lon;
    }

    /// One tick's battery consumption. Moving drain scales with speed
    /// (a per-minute rate applied for half a second); idle drain is a fixed
    /// per-tick amount. The level floors at 0 and never recovers.
    pub fn drain_battery(&mut self) {
        let drain = if self.speed_kmh > 0.0 {
            (0.02 + (self.speed_kmh / 100.0) * 0.08) * crate::TICK_SECONDS
        } else {
            IDLE_DRAIN_PER_TICK
        };
        self.battery_pct = (self.battery_pct - drain).max(0.0);
    }

    /// First-order lag toward a speed-dependent target temperature.
    pub fn update_temperature(&mut self, noise: f64) {
        let target = BASE_TEMPERATURE_C + self.speed_kmh * 0.08 + noise;
        self.temperature_c += (target - self.temperature_c) * THERMAL_SMOOTHING;
    }

    pub fn is_depleted(&self) -> bool {
        self.battery_pct <= 0.0
    }

    /// Snapshot the current state, stamped with the current UTC instant at
    /// second precision.
    pub fn record(&self) -> TelemetryRecord {
        TelemetryRecord {
            vehicle_id: self.vehicle_id.clone(),
            position: Position {
                lat: self.lat,
                lon: self.lon,
            },
            speed_kmh: self.speed_kmh,
            battery_pct: self.battery_pct,
            temperature_c: self.temperature_c,
            status: self.status(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vehicle() -> VehicleState {
        VehicleState::new("veh-001", 40.4168, -3.7038, 40.0, 20.0)
    }

    #[test]
    fn test_acceleration_is_capped() {
        let mut v = vehicle();
        v.speed_kmh = 215.0;
        v.accelerate(15.0);
        assert_eq!(v.speed_kmh, 220.0);
    }

    #[test]
    fn test_acceleration_at_cap_is_a_noop() {
        let mut v = vehicle();
        v.speed_kmh = 220.0;
        let (lat, lon) = (v.lat, v.lon);

        v.accelerate(10.0);
        assert_eq!(v.speed_kmh, 220.0);
        assert_eq!((v.lat, v.lon), (lat, lon));
    }

    #[test]
    fn test_acceleration_moves_vehicle() {
        let mut v = vehicle();
        v.accelerate(20.0);
        assert_eq!(v.speed_kmh, 20.0);
        assert!(v.lat > 40.4168);
        assert!(v.lon > -3.7038);
    }

    #[test]
    fn test_brake_to_stop_clamps_and_stays_put() {
        let mut v = vehicle();
        v.speed_kmh = 5.0;
        let (lat, lon) = (v.lat, v.lon);

        v.brake(10.0);
        assert_eq!(v.speed_kmh, 0.0);
        assert_eq!(v.status(), VehicleStatus::Stopped);
        assert_eq!((v.lat, v.lon), (lat, lon));
    }

    #[test]
    fn test_brake_past_zero_exactly() {
        // speed - delta == 0 also takes the clamp branch.
        let mut v = vehicle();
        v.speed_kmh = 10.0;
        let lat = v.lat;
        v.brake(10.0);
        assert_eq!(v.speed_kmh, 0.0);
        assert_eq!(v.lat, lat);
    }

    #[test]
    fn test_partial_brake_moves_vehicle() {
        let mut v = vehicle();
        v.speed_kmh = 50.0;
        v.brake(10.0);
        assert_eq!(v.speed_kmh, 40.0);
        assert!(v.lat > 40.4168);
    }

    #[test]
    fn test_moving_drain_scales_with_speed() {
        let mut v = vehicle();
        v.speed_kmh = 100.0;
        v.drain_battery();
        // (0.02 + 0.08) * 0.5 = 0.05 percentage points per tick
        assert!((v.battery_pct - 39.95).abs() < 1e-9);
    }

    #[test]
    fn test_idle_drain_is_fixed() {
        let mut v = vehicle();
        v.drain_battery();
        assert!((v.battery_pct - 39.995).abs() < 1e-9);
    }

    #[test]
    fn test_battery_floors_at_zero() {
        let mut v = vehicle();
        v.battery_pct = 0.003;
        v.drain_battery();
        assert_eq!(v.battery_pct, 0.0);
        assert!(v.is_depleted());

        // Never goes negative, never recovers.
        v.drain_battery();
        assert_eq!(v.battery_pct, 0.0);
    }

    #[test]
    fn test_temperature_lags_toward_target() {
        let mut v = vehicle();
        v.update_temperature(0.4);
        // target = 20.4, gap closed by 15%
        assert!((v.temperature_c - 20.06).abs() < 1e-9);

        v.speed_kmh = 100.0;
        v.update_temperature(0.0);
        // target = 28.0 from 20.06
        assert!((v.temperature_c - (20.06 + (28.0 - 20.06) * 0.15)).abs() < 1e-9);
    }

    #[test]
    fn test_record_snapshot_is_consistent() {
        let mut v = vehicle();
        v.accelerate(12.0);
        let record = v.record();

        assert_eq!(record.vehicle_id, "veh-001");
        assert_eq!(record.speed_kmh, v.speed_kmh);
        assert_eq!(record.status, VehicleStatus::Moving);
        assert!(telemetrymodels::validate(&record).is_ok());
    }
}
