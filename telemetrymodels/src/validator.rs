//! Range and format checks applied to every incoming telemetry record.
//!
//! Validation happens at the ingestion boundary, not by construction: a
//! `TelemetryRecord` can hold out-of-range values (e.g. one deserialized from
//! an untrusted sender) until it passes `validate`.

use chrono::DateTime;
use thiserror::Error;

use crate::record::{TelemetryRecord, VehicleStatus};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("vehicle_id must not be empty")]
    EmptyVehicleId,
    #[error("latitude must be between -90 and 90, got {0}")]
    LatitudeOutOfRange(f64),
    #[error("longitude must be between -180 and 180, got {0}")]
    LongitudeOutOfRange(f64),
    #[error("speed_kmh cannot be negative, got {0}")]
    NegativeSpeed(f64),
    #[error("battery_pct must be between 0 and 100, got {0}")]
    BatteryOutOfRange(f64),
    #[error("temperature_c must be between -50 and 100, got {0}")]
    TemperatureOutOfRange(f64),
    #[error("status '{status}' is inconsistent with speed {speed_kmh} km/h")]
    StatusSpeedMismatch {
        status: VehicleStatus,
        speed_kmh: f64,
    },
    #[error("timestamp is not a valid ISO-8601 UTC instant: '{0}'")]
    MalformedTimestamp(String),
}

/// Check every field of `record` against its allowed range, the status/speed
/// consistency rule, and timestamp parseability. Reports the first violation
/// in field order. Never mutates the input.
///
/// Note: speed has no upper bound here. The simulator caps itself at
/// 220 km/h, but the ingestion boundary accepts any non-negative speed.
pub fn validate(record: &TelemetryRecord) -> Result<(), ValidationError> {
    if record.vehicle_id.is_empty() {
        return Err(ValidationError::EmptyVehicleId);
    }
    if !(-90.0..=90.0).contains(&record.position.lat) {
        return Err(ValidationError::LatitudeOutOfRange(record.position.lat));
    }
    if !(-180.0..=180.0).contains(&record.position.lon) {
        return Err(ValidationError::LongitudeOutOfRange(record.position.lon));
    }
    if !(0.0..).contains(&record.speed_kmh) {
        return Err(ValidationError::NegativeSpeed(record.speed_kmh));
    }
    if !(0.0..=100.0).contains(&record.battery_pct) {
        return Err(ValidationError::BatteryOutOfRange(record.battery_pct));
    }
    if !(-50.0..=100.0).contains(&record.temperature_c) {
        return Err(ValidationError::TemperatureOutOfRange(record.temperature_c));
    }
    if record.status != VehicleStatus::from_speed(record.speed_kmh) {
        return Err(ValidationError::StatusSpeedMismatch {
            status: record.status,
            speed_kmh: record.speed_kmh,
        });
    }
    if DateTime::parse_from_rfc3339(&record.timestamp).is_err() {
        return Err(ValidationError::MalformedTimestamp(record.timestamp.clone()));
    }
    Ok(())
}
