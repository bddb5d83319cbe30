use serde::{Deserialize, Serialize};

/// ---- Wire schema (telemetry over HTTP/WebSocket) ----

/// GPS position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub lat: f64,
    pub lon: f64,
}

/// Motion state of the vehicle. Must be `Stopped` exactly when speed is zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleStatus {
    Moving,
    Stopped,
}

impl VehicleStatus {
    /// Derive the status from a speed value; status is never stored
    /// independently of speed.
    pub fn from_speed(speed_kmh: f64) -> Self {
        if speed_kmh == 0.0 {
            VehicleStatus::Stopped
        } else {
            VehicleStatus::Moving
        }
    }
}

impl std::fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VehicleStatus::Moving => write!(f, "moving"),
            VehicleStatus::Stopped => write!(f, "stopped"),
        }
    }
}

/// One telemetry snapshot for one vehicle. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryRecord {
    /// Unique vehicle key; stable for the lifetime of a simulated vehicle.
    pub vehicle_id: String,

    pub position: Position,

    pub speed_kmh: f64,

    pub battery_pct: f64,

    pub temperature_c: f64,

    pub status: VehicleStatus,

    /// ISO-8601 UTC instant, second precision. Carried as a string so that a
    /// malformed timestamp is reported by the validator, not by the
    /// deserialization layer.
    pub timestamp: String,
}
