//! Latest-State Store
//!
//! Snapshot cache holding the most recently accepted telemetry record per
//! vehicle. One entry per vehicle id, overwritten on every accepted record,
//! never expired. Memory is bounded by the number of distinct vehicles,
//! independent of traffic volume.

use std::collections::HashMap;

use tokio::sync::RwLock;

use telemetrymodels::TelemetryRecord;

/// Keyed mapping from vehicle id to its latest accepted record.
///
/// Shared, process-lifetime state: all mutation goes through the inner lock,
/// the raw map is never exposed to callers.
pub struct LatestStateStore {
    records: RwLock<HashMap<String, TelemetryRecord>>,
}

impl LatestStateStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Insert-or-overwrite the record under its vehicle id.
    pub async fn upsert(&self, record: TelemetryRecord) {
        let mut records = self.records.write().await;
        records.insert(record.vehicle_id.clone(), record);
    }

    /// Latest record for a vehicle, if any has been accepted.
    pub async fn get(&self, vehicle_id: &str) -> Option<TelemetryRecord> {
        let records = self.records.read().await;
        records.get(vehicle_id).cloned()
    }

    /// Number of distinct vehicles currently tracked.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Remove every entry. Test reset hook; nothing in the serving path
    /// deletes entries.
    pub async fn clear(&self) {
        self.records.write().await.clear();
    }
}

impl Default for LatestStateStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use telemetrymodels::{Position, VehicleStatus};

    fn record(vehicle_id: &str, speed_kmh: f64) -> TelemetryRecord {
        TelemetryRecord {
            vehicle_id: vehicle_id.to_string(),
            position: Position {
                lat: 40.4168,
                lon: -3.7038,
            },
            speed_kmh,
            battery_pct: 50.0,
            temperature_c: 21.0,
            status: VehicleStatus::from_speed(speed_kmh),
            timestamp: "2026-02-04T12:00:00Z".to_string(),
        }
    }

    #[tokio::test]
    async fn test_upsert_then_get_round_trip() {
        let store = LatestStateStore::new();
        let r = record("veh-001", 10.0);

        store.upsert(r.clone()).await;
        assert_eq!(store.get("veh-001").await, Some(r));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_get_unknown_vehicle() {
        let store = LatestStateStore::new();
        assert_eq!(store.get("veh-404").await, None);
    }

    #[tokio::test]
    async fn test_overwrite_keeps_only_latest() {
        let store = LatestStateStore::new();
        store.upsert(record("veh-001", 10.0)).await;
        store.upsert(record("veh-001", 55.0)).await;

        let latest = store.get("veh-001").await.unwrap();
        assert!((latest.speed_kmh - 55.0).abs() < f64::EPSILON);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_clear_resets_store() {
        let store = LatestStateStore::new();
        store.upsert(record("veh-001", 10.0)).await;
        store.upsert(record("veh-002", 20.0)).await;
        assert_eq!(store.len().await, 2);

        store.clear().await;
        assert_eq!(store.len().await, 0);
        assert_eq!(store.get("veh-001").await, None);
    }
}
