//! Ingestion Service
//!
//! Orchestrates validate → store → broadcast for each incoming record.
//! Acceptance is decided by validation alone: broadcast delivery failures
//! never roll back the store write and never fail the ingest call.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use telemetrymodels::{validate, TelemetryRecord, ValidationError};

use crate::hub::BroadcastHub;
use crate::store::LatestStateStore;

/// Accept/reject counters since startup.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct IngestStats {
    pub accepted: u64,
    pub rejected: u64,
}

pub struct IngestionService {
    store: Arc<LatestStateStore>,
    hub: Arc<BroadcastHub>,
    accepted: AtomicU64,
    rejected: AtomicU64,
}

impl IngestionService {
    pub fn new(store: Arc<LatestStateStore>, hub: Arc<BroadcastHub>) -> Self {
        Self {
            store,
            hub,
            accepted: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
        }
    }

    pub fn store(&self) -> Arc<LatestStateStore> {
        self.store.clone()
    }

    pub fn hub(&self) -> Arc<BroadcastHub> {
        self.hub.clone()
    }

    pub fn stats(&self) -> IngestStats {
        IngestStats {
            accepted: self.accepted.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
        }
    }

    /// Validate `candidate`; on success store it and fan it out to every
    /// current observer. A rejected record mutates nothing.
    pub async fn ingest(&self, candidate: TelemetryRecord) -> Result<(), ValidationError> {
        if let Err(e) = validate(&candidate) {
            self.rejected.fetch_add(1, Ordering::Relaxed);
            log::debug!("rejected record for '{}': {}", candidate.vehicle_id, e);
            return Err(e);
        }

        // Serialize once so every observer receives a byte-identical payload.
        let payload = serde_json::to_string(&candidate)
            .expect("TelemetryRecord always serializes to JSON");

        let vehicle_id = candidate.vehicle_id.clone();
        self.store.upsert(candidate).await;
        let delivered = self.hub.broadcast(&payload).await;
        self.accepted.fetch_add(1, Ordering::Relaxed);

        log::debug!(
            "accepted record for '{}', delivered to {} observers",
            vehicle_id,
            delivered
        );
        Ok(())
    }
}
