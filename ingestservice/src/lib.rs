//! Telemetry Ingestion Service Crate
//!
//! Provides the backend half of the telemetry pipeline:
//! - `LatestStateStore` - snapshot cache keyed by vehicle id (no history)
//! - `BroadcastHub` - observer registry with best-effort fanout
//! - `IngestionService` - validate, store, broadcast for each incoming record
//! - REST + WebSocket API exposing the ingest and subscription endpoints

pub mod error;
pub mod hub;
pub mod ingest;
pub mod rest_api;
pub mod store;

// Re-exports
pub use error::{ServiceError, ServiceResult};
pub use hub::{BroadcastHub, Subscription};
pub use ingest::{IngestStats, IngestionService};
pub use rest_api::{create_router, ApiState, BackendConfig, IngestApiService, ServiceStatus};
pub use store::LatestStateStore;
