//! REST + WebSocket API using Axum
//!
//! Provides the HTTP surface of the telemetry backend:
//! - POST /ingest - Submit a telemetry record
//! - GET /ws - Subscribe to the live telemetry stream (WebSocket)
//! - GET /vehicles/{id} - Latest snapshot for a vehicle
//! - GET /health - Health check with ingest counters

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        Path, State, WebSocketUpgrade,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use futures_util::{SinkExt, StreamExt};

use telemetrymodels::TelemetryRecord;

use crate::error::{ServiceError, ServiceResult};
use crate::ingest::IngestionService;

/// Backend configuration, built in `main` and overridable via environment.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub bind_addr: String,
    /// Per-observer delivery channel capacity; an observer that falls this
    /// far behind is pruned.
    pub observer_channel_capacity: usize,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8000".to_string(),
            observer_channel_capacity: 64,
        }
    }
}

/// API state shared across handlers.
pub struct ApiState {
    pub ingestion: Arc<IngestionService>,
}

/// API response types
#[derive(serde::Serialize)]
struct SavedResponse {
    saved: bool,
}

#[derive(serde::Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(serde::Serialize)]
struct HealthResponse {
    status: String,
    timestamp: String,
    accepted: u64,
    rejected: u64,
    vehicles: usize,
    observers: usize,
}

/// Submit one telemetry record. Validation failure is a 400 with the reason;
/// acceptance is a 201 acknowledging storage.
async fn ingest_telemetry(
    State(state): State<Arc<ApiState>>,
    Json(candidate): Json<TelemetryRecord>,
) -> impl IntoResponse {
    match state.ingestion.ingest(candidate).await {
        Ok(()) => (StatusCode::CREATED, Json(SavedResponse { saved: true })).into_response(),
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}

/// Latest accepted snapshot for one vehicle.
async fn get_vehicle(
    State(state): State<Arc<ApiState>>,
    Path(vehicle_id): Path<String>,
) -> impl IntoResponse {
    match state.ingestion.store().get(&vehicle_id).await {
        Some(record) => (StatusCode::OK, Json(record)).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Vehicle '{}' not found", vehicle_id),
            }),
        )
            .into_response(),
    }
}

/// Health check endpoint
async fn health_check(State(state): State<Arc<ApiState>>) -> impl IntoResponse {
    let stats = state.ingestion.stats();
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        accepted: stats.accepted,
        rejected: stats.rejected,
        vehicles: state.ingestion.store().len().await,
        observers: state.ingestion.hub().subscriber_count().await,
    })
}

/// Upgrade to a WebSocket and register the connection as an observer.
async fn ws_endpoint(
    State(state): State<Arc<ApiState>>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_observer(socket, state))
}

/// Pump accepted records to one observer until either side closes.
///
/// Inbound frames are read but not semantically processed; they only keep
/// the connection alive. The hub closing the delivery channel (prune after a
/// failed send) also ends the connection.
async fn handle_observer(socket: WebSocket, state: Arc<ApiState>) {
    let hub = state.ingestion.hub();
    let mut subscription = hub.subscribe().await;
    let observer_id = subscription.id;
    log::info!("observer {} connected", observer_id);

    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            payload = subscription.rx.recv() => {
                match payload {
                    Some(text) => {
                        if sink.send(Message::Text(text)).await.is_err() {
                            break;
                        }
                    }
                    // Pruned by the hub after a failed delivery.
                    None => break,
                }
            }
            inbound = stream.next() => {
                match inbound {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    hub.unsubscribe(observer_id).await;
    log::info!("observer {} disconnected", observer_id);
}

/// Create the API router
pub fn create_router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/ingest", post(ingest_telemetry))
        .route("/vehicles/:id", get(get_vehicle))
        .route("/ws", get(ws_endpoint))
        .with_state(state)
}

/// Service status information
#[derive(Debug, Clone, serde::Serialize)]
pub struct ServiceStatus {
    pub name: String,
    pub running: bool,
    pub started_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl ServiceStatus {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            running: false,
            started_at: None,
        }
    }
}

/// Ingest API Service
///
/// Owns the HTTP server lifecycle: `start` binds the listener and spawns the
/// server with graceful shutdown, `stop` triggers the shutdown signal.
pub struct IngestApiService {
    name: String,
    bind_addr: String,
    state: Arc<ApiState>,
    status: ServiceStatus,
    local_addr: Option<std::net::SocketAddr>,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl IngestApiService {
    pub fn new(bind_addr: &str, state: Arc<ApiState>) -> Self {
        Self {
            name: "ingest_api".to_string(),
            bind_addr: bind_addr.to_string(),
            state,
            status: ServiceStatus::new("ingest_api"),
            local_addr: None,
            shutdown_tx: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> Arc<ApiState> {
        self.state.clone()
    }

    pub fn status(&self) -> ServiceStatus {
        self.status.clone()
    }

    /// Address the listener actually bound to; `None` until started. Useful
    /// when binding to port 0.
    pub fn local_addr(&self) -> Option<std::net::SocketAddr> {
        self.local_addr
    }

    pub async fn start(&mut self) -> ServiceResult<()> {
        if self.status.running {
            return Err(ServiceError::AlreadyRunning);
        }

        let addr: std::net::SocketAddr = self
            .bind_addr
            .parse()
            .map_err(|e| ServiceError::StartFailed(format!("Invalid address: {}", e)))?;

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServiceError::StartFailed(format!("Bind failed: {}", e)))?;
        self.local_addr = listener.local_addr().ok();

        let router = create_router(self.state.clone());
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
        self.shutdown_tx = Some(shutdown_tx);

        tokio::spawn(async move {
            log::info!("Ingest API listening on {}", addr);
            axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                    log::info!("Ingest API shutting down");
                })
                .await
                .ok();
        });

        self.status.running = true;
        self.status.started_at = Some(chrono::Utc::now());

        log::info!("Ingest API service started on {}", self.bind_addr);
        Ok(())
    }

    pub async fn stop(&mut self) -> ServiceResult<()> {
        if !self.status.running {
            return Err(ServiceError::NotRunning);
        }

        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }

        self.status.running = false;
        log::info!("Ingest API service stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hub::BroadcastHub;
    use crate::store::LatestStateStore;

    fn api_state() -> Arc<ApiState> {
        Arc::new(ApiState {
            ingestion: Arc::new(IngestionService::new(
                Arc::new(LatestStateStore::new()),
                Arc::new(BroadcastHub::new(8)),
            )),
        })
    }

    #[tokio::test]
    async fn test_service_lifecycle() {
        let mut service = IngestApiService::new("127.0.0.1:0", api_state());

        service.start().await.unwrap();
        assert!(service.status().running);
        assert!(service.local_addr().is_some());

        // Double start is an error.
        assert!(matches!(
            service.start().await,
            Err(ServiceError::AlreadyRunning)
        ));

        service.stop().await.unwrap();
        assert!(!service.status().running);
        assert!(matches!(
            service.stop().await,
            Err(ServiceError::NotRunning)
        ));
    }

    #[tokio::test]
    async fn test_invalid_bind_addr_fails_start() {
        let mut service = IngestApiService::new("not-an-address", api_state());
        assert!(matches!(
            service.start().await,
            Err(ServiceError::StartFailed(_))
        ));
    }
}
