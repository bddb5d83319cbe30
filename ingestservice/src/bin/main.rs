use std::sync::Arc;

use anyhow::Result;

use ingestservice::{
    ApiState, BackendConfig, BroadcastHub, IngestApiService, IngestionService, LatestStateStore,
};

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    env_logger::init();

    let mut cfg = BackendConfig::default();
    if let Ok(addr) = std::env::var("BIND_ADDR") {
        cfg.bind_addr = addr;
    }
    if let Ok(capacity) = std::env::var("OBSERVER_CHANNEL_CAPACITY") {
        if let Ok(n) = capacity.parse() {
            cfg.observer_channel_capacity = n;
        }
    }

    let store = Arc::new(LatestStateStore::new());
    let hub = Arc::new(BroadcastHub::new(cfg.observer_channel_capacity));
    let ingestion = Arc::new(IngestionService::new(store, hub));
    let state = Arc::new(ApiState { ingestion });

    let mut service = IngestApiService::new(&cfg.bind_addr, state);
    service.start().await?;

    log::info!(
        "Telemetry backend running on {}. Press Ctrl+C to stop.",
        cfg.bind_addr
    );

    tokio::signal::ctrl_c().await?;
    log::info!("Ctrl+C received, shutting down...");
    service.stop().await?;

    Ok(())
}
