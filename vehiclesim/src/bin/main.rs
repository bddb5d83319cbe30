use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing::info;

use vehiclesim::{runner, HttpTransmitter, SimulatorConfig, VehicleSimulator};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        )
        .init();

    let mut cfg = SimulatorConfig::default();
    if let Ok(id) = std::env::var("VEHICLE_ID") {
        cfg.vehicle_id = id;
    }
    if let Ok(battery) = std::env::var("INITIAL_BATTERY_PCT") {
        if let Ok(v) = battery.parse() {
            cfg.initial_battery_pct = v;
        }
    }
    if let Ok(seed) = std::env::var("SIM_SEED") {
        if let Ok(v) = seed.parse() {
            cfg.seed = Some(v);
        }
    }
    let ingest_url = std::env::var("INGEST_URL")
        .unwrap_or_else(|_| "http://127.0.0.1:8000/ingest".to_string());

    let simulator = VehicleSimulator::new(&cfg);
    let transmitter = HttpTransmitter::new(&ingest_url)?;
    let cancel = CancellationToken::new();

    info!(
        "simulator started: vehicle '{}', posting to {} every {:?}. Press Ctrl+C to stop.",
        cfg.vehicle_id, ingest_url, cfg.tick
    );

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Ctrl+C received, stopping simulator.");
            cancel.cancel();
        }
        _ = runner::run(simulator, &transmitter, cfg.tick, cancel.clone()) => {}
    }

    Ok(())
}
