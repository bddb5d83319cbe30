//! Simulation run loop.
//!
//! One tick per fixed interval until the battery is exhausted or the token
//! is cancelled. Transmission is fire-and-forget: a transport failure is
//! logged and the next tick proceeds unchanged, with no retry, no backoff
//! and no queued redelivery.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::simulator::VehicleSimulator;
use crate::transmitter::TelemetryTransmitter;

pub async fn run<T: TelemetryTransmitter>(
    mut simulator: VehicleSimulator,
    transmitter: &T,
    tick: Duration,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(tick);

    loop {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                info!("simulation cancelled");
                break;
            }
            _ = interval.tick() => {
                let record = simulator.tick();
                info!(
                    "tick: speed={:.1} km/h battery={:.1}% temp={:.1}C pos=({:.6}, {:.6}) {}",
                    record.speed_kmh,
                    record.battery_pct,
                    record.temperature_c,
                    record.position.lat,
                    record.position.lon,
                    record.status,
                );

                if let Err(e) = transmitter.send(&record).await {
                    warn!("failed to transmit telemetry: {}", e);
                }

                if simulator.is_depleted() {
                    info!("battery exhausted, simulation finished");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulator::SimulatorConfig;
    use crate::transmitter::TransmitError;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use telemetrymodels::TelemetryRecord;

    struct MockTransmitter {
        sent: Mutex<Vec<TelemetryRecord>>,
        fail: bool,
    }

    impl MockTransmitter {
        fn new(fail: bool) -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                fail,
            }
        }

        fn sent(&self) -> Vec<TelemetryRecord> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TelemetryTransmitter for MockTransmitter {
        async fn send(&self, record: &TelemetryRecord) -> Result<(), TransmitError> {
            self.sent.lock().unwrap().push(record.clone());
            if self.fail {
                Err(TransmitError::Request("connection refused".to_string()))
            } else {
                Ok(())
            }
        }
    }

    fn config(battery: f64) -> SimulatorConfig {
        SimulatorConfig {
            seed: Some(42),
            initial_battery_pct: battery,
            tick: Duration::from_millis(1),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_loop_stops_after_final_zero_battery_record() {
        let cfg = config(0.01);
        let transmitter = MockTransmitter::new(false);
        let simulator = VehicleSimulator::new(&cfg);

        run(simulator, &transmitter, cfg.tick, CancellationToken::new()).await;

        let sent = transmitter.sent();
        assert!(!sent.is_empty());
        // The terminal zero-battery record is transmitted exactly once,
        // as the last record.
        assert_eq!(sent.last().unwrap().battery_pct, 0.0);
        assert_eq!(sent.iter().filter(|r| r.battery_pct == 0.0).count(), 1);
    }

    #[tokio::test]
    async fn test_transport_failure_does_not_stop_the_loop() {
        let cfg = config(0.02);
        let transmitter = MockTransmitter::new(true);
        let simulator = VehicleSimulator::new(&cfg);

        run(simulator, &transmitter, cfg.tick, CancellationToken::new()).await;

        // Every tick still attempted a transmission and the loop only ended
        // on battery exhaustion.
        let sent = transmitter.sent();
        assert!(sent.len() >= 2);
        assert_eq!(sent.last().unwrap().battery_pct, 0.0);
    }

    #[tokio::test]
    async fn test_cancellation_stops_the_loop() {
        let cfg = SimulatorConfig {
            seed: Some(42),
            tick: Duration::from_millis(1),
            ..Default::default()
        };
        let transmitter = MockTransmitter::new(false);
        let simulator = VehicleSimulator::new(&cfg);

        let cancel = CancellationToken::new();
        cancel.cancel();
        run(simulator, &transmitter, cfg.tick, cancel).await;

        // Cancelled before the first interval fired.
        assert!(transmitter.sent().is_empty());
    }
}
