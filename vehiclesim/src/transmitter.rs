//! Outbound transmission of telemetry to the ingestion backend.
//!
//! The trait seam exists so the run loop can be exercised with a mock
//! transmitter in tests; the real implementation POSTs JSON over HTTP to a
//! single configured destination.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use telemetrymodels::TelemetryRecord;

#[derive(Error, Debug)]
pub enum TransmitError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("ingest endpoint returned {status}: {body}")]
    Rejected { status: u16, body: String },
}

#[async_trait]
pub trait TelemetryTransmitter: Send + Sync {
    async fn send(&self, record: &TelemetryRecord) -> Result<(), TransmitError>;
}

/// HTTP transmitter backed by reqwest.
pub struct HttpTransmitter {
    client: reqwest::Client,
    ingest_url: String,
}

impl HttpTransmitter {
    pub fn new(ingest_url: &str) -> Result<Self, TransmitError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| TransmitError::Request(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            ingest_url: ingest_url.to_string(),
        })
    }

    pub fn ingest_url(&self) -> &str {
        &self.ingest_url
    }
}

#[async_trait]
impl TelemetryTransmitter for HttpTransmitter {
    async fn send(&self, record: &TelemetryRecord) -> Result<(), TransmitError> {
        let response = self
            .client
            .post(&self.ingest_url)
            .json(record)
            .send()
            .await
            .map_err(|e| TransmitError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransmitError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transmitter_construction() {
        let t = HttpTransmitter::new("http://127.0.0.1:8000/ingest").unwrap();
        assert_eq!(t.ingest_url(), "http://127.0.0.1:8000/ingest");
    }
}
