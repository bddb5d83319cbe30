//! Service lifecycle errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("service start failed: {0}")]
    StartFailed(String),
    #[error("service not running")]
    NotRunning,
    #[error("service already running")]
    AlreadyRunning,
}

pub type ServiceResult<T> = Result<T, ServiceError>;
