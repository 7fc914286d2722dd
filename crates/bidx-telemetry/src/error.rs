//! Telemetry error types.

use thiserror::Error;

/// Failures from the logging and metrics layers.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The global tracing subscriber could not be installed.
    #[error("Tracing subscriber install failed: {0}")]
    SubscriberInit(String),

    /// Metrics could not be encoded for export.
    #[error("Metrics encoding failed: {0}")]
    Metrics(String),
}

pub type TelemetryResult<T> = Result<T, TelemetryError>;
