//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Engine error: {0}")]
    Engine(#[from] bidx_engine::EngineError),

    #[error("Journal error: {0}")]
    Journal(#[from] bidx_journal::JournalError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] bidx_telemetry::TelemetryError),

    #[error("Simulation error: {0}")]
    Simulation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
