//! Prometheus metrics and structured logging for bidx.
//!
//! Provides observability for the auction engine:
//! - Prometheus metrics for bid flow, rejections, and finalizations
//! - Structured JSON logging with tracing

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::init_logging;
pub use metrics::Metrics;
