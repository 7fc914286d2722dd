//! bidx application shell.
//!
//! Loads configuration, replays the journal into a recovered
//! `AuctionHouse`, runs the clock and an event-logging subscriber, and
//! dispatches on run mode:
//! - `serve`: keep the engine running until shutdown
//! - `simulate`: concurrent load generator with a settlement summary

pub mod app;
pub mod config;
pub mod error;
pub mod sim;

pub use app::Application;
pub use config::{AppConfig, RunMode, SimulationConfig};
pub use error::{AppError, AppResult};
