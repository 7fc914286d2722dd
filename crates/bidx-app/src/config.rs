//! Application configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use bidx_engine::{ClockConfig, EngineConfig};
use bidx_journal::JournalConfig;

/// Run mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// Run the engine and clock until shutdown.
    #[default]
    Serve,
    /// Seed auctions, run concurrent bidders, print a settlement summary.
    Simulate,
}

/// Load-generator settings for simulate mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Auctions to seed, cycling through increment policies and reserves.
    #[serde(default = "default_auctions")]
    pub auctions: usize,
    /// Concurrent bidder tasks.
    #[serde(default = "default_bidders")]
    pub bidders: usize,
    /// Submissions per bidder.
    #[serde(default = "default_bids_per_bidder")]
    pub bids_per_bidder: usize,
    /// How long each seeded auction runs before its deadline.
    #[serde(default = "default_auction_duration_secs")]
    pub auction_duration_secs: u64,
}

fn default_auctions() -> usize {
    4
}

fn default_bidders() -> usize {
    6
}

fn default_bids_per_bidder() -> usize {
    8
}

fn default_auction_duration_secs() -> u64 {
    10
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            auctions: default_auctions(),
            bidders: default_bidders(),
            bids_per_bidder: default_bids_per_bidder(),
            auction_duration_secs: default_auction_duration_secs(),
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.auctions == 0 {
            return Err("simulation.auctions must be positive".to_string());
        }
        if self.bidders == 0 {
            return Err("simulation.bidders must be positive".to_string());
        }
        if self.auction_duration_secs == 0 {
            return Err("simulation.auction_duration_secs must be positive".to_string());
        }
        Ok(())
    }
}

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Run mode.
    #[serde(default)]
    pub mode: RunMode,
    /// Engine configuration.
    #[serde(default)]
    pub engine: EngineConfig,
    /// Clock configuration.
    #[serde(default)]
    pub clock: ClockConfig,
    /// Journal configuration.
    #[serde(default)]
    pub journal: JournalConfig,
    /// Simulation configuration (simulate mode only).
    #[serde(default)]
    pub simulation: SimulationConfig,
}

impl AppConfig {
    /// Resolve and load configuration.
    ///
    /// Path precedence: CLI argument, then `BIDX_CONFIG` env var, then
    /// `config/default.toml`. A missing file at the default path falls
    /// back to built-in defaults with a warning.
    pub fn load(cli_path: Option<String>) -> AppResult<Self> {
        let config_path = cli_path
            .or_else(|| std::env::var("BIDX_CONFIG").ok())
            .unwrap_or_else(|| "config/default.toml".to_string());

        if Path::new(&config_path).exists() {
            Self::from_file(&config_path)
        } else {
            tracing::warn!(path = %config_path, "Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load from a specific file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all sections.
    pub fn validate(&self) -> AppResult<()> {
        self.engine.validate().map_err(AppError::Config)?;
        self.clock.validate().map_err(AppError::Config)?;
        self.simulation.validate().map_err(AppError::Config)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.mode, RunMode::Serve);
        assert_eq!(config.engine.ending_soon_window_secs, 86_400);
        assert_eq!(config.clock.tick_interval_ms, 500);
        assert_eq!(config.journal.data_dir, "./data");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            mode = "simulate"

            [journal]
            data_dir = "/tmp/bidx-test"

            [simulation]
            auctions = 2
            "#,
        )
        .unwrap();
        assert_eq!(config.mode, RunMode::Simulate);
        assert_eq!(config.journal.data_dir, "/tmp/bidx-test");
        assert_eq!(config.simulation.auctions, 2);
        assert_eq!(config.simulation.bidders, 6);
        assert_eq!(config.engine.event_channel_capacity, 1024);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let config: AppConfig = toml::from_str(
            r#"
            [clock]
            tick_interval_ms = 0
            "#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_round_trip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        assert!(toml_str.contains("mode"));
        assert!(toml_str.contains("ending_soon_window_secs"));
    }
}
