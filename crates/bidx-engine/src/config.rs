//! Engine and clock configuration.

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Configuration for the auction engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Width of the ending-soon urgency window before the end time,
    /// in seconds. Bidding rules are unchanged inside the window.
    #[serde(default = "default_ending_soon_window_secs")]
    pub ending_soon_window_secs: u64,
    /// Capacity of the event broadcast channel. Slow subscribers that
    /// fall further behind than this observe a lag and must re-read.
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

fn default_ending_soon_window_secs() -> u64 {
    86_400 // 24 hours
}

fn default_event_channel_capacity() -> usize {
    1024
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ending_soon_window_secs: default_ending_soon_window_secs(),
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

impl EngineConfig {
    /// The ending-soon window as a duration.
    #[must_use]
    pub fn ending_soon_window(&self) -> Duration {
        Duration::seconds(self.ending_soon_window_secs as i64)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.event_channel_capacity == 0 {
            return Err("event_channel_capacity must be positive".to_string());
        }
        Ok(())
    }
}

/// Configuration for the auction clock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClockConfig {
    /// Tick interval in milliseconds. Transitions are computed from wall
    /// time on every tick, so a coarse interval only delays them, never
    /// drops them.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

fn default_tick_interval_ms() -> u64 {
    500
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

impl ClockConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.tick_interval_ms == 0 {
            return Err("tick_interval_ms must be positive".to_string());
        }
        Ok(())
    }
}
