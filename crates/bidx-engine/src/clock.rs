//! Background clock driving time-based transitions.
//!
//! The clock is a convenience, not a correctness requirement: every
//! transition is derived from wall time, and bid submission applies due
//! transitions itself. A slow or stopped clock only delays the moment
//! idle auctions get their EndingSoon/Finalized records written.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::ClockConfig;
use crate::coordinator::AuctionHouse;

/// Periodic driver for lifecycle transitions.
pub struct AuctionClock {
    house: Arc<AuctionHouse>,
    tick_interval: Duration,
}

impl AuctionClock {
    pub fn new(house: Arc<AuctionHouse>, config: &ClockConfig) -> Self {
        Self {
            house,
            tick_interval: Duration::from_millis(config.tick_interval_ms),
        }
    }

    /// Run the tick loop forever.
    pub async fn run(self) {
        info!(
            interval_ms = self.tick_interval.as_millis() as u64,
            "Auction clock started"
        );
        let mut interval = tokio::time::interval(self.tick_interval);
        loop {
            interval.tick().await;
            self.tick_once(Utc::now()).await;
        }
    }

    /// Spawn the tick loop as a background task.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Advance every auction to the status due at `now`.
    ///
    /// An error on one auction is logged and does not stop the sweep;
    /// the next tick retries it. Terminal auctions are a cheap no-op.
    pub async fn tick_once(&self, now: DateTime<Utc>) {
        for id in self.house.auction_ids() {
            if let Err(e) = self.house.advance_clock_at(&id, now).await {
                warn!(auction_id = %id, error = %e, "Clock advance failed; retrying next tick");
            }
        }
    }
}
