//! Application orchestration.
//!
//! Wires the pieces together:
//! - journal replay into a recovered `AuctionHouse`
//! - background clock
//! - event-logging subscriber
//! - mode dispatch (serve / simulate) under a shutdown signal

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use bidx_engine::{AuctionClock, AuctionEvent, AuctionHouse};
use bidx_journal::{JournalReader, JournalWriter};

use crate::config::{AppConfig, RunMode};
use crate::error::AppResult;
use crate::sim;

/// Main application.
pub struct Application {
    config: AppConfig,
    house: Arc<AuctionHouse>,
}

impl Application {
    /// Replay the journal and build the recovered auction house.
    pub fn new(config: AppConfig) -> AppResult<Self> {
        let records = JournalReader::open(&config.journal).replay()?;
        let journal = JournalWriter::open(&config.journal)?;
        let house = Arc::new(AuctionHouse::recover(
            config.engine.clone(),
            journal,
            records,
        )?);
        Ok(Self { config, house })
    }

    /// Run until the mode completes or a shutdown signal arrives.
    pub async fn run(self) -> AppResult<()> {
        info!(mode = ?self.config.mode, "Starting bidx");

        let clock_handle = AuctionClock::new(self.house.clone(), &self.config.clock).spawn();
        let events_handle = tokio::spawn(log_events(self.house.subscribe()));

        match self.config.mode {
            RunMode::Serve => {
                tokio::signal::ctrl_c().await?;
                info!("Shutdown signal received");
            }
            RunMode::Simulate => {
                tokio::select! {
                    result = sim::run(self.house.clone(), &self.config.simulation) => result?,
                    _ = tokio::signal::ctrl_c() => {
                        info!("Shutdown signal received during simulation");
                    }
                }
            }
        }

        info!(auctions = self.house.auction_count(), "Shutting down");
        clock_handle.abort();
        events_handle.abort();
        Ok(())
    }

    /// The live auction house, for embedding callers.
    pub fn house(&self) -> Arc<AuctionHouse> {
        self.house.clone()
    }
}

/// Demonstration subscriber: logs the live event stream.
///
/// Lag is tolerated; the subscriber resumes from the live tail. The
/// journal, not this log, is the durable record.
async fn log_events(mut rx: broadcast::Receiver<AuctionEvent>) {
    loop {
        match rx.recv().await {
            Ok(event) => debug!(
                event_id = %event.event_id(),
                auction_id = %event.auction_id(),
                kind = event.kind(),
                "Auction event"
            ),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "Event subscriber lagged; continuing from live tail");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
