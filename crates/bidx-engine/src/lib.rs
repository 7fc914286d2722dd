//! Bid acceptance and auction lifecycle engine.
//!
//! This crate owns the live marketplace state:
//! - [`AuctionHouse`]: registry of auctions and the single operation
//!   entry point (create, activate, submit, advance, read)
//! - [`AuctionCoordinator`]: per-auction serialization cell
//! - [`AuctionClock`]: background driver for time-based transitions
//! - [`AuctionEvent`] / [`EventNotifier`]: ordered per-auction event
//!   stream with at-least-once delivery
//! - recovery: journal replay back into coordinator state
//!
//! Concurrency model: one async mutex per auction. Operations on the
//! same auction are applied strictly one at a time; different auctions
//! never contend. Every mutation is journaled before it is applied.

pub mod clock;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod events;
pub mod notifier;
mod recovery;

pub use clock::AuctionClock;
pub use config::{ClockConfig, EngineConfig};
pub use coordinator::{AuctionCoordinator, AuctionHouse, AuctionView, BidOutcome, BidRequest};
pub use error::{EngineError, EngineResult};
pub use events::AuctionEvent;
pub use notifier::EventNotifier;
