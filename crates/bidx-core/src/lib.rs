//! Core domain types for the bidx auction engine.
//!
//! This crate provides fundamental types used throughout the marketplace core:
//! - `Money`: precision-safe rupee amounts
//! - `AuctionId`, `BidderId`, `SellerId`, `BidId`, `EventId`: opaque identifiers
//! - `Auction`, `Bid`: the auction and bid records
//! - `BidLedger`: per-auction append-only log of accepted bids
//! - `validate`: the pure bid validation function

pub mod auction;
pub mod bid;
pub mod error;
pub mod ids;
pub mod ledger;
pub mod money;
pub mod status;
pub mod validator;

pub use auction::{Auction, IncrementPolicy, ListingTerms};
pub use bid::Bid;
pub use error::{CoreError, Result};
pub use ids::{AuctionId, BidId, BidderId, EventId, SellerId};
pub use ledger::BidLedger;
pub use money::Money;
pub use status::{resolve_status, AuctionStatus};
pub use validator::{validate, RejectReason};
