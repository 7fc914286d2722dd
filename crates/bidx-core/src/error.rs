//! Error types for bidx-core.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::money::Money;
use crate::status::AuctionStatus;

/// Core error types.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Starting price must be positive, got {0}")]
    InvalidStartingPrice(Money),

    #[error("Reserve price {reserve} is below starting price {starting}")]
    ReserveBelowStarting { reserve: Money, starting: Money },

    #[error("Bid increment must be positive")]
    InvalidIncrement,

    #[error("Auction already activated (status {0})")]
    AlreadyActivated(AuctionStatus),

    #[error("End time {0} is not in the future")]
    EndTimeNotFuture(DateTime<Utc>),

    #[error("Ledger sequence gap: expected {expected}, found {found}")]
    SequenceGap { expected: u64, found: u64 },

    #[error("Ledger amounts not strictly increasing: {prev} then {next}")]
    AmountNotIncreasing { prev: Money, next: Money },

    #[error("Decimal parse error: {0}")]
    DecimalParse(#[from] rust_decimal::Error),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
