//! Pure bid validation.
//!
//! `validate` inspects a proposed amount against an auction record and
//! returns the first rule it fails, or `Ok` if it would be accepted.
//! No side effects and no shared state: the coordinator calls it under
//! its serialization point, and read-side callers may call it
//! speculatively against a snapshot to pre-check a bid.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auction::Auction;
use crate::money::Money;

/// Reason a bid proposal was rejected.
///
/// All of these are expected outcomes returned to the submitter and
/// emitted as events; none of them is a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// Bid submitted outside Active/EndingSoon, or past the end time.
    AuctionNotOpen,
    /// Amount does not exceed the current bid.
    TooLow,
    /// Amount exceeds the current bid but not by the minimum increment.
    IncrementTooSmall,
    /// Caller's `expected_version` no longer matches; re-read and retry.
    StaleVersion,
}

impl RejectReason {
    /// Stable label for logs and metrics.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuctionNotOpen => "auction_not_open",
            Self::TooLow => "too_low",
            Self::IncrementTooSmall => "increment_too_small",
            Self::StaleVersion => "stale_version",
        }
    }
}

/// Validate a proposed bid against the auction's current state.
///
/// Rules, checked in order, first failure wins:
/// 1. `AuctionNotOpen`: status is not Active/EndingSoon, or `now` has
///    reached the end time (a bid racing the closing tick must lose the
///    race no matter which is processed first).
/// 2. `TooLow`: amount does not exceed the current bid.
/// 3. `IncrementTooSmall`: amount does not clear the minimum increment
///    derived from the current bid.
pub fn validate(auction: &Auction, amount: Money, now: DateTime<Utc>) -> Result<(), RejectReason> {
    let past_end = auction.end_time.map_or(false, |end| now >= end);
    if !auction.status.is_open() || past_end {
        return Err(RejectReason::AuctionNotOpen);
    }
    if amount <= auction.current_bid {
        return Err(RejectReason::TooLow);
    }
    if amount < auction.current_bid + auction.min_increment() {
        return Err(RejectReason::IncrementTooSmall);
    }
    Ok(())
}
