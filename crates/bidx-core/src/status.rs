//! Auction lifecycle status.
//!
//! The status enum and the pure derivation from wall time. Transitions
//! are monotonic: Draft → Active → EndingSoon → Ended → Finalized, never
//! backward, which is what makes clock advancement idempotent.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of an auction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuctionStatus {
    /// Listing created but not yet open for bidding.
    Draft,
    /// Open for bidding.
    Active,
    /// Open for bidding, inside the configured urgency window.
    EndingSoon,
    /// Past end time. Never observable at rest: the coordinator applies
    /// Ended and Finalized in the same step.
    Ended,
    /// Terminal. Winner (or no-winner) computed exactly once.
    Finalized,
}

impl AuctionStatus {
    /// Returns true if bids may be accepted in this status.
    #[must_use]
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Active | Self::EndingSoon)
    }

    /// Returns true if the auction is in its terminal state.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finalized)
    }

    /// Position in the one-way lifecycle, for monotonicity checks.
    #[must_use]
    pub fn rank(&self) -> u8 {
        match self {
            Self::Draft => 0,
            Self::Active => 1,
            Self::EndingSoon => 2,
            Self::Ended => 3,
            Self::Finalized => 4,
        }
    }
}

impl fmt::Display for AuctionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Draft => write!(f, "draft"),
            Self::Active => write!(f, "active"),
            Self::EndingSoon => write!(f, "ending-soon"),
            Self::Ended => write!(f, "ended"),
            Self::Finalized => write!(f, "finalized"),
        }
    }
}

/// Derive the status an auction is due for at `now`.
///
/// Pure and monotone: the result never ranks below `current`, so calling
/// this arbitrarily often (irregular ticks, restarts, lazy advancement on
/// bid submission) can never re-apply or skip a transition. Draft and
/// Finalized are fixed points; activation and finalization are applied by
/// the coordinator, not derived here.
#[must_use]
pub fn resolve_status(
    current: AuctionStatus,
    end_time: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    ending_soon_window: Duration,
) -> AuctionStatus {
    if !current.is_open() {
        return current;
    }
    let Some(end) = end_time else {
        return current;
    };
    if now >= end {
        return AuctionStatus::Ended;
    }
    if current == AuctionStatus::Active && end - now <= ending_soon_window {
        return AuctionStatus::EndingSoon;
    }
    current
}
