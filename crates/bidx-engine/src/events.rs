//! Events emitted by the engine.
//!
//! Every state change produces exactly one event, emitted inside the same
//! serialized step that applied the change, so subscribers observe events
//! for a given auction in the order the changes happened. Delivery is
//! at-least-once; `event_id` is the idempotency key for downstream
//! consumers that may see a replayed event.

use bidx_core::{AuctionId, AuctionStatus, Bid, BidderId, EventId, Money, RejectReason};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A notification about an auction state change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuctionEvent {
    /// A bid was accepted and is now the leading bid.
    BidAccepted {
        event_id: EventId,
        bid: Bid,
        /// Bidder displaced from the lead, if any.
        previous_leader: Option<BidderId>,
        version: u64,
        at: DateTime<Utc>,
    },
    /// A bid was rejected. Carries enough context for the bidder to
    /// construct a competitive retry.
    BidRejected {
        event_id: EventId,
        auction_id: AuctionId,
        bidder_id: BidderId,
        amount: Money,
        reason: RejectReason,
        current_bid: Money,
        min_increment: Money,
        version: u64,
        at: DateTime<Utc>,
    },
    /// The auction moved to a new lifecycle status.
    StatusChanged {
        event_id: EventId,
        auction_id: AuctionId,
        from: AuctionStatus,
        to: AuctionStatus,
        version: u64,
        at: DateTime<Utc>,
    },
    /// Settlement is complete. `winner_id` is `None` when there were no
    /// bids or the reserve price was not met.
    AuctionFinalized {
        event_id: EventId,
        auction_id: AuctionId,
        winner_id: Option<BidderId>,
        final_price: Money,
        bid_count: u64,
        version: u64,
        at: DateTime<Utc>,
    },
}

impl AuctionEvent {
    /// Idempotency key for at-least-once delivery.
    #[must_use]
    pub fn event_id(&self) -> EventId {
        match self {
            Self::BidAccepted { event_id, .. }
            | Self::BidRejected { event_id, .. }
            | Self::StatusChanged { event_id, .. }
            | Self::AuctionFinalized { event_id, .. } => *event_id,
        }
    }

    /// The auction this event belongs to.
    #[must_use]
    pub fn auction_id(&self) -> &AuctionId {
        match self {
            Self::BidAccepted { bid, .. } => &bid.auction_id,
            Self::BidRejected { auction_id, .. }
            | Self::StatusChanged { auction_id, .. }
            | Self::AuctionFinalized { auction_id, .. } => auction_id,
        }
    }

    /// Short label for logging and metrics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::BidAccepted { .. } => "bid_accepted",
            Self::BidRejected { .. } => "bid_rejected",
            Self::StatusChanged { .. } => "status_changed",
            Self::AuctionFinalized { .. } => "auction_finalized",
        }
    }
}
