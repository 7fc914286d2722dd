//! Journal record schema.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bidx_core::{AuctionId, AuctionStatus, Bid, BidderId, ListingTerms, Money, SellerId};

/// One committed mutation.
///
/// Close and finalize are a single `Finalized` record: replay can never
/// observe an auction that ended without a winner computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum JournalRecord {
    /// Draft created with validated terms.
    AuctionCreated {
        auction_id: AuctionId,
        seller_id: SellerId,
        terms: ListingTerms,
        at: DateTime<Utc>,
    },
    /// Draft opened for bidding; end time fixed.
    AuctionActivated {
        auction_id: AuctionId,
        end_time: DateTime<Utc>,
        at: DateTime<Utc>,
        version: u64,
    },
    /// Bid accepted; the embedded record carries the assigned sequence.
    BidAccepted {
        bid: Bid,
        at: DateTime<Utc>,
        version: u64,
    },
    /// Clock-driven transition short of closing (EndingSoon).
    StatusChanged {
        auction_id: AuctionId,
        to: AuctionStatus,
        at: DateTime<Utc>,
        version: u64,
    },
    /// Closed and finalized in one step.
    Finalized {
        auction_id: AuctionId,
        winner_id: Option<BidderId>,
        final_price: Money,
        at: DateTime<Utc>,
        version: u64,
    },
}

impl JournalRecord {
    /// The auction this record belongs to.
    #[must_use]
    pub fn auction_id(&self) -> &AuctionId {
        match self {
            Self::AuctionCreated { auction_id, .. }
            | Self::AuctionActivated { auction_id, .. }
            | Self::StatusChanged { auction_id, .. }
            | Self::Finalized { auction_id, .. } => auction_id,
            Self::BidAccepted { bid, .. } => &bid.auction_id,
        }
    }
}
