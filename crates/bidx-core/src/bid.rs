//! The accepted-bid record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{AuctionId, BidId, BidderId};
use crate::money::Money;

/// One accepted bid.
///
/// Created only by the coordinator on acceptance; rejected proposals never
/// produce a record. `sequence` is coordinator-assigned and is the
/// authoritative order; `submitted_at` is the caller's wall clock and is
/// untrusted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bid {
    /// Unique bid identifier.
    pub id: BidId,
    /// Auction this bid belongs to.
    pub auction_id: AuctionId,
    /// Bidder identity from the external auth service.
    pub bidder_id: BidderId,
    /// Bid amount.
    pub amount: Money,
    /// Caller-reported submission time.
    pub submitted_at: DateTime<Utc>,
    /// Strictly increasing per auction, gapless, starting at 1.
    pub sequence: u64,
}
