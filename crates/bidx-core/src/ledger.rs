//! Per-auction append-only log of accepted bids.
//!
//! The ledger assigns sequence numbers, so gapless numbering from 1 holds
//! by construction. It never rejects a bid: validation is the
//! coordinator's responsibility, applied before `append`.

use chrono::{DateTime, Utc};

use crate::bid::Bid;
use crate::error::{CoreError, Result};
use crate::ids::{AuctionId, BidId, BidderId};
use crate::money::Money;

/// Append-only ordered log of accepted bids for one auction.
#[derive(Debug, Clone)]
pub struct BidLedger {
    auction_id: AuctionId,
    bids: Vec<Bid>,
}

impl BidLedger {
    /// Empty ledger for a new auction.
    #[must_use]
    pub fn new(auction_id: AuctionId) -> Self {
        Self {
            auction_id,
            bids: Vec::new(),
        }
    }

    /// Rebuild a ledger from previously recorded bids, re-verifying the
    /// invariants they were recorded under: sequences gapless from 1 and
    /// amounts strictly increasing in sequence order.
    pub fn restore(auction_id: AuctionId, bids: Vec<Bid>) -> Result<Self> {
        let mut prev_amount: Option<Money> = None;
        for (i, bid) in bids.iter().enumerate() {
            let expected = i as u64 + 1;
            if bid.sequence != expected {
                return Err(CoreError::SequenceGap {
                    expected,
                    found: bid.sequence,
                });
            }
            if let Some(prev) = prev_amount {
                if bid.amount <= prev {
                    return Err(CoreError::AmountNotIncreasing {
                        prev,
                        next: bid.amount,
                    });
                }
            }
            prev_amount = Some(bid.amount);
        }
        Ok(Self { auction_id, bids })
    }

    /// Build the record the next acceptance would append, without
    /// appending it. The coordinator journals this record first, then
    /// commits it with `append`.
    #[must_use]
    pub fn next_bid(
        &self,
        bidder_id: BidderId,
        amount: Money,
        submitted_at: DateTime<Utc>,
    ) -> Bid {
        Bid {
            id: BidId::generate(),
            auction_id: self.auction_id.clone(),
            bidder_id,
            amount,
            submitted_at,
            sequence: self.next_sequence(),
        }
    }

    /// Append an accepted bid and return the new current bid.
    ///
    /// The bid must be the one `next_bid` produced for this ledger state.
    pub fn append(&mut self, bid: Bid) -> Money {
        debug_assert_eq!(bid.sequence, self.next_sequence());
        debug_assert_eq!(bid.auction_id, self.auction_id);
        debug_assert!(self
            .latest()
            .map_or(true, |latest| bid.amount > latest.amount));
        let amount = bid.amount;
        self.bids.push(bid);
        amount
    }

    /// Sequence number the next accepted bid will get.
    #[must_use]
    pub fn next_sequence(&self) -> u64 {
        self.bids.len() as u64 + 1
    }

    /// Amount of the highest-sequence bid, if any.
    #[must_use]
    pub fn current_bid(&self) -> Option<Money> {
        self.bids.last().map(|b| b.amount)
    }

    /// Number of accepted bids.
    #[must_use]
    pub fn bid_count(&self) -> u64 {
        self.bids.len() as u64
    }

    /// The highest-sequence bid. "Latest" needs no backfill: it is simply
    /// the last appended record.
    #[must_use]
    pub fn latest(&self) -> Option<&Bid> {
        self.bids.last()
    }

    /// All accepted bids in sequence order.
    #[must_use]
    pub fn bids(&self) -> &[Bid] {
        &self.bids
    }

    /// Owned copy of the bid list, for read-side views.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Bid> {
        self.bids.clone()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bids.is_empty()
    }
}
