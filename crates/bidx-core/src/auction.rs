//! The auction record and its listing terms.
//!
//! This module provides:
//! - `IncrementPolicy`: how the minimum next-bid step is derived
//! - `ListingTerms`: seller economics, validated and frozen at creation
//! - `Auction`: the authoritative per-auction record
//!
//! An `Auction` is mutated only through the named methods below, and only
//! by the coordinator that owns it. Everything else reads clones.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::ids::{AuctionId, BidderId, SellerId};
use crate::money::Money;
use crate::status::AuctionStatus;

// ============================================================================
// Increment Policy
// ============================================================================

/// Minimum bid increment policy, chosen once per auction and frozen.
///
/// A new bid must be at least `current_bid + min_increment(current_bid)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IncrementPolicy {
    /// Flat step, e.g. ₹500 over the current bid.
    Absolute { amount: Money },
    /// Step derived from the current price, with an absolute floor,
    /// e.g. 5% of the current bid but never less than ₹10.
    PercentOfCurrent { percent: Decimal, floor: Money },
}

impl IncrementPolicy {
    /// Flat increment.
    #[must_use]
    pub fn absolute(amount: Money) -> Self {
        Self::Absolute { amount }
    }

    /// Percentage-of-current increment with an absolute floor.
    #[must_use]
    pub fn percent_of_current(percent: Decimal, floor: Money) -> Self {
        Self::PercentOfCurrent { percent, floor }
    }

    /// The minimum step required over the given current bid.
    #[must_use]
    pub fn min_increment(&self, current_bid: Money) -> Money {
        match self {
            Self::Absolute { amount } => *amount,
            Self::PercentOfCurrent { percent, floor } => {
                let step = Money::new(current_bid.inner() * *percent / Decimal::ONE_HUNDRED);
                (*floor).max(step)
            }
        }
    }

    /// Check that the policy can only produce positive increments.
    pub fn validate(&self) -> Result<()> {
        let valid = match self {
            Self::Absolute { amount } => amount.is_positive(),
            Self::PercentOfCurrent { percent, floor } => {
                percent.is_sign_positive() && !percent.is_zero() && floor.is_positive()
            }
        };
        if valid {
            Ok(())
        } else {
            Err(CoreError::InvalidIncrement)
        }
    }
}

// ============================================================================
// Listing Terms
// ============================================================================

/// Seller-chosen economics, fixed when the draft is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingTerms {
    /// Price the first bid must clear (plus increment).
    pub starting_price: Money,
    /// Minimum acceptable final price; if unmet, no winner is declared.
    pub reserve_price: Option<Money>,
    /// Minimum next-bid step derivation.
    pub increment: IncrementPolicy,
}

impl ListingTerms {
    #[must_use]
    pub fn new(
        starting_price: Money,
        reserve_price: Option<Money>,
        increment: IncrementPolicy,
    ) -> Self {
        Self {
            starting_price,
            reserve_price,
            increment,
        }
    }

    /// Validate the terms as a whole.
    pub fn validate(&self) -> Result<()> {
        if !self.starting_price.is_positive() {
            return Err(CoreError::InvalidStartingPrice(self.starting_price));
        }
        if let Some(reserve) = self.reserve_price {
            if reserve < self.starting_price {
                return Err(CoreError::ReserveBelowStarting {
                    reserve,
                    starting: self.starting_price,
                });
            }
        }
        self.increment.validate()
    }
}

// ============================================================================
// Auction Record
// ============================================================================

/// The authoritative record for one auction.
///
/// Owned and mutated exclusively by its coordinator. `version` increments
/// once per applied mutating operation, letting optimistic callers detect
/// that a snapshot they acted on is stale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Auction {
    /// Opaque unique identifier.
    pub id: AuctionId,
    /// Seller identity from the external auth service.
    pub seller_id: SellerId,
    /// Economics frozen at creation.
    pub terms: ListingTerms,
    /// Highest accepted bid, or the starting price before any acceptance.
    pub current_bid: Money,
    /// Number of accepted bids.
    pub bid_count: u64,
    /// Bidding deadline. `None` until activation, immutable afterwards.
    pub end_time: Option<DateTime<Utc>>,
    /// Lifecycle status.
    pub status: AuctionStatus,
    /// Winning bidder, set exactly once on finalization. `None` after
    /// finalization means the reserve was not met or no bids arrived.
    pub finalized_winner_id: Option<BidderId>,
    /// Mutation counter, starts at 1.
    pub version: u64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Auction {
    /// Create a Draft auction with validated terms.
    ///
    /// `current_bid` starts at the starting price so validation and
    /// increment derivation need no empty-ledger special case.
    pub fn new_draft(
        id: AuctionId,
        seller_id: SellerId,
        terms: ListingTerms,
        created_at: DateTime<Utc>,
    ) -> Result<Self> {
        terms.validate()?;
        let current_bid = terms.starting_price;
        Ok(Self {
            id,
            seller_id,
            terms,
            current_bid,
            bid_count: 0,
            end_time: None,
            status: AuctionStatus::Draft,
            finalized_winner_id: None,
            version: 1,
            created_at,
        })
    }

    /// Open the auction for bidding. Exactly once per auction.
    ///
    /// Fixes the end time; every term is immutable from here on.
    pub fn activate(&mut self, end_time: DateTime<Utc>, now: DateTime<Utc>) -> Result<()> {
        if self.status != AuctionStatus::Draft {
            return Err(CoreError::AlreadyActivated(self.status));
        }
        if end_time <= now {
            return Err(CoreError::EndTimeNotFuture(end_time));
        }
        self.end_time = Some(end_time);
        self.status = AuctionStatus::Active;
        self.version += 1;
        Ok(())
    }

    /// Apply an accepted bid. Caller has already validated it.
    pub fn record_bid(&mut self, amount: Money) {
        debug_assert!(self.status.is_open());
        debug_assert!(amount > self.current_bid);
        self.current_bid = amount;
        self.bid_count += 1;
        self.version += 1;
    }

    /// Enter the urgency window. Bidding rules are unchanged.
    pub fn mark_ending_soon(&mut self) {
        debug_assert_eq!(self.status, AuctionStatus::Active);
        self.status = AuctionStatus::EndingSoon;
        self.version += 1;
    }

    /// Close and finalize in one step.
    ///
    /// The record never rests in Ended: the winner is computed in the same
    /// coordinator operation that observes the deadline, so no bid can be
    /// admitted between the two.
    pub fn finalize(&mut self, winner: Option<BidderId>) {
        debug_assert!(self.status.is_open());
        self.status = AuctionStatus::Finalized;
        self.finalized_winner_id = winner;
        self.version += 1;
    }

    /// The minimum step the next bid must clear over `current_bid`.
    #[must_use]
    pub fn min_increment(&self) -> Money {
        self.terms.increment.min_increment(self.current_bid)
    }

    /// True when at least one bid was accepted and the reserve (if any)
    /// is covered by the current bid.
    #[must_use]
    pub fn reserve_met(&self) -> bool {
        if self.bid_count == 0 {
            return false;
        }
        match self.terms.reserve_price {
            Some(reserve) => self.current_bid >= reserve,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn utc(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, hour, 0, 0).unwrap()
    }

    fn terms() -> ListingTerms {
        ListingTerms::new(
            Money::new(dec!(1000)),
            None,
            IncrementPolicy::absolute(Money::new(dec!(100))),
        )
    }

    fn draft() -> Auction {
        Auction::new_draft(
            AuctionId::from("auc_test"),
            SellerId::from("seller_1"),
            terms(),
            utc(2026, 3, 1, 0),
        )
        .unwrap()
    }

    #[test]
    fn test_absolute_increment() {
        let policy = IncrementPolicy::absolute(Money::new(dec!(500)));
        assert_eq!(
            policy.min_increment(Money::new(dec!(99999))),
            Money::new(dec!(500))
        );
    }

    #[test]
    fn test_percent_increment_uses_current_bid() {
        let policy = IncrementPolicy::percent_of_current(dec!(5), Money::new(dec!(10)));
        assert_eq!(
            policy.min_increment(Money::new(dec!(2000))),
            Money::new(dec!(100))
        );
    }

    #[test]
    fn test_percent_increment_floor_applies_at_low_prices() {
        let policy = IncrementPolicy::percent_of_current(dec!(5), Money::new(dec!(10)));
        // 5% of 50 is 2.50, below the ₹10 floor.
        assert_eq!(
            policy.min_increment(Money::new(dec!(50))),
            Money::new(dec!(10))
        );
    }

    #[test]
    fn test_increment_must_be_positive() {
        assert!(IncrementPolicy::absolute(Money::ZERO).validate().is_err());
        assert!(
            IncrementPolicy::percent_of_current(dec!(0), Money::new(dec!(10)))
                .validate()
                .is_err()
        );
        assert!(
            IncrementPolicy::percent_of_current(dec!(5), Money::ZERO)
                .validate()
                .is_err()
        );
        assert!(IncrementPolicy::absolute(Money::new(dec!(500)))
            .validate()
            .is_ok());
    }

    #[test]
    fn test_terms_reserve_below_starting_rejected() {
        let bad = ListingTerms::new(
            Money::new(dec!(1000)),
            Some(Money::new(dec!(900))),
            IncrementPolicy::absolute(Money::new(dec!(100))),
        );
        assert!(matches!(
            bad.validate(),
            Err(CoreError::ReserveBelowStarting { .. })
        ));
    }

    #[test]
    fn test_new_draft_starts_at_starting_price() {
        let auction = draft();
        assert_eq!(auction.status, AuctionStatus::Draft);
        assert_eq!(auction.current_bid, Money::new(dec!(1000)));
        assert_eq!(auction.bid_count, 0);
        assert_eq!(auction.version, 1);
        assert!(auction.end_time.is_none());
    }

    #[test]
    fn test_activate_fixes_end_time() {
        let mut auction = draft();
        let end = utc(2026, 3, 10, 12);
        auction.activate(end, utc(2026, 3, 1, 0)).unwrap();
        assert_eq!(auction.status, AuctionStatus::Active);
        assert_eq!(auction.end_time, Some(end));
        assert_eq!(auction.version, 2);
    }

    #[test]
    fn test_activate_twice_rejected() {
        let mut auction = draft();
        auction
            .activate(utc(2026, 3, 10, 12), utc(2026, 3, 1, 0))
            .unwrap();
        let err = auction
            .activate(utc(2026, 3, 11, 12), utc(2026, 3, 1, 0))
            .unwrap_err();
        assert!(matches!(err, CoreError::AlreadyActivated(_)));
    }

    #[test]
    fn test_activate_with_past_end_time_rejected() {
        let mut auction = draft();
        let err = auction
            .activate(utc(2026, 3, 1, 0), utc(2026, 3, 1, 0))
            .unwrap_err();
        assert!(matches!(err, CoreError::EndTimeNotFuture(_)));
    }

    #[test]
    fn test_record_bid_bumps_version_and_count() {
        let mut auction = draft();
        auction
            .activate(utc(2026, 3, 10, 12), utc(2026, 3, 1, 0))
            .unwrap();
        auction.record_bid(Money::new(dec!(1100)));
        assert_eq!(auction.current_bid, Money::new(dec!(1100)));
        assert_eq!(auction.bid_count, 1);
        assert_eq!(auction.version, 3);
    }

    #[test]
    fn test_reserve_met_requires_a_bid() {
        let auction = draft();
        // current_bid equals starting price but nothing was accepted.
        assert!(!auction.reserve_met());
    }

    #[test]
    fn test_reserve_met_checks_current_bid() {
        let mut auction = Auction::new_draft(
            AuctionId::from("auc_test"),
            SellerId::from("seller_1"),
            ListingTerms::new(
                Money::new(dec!(40000)),
                Some(Money::new(dec!(50000))),
                IncrementPolicy::absolute(Money::new(dec!(500))),
            ),
            utc(2026, 3, 1, 0),
        )
        .unwrap();
        auction
            .activate(utc(2026, 3, 10, 12), utc(2026, 3, 1, 0))
            .unwrap();

        auction.record_bid(Money::new(dec!(45000)));
        assert!(!auction.reserve_met());

        auction.record_bid(Money::new(dec!(50000)));
        assert!(auction.reserve_met());
    }

    #[test]
    fn test_finalize_sets_winner_once() {
        let mut auction = draft();
        auction
            .activate(utc(2026, 3, 10, 12), utc(2026, 3, 1, 0))
            .unwrap();
        auction.record_bid(Money::new(dec!(1100)));
        let v = auction.version;

        auction.finalize(Some(BidderId::from("bidder_7")));
        assert_eq!(auction.status, AuctionStatus::Finalized);
        assert_eq!(auction.finalized_winner_id, Some(BidderId::from("bidder_7")));
        assert_eq!(auction.version, v + 1);
    }

    #[test]
    fn test_increment_policy_serde_round_trip() {
        let policy = IncrementPolicy::percent_of_current(dec!(5), Money::new(dec!(10)));
        let json = serde_json::to_string(&policy).unwrap();
        let back: IncrementPolicy = serde_json::from_str(&json).unwrap();
        assert_eq!(back, policy);
    }
}
