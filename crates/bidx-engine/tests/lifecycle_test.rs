//! Lifecycle integration tests.
//!
//! Drives auctions through Draft -> Active -> EndingSoon -> Finalized and
//! checks the clock-facing guarantees:
//! - transitions are applied lazily on submission, not only on ticks
//! - close and winner computation are one atomic step
//! - finalization happens exactly once no matter how often time advances
//! - the reserve price gates winner declaration

use std::sync::Arc;

use bidx_core::{AuctionId, AuctionStatus, BidderId, IncrementPolicy, ListingTerms, Money, SellerId};
use bidx_engine::{
    AuctionClock, AuctionEvent, AuctionHouse, BidOutcome, BidRequest, ClockConfig, EngineConfig,
};
use bidx_journal::{JournalConfig, JournalWriter};
use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tempfile::TempDir;

fn utc(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, day, hour, 0, 0).unwrap()
}

fn house(dir: &TempDir) -> Arc<AuctionHouse> {
    let config = JournalConfig {
        data_dir: dir.path().to_str().unwrap().to_string(),
    };
    let journal = JournalWriter::open(&config).unwrap();
    Arc::new(AuctionHouse::new(EngineConfig::default(), journal))
}

/// Auction ending day 10 noon, activated day 1.
async fn open_auction(
    house: &AuctionHouse,
    starting: Decimal,
    reserve: Option<Decimal>,
) -> AuctionId {
    let terms = ListingTerms::new(
        Money::new(starting),
        reserve.map(Money::new),
        IncrementPolicy::absolute(Money::new(dec!(100))),
    );
    let auction = house
        .create_draft(SellerId::from("seller_1"), terms)
        .unwrap();
    house
        .activate_at(&auction.id, utc(10, 12), utc(1, 0))
        .await
        .unwrap();
    auction.id
}

fn request(id: &AuctionId, bidder: &str, amount: Decimal) -> BidRequest {
    BidRequest {
        auction_id: id.clone(),
        bidder_id: BidderId::from(bidder),
        amount: Money::new(amount),
        submitted_at: utc(2, 0),
        expected_version: None,
    }
}

#[tokio::test]
async fn test_activation_opens_bidding_and_emits_status_change() {
    let dir = TempDir::new().unwrap();
    let house = house(&dir);
    let mut rx = house.subscribe();

    let terms = ListingTerms::new(
        Money::new(dec!(1000)),
        None,
        IncrementPolicy::absolute(Money::new(dec!(100))),
    );
    let draft = house
        .create_draft(SellerId::from("seller_1"), terms)
        .unwrap();
    assert_eq!(draft.status, AuctionStatus::Draft);
    assert_eq!(draft.version, 1);

    let active = house
        .activate_at(&draft.id, utc(10, 12), utc(1, 0))
        .await
        .unwrap();
    assert_eq!(active.status, AuctionStatus::Active);
    assert_eq!(active.end_time, Some(utc(10, 12)));
    assert_eq!(active.version, 2);

    match rx.recv().await.unwrap() {
        AuctionEvent::StatusChanged { from, to, .. } => {
            assert_eq!(from, AuctionStatus::Draft);
            assert_eq!(to, AuctionStatus::Active);
        }
        other => panic!("expected StatusChanged, got {other:?}"),
    }
}

#[tokio::test]
async fn test_clock_applies_ending_soon_inside_window() {
    let dir = TempDir::new().unwrap();
    let house = house(&dir);
    let id = open_auction(&house, dec!(1000), None).await;
    let clock = AuctionClock::new(house.clone(), &ClockConfig::default());

    // Outside the 24h window: nothing to do.
    clock.tick_once(utc(8, 12)).await;
    let view = house.auction(&id).await.unwrap();
    assert_eq!(view.auction.status, AuctionStatus::Active);

    // Inside the window.
    clock.tick_once(utc(9, 13)).await;
    let view = house.auction(&id).await.unwrap();
    assert_eq!(view.auction.status, AuctionStatus::EndingSoon);

    // Bidding continues unchanged inside the window.
    let outcome = house
        .submit_bid_at(request(&id, "b1", dec!(1100)), utc(9, 14))
        .await
        .unwrap();
    assert!(outcome.is_accepted());
}

#[tokio::test]
async fn test_close_finalizes_in_one_step() {
    let dir = TempDir::new().unwrap();
    let house = house(&dir);
    let id = open_auction(&house, dec!(1000), None).await;

    house
        .submit_bid_at(request(&id, "bidder_a", dec!(1100)), utc(2, 0))
        .await
        .unwrap();
    house
        .submit_bid_at(request(&id, "bidder_b", dec!(1250)), utc(2, 1))
        .await
        .unwrap();

    let mut rx = house.subscribe();
    let status = house.advance_clock_at(&id, utc(10, 12)).await.unwrap();

    // Never observable at Ended: the same step computed the winner.
    assert_eq!(status, AuctionStatus::Finalized);
    let view = house.auction(&id).await.unwrap();
    assert_eq!(view.auction.status, AuctionStatus::Finalized);
    assert_eq!(
        view.auction.finalized_winner_id,
        Some(BidderId::from("bidder_b"))
    );
    assert_eq!(view.auction.current_bid, Money::new(dec!(1250)));

    // Close announces the Ended moment, then the settlement.
    match rx.recv().await.unwrap() {
        AuctionEvent::StatusChanged { to, .. } => assert_eq!(to, AuctionStatus::Ended),
        other => panic!("expected StatusChanged, got {other:?}"),
    }
    match rx.recv().await.unwrap() {
        AuctionEvent::AuctionFinalized {
            winner_id,
            final_price,
            bid_count,
            ..
        } => {
            assert_eq!(winner_id, Some(BidderId::from("bidder_b")));
            assert_eq!(final_price, Money::new(dec!(1250)));
            assert_eq!(bid_count, 2);
        }
        other => panic!("expected AuctionFinalized, got {other:?}"),
    }
}

#[tokio::test]
async fn test_finalization_is_idempotent_under_repeated_ticks() {
    let dir = TempDir::new().unwrap();
    let house = house(&dir);
    let id = open_auction(&house, dec!(1000), None).await;
    house
        .submit_bid_at(request(&id, "bidder_a", dec!(1100)), utc(2, 0))
        .await
        .unwrap();

    let clock = AuctionClock::new(house.clone(), &ClockConfig::default());
    let mut rx = house.subscribe();

    clock.tick_once(utc(10, 12)).await;
    clock.tick_once(utc(10, 13)).await;
    clock.tick_once(utc(11, 0)).await;
    house.advance_clock_at(&id, utc(12, 0)).await.unwrap();

    let view = house.auction(&id).await.unwrap();
    assert_eq!(view.auction.status, AuctionStatus::Finalized);
    let version_after_first_close = view.auction.version;

    // Only the first tick produced events; the rest were no-ops.
    let mut finalized_events = 0;
    while let Ok(event) = rx.try_recv() {
        if matches!(event, AuctionEvent::AuctionFinalized { .. }) {
            finalized_events += 1;
        }
    }
    assert_eq!(finalized_events, 1);

    // Version stable across the repeated ticks.
    let view = house.auction(&id).await.unwrap();
    assert_eq!(view.auction.version, version_after_first_close);
}

#[tokio::test]
async fn test_reserve_not_met_declares_no_winner() {
    let dir = TempDir::new().unwrap();
    let house = house(&dir);
    let id = open_auction(&house, dec!(40000), Some(dec!(50000))).await;

    let outcome = house
        .submit_bid_at(request(&id, "bidder_a", dec!(45000)), utc(2, 0))
        .await
        .unwrap();
    assert!(outcome.is_accepted(), "bids below reserve are still valid");

    let mut rx = house.subscribe();
    house.advance_clock_at(&id, utc(10, 12)).await.unwrap();

    let view = house.auction(&id).await.unwrap();
    assert_eq!(view.auction.status, AuctionStatus::Finalized);
    assert_eq!(view.auction.finalized_winner_id, None);

    match rx.recv().await.unwrap() {
        AuctionEvent::StatusChanged { to, .. } => assert_eq!(to, AuctionStatus::Ended),
        other => panic!("expected StatusChanged, got {other:?}"),
    }
    match rx.recv().await.unwrap() {
        AuctionEvent::AuctionFinalized {
            winner_id,
            final_price,
            ..
        } => {
            assert_eq!(winner_id, None);
            assert_eq!(final_price, Money::new(dec!(45000)));
        }
        other => panic!("expected AuctionFinalized, got {other:?}"),
    }
}

#[tokio::test]
async fn test_reserve_met_declares_highest_bidder() {
    let dir = TempDir::new().unwrap();
    let house = house(&dir);
    let id = open_auction(&house, dec!(40000), Some(dec!(50000))).await;

    house
        .submit_bid_at(request(&id, "bidder_a", dec!(45000)), utc(2, 0))
        .await
        .unwrap();
    house
        .submit_bid_at(request(&id, "bidder_b", dec!(50000)), utc(2, 1))
        .await
        .unwrap();

    house.advance_clock_at(&id, utc(10, 12)).await.unwrap();
    let view = house.auction(&id).await.unwrap();
    assert_eq!(
        view.auction.finalized_winner_id,
        Some(BidderId::from("bidder_b"))
    );
}

#[tokio::test]
async fn test_no_bids_finalizes_without_winner() {
    let dir = TempDir::new().unwrap();
    let house = house(&dir);
    let id = open_auction(&house, dec!(1000), None).await;

    house.advance_clock_at(&id, utc(10, 12)).await.unwrap();
    let view = house.auction(&id).await.unwrap();
    assert_eq!(view.auction.status, AuctionStatus::Finalized);
    assert_eq!(view.auction.finalized_winner_id, None);
    assert_eq!(view.auction.current_bid, Money::new(dec!(1000)));
}

/// A bid arriving at or after the end time loses the race against the
/// close even when no clock tick has fired yet: the submission itself
/// applies the due close first.
#[tokio::test]
async fn test_late_bid_rejected_without_any_tick() {
    let dir = TempDir::new().unwrap();
    let house = house(&dir);
    let id = open_auction(&house, dec!(1000), None).await;

    house
        .submit_bid_at(request(&id, "bidder_a", dec!(1100)), utc(2, 0))
        .await
        .unwrap();

    let outcome = house
        .submit_bid_at(request(&id, "bidder_b", dec!(5000)), utc(10, 12))
        .await
        .unwrap();
    match outcome {
        BidOutcome::Rejected { reason, .. } => assert_eq!(reason.as_str(), "auction_not_open"),
        BidOutcome::Accepted { .. } => panic!("late bid must not be accepted"),
    }

    // The submission finalized the auction on its way in, and the late
    // bid is not part of the record.
    let view = house.auction(&id).await.unwrap();
    assert_eq!(view.auction.status, AuctionStatus::Finalized);
    assert_eq!(
        view.auction.finalized_winner_id,
        Some(BidderId::from("bidder_a"))
    );
    assert_eq!(view.bids.len(), 1);
}

#[tokio::test]
async fn test_skipped_window_still_closes() {
    // No tick ever fired during the ending-soon window; the close is
    // applied directly from Active.
    let dir = TempDir::new().unwrap();
    let house = house(&dir);
    let id = open_auction(&house, dec!(1000), None).await;

    let status = house.advance_clock_at(&id, utc(11, 0)).await.unwrap();
    assert_eq!(status, AuctionStatus::Finalized);
}

#[tokio::test]
async fn test_clock_sweeps_all_auctions() {
    let dir = TempDir::new().unwrap();
    let house = house(&dir);
    let first = open_auction(&house, dec!(1000), None).await;
    let second = open_auction(&house, dec!(2000), None).await;
    let clock = AuctionClock::new(house.clone(), &ClockConfig::default());

    clock.tick_once(utc(10, 12)).await;

    for id in [&first, &second] {
        let view = house.auction(id).await.unwrap();
        assert_eq!(view.auction.status, AuctionStatus::Finalized);
    }
}
