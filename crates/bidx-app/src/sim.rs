//! Load generator for simulate mode.
//!
//! Seeds a batch of auctions with varied terms, runs concurrent bidder
//! tasks against them, waits for settlement, and prints a summary. This
//! exercises the race-resolution and finalization paths with real
//! contention rather than scripted turns.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use bidx_core::{AuctionId, BidderId, IncrementPolicy, ListingTerms, Money, SellerId};
use bidx_engine::{AuctionHouse, BidOutcome, BidRequest};
use bidx_telemetry::Metrics;

use crate::config::SimulationConfig;
use crate::error::{AppError, AppResult};

/// Per-bidder tally, merged into the settlement summary.
#[derive(Debug, Default)]
struct BidderReport {
    accepted: u64,
    rejected: HashMap<&'static str, u64>,
}

/// Run the full simulation: seed, bid, settle, summarize.
pub async fn run(house: Arc<AuctionHouse>, config: &SimulationConfig) -> AppResult<()> {
    info!(
        auctions = config.auctions,
        bidders = config.bidders,
        bids_per_bidder = config.bids_per_bidder,
        duration_secs = config.auction_duration_secs,
        "Starting simulation"
    );

    let auction_ids = Arc::new(seed_auctions(&house, config).await?);

    let mut handles: Vec<JoinHandle<BidderReport>> = Vec::with_capacity(config.bidders);
    for bidder_index in 0..config.bidders {
        let house = house.clone();
        let auction_ids = auction_ids.clone();
        let rounds = config.bids_per_bidder;
        handles.push(tokio::spawn(async move {
            run_bidder(house, auction_ids, bidder_index, rounds).await
        }));
    }

    let mut accepted = 0u64;
    let mut rejected: HashMap<&'static str, u64> = HashMap::new();
    for handle in handles {
        match handle.await {
            Ok(report) => {
                accepted += report.accepted;
                for (reason, count) in report.rejected {
                    *rejected.entry(reason).or_default() += count;
                }
            }
            Err(e) => warn!(error = %e, "Bidder task failed"),
        }
    }

    wait_for_settlement(&house, &auction_ids, config).await?;

    info!(accepted, "Simulation bids accepted");
    let mut reasons: Vec<_> = rejected.into_iter().collect();
    reasons.sort();
    for (reason, count) in reasons {
        info!(reason, count, "Simulation bids rejected");
    }
    for id in auction_ids.iter() {
        let view = house.auction(id).await?;
        match &view.auction.finalized_winner_id {
            Some(winner_id) => info!(
                auction_id = %id,
                winner_id = %winner_id,
                final_price = %view.auction.current_bid,
                bid_count = view.auction.bid_count,
                "Auction settled"
            ),
            None => info!(
                auction_id = %id,
                final_price = %view.auction.current_bid,
                bid_count = view.auction.bid_count,
                "Auction settled without winner"
            ),
        }
    }

    match Metrics::render() {
        Ok(snapshot) => debug!(snapshot = %snapshot, "Final metrics snapshot"),
        Err(e) => warn!(error = %e, "Metrics snapshot failed"),
    }
    Ok(())
}

/// Create and activate the seed auctions, deadlines a short way out.
async fn seed_auctions(
    house: &AuctionHouse,
    config: &SimulationConfig,
) -> AppResult<Vec<AuctionId>> {
    let end_time = Utc::now() + chrono::Duration::seconds(config.auction_duration_secs as i64);
    let mut ids = Vec::with_capacity(config.auctions);
    for index in 0..config.auctions {
        let seller_id = SellerId::new(format!("sim_seller_{}", index % 2 + 1));
        let auction = house.create_draft(seller_id, seed_terms(index))?;
        house.activate(&auction.id, end_time).await?;
        ids.push(auction.id);
    }
    Ok(ids)
}

/// Vary terms across the batch: both increment policies, reserve on
/// every third auction.
fn seed_terms(index: usize) -> ListingTerms {
    let starting = Money::new(Decimal::from(1_000 * (index as u64 + 1)));
    let increment = if index % 2 == 0 {
        IncrementPolicy::absolute(Money::new(dec!(500)))
    } else {
        IncrementPolicy::percent_of_current(dec!(5), Money::new(dec!(10)))
    };
    let reserve = (index % 3 == 2).then(|| starting * dec!(2));
    ListingTerms::new(starting, reserve, increment)
}

async fn run_bidder(
    house: Arc<AuctionHouse>,
    auction_ids: Arc<Vec<AuctionId>>,
    bidder_index: usize,
    rounds: usize,
) -> BidderReport {
    let bidder_id = BidderId::new(format!("sim_bidder_{bidder_index}"));
    let mut report = BidderReport::default();

    for round in 0..rounds {
        let auction_id = &auction_ids[(bidder_index + round) % auction_ids.len()];
        let (current_bid, min_increment, version) = match house.price_context(auction_id).await {
            Ok(context) => context,
            Err(e) => {
                warn!(error = %e, "Price context read failed");
                continue;
            }
        };

        // Overbid by zero to two extra increments, and condition every
        // other submission on the version it just read so some land as
        // stale under contention.
        let extra = Decimal::from(((bidder_index + round) % 3) as u64);
        let request = BidRequest {
            auction_id: auction_id.clone(),
            bidder_id: bidder_id.clone(),
            amount: current_bid + min_increment + min_increment * extra,
            submitted_at: Utc::now(),
            expected_version: (round % 2 == 0).then_some(version),
        };

        match house.submit_bid(request).await {
            Ok(BidOutcome::Accepted { .. }) => report.accepted += 1,
            Ok(BidOutcome::Rejected { reason, .. }) => {
                *report.rejected.entry(reason.as_str()).or_default() += 1;
            }
            Err(e) => warn!(error = %e, "Bid submission failed"),
        }

        let pace = 20 + (bidder_index as u64 * 13 + round as u64 * 7) % 60;
        tokio::time::sleep(Duration::from_millis(pace)).await;
    }
    report
}

/// Drive the clock until every seeded auction reaches Finalized.
async fn wait_for_settlement(
    house: &AuctionHouse,
    auction_ids: &[AuctionId],
    config: &SimulationConfig,
) -> AppResult<()> {
    let deadline =
        tokio::time::Instant::now() + Duration::from_secs(config.auction_duration_secs + 30);
    loop {
        let mut remaining = 0usize;
        for id in auction_ids {
            let status = house.advance_clock(id).await?;
            if !status.is_terminal() {
                remaining += 1;
            }
        }
        if remaining == 0 {
            return Ok(());
        }
        if tokio::time::Instant::now() >= deadline {
            return Err(AppError::Simulation(format!(
                "{remaining} auctions still open past the settlement deadline"
            )));
        }
        tokio::time::sleep(Duration::from_millis(250)).await;
    }
}
