//! State reconstruction from the journal.
//!
//! Replay folds records through the same core mutators normal operation
//! uses, re-verifying on the way that what was journaled is a history the
//! rules could actually have produced. Any mismatch aborts recovery with
//! a [`Replay`](crate::EngineError::Replay) error rather than loading a
//! state the engine cannot vouch for.

use std::collections::HashMap;

use tracing::{debug, info};

use bidx_core::{Auction, AuctionId, AuctionStatus, Bid, BidLedger};
use bidx_journal::JournalRecord;

use crate::coordinator::AuctionState;
use crate::error::{EngineError, EngineResult};

fn replay_err(auction_id: &AuctionId, detail: impl Into<String>) -> EngineError {
    EngineError::Replay {
        auction_id: auction_id.clone(),
        detail: detail.into(),
    }
}

/// Rebuild per-auction state from replayed records.
///
/// Records must be in journal order. Versions recorded at append time are
/// compared against the versions the fold reproduces, so a missing or
/// reordered record is detected instead of silently absorbed.
pub(crate) fn rebuild(records: Vec<JournalRecord>) -> EngineResult<Vec<AuctionState>> {
    let total = records.len();
    let mut slots: HashMap<AuctionId, (Auction, Vec<Bid>)> = HashMap::new();

    for record in records {
        match record {
            JournalRecord::AuctionCreated {
                auction_id,
                seller_id,
                terms,
                at,
            } => {
                let auction = Auction::new_draft(auction_id.clone(), seller_id, terms, at)?;
                if slots.insert(auction_id.clone(), (auction, Vec::new())).is_some() {
                    return Err(replay_err(&auction_id, "auction created twice"));
                }
            }

            JournalRecord::AuctionActivated {
                auction_id,
                end_time,
                at,
                version,
            } => {
                let (auction, _) = slots
                    .get_mut(&auction_id)
                    .ok_or_else(|| replay_err(&auction_id, "activation of unknown auction"))?;
                auction.activate(end_time, at)?;
                check_version(auction, version)?;
            }

            JournalRecord::BidAccepted { bid, version, .. } => {
                let (auction, bids) = slots
                    .get_mut(&bid.auction_id)
                    .ok_or_else(|| replay_err(&bid.auction_id, "bid for unknown auction"))?;
                if !auction.status.is_open() {
                    return Err(replay_err(
                        &bid.auction_id,
                        format!("bid accepted while {}", auction.status),
                    ));
                }
                if bid.amount <= auction.current_bid {
                    return Err(replay_err(
                        &bid.auction_id,
                        format!(
                            "bid {} does not exceed current bid {}",
                            bid.amount, auction.current_bid
                        ),
                    ));
                }
                auction.record_bid(bid.amount);
                check_version(auction, version)?;
                bids.push(bid);
            }

            JournalRecord::StatusChanged {
                auction_id,
                to,
                version,
                ..
            } => {
                let (auction, _) = slots
                    .get_mut(&auction_id)
                    .ok_or_else(|| replay_err(&auction_id, "status change for unknown auction"))?;
                if to != AuctionStatus::EndingSoon || auction.status != AuctionStatus::Active {
                    return Err(replay_err(
                        &auction_id,
                        format!("unexpected status change {} -> {}", auction.status, to),
                    ));
                }
                auction.mark_ending_soon();
                check_version(auction, version)?;
            }

            JournalRecord::Finalized {
                auction_id,
                winner_id,
                final_price,
                version,
                ..
            } => {
                let (auction, _) = slots
                    .get_mut(&auction_id)
                    .ok_or_else(|| replay_err(&auction_id, "finalization of unknown auction"))?;
                if !auction.status.is_open() {
                    return Err(replay_err(
                        &auction_id,
                        format!("finalized while {}", auction.status),
                    ));
                }
                if final_price != auction.current_bid {
                    return Err(replay_err(
                        &auction_id,
                        format!(
                            "finalized price {} does not match current bid {}",
                            final_price, auction.current_bid
                        ),
                    ));
                }
                auction.finalize(winner_id);
                check_version(auction, version)?;
            }
        }
    }

    let mut states = Vec::with_capacity(slots.len());
    for (auction_id, (auction, bids)) in slots {
        // restore() re-verifies gapless sequences and increasing amounts.
        let ledger = BidLedger::restore(auction_id.clone(), bids)?;
        if ledger.bid_count() != auction.bid_count {
            return Err(replay_err(
                &auction_id,
                format!(
                    "ledger has {} bids but auction counted {}",
                    ledger.bid_count(),
                    auction.bid_count
                ),
            ));
        }
        if let Some(top) = ledger.current_bid() {
            if top != auction.current_bid {
                return Err(replay_err(
                    &auction_id,
                    format!(
                        "ledger top {} does not match current bid {}",
                        top, auction.current_bid
                    ),
                ));
            }
        }
        debug!(
            auction_id = %auction.id,
            status = %auction.status,
            bid_count = auction.bid_count,
            "Rebuilt auction from journal"
        );
        states.push(AuctionState { auction, ledger });
    }

    info!(records = total, auctions = states.len(), "Journal replay complete");
    Ok(states)
}

fn check_version(auction: &Auction, journaled: u64) -> EngineResult<()> {
    if auction.version != journaled {
        return Err(replay_err(
            &auction.id,
            format!(
                "version diverged: replay at {} but journal recorded {}",
                auction.version, journaled
            ),
        ));
    }
    Ok(())
}
