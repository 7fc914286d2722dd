//! Per-auction serialization and the auction registry.
//!
//! Every mutation of an auction flows through that auction's
//! [`AuctionCoordinator`], a cell holding the record and its bid ledger
//! behind an async mutex. Operations on one auction are therefore applied
//! one at a time in a total order, while different auctions proceed in
//! parallel. There is no cross-auction ordering and none is needed.
//!
//! Each applied operation follows the same discipline:
//! 1. validate against current state,
//! 2. append the journal record and flush,
//! 3. apply the mutation in memory,
//! 4. emit the event.
//!
//! A failed append means the operation did not happen: state is untouched
//! and the caller sees a transient error it may retry.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::{debug, info};

use bidx_core::{
    resolve_status, validate, Auction, AuctionId, AuctionStatus, Bid, BidLedger, BidderId,
    EventId, ListingTerms, Money, RejectReason, SellerId,
};
use bidx_journal::{JournalRecord, JournalWriter};
use bidx_telemetry::Metrics;

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::events::AuctionEvent;
use crate::notifier::EventNotifier;

// ============================================================================
// Requests and Outcomes
// ============================================================================

/// A bid submission.
#[derive(Debug, Clone)]
pub struct BidRequest {
    pub auction_id: AuctionId,
    pub bidder_id: BidderId,
    pub amount: Money,
    /// Client-reported time, recorded for audit but never trusted for
    /// ordering. The assigned sequence number is authoritative.
    pub submitted_at: DateTime<Utc>,
    /// Optimistic concurrency check. When set, the bid is rejected with
    /// `StaleVersion` if the auction has moved past this version.
    pub expected_version: Option<u64>,
}

/// Result of a bid submission that reached the auction.
///
/// Both arms are successful calls; rejection is an expected outcome, not
/// an error.
#[derive(Debug, Clone)]
pub enum BidOutcome {
    Accepted {
        bid: Bid,
        version: u64,
    },
    /// Carries the live price context so the bidder can retry
    /// competitively without another read.
    Rejected {
        reason: RejectReason,
        current_bid: Money,
        min_increment: Money,
        version: u64,
    },
}

impl BidOutcome {
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}

/// Read-side snapshot of one auction.
#[derive(Debug, Clone)]
pub struct AuctionView {
    pub auction: Auction,
    pub bids: Vec<Bid>,
}

// ============================================================================
// Coordinator Cell
// ============================================================================

/// Mutable state owned by one coordinator: the auction record and its
/// accepted-bid ledger, kept in lockstep.
#[derive(Debug)]
pub(crate) struct AuctionState {
    pub(crate) auction: Auction,
    pub(crate) ledger: BidLedger,
}

impl AuctionState {
    pub(crate) fn new(auction: Auction) -> Self {
        let ledger = BidLedger::new(auction.id.clone());
        Self { auction, ledger }
    }
}

/// Serialization point for one auction.
///
/// The lock is held across the journal append, so journal order equals
/// application order per auction.
#[derive(Debug)]
pub struct AuctionCoordinator {
    state: tokio::sync::Mutex<AuctionState>,
}

impl AuctionCoordinator {
    pub(crate) fn new(state: AuctionState) -> Arc<Self> {
        Arc::new(Self {
            state: tokio::sync::Mutex::new(state),
        })
    }

    pub(crate) async fn lock(&self) -> tokio::sync::MutexGuard<'_, AuctionState> {
        self.state.lock().await
    }
}

// ============================================================================
// Auction House
// ============================================================================

/// Registry of live auctions and the single entry point for operations.
pub struct AuctionHouse {
    auctions: DashMap<AuctionId, Arc<AuctionCoordinator>>,
    /// Shared append-only journal. Locked only around synchronous appends,
    /// never across an await.
    journal: parking_lot::Mutex<JournalWriter>,
    notifier: EventNotifier,
    config: EngineConfig,
}

impl AuctionHouse {
    /// Fresh house with an empty registry.
    pub fn new(config: EngineConfig, journal: JournalWriter) -> Self {
        let notifier = EventNotifier::new(config.event_channel_capacity);
        Self {
            auctions: DashMap::new(),
            journal: parking_lot::Mutex::new(journal),
            notifier,
            config,
        }
    }

    /// House rebuilt from replayed journal records.
    ///
    /// The journal writer must be opened in append mode on the same file
    /// the records came from, so new operations continue the history.
    pub fn recover(
        config: EngineConfig,
        journal: JournalWriter,
        records: Vec<JournalRecord>,
    ) -> EngineResult<Self> {
        let states = crate::recovery::rebuild(records)?;
        let house = Self::new(config, journal);

        let mut open = 0usize;
        let total = states.len();
        for state in states {
            if state.auction.status.is_open() {
                open += 1;
                Metrics::open_auctions_inc();
            }
            let id = state.auction.id.clone();
            house.auctions.insert(id, AuctionCoordinator::new(state));
        }

        info!(auctions = total, open, "Recovered auction house from journal");
        Ok(house)
    }

    /// Subscribe to the event stream for all auctions.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<AuctionEvent> {
        self.notifier.subscribe()
    }

    /// IDs of every auction in the registry, in no particular order.
    #[must_use]
    pub fn auction_ids(&self) -> Vec<AuctionId> {
        self.auctions.iter().map(|e| e.key().clone()).collect()
    }

    #[must_use]
    pub fn auction_count(&self) -> usize {
        self.auctions.len()
    }

    fn coordinator(&self, id: &AuctionId) -> EngineResult<Arc<AuctionCoordinator>> {
        // Clone the Arc out so no map shard guard is held across an await.
        self.auctions
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| EngineError::AuctionNotFound(id.clone()))
    }

    // ------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------

    /// Create a Draft auction with validated, frozen terms.
    ///
    /// Economics (starting price, reserve, increment policy) are fixed
    /// here and cannot change for the life of the auction.
    pub fn create_draft(&self, seller_id: SellerId, terms: ListingTerms) -> EngineResult<Auction> {
        let now = Utc::now();
        let auction = Auction::new_draft(AuctionId::generate(), seller_id, terms, now)?;

        self.journal.lock().append(&JournalRecord::AuctionCreated {
            auction_id: auction.id.clone(),
            seller_id: auction.seller_id.clone(),
            terms: auction.terms.clone(),
            at: now,
        })?;

        self.auctions.insert(
            auction.id.clone(),
            AuctionCoordinator::new(AuctionState::new(auction.clone())),
        );

        Metrics::auction_created();
        info!(
            auction_id = %auction.id,
            seller_id = %auction.seller_id,
            starting_price = %auction.terms.starting_price,
            "Auction draft created"
        );
        Ok(auction)
    }

    // ------------------------------------------------------------------
    // Activate
    // ------------------------------------------------------------------

    /// Open a Draft auction for bidding, fixing its end time.
    pub async fn activate(
        &self,
        id: &AuctionId,
        end_time: DateTime<Utc>,
    ) -> EngineResult<Auction> {
        self.activate_at(id, end_time, Utc::now()).await
    }

    /// [`activate`](Self::activate) with an explicit clock.
    pub async fn activate_at(
        &self,
        id: &AuctionId,
        end_time: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> EngineResult<Auction> {
        let coordinator = self.coordinator(id)?;
        let mut state = coordinator.lock().await;

        // Validate on a clone, journal, then commit, so a failed append
        // leaves the in-memory record untouched.
        let mut next = state.auction.clone();
        next.activate(end_time, now)?;

        self.journal.lock().append(&JournalRecord::AuctionActivated {
            auction_id: next.id.clone(),
            end_time,
            at: now,
            version: next.version,
        })?;

        let from = state.auction.status;
        state.auction = next;

        Metrics::status_transition("active");
        Metrics::open_auctions_inc();
        self.notifier.emit(AuctionEvent::StatusChanged {
            event_id: EventId::new(),
            auction_id: state.auction.id.clone(),
            from,
            to: AuctionStatus::Active,
            version: state.auction.version,
            at: now,
        });
        info!(
            auction_id = %state.auction.id,
            end_time = %end_time,
            "Auction activated"
        );
        Ok(state.auction.clone())
    }

    // ------------------------------------------------------------------
    // Submit Bid
    // ------------------------------------------------------------------

    /// Submit a bid.
    ///
    /// Returns `Ok(BidOutcome)` whenever the auction exists and the
    /// journal is healthy; whether the bid won its race is inside the
    /// outcome.
    pub async fn submit_bid(&self, request: BidRequest) -> EngineResult<BidOutcome> {
        self.submit_bid_at(request, Utc::now()).await
    }

    /// [`submit_bid`](Self::submit_bid) with an explicit clock.
    pub async fn submit_bid_at(
        &self,
        request: BidRequest,
        now: DateTime<Utc>,
    ) -> EngineResult<BidOutcome> {
        let coordinator = self.coordinator(&request.auction_id)?;
        let mut state = coordinator.lock().await;

        // Transitions due by wall time apply before the bid, so a bid
        // arriving after the end time meets an already-closed auction
        // even if no clock tick has fired yet.
        self.apply_due_transitions(&mut state, now)?;

        if let Some(expected) = request.expected_version {
            if expected != state.auction.version {
                return Ok(self.reject(&state, &request, RejectReason::StaleVersion, now));
            }
        }

        if let Err(reason) = validate(&state.auction, request.amount, now) {
            return Ok(self.reject(&state, &request, reason, now));
        }

        let bid = state
            .ledger
            .next_bid(request.bidder_id.clone(), request.amount, request.submitted_at);
        let previous_leader = state.ledger.latest().map(|b| b.bidder_id.clone());

        self.journal.lock().append(&JournalRecord::BidAccepted {
            bid: bid.clone(),
            at: now,
            version: state.auction.version + 1,
        })?;

        state.ledger.append(bid.clone());
        state.auction.record_bid(bid.amount);

        Metrics::bid_accepted(bid.amount.to_f64());
        self.notifier.emit(AuctionEvent::BidAccepted {
            event_id: EventId::new(),
            bid: bid.clone(),
            previous_leader,
            version: state.auction.version,
            at: now,
        });
        info!(
            auction_id = %bid.auction_id,
            bidder_id = %bid.bidder_id,
            amount = %bid.amount,
            sequence = bid.sequence,
            "Bid accepted"
        );
        Ok(BidOutcome::Accepted {
            bid,
            version: state.auction.version,
        })
    }

    /// Build, record, and emit a rejection. Rejections mutate nothing and
    /// are not journaled; only the event and metrics observe them.
    fn reject(
        &self,
        state: &AuctionState,
        request: &BidRequest,
        reason: RejectReason,
        now: DateTime<Utc>,
    ) -> BidOutcome {
        let current_bid = state.auction.current_bid;
        let min_increment = state.auction.min_increment();
        let version = state.auction.version;

        Metrics::bid_rejected(reason.as_str());
        self.notifier.emit(AuctionEvent::BidRejected {
            event_id: EventId::new(),
            auction_id: request.auction_id.clone(),
            bidder_id: request.bidder_id.clone(),
            amount: request.amount,
            reason,
            current_bid,
            min_increment,
            version,
            at: now,
        });
        debug!(
            auction_id = %request.auction_id,
            bidder_id = %request.bidder_id,
            amount = %request.amount,
            reason = reason.as_str(),
            "Bid rejected"
        );
        BidOutcome::Rejected {
            reason,
            current_bid,
            min_increment,
            version,
        }
    }

    // ------------------------------------------------------------------
    // Clock
    // ------------------------------------------------------------------

    /// Apply any time-driven transitions the auction is due for.
    ///
    /// Idempotent: calling it again with the same or a later `now` applies
    /// nothing it has already applied. Returns the status after advancing.
    pub async fn advance_clock(&self, id: &AuctionId) -> EngineResult<AuctionStatus> {
        self.advance_clock_at(id, Utc::now()).await
    }

    /// [`advance_clock`](Self::advance_clock) with an explicit clock.
    pub async fn advance_clock_at(
        &self,
        id: &AuctionId,
        now: DateTime<Utc>,
    ) -> EngineResult<AuctionStatus> {
        let coordinator = self.coordinator(id)?;
        let mut state = coordinator.lock().await;
        self.apply_due_transitions(&mut state, now)?;
        Ok(state.auction.status)
    }

    /// Apply every transition due at `now`, in lifecycle order, each one
    /// journaled and emitted like any other operation.
    ///
    /// Close is atomic: reaching the end time journals a single
    /// `Finalized` record and moves the auction straight to Finalized
    /// with its winner computed. No operation can interleave between
    /// "ended" and "winner known" because both happen under this lock.
    fn apply_due_transitions(
        &self,
        state: &mut AuctionState,
        now: DateTime<Utc>,
    ) -> EngineResult<()> {
        loop {
            let due = resolve_status(
                state.auction.status,
                state.auction.end_time,
                now,
                self.config.ending_soon_window(),
            );
            if due == state.auction.status {
                return Ok(());
            }
            match due {
                AuctionStatus::EndingSoon => self.apply_ending_soon(state, now)?,
                AuctionStatus::Ended => self.apply_close(state, now)?,
                _ => return Ok(()),
            }
        }
    }

    fn apply_ending_soon(&self, state: &mut AuctionState, now: DateTime<Utc>) -> EngineResult<()> {
        let from = state.auction.status;
        self.journal.lock().append(&JournalRecord::StatusChanged {
            auction_id: state.auction.id.clone(),
            to: AuctionStatus::EndingSoon,
            at: now,
            version: state.auction.version + 1,
        })?;
        state.auction.mark_ending_soon();

        Metrics::status_transition("ending-soon");
        self.notifier.emit(AuctionEvent::StatusChanged {
            event_id: EventId::new(),
            auction_id: state.auction.id.clone(),
            from,
            to: AuctionStatus::EndingSoon,
            version: state.auction.version,
            at: now,
        });
        debug!(auction_id = %state.auction.id, "Auction entered ending-soon window");
        Ok(())
    }

    fn apply_close(&self, state: &mut AuctionState, now: DateTime<Utc>) -> EngineResult<()> {
        let from = state.auction.status;
        let winner = if state.auction.reserve_met() {
            state.ledger.latest().map(|b| b.bidder_id.clone())
        } else {
            None
        };
        let final_price = state.auction.current_bid;

        self.journal.lock().append(&JournalRecord::Finalized {
            auction_id: state.auction.id.clone(),
            winner_id: winner.clone(),
            final_price,
            at: now,
            version: state.auction.version + 1,
        })?;
        state.auction.finalize(winner.clone());

        let outcome = match (&winner, state.auction.bid_count) {
            (Some(_), _) => "won",
            (None, 0) => "no_bids",
            (None, _) => "reserve_not_met",
        };
        Metrics::status_transition("ended");
        Metrics::auction_finalized(outcome);
        Metrics::open_auctions_dec();

        self.notifier.emit(AuctionEvent::StatusChanged {
            event_id: EventId::new(),
            auction_id: state.auction.id.clone(),
            from,
            to: AuctionStatus::Ended,
            version: state.auction.version,
            at: now,
        });
        self.notifier.emit(AuctionEvent::AuctionFinalized {
            event_id: EventId::new(),
            auction_id: state.auction.id.clone(),
            winner_id: winner.clone(),
            final_price,
            bid_count: state.auction.bid_count,
            version: state.auction.version,
            at: now,
        });

        match &winner {
            Some(winner_id) => info!(
                auction_id = %state.auction.id,
                winner_id = %winner_id,
                final_price = %final_price,
                bid_count = state.auction.bid_count,
                "Auction finalized with winner"
            ),
            None => info!(
                auction_id = %state.auction.id,
                final_price = %final_price,
                bid_count = state.auction.bid_count,
                outcome,
                "Auction finalized without winner"
            ),
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Snapshot of an auction and its accepted bids.
    ///
    /// Taken under the coordinator lock, so the pair is always mutually
    /// consistent. It may be stale the moment it returns; `version` tells
    /// an optimistic caller whether it still is.
    pub async fn auction(&self, id: &AuctionId) -> EngineResult<AuctionView> {
        let coordinator = self.coordinator(id)?;
        let state = coordinator.lock().await;
        Ok(AuctionView {
            auction: state.auction.clone(),
            bids: state.ledger.snapshot(),
        })
    }

    /// Current highest bid and the minimum the next bid must reach.
    ///
    /// Convenience for read-heavy pricing displays.
    pub async fn price_context(&self, id: &AuctionId) -> EngineResult<(Money, Money, u64)> {
        let coordinator = self.coordinator(id)?;
        let state = coordinator.lock().await;
        Ok((
            state.auction.current_bid,
            state.auction.min_increment(),
            state.auction.version,
        ))
    }
}

impl std::fmt::Debug for AuctionHouse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuctionHouse")
            .field("auctions", &self.auctions.len())
            .field("subscribers", &self.notifier.subscriber_count())
            .finish()
    }
}
