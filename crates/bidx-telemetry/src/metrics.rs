//! Prometheus metrics for the auction engine.
//!
//! Covers the flows that matter operationally:
//! - Bid throughput and rejection breakdown
//! - Auction lifecycle transitions and finalization outcomes
//! - Open-auction population
//!
//! # Panics
//!
//! Metric registration uses `unwrap()` intentionally. If registration fails,
//! it indicates a fatal configuration error (e.g., duplicate metric names)
//! that should cause an immediate crash at startup rather than silent failure.
//! These panics only occur during static initialization, never at runtime.

use crate::error::{TelemetryError, TelemetryResult};
use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram, register_int_counter, register_int_gauge,
    CounterVec, Histogram, IntCounter, IntGauge, TextEncoder,
};

/// Total bids accepted.
pub static BIDS_ACCEPTED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!("bidx_bids_accepted_total", "Total bids accepted").unwrap()
});

/// Total bids rejected.
/// Labels: reason (auction_not_open/too_low/increment_too_small/stale_version)
pub static BIDS_REJECTED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "bidx_bids_rejected_total",
        "Total bids rejected",
        &["reason"]
    )
    .unwrap()
});

/// Total auctions created (drafts).
pub static AUCTIONS_CREATED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!("bidx_auctions_created_total", "Total auction drafts created").unwrap()
});

/// Total auctions finalized.
/// Labels: outcome (won/reserve_not_met/no_bids)
pub static AUCTIONS_FINALIZED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "bidx_auctions_finalized_total",
        "Total auctions finalized",
        &["outcome"]
    )
    .unwrap()
});

/// Total lifecycle transitions applied.
/// Labels: to (active/ending-soon/ended)
pub static STATUS_TRANSITIONS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "bidx_status_transitions_total",
        "Total auction status transitions applied",
        &["to"]
    )
    .unwrap()
});

/// Auctions currently open for bidding.
pub static OPEN_AUCTIONS: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!("bidx_open_auctions", "Auctions currently open for bidding").unwrap()
});

/// Accepted bid amounts in rupees.
pub static BID_AMOUNT: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "bidx_bid_amount",
        "Accepted bid amounts in rupees",
        vec![
            100.0, 500.0, 1000.0, 5000.0, 10000.0, 50000.0, 100000.0, 500000.0, 1000000.0
        ]
    )
    .unwrap()
});

/// Metrics facade for easy access.
pub struct Metrics;

impl Metrics {
    /// Record an accepted bid.
    pub fn bid_accepted(amount: f64) {
        BIDS_ACCEPTED_TOTAL.inc();
        BID_AMOUNT.observe(amount);
    }

    /// Record a rejected bid.
    pub fn bid_rejected(reason: &str) {
        BIDS_REJECTED_TOTAL.with_label_values(&[reason]).inc();
    }

    /// Record a draft creation.
    pub fn auction_created() {
        AUCTIONS_CREATED_TOTAL.inc();
    }

    /// Record a lifecycle transition.
    pub fn status_transition(to: &str) {
        STATUS_TRANSITIONS_TOTAL.with_label_values(&[to]).inc();
    }

    /// Record a finalization outcome.
    pub fn auction_finalized(outcome: &str) {
        AUCTIONS_FINALIZED_TOTAL.with_label_values(&[outcome]).inc();
    }

    /// An auction opened for bidding.
    pub fn open_auctions_inc() {
        OPEN_AUCTIONS.inc();
    }

    /// An open auction reached its terminal state.
    pub fn open_auctions_dec() {
        OPEN_AUCTIONS.dec();
    }

    /// Render all registered metrics in Prometheus text format,
    /// for whatever exporter the embedding service wires up.
    pub fn render() -> TelemetryResult<String> {
        let encoder = TextEncoder::new();
        encoder
            .encode_to_string(&prometheus::gather())
            .map_err(|e| TelemetryError::Metrics(e.to_string()))
    }
}
