//! Engine error types.

use bidx_core::AuctionId;
use thiserror::Error;

/// Errors surfaced by engine operations.
///
/// These are operational failures. A bid that is merely rejected by the
/// acceptance rules is not an error; it comes back as
/// [`BidOutcome::Rejected`](crate::BidOutcome::Rejected).
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("auction not found: {0}")]
    AuctionNotFound(AuctionId),

    #[error("core error: {0}")]
    Core(#[from] bidx_core::CoreError),

    #[error("journal error: {0}")]
    Journal(#[from] bidx_journal::JournalError),

    #[error("replay error for auction {auction_id}: {detail}")]
    Replay { auction_id: AuctionId, detail: String },
}

pub type EngineResult<T> = Result<T, EngineError>;
