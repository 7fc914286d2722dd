//! Opaque identifiers used across the marketplace core.
//!
//! `BidderId` and `SellerId` are supplied by the external identity
//! service; the core never inspects them. `AuctionId` and `BidId` are
//! generated here. `EventId` is the idempotency key subscribers dedupe on.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique auction identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuctionId(String);

impl AuctionId {
    /// Create a new unique auction ID.
    ///
    /// Format: `auc_{timestamp_ms}_{uuid_short}`
    pub fn generate() -> Self {
        let ts = chrono::Utc::now().timestamp_millis();
        let uuid_short = &Uuid::new_v4().to_string()[..8];
        Self(format!("auc_{ts}_{uuid_short}"))
    }

    /// Create from an existing string (for externally assigned ids).
    pub fn from_string(s: String) -> Self {
        Self(s)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AuctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for AuctionId {
    fn from(s: String) -> Self {
        Self::from_string(s)
    }
}

impl From<&str> for AuctionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for AuctionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Unique accepted-bid identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BidId(String);

impl BidId {
    /// Create a new unique bid ID.
    ///
    /// Format: `bid_{timestamp_ms}_{uuid_short}`
    pub fn generate() -> Self {
        let ts = chrono::Utc::now().timestamp_millis();
        let uuid_short = &Uuid::new_v4().to_string()[..8];
        Self(format!("bid_{ts}_{uuid_short}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BidId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for BidId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for BidId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Opaque bidder identity, issued by the external auth service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BidderId(String);

impl BidderId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BidderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for BidderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for BidderId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Opaque seller identity, issued by the external auth service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SellerId(String);

impl SellerId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SellerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SellerId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SellerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Unique event identifier.
///
/// Delivery is at-least-once; subscribers must treat this as their
/// idempotency key and drop duplicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(Uuid);

impl EventId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
