use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// A unique identifier for an auction
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct AuctionId(pub String);

/// A unique identifier for a bidder
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct BidderId(pub String);

/// An immutable descriptive fact about an auction, fixed at auction creation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    /// Position of this attribute within the auction
    pub id: u32,
    /// The attribute's numeric value
    pub value: f64,
}

/// A bid placed by one bidder in one auction round
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bid {
    /// The bidder that placed this bid
    pub bidder_id: BidderId,
    /// The bid amount, always at least 1.0
    pub amount: f64,
    /// When the bid was produced
    pub timestamp: DateTime<Utc>,
}

/// The read-only view of an auction handed to bid evaluators
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BidRequest {
    /// The auction being bid on
    pub auction_id: AuctionId,
    /// The auction's attribute values
    pub attributes: Vec<f64>,
    /// How long the bidding window stays open
    pub timeout: Duration,
    /// When the request was issued
    pub timestamp: DateTime<Utc>,
}

/// The immutable outcome of one completed auction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuctionResult {
    /// The auction this result belongs to
    pub auction_id: AuctionId,
    /// The winning bid, absent when no bids were collected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<Bid>,
    /// Number of bids collected before the deadline
    pub total_bids: usize,
    /// When the auction opened
    pub start_time: DateTime<Utc>,
    /// When the auction completed
    pub end_time: DateTime<Utc>,
    /// Wall-clock time the auction took
    pub duration: Duration,
    /// Failure description when the auction could not complete normally
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AuctionResult {
    /// Whether the auction completed without an auction-level failure
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

impl fmt::Display for AuctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for BidderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
