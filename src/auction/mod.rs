use crate::types::{Attribute, AuctionId, Bid, BidRequest};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

pub mod runner;
pub use runner::AuctionRunner;

#[cfg(test)]
mod tests;

/// Phases an auction moves through; `Complete` is terminal and is reached
/// even when zero bids were collected or the deadline expired early.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuctionPhase {
    Pending,
    Collecting,
    Resolving,
    Complete,
}

impl fmt::Display for AuctionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuctionPhase::Pending => write!(f, "Pending"),
            AuctionPhase::Collecting => write!(f, "Collecting"),
            AuctionPhase::Resolving => write!(f, "Resolving"),
            AuctionPhase::Complete => write!(f, "Complete"),
        }
    }
}

/// One independent bidding round over a fixed set of attributes with a hard
/// deadline. Owned exclusively by its [`AuctionRunner`] while it executes;
/// the bid ledger is append-only and written by the runner's collection loop
/// alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Auction {
    pub id: AuctionId,
    pub attributes: Vec<Attribute>,
    /// How long the bidding window stays open
    pub timeout: Duration,
    /// The append-only bid ledger
    pub bids: Vec<Bid>,
    /// The winning bid, set during resolution
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<Bid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    pub is_complete: bool,
}

impl Auction {
    pub fn new(id: AuctionId, attributes: Vec<Attribute>, timeout: Duration) -> Self {
        Self {
            id,
            attributes,
            timeout,
            bids: Vec::new(),
            winner: None,
            start_time: None,
            end_time: None,
            is_complete: false,
        }
    }

    /// Builds the read-only request handed to every bid evaluator
    pub fn bid_request(&self) -> BidRequest {
        BidRequest {
            auction_id: self.id.clone(),
            attributes: self.attributes.iter().map(|a| a.value).collect(),
            timeout: self.timeout,
            timestamp: Utc::now(),
        }
    }
}
