use crate::types::{Bid, BidRequest, BidderId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

pub mod simulated;
pub use simulated::SimulatedEvaluator;


#[derive(Debug, Error)]
pub enum EvaluatorError {
    #[error("evaluation cancelled before completion")]
    Cancelled,
}

/// A simulated bidding agent's fixed behavioral parameters.
///
/// Generated once at startup and reused, unchanged, for every auction the
/// bidder participates in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bidder {
    pub id: BidderId,
    pub name: String,
    /// Probability in [0, 1] of placing a bid after the latency wait
    pub bid_chance: f64,
    /// Center of the bid amount distribution
    pub base_bid: f64,
    /// Width of the uniform spread around the base bid
    pub bid_range: f64,
    /// Simulated response latency
    pub speed: Duration,
    /// Attribute ids this bidder favors (not used by bid computation yet)
    pub preferred_attributes: Vec<u32>,
}

/// One bidder's decision process for one auction round.
///
/// Implementations read only the request and the deadline token; they never
/// touch auction state. `Ok(None)` is a deliberate abstention, not an error.
#[async_trait]
pub trait BidEvaluator: Send + Sync {
    /// Decide whether to bid and for how much, or fail with `Cancelled`
    /// when the deadline fires first.
    async fn evaluate(
        &self,
        request: &BidRequest,
        deadline: &CancellationToken,
    ) -> Result<Option<Bid>, EvaluatorError>;
}
