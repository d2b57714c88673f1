use super::{BidEvaluator, Bidder, EvaluatorError};
use crate::types::{Bid, BidRequest};
use crate::utils::logging;
use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

/// A [`BidEvaluator`] that simulates one bidder's behavior: a latency wait,
/// a probabilistic bid decision, and a randomized amount around the base bid.
pub struct SimulatedEvaluator {
    bidder: Bidder,
}

impl SimulatedEvaluator {
    pub fn new(bidder: Bidder) -> Self {
        Self { bidder }
    }

    pub fn bidder(&self) -> &Bidder {
        &self.bidder
    }
}

#[async_trait]
impl BidEvaluator for SimulatedEvaluator {
    async fn evaluate(
        &self,
        request: &BidRequest,
        deadline: &CancellationToken,
    ) -> Result<Option<Bid>, EvaluatorError> {
        if deadline.is_cancelled() {
            return Err(EvaluatorError::Cancelled);
        }

        // Simulate response latency, abandoning if the deadline fires first
        tokio::select! {
            _ = deadline.cancelled() => return Err(EvaluatorError::Cancelled),
            _ = sleep(self.bidder.speed) => {}
        }

        let (passed, amount) = {
            let mut rng = rand::thread_rng();
            let passed = rng.gen_bool(self.bidder.bid_chance);
            let variation = (rng.gen::<f64>() - 0.5) * self.bidder.bid_range;
            (passed, self.bidder.base_bid + variation)
        };

        if !passed {
            logging::log("BIDDER", &format!("{} abstains from {}", self.bidder.id, request.auction_id));
            return Ok(None);
        }

        let amount = amount.max(1.0);
        let amount = (amount * 100.0).round() / 100.0;

        logging::log("BIDDER", &format!("{} bids {:.2} on {}", self.bidder.id, amount, request.auction_id));

        Ok(Some(Bid {
            bidder_id: self.bidder.id.clone(),
            amount,
            timestamp: Utc::now(),
        }))
    }
}
