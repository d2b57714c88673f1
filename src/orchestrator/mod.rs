//! Fan-out over auctions: launches one runner per auction, all concurrent,
//! and joins them into an index-stable result set.

use crate::admission::AdmissionGate;
use crate::auction::{Auction, AuctionRunner};
use crate::bidder::BidEvaluator;
use crate::types::{AuctionId, AuctionResult};
use crate::utils::logging;
use chrono::Utc;
use futures::future::join_all;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio_util::sync::CancellationToken;


#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("auction {0} failed: {1}")]
    AuctionFailed(AuctionId, String),
}

/// The outcome of one full run: every auction's result in input order, plus
/// the first auction-level failure if any occurred. Failures never discard
/// the other results.
pub struct RunOutcome {
    pub results: Vec<AuctionResult>,
    pub first_failure: Option<OrchestratorError>,
}

/// Launches and joins all auction runners. Holds the shared admission gate
/// and the bidder pool every auction fans out to.
pub struct Orchestrator {
    gate: AdmissionGate,
    evaluators: Arc<Vec<Arc<dyn BidEvaluator>>>,
}

impl Orchestrator {
    pub fn new(gate: AdmissionGate, evaluators: Vec<Arc<dyn BidEvaluator>>) -> Self {
        Self {
            gate,
            evaluators: Arc::new(evaluators),
        }
    }

    pub fn gate(&self) -> &AdmissionGate {
        &self.gate
    }

    /// Runs every auction concurrently and waits for all of them.
    ///
    /// The output preserves input auction order regardless of completion
    /// order. A runner that fails is recorded as a failed result for that
    /// auction alone; the first such failure is surfaced through
    /// `first_failure` while all other results are still returned.
    pub async fn run_all(
        &self,
        auctions: Vec<Auction>,
        run_cancel: &CancellationToken,
    ) -> RunOutcome {
        let started = Instant::now();
        logging::log("ORCHESTRATOR", &format!("Starting {} auctions concurrently", auctions.len()));

        let mut ids = Vec::with_capacity(auctions.len());
        let mut handles = Vec::with_capacity(auctions.len());
        for auction in auctions {
            ids.push(auction.id.clone());
            let runner = AuctionRunner::new(auction, self.gate.clone());
            let evaluators = self.evaluators.clone();
            let cancel = run_cancel.clone();
            handles.push(tokio::spawn(async move {
                runner.run(evaluators.as_slice(), &cancel).await
            }));
        }

        let mut results = Vec::with_capacity(ids.len());
        let mut first_failure = None;
        for (id, joined) in ids.into_iter().zip(join_all(handles).await) {
            let result = match joined {
                Ok(result) => result,
                Err(e) => failed_result(id, e.to_string()),
            };
            if let Some(error) = &result.error {
                if first_failure.is_none() {
                    first_failure = Some(OrchestratorError::AuctionFailed(
                        result.auction_id.clone(),
                        error.clone(),
                    ));
                }
            }
            results.push(result);
        }

        logging::log("ORCHESTRATOR", &format!("All auctions completed in {:?}", started.elapsed()));
        RunOutcome { results, first_failure }
    }
}

/// Result recorded for an auction whose runner could not complete at all
fn failed_result(auction_id: AuctionId, error: String) -> AuctionResult {
    let now = Utc::now();
    AuctionResult {
        auction_id,
        winner: None,
        total_bids: 0,
        start_time: now,
        end_time: now,
        duration: Duration::ZERO,
        error: Some(error),
    }
}
