use super::{Auction, AuctionPhase};
use crate::admission::AdmissionGate;
use crate::bidder::BidEvaluator;
use crate::types::{AuctionResult, Bid};
use crate::utils::logging;
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Drives one auction to completion: opens a deadline-bounded window, fans
/// the bid request out to every evaluator through the admission gate, fans
/// the returned bids back into the auction's ledger, and resolves a winner.
pub struct AuctionRunner {
    auction: Auction,
    gate: AdmissionGate,
    phase: AuctionPhase,
}

impl AuctionRunner {
    pub fn new(auction: Auction, gate: AdmissionGate) -> Self {
        Self {
            auction,
            gate,
            phase: AuctionPhase::Pending,
        }
    }

    pub fn phase(&self) -> AuctionPhase {
        self.phase
    }

    /// Runs the auction to completion and emits its immutable result.
    ///
    /// The deadline is `now + auction.timeout`, bounded by `run_cancel`:
    /// cancelling the overall run cancels this auction promptly, while this
    /// auction's own deadline never affects sibling auctions. The runner
    /// never retries an evaluator and never extends its deadline.
    pub async fn run(
        mut self,
        evaluators: &[Arc<dyn BidEvaluator>],
        run_cancel: &CancellationToken,
    ) -> AuctionResult {
        let started = Instant::now();
        let start_time = Utc::now();
        self.auction.start_time = Some(start_time);

        self.phase = AuctionPhase::Collecting;
        logging::log("RUNNER", &format!(
            "Auction {} {} (timeout: {:?}, {} bidders)",
            self.auction.id, self.phase, self.auction.timeout, evaluators.len()
        ));

        // Child of the run-wide token so overall cancellation propagates
        let deadline = run_cancel.child_token();
        let watchdog = if self.auction.timeout.is_zero() {
            // The window never opens; evaluators must not start at all
            deadline.cancel();
            None
        } else {
            let deadline = deadline.clone();
            let timeout = self.auction.timeout;
            Some(tokio::spawn(async move {
                tokio::time::sleep(timeout).await;
                deadline.cancel();
            }))
        };

        let request = Arc::new(self.auction.bid_request());
        let (bid_tx, mut bid_rx) = mpsc::channel::<Bid>(evaluators.len().max(1));

        // Fan-out: one task per evaluator, each gated by a global permit.
        // Tasks still waiting for a permit when the deadline fires are
        // abandoned without ever starting their evaluation.
        for evaluator in evaluators {
            let evaluator = evaluator.clone();
            let gate = self.gate.clone();
            let deadline = deadline.clone();
            let request = request.clone();
            let bid_tx = bid_tx.clone();
            tokio::spawn(async move {
                let Some(_permit) = gate.admit(&deadline).await else {
                    return;
                };
                // Cancellation and abstention both contribute no bid
                if let Ok(Some(bid)) = evaluator.evaluate(&request, &deadline).await {
                    let _ = bid_tx.send(bid).await;
                }
            });
        }
        drop(bid_tx);

        // Fan-in: the sole appender to the ledger. The channel closes once
        // every launched task has returned or been abandoned.
        while let Some(bid) = bid_rx.recv().await {
            self.auction.bids.push(bid);
        }

        if let Some(watchdog) = watchdog {
            watchdog.abort();
        }

        self.phase = AuctionPhase::Resolving;
        self.auction.winner = self.resolve_winner();

        self.phase = AuctionPhase::Complete;
        let end_time = Utc::now();
        self.auction.end_time = Some(end_time);
        self.auction.is_complete = true;

        logging::log("RUNNER", &format!(
            "Auction {} {}: {} bids, winner: {}",
            self.auction.id,
            self.phase,
            self.auction.bids.len(),
            self.auction
                .winner
                .as_ref()
                .map(|b| format!("{} ({:.2})", b.bidder_id, b.amount))
                .unwrap_or_else(|| "none".to_string()),
        ));

        AuctionResult {
            auction_id: self.auction.id.clone(),
            winner: self.auction.winner.clone(),
            total_bids: self.auction.bids.len(),
            start_time,
            end_time,
            duration: started.elapsed(),
            error: None,
        }
    }

    /// Single scan in ledger order keeping the first bid not exceeded by a
    /// strictly greater later one, so the earliest bid at the maximum
    /// amount wins ties.
    fn resolve_winner(&self) -> Option<Bid> {
        let mut winner: Option<&Bid> = None;
        for bid in &self.auction.bids {
            match winner {
                Some(current) if bid.amount > current.amount => winner = Some(bid),
                None => winner = Some(bid),
                _ => {}
            }
        }
        winner.cloned()
    }
}
