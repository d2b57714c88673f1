use crate::admission::AdmissionGate;
use crate::auction::{Auction, AuctionRunner};
use crate::bidder::{BidEvaluator, EvaluatorError};
use crate::types::{Attribute, AuctionId, Bid, BidRequest, BidderId};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

/// An evaluator that always bids a fixed amount after a fixed delay
pub struct FixedEvaluator {
    pub id: BidderId,
    pub amount: f64,
    pub delay: Duration,
}

#[async_trait]
impl BidEvaluator for FixedEvaluator {
    async fn evaluate(
        &self,
        _request: &BidRequest,
        deadline: &CancellationToken,
    ) -> Result<Option<Bid>, EvaluatorError> {
        tokio::select! {
            _ = deadline.cancelled() => return Err(EvaluatorError::Cancelled),
            _ = sleep(self.delay) => {}
        }
        Ok(Some(Bid {
            bidder_id: self.id.clone(),
            amount: self.amount,
            timestamp: Utc::now(),
        }))
    }
}

/// An evaluator that always abstains
struct SilentEvaluator;

#[async_trait]
impl BidEvaluator for SilentEvaluator {
    async fn evaluate(
        &self,
        _request: &BidRequest,
        _deadline: &CancellationToken,
    ) -> Result<Option<Bid>, EvaluatorError> {
        Ok(None)
    }
}

pub fn test_auction(id: &str, timeout: Duration) -> Auction {
    let attributes = (0..4)
        .map(|i| Attribute { id: i, value: i as f64 * 10.0 })
        .collect();
    Auction::new(AuctionId(id.to_string()), attributes, timeout)
}

fn fixed(id: &str, amount: f64, delay_ms: u64) -> Arc<dyn BidEvaluator> {
    Arc::new(FixedEvaluator {
        id: BidderId(id.to_string()),
        amount,
        delay: Duration::from_millis(delay_ms),
    })
}

/// Test that the highest bid wins and all bids are collected
#[tokio::test]
async fn test_highest_bid_wins() {
    let evaluators = vec![
        fixed("bidder-1", 10.00, 5),
        fixed("bidder-2", 42.75, 10),
        fixed("bidder-3", 17.30, 15),
    ];
    let runner = AuctionRunner::new(
        test_auction("auction-1", Duration::from_secs(2)),
        AdmissionGate::new(8),
    );
    let result = runner.run(&evaluators, &CancellationToken::new()).await;

    assert_eq!(result.total_bids, 3);
    let winner = result.winner.expect("expected a winner");
    assert_eq!(winner.bidder_id, BidderId("bidder-2".to_string()));
    assert_eq!(winner.amount, 42.75);
    assert!(result.error.is_none());
}

/// Test the tie-break rule: amounts 10.00, 25.50, 25.50 arriving in that
/// completion order resolve to the first 25.50 reaching the ledger
#[tokio::test]
async fn test_tie_resolves_to_first_arrival() {
    let evaluators = vec![
        fixed("bidder-1", 10.00, 5),
        fixed("bidder-2", 25.50, 20),
        fixed("bidder-3", 25.50, 60),
    ];
    let runner = AuctionRunner::new(
        test_auction("auction-1", Duration::from_secs(2)),
        AdmissionGate::new(8),
    );
    let result = runner.run(&evaluators, &CancellationToken::new()).await;

    assert_eq!(result.total_bids, 3);
    let winner = result.winner.expect("expected a winner");
    assert_eq!(winner.amount, 25.50);
    assert_eq!(winner.bidder_id, BidderId("bidder-2".to_string()));
}

/// Test that an auction with only abstaining bidders completes with no winner
#[tokio::test]
async fn test_no_bids_no_winner() {
    let evaluators: Vec<Arc<dyn BidEvaluator>> =
        vec![Arc::new(SilentEvaluator), Arc::new(SilentEvaluator)];
    let runner = AuctionRunner::new(
        test_auction("auction-1", Duration::from_secs(1)),
        AdmissionGate::new(4),
    );
    let result = runner.run(&evaluators, &CancellationToken::new()).await;

    assert_eq!(result.total_bids, 0);
    assert!(result.winner.is_none());
    assert!(result.error.is_none());
}

/// Test that an auction with no bidders at all still completes
#[tokio::test]
async fn test_no_bidders_completes() {
    use crate::auction::AuctionPhase;

    let evaluators: Vec<Arc<dyn BidEvaluator>> = Vec::new();
    let runner = AuctionRunner::new(
        test_auction("auction-1", Duration::from_millis(200)),
        AdmissionGate::new(4),
    );
    assert_eq!(runner.phase(), AuctionPhase::Pending);
    let result = runner.run(&evaluators, &CancellationToken::new()).await;

    assert_eq!(result.total_bids, 0);
    assert!(result.winner.is_none());
}

/// Test that a permit pool of one strictly serializes evaluations
#[tokio::test]
async fn test_single_permit_serializes_evaluations() {
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct TrackingEvaluator {
        id: BidderId,
        current: Arc<AtomicUsize>,
        max_seen: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl BidEvaluator for TrackingEvaluator {
        async fn evaluate(
            &self,
            _request: &BidRequest,
            _deadline: &CancellationToken,
        ) -> Result<Option<Bid>, EvaluatorError> {
            let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_seen.fetch_max(now, Ordering::SeqCst);
            sleep(Duration::from_millis(15)).await;
            self.current.fetch_sub(1, Ordering::SeqCst);
            Ok(Some(Bid {
                bidder_id: self.id.clone(),
                amount: 5.0,
                timestamp: Utc::now(),
            }))
        }
    }

    let current = Arc::new(AtomicUsize::new(0));
    let max_seen = Arc::new(AtomicUsize::new(0));
    let evaluators: Vec<Arc<dyn BidEvaluator>> = (0..5)
        .map(|i| {
            Arc::new(TrackingEvaluator {
                id: BidderId(format!("bidder-{}", i + 1)),
                current: current.clone(),
                max_seen: max_seen.clone(),
            }) as Arc<dyn BidEvaluator>
        })
        .collect();

    let runner = AuctionRunner::new(
        test_auction("auction-1", Duration::from_secs(5)),
        AdmissionGate::new(1),
    );
    let result = runner.run(&evaluators, &CancellationToken::new()).await;

    assert_eq!(result.total_bids, 5);
    assert_eq!(max_seen.load(Ordering::SeqCst), 1);
}
