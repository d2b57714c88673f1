//! Run-wide metrics for the auction simulator.
//! Aggregates auction outcomes and samples process memory while the run is
//! in flight; peak evaluation concurrency comes from the admission gate.


use auction_sim::types::AuctionResult;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use sysinfo::System;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// How often the collector samples process memory
const SAMPLE_INTERVAL: Duration = Duration::from_millis(100);

// ------------------------------------------------------------------------------------------------
// Metrics Types
// ------------------------------------------------------------------------------------------------

/// Aggregate metrics for one full simulation run
#[derive(Debug, Clone, Serialize)]
pub struct SimulationMetrics {
    pub total_auctions: usize,
    pub total_bidders: usize,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub total_duration: Duration,
    pub successful_auctions: usize,
    pub failed_auctions: usize,
    pub total_bids_received: usize,
    pub average_bids_per_auction: f64,
    /// Highest number of simultaneous bid evaluations observed
    pub peak_concurrent_evaluations: usize,
    /// Highest process memory observed during the run, in MB
    pub peak_memory_mb: f64,
}

// ------------------------------------------------------------------------------------------------
// Collector
// ------------------------------------------------------------------------------------------------

/// Samples resource usage between `start()` and `stop()` and folds auction
/// outcomes into a [`SimulationMetrics`] snapshot.
pub struct MetricsCollector {
    start_time: DateTime<Utc>,
    started: Instant,
    peak_memory_bytes: Arc<AtomicU64>,
    stop_signal: CancellationToken,
    sampler: JoinHandle<()>,
}

impl MetricsCollector {
    /// Begins collection and spawns the background memory sampler
    pub fn start() -> Self {
        let peak_memory_bytes = Arc::new(AtomicU64::new(0));
        let stop_signal = CancellationToken::new();

        let sampler = {
            let peak = peak_memory_bytes.clone();
            let stop = stop_signal.clone();
            tokio::spawn(sample_memory(peak, stop))
        };

        Self {
            start_time: Utc::now(),
            started: Instant::now(),
            peak_memory_bytes,
            stop_signal,
            sampler,
        }
    }

    /// Stops sampling and produces the final metrics snapshot
    pub async fn stop(
        self,
        results: &[AuctionResult],
        total_bidders: usize,
        peak_concurrent_evaluations: usize,
    ) -> SimulationMetrics {
        self.stop_signal.cancel();
        let _ = self.sampler.await;

        let successful = results.iter().filter(|r| r.is_success()).count();
        let total_bids: usize = results.iter().map(|r| r.total_bids).sum();
        let average = if results.is_empty() {
            0.0
        } else {
            total_bids as f64 / results.len() as f64
        };

        SimulationMetrics {
            total_auctions: results.len(),
            total_bidders,
            start_time: self.start_time,
            end_time: Utc::now(),
            total_duration: self.started.elapsed(),
            successful_auctions: successful,
            failed_auctions: results.len() - successful,
            total_bids_received: total_bids,
            average_bids_per_auction: average,
            peak_concurrent_evaluations,
            peak_memory_mb: self.peak_memory_bytes.load(Ordering::SeqCst) as f64 / 1024.0 / 1024.0,
        }
    }
}

/// Periodically refreshes this process's memory usage, keeping the peak
async fn sample_memory(peak: Arc<AtomicU64>, stop: CancellationToken) {
    let Ok(pid) = sysinfo::get_current_pid() else {
        return;
    };
    let mut system = System::new();
    let mut interval = tokio::time::interval(SAMPLE_INTERVAL);
    loop {
        tokio::select! {
            _ = stop.cancelled() => break,
            _ = interval.tick() => {
                if system.refresh_process(pid) {
                    if let Some(process) = system.process(pid) {
                        peak.fetch_max(process.memory(), Ordering::SeqCst);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use auction_sim::types::{AuctionId, Bid, BidderId};

    fn result(id: &str, bids: usize, error: Option<&str>) -> AuctionResult {
        let now = Utc::now();
        AuctionResult {
            auction_id: AuctionId(id.to_string()),
            winner: (bids > 0).then(|| Bid {
                bidder_id: BidderId("bidder-1".to_string()),
                amount: 10.0,
                timestamp: now,
            }),
            total_bids: bids,
            start_time: now,
            end_time: now,
            duration: Duration::from_millis(10),
            error: error.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn aggregates_auction_outcomes() {
        let collector = MetricsCollector::start();
        let results = vec![
            result("auction-1", 3, None),
            result("auction-2", 0, Some("deadline context invalid")),
            result("auction-3", 5, None),
        ];

        let metrics = collector.stop(&results, 10, 4).await;

        assert_eq!(metrics.total_auctions, 3);
        assert_eq!(metrics.total_bidders, 10);
        assert_eq!(metrics.successful_auctions, 2);
        assert_eq!(metrics.failed_auctions, 1);
        assert_eq!(metrics.total_bids_received, 8);
        assert!((metrics.average_bids_per_auction - 8.0 / 3.0).abs() < 1e-9);
        assert_eq!(metrics.peak_concurrent_evaluations, 4);
    }

    #[tokio::test]
    async fn empty_run_yields_zeroed_metrics() {
        let collector = MetricsCollector::start();
        let metrics = collector.stop(&[], 0, 0).await;

        assert_eq!(metrics.total_auctions, 0);
        assert_eq!(metrics.total_bids_received, 0);
        assert_eq!(metrics.average_bids_per_auction, 0.0);
    }
}
