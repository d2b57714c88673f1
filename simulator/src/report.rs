//! Console reporting and JSON persistence of simulation results.
//! Writes one file per auction result plus one aggregate metrics file;
//! persistence failures are warnings and never abort the run.


use crate::metrics::SimulationMetrics;
use auction_sim::types::AuctionResult;
use auction_sim::utils::logging;
use chrono::Local;
use std::fs;
use std::path::PathBuf;

/// Handles output of simulation results to the console and to disk
pub struct Reporter {
    output_dir: PathBuf,
}

impl Reporter {
    /// Creates a reporter writing into `output_dir`, creating it if needed
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        let output_dir = output_dir.into();
        if let Err(e) = fs::create_dir_all(&output_dir) {
            println!("Warning: could not create output directory: {}", e);
        }
        Self { output_dir }
    }

    /// Prints the aggregate run summary
    pub fn print_summary(&self, metrics: &SimulationMetrics) {
        let separator = "=".repeat(60);
        println!("\n{}", separator);
        println!("AUCTION SIMULATION SUMMARY");
        println!("{}", separator);

        println!("Total Duration: {:.2?}", metrics.total_duration);
        let success_pct = if metrics.total_auctions > 0 {
            metrics.successful_auctions as f64 / metrics.total_auctions as f64 * 100.0
        } else {
            0.0
        };
        println!(
            "Successful Auctions: {}/{} ({:.1}%)",
            metrics.successful_auctions, metrics.total_auctions, success_pct
        );
        println!(
            "Total Bids Received: {} (avg: {:.1} per auction)",
            metrics.total_bids_received, metrics.average_bids_per_auction
        );
        println!("Peak Concurrent Evaluations: {}", metrics.peak_concurrent_evaluations);
        println!("Peak Memory Usage: {:.2} MB", metrics.peak_memory_mb);
        println!("{}", separator);
    }

    /// Prints the fixed-width per-auction result table
    pub fn print_auction_details(&self, results: &[AuctionResult]) {
        println!("\nDetailed Auction Results:");
        let line = "-".repeat(80);
        println!("{}", line);
        println!(
            "{:<12} {:<8} {:<12} {:<22} {:<20}",
            "Auction ID", "Bids", "Duration", "Winner", "Status"
        );
        println!("{}", line);

        let mut successful = 0;
        for result in results {
            let status = match &result.error {
                None => {
                    successful += 1;
                    "Success".to_string()
                }
                Some(e) => format!("Error: {}", e),
            };
            let winner = result
                .winner
                .as_ref()
                .map(|bid| format!("{} (${:.2})", bid.bidder_id, bid.amount))
                .unwrap_or_else(|| "None".to_string());
            println!(
                "{:<12} {:<8} {:<12} {:<22} {:<20}",
                result.auction_id.to_string(),
                result.total_bids,
                format!("{:.0?}", result.duration),
                winner,
                status
            );
        }

        println!("{}", line);
        let pct = if results.is_empty() {
            0.0
        } else {
            successful as f64 / results.len() as f64 * 100.0
        };
        println!("Summary: {}/{} auctions successful ({:.1}%)", successful, results.len(), pct);
    }

    /// Writes the aggregate metrics to a timestamped JSON file
    pub fn save_metrics(&self, metrics: &SimulationMetrics) -> Result<(), String> {
        let filename = self.output_dir.join(format!(
            "simulation_metrics_{}.json",
            Local::now().format("%Y%m%d_%H%M%S")
        ));
        let contents = serde_json::to_string_pretty(metrics).map_err(|e| e.to_string())?;
        fs::write(&filename, contents).map_err(|e| e.to_string())?;
        logging::log("REPORTER", &format!("Metrics saved to: {}", filename.display()));
        Ok(())
    }

    /// Writes one JSON file per auction result
    pub fn save_auction_results(&self, results: &[AuctionResult]) -> Result<(), String> {
        for result in results {
            let filename = self.output_dir.join(format!("auction_{}.json", result.auction_id));
            let contents = serde_json::to_string_pretty(result).map_err(|e| e.to_string())?;
            fs::write(&filename, contents).map_err(|e| e.to_string())?;
        }
        logging::log("REPORTER", &format!("Auction results saved to: {}/", self.output_dir.display()));
        Ok(())
    }
}
