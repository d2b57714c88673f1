use std::env;
use std::thread;
use std::time::Duration;

use auction_sim::admission::AdmissionGate;
use auction_sim::orchestrator::Orchestrator;
use auction_sim::utils::logging;
use indicatif::{ProgressBar, ProgressStyle};
use simulator::{
    config::{Config, ConfigError},
    setup, MetricsCollector, Reporter,
};
use tokio_util::sync::CancellationToken;


// ------------------------------------------------------------------------------------------------
// Main
// ------------------------------------------------------------------------------------------------

/// Main function that orchestrates the simulation setup and execution
#[tokio::main]
async fn main() -> Result<(), ConfigError> {
    setup_logging();

    // Load configuration with resource standardization
    let config = Config::load()?;
    let limits = config.resource_limits();
    print_banner(&config, &limits);

    // Initialize simulation components
    println!("\nInitializing simulation components...");
    let auctions = setup::generate_auctions(&config);
    let bidders = setup::generate_bidders(&config);
    let evaluators = setup::build_evaluators(&bidders);
    println!("Initialization complete:");
    println!("   Auctions: {}", auctions.len());
    println!("   Bidders: {}", bidders.len());

    let gate = AdmissionGate::new(limits.max_concurrent_bidders);
    let collector = MetricsCollector::start();
    let orchestrator = Orchestrator::new(gate.clone(), evaluators);

    let separator = "=".repeat(60);
    println!("\n{}", separator);
    println!("Starting auction simulation...");
    println!("{}", separator);
    println!(
        "\nStarting {} concurrent auctions with {} bidders each...",
        config.simulation.total_auctions, config.simulation.total_bidders
    );
    println!("Auction timeout: {:?}", config.auction_timeout());
    println!("Resource limit: {} concurrent bidders", limits.max_concurrent_bidders);

    // Run all auctions concurrently
    let progress = ProgressBar::new_spinner();
    progress.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner} [{elapsed_precise}] {msg}")
            .unwrap(),
    );
    progress.set_message(format!("running {} auctions", config.simulation.total_auctions));
    progress.enable_steady_tick(Duration::from_millis(100));

    let run_cancel = CancellationToken::new();
    let outcome = orchestrator.run_all(auctions, &run_cancel).await;

    progress.finish_with_message("all auctions complete");

    // Stop metrics and report results
    let metrics = collector
        .stop(&outcome.results, config.simulation.total_bidders, gate.peak_in_flight())
        .await;

    let reporter = Reporter::new("simulator/results");
    reporter.print_summary(&metrics);

    // Persistence failures are warnings, never fatal
    if let Err(e) = reporter.save_metrics(&metrics) {
        println!("Warning: Could not save metrics: {}", e);
    }
    if let Err(e) = reporter.save_auction_results(&outcome.results) {
        println!("Warning: Could not save auction results: {}", e);
    }

    reporter.print_auction_details(&outcome.results);
    println!("\nSimulation completed in {:.2?}", metrics.total_duration);

    if let Some(failure) = outcome.first_failure {
        eprintln!("Simulation finished with failures: {}", failure);
        std::process::exit(1);
    }
    Ok(())
}

/// Sets up logging if ENABLE_LOGS environment variable is set
fn setup_logging() {
    if env::var("ENABLE_LOGS").is_ok() {
        env::set_var("AUCTION_SIM_LOGGING", "true");
    }
    logging::init_logging();
}

/// Prints the environment and configuration banner
fn print_banner(config: &Config, limits: &simulator::config::ResourceLimits) {
    let available = thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
    println!("Auction Simulator");
    println!("Available CPUs: {}", available);

    println!("\nSimulation Configuration:");
    println!("   Auctions: {} (concurrent)", config.simulation.total_auctions);
    println!("   Bidders: {}", config.simulation.total_bidders);
    println!("   Attributes: {} per auction", config.simulation.attributes_per_auction);
    println!("   Auction Timeout: {:?}", config.auction_timeout());

    println!("\nResource Standardization:");
    println!("   Max vCPUs: {}", limits.max_vcpus);
    println!("   Max Memory: {} MB", limits.max_memory_mb);
    println!("   Max Concurrent Bidders: {}", limits.max_concurrent_bidders);
}
