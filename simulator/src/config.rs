//! Configuration loader and validator for the auction simulator.
//! Handles parsing, validation, and access to simulation configuration,
//! including resource-limit derivation from available compute capacity.


use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::thread;
use std::time::Duration;
use thiserror::Error;

/// Default path of the optional configuration file
const CONFIG_PATH: &str = "simulator/config.toml";

/// Evaluations admitted per vCPU when no explicit cap is configured
const MAX_CONCURRENT_BIDDERS_PER_CPU: usize = 100;

// ------------------------------------------------------------------------------------------------
// Main Configuration Structs
// ------------------------------------------------------------------------------------------------

/// Main configuration struct for simulation parameters.
///
/// Contains everything needed to run a simulation: the shape of the run
/// (auction/bidder counts, deadline), the behavioral ranges bidders are
/// generated from, and the resource budget the run must stay within.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Run shape: counts, attributes per auction, and the per-auction deadline
    pub simulation: SimulationConfig,
    /// Ranges that generated bidder profiles are drawn from
    pub bidders: BidderBehaviorConfig,
    /// Standardized resource constraints for the whole run
    pub resources: ResourceConfig,
}

/// Configuration for the shape of one simulation run
#[derive(Debug, Deserialize, Clone)]
pub struct SimulationConfig {
    /// Number of auctions, all executed concurrently
    pub total_auctions: usize,
    /// Number of bidders participating in every auction
    pub total_bidders: usize,
    /// Number of attributes generated per auction
    pub attributes_per_auction: usize,
    /// Per-auction deadline in seconds
    pub auction_timeout: f64,
}

/// Ranges used to randomize generated bidder profiles
#[derive(Debug, Deserialize, Clone)]
pub struct BidderBehaviorConfig {
    pub min_bid_chance: f64,
    pub max_bid_chance: f64,
    pub min_base_bid: f64,
    pub max_base_bid: f64,
    pub min_bid_range: f64,
    pub max_bid_range: f64,
    /// Fastest simulated response latency in milliseconds
    pub min_speed_ms: u64,
    /// Slowest simulated response latency in milliseconds
    pub max_speed_ms: u64,
}

/// Configured resource budget for the run
#[derive(Debug, Deserialize, Clone)]
pub struct ResourceConfig {
    /// Maximum vCPUs the run may use
    pub max_vcpus: usize,
    /// Maximum memory budget in MB
    pub max_memory_mb: u64,
    /// Explicit cap on concurrent bid evaluations; derived from the vCPU
    /// budget when absent
    #[serde(default)]
    pub max_concurrent_bidders: Option<usize>,
}

/// Resource constraints actually applied to a run, derived from the
/// configured budget and the machine's available parallelism
#[derive(Debug, Clone, Copy)]
pub struct ResourceLimits {
    pub max_vcpus: usize,
    pub max_memory_mb: u64,
    pub max_concurrent_bidders: usize,
}

// ------------------------------------------------------------------------------------------------
// Error Types and Validation
// ------------------------------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileReadError(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// ------------------------------------------------------------------------------------------------
// Configuration Implementation Methods
// ------------------------------------------------------------------------------------------------

impl Config {
    /// Loads the configuration from `simulator/config.toml`, falling back to
    /// the built-in standard configuration when the file is absent.
    pub fn load() -> Result<Self, ConfigError> {
        let config_str = match fs::read_to_string(CONFIG_PATH) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let config = Config::standard();
                config.validate()?;
                return Ok(config);
            }
            Err(e) => return Err(ConfigError::FileReadError(e)),
        };
        let config: Config = toml::from_str(&config_str)?;
        config.validate()?;
        Ok(config)
    }

    /// The built-in configuration used when no config file is present
    pub fn standard() -> Self {
        Self {
            simulation: SimulationConfig {
                total_auctions: 40,
                total_bidders: 100,
                attributes_per_auction: 20,
                auction_timeout: 2.0,
            },
            bidders: BidderBehaviorConfig {
                min_bid_chance: 0.6,
                max_bid_chance: 0.8,
                min_base_bid: 50.0,
                max_base_bid: 150.0,
                min_bid_range: 5.0,
                max_bid_range: 20.0,
                min_speed_ms: 5,
                max_speed_ms: 250,
            },
            resources: ResourceConfig {
                max_vcpus: 2,
                max_memory_mb: 1024,
                max_concurrent_bidders: None,
            },
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.simulation.total_auctions == 0 {
            return Err(ConfigError::ValidationError("Total auctions must be positive".into()));
        }
        if self.simulation.total_bidders == 0 {
            return Err(ConfigError::ValidationError("Total bidders must be positive".into()));
        }
        if self.simulation.attributes_per_auction == 0 {
            return Err(ConfigError::ValidationError("Attributes per auction must be positive".into()));
        }
        if self.simulation.auction_timeout < 0.0 {
            return Err(ConfigError::ValidationError("Auction timeout must be non-negative".into()));
        }
        if self.bidders.min_bid_chance < 0.0 || self.bidders.max_bid_chance > 1.0 {
            return Err(ConfigError::ValidationError("Bid chance must be between 0 and 1".into()));
        }
        if self.bidders.min_bid_chance > self.bidders.max_bid_chance {
            return Err(ConfigError::ValidationError("Min bid chance must not exceed max bid chance".into()));
        }
        if self.bidders.min_base_bid <= 0.0 || self.bidders.min_base_bid > self.bidders.max_base_bid {
            return Err(ConfigError::ValidationError("Base bid range must be positive and ordered".into()));
        }
        if self.bidders.min_bid_range < 0.0 || self.bidders.min_bid_range > self.bidders.max_bid_range {
            return Err(ConfigError::ValidationError("Bid range must be non-negative and ordered".into()));
        }
        if self.bidders.min_speed_ms > self.bidders.max_speed_ms {
            return Err(ConfigError::ValidationError("Min speed must not exceed max speed".into()));
        }
        if self.resources.max_vcpus == 0 {
            return Err(ConfigError::ValidationError("CPU limit must be positive".into()));
        }
        if self.resources.max_memory_mb < 100 {
            return Err(ConfigError::ValidationError("Insufficient memory limit".into()));
        }
        if self.resources.max_concurrent_bidders == Some(0) {
            return Err(ConfigError::ValidationError("Concurrent bidder limit must be positive".into()));
        }
        Ok(())
    }

    /// The per-auction deadline as a duration
    pub fn auction_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.simulation.auction_timeout)
    }

    /// Derives the resource constraints applied to this run: the vCPU
    /// budget capped by available parallelism, and a concurrent-evaluation
    /// cap that never exceeds the total work available.
    pub fn resource_limits(&self) -> ResourceLimits {
        let available = thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
        let max_vcpus = available.min(self.resources.max_vcpus);

        let derived = max_vcpus * MAX_CONCURRENT_BIDDERS_PER_CPU;
        let ceiling = self.simulation.total_bidders * self.simulation.total_auctions;
        let max_concurrent = self
            .resources
            .max_concurrent_bidders
            .unwrap_or(derived)
            .min(ceiling)
            .max(1);

        ResourceLimits {
            max_vcpus,
            max_memory_mb: self.resources.max_memory_mb,
            max_concurrent_bidders: max_concurrent,
        }
    }
}
