pub mod config;
pub mod setup;
pub mod metrics;
pub mod report;

pub use config::Config;
pub use metrics::{MetricsCollector, SimulationMetrics};
pub use report::Reporter;
