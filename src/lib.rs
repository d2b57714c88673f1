pub mod types;
pub mod admission;
pub mod bidder;
pub mod auction;
pub mod orchestrator;
pub mod utils;

pub use admission::AdmissionGate;
pub use auction::AuctionRunner;
pub use bidder::BidEvaluator;
pub use orchestrator::Orchestrator;
