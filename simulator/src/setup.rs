//! Startup generation of auctions and bidder profiles from the configured
//! counts and numeric ranges.


use crate::config::Config;
use auction_sim::auction::Auction;
use auction_sim::bidder::{BidEvaluator, Bidder, SimulatedEvaluator};
use auction_sim::types::{Attribute, AuctionId, BidderId};
use auction_sim::utils::logging;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;

/// Creates all auction instances with random attribute values in [0, 100)
pub fn generate_auctions(config: &Config) -> Vec<Auction> {
    logging::log("SETUP", &format!("Initializing {} auctions...", config.simulation.total_auctions));
    let mut rng = rand::thread_rng();
    let timeout = config.auction_timeout();

    let auctions: Vec<Auction> = (0..config.simulation.total_auctions)
        .map(|i| {
            let attributes = (0..config.simulation.attributes_per_auction)
                .map(|j| Attribute {
                    id: j as u32,
                    value: (rng.gen_range(0.0..100.0) * 100.0_f64).floor() / 100.0,
                })
                .collect();
            Auction::new(AuctionId(format!("auction-{}", i + 1)), attributes, timeout)
        })
        .collect();

    logging::log("SETUP", &format!("Initialized {} auctions", auctions.len()));
    auctions
}

/// Creates all bidder profiles from the configured behavior ranges
pub fn generate_bidders(config: &Config) -> Vec<Bidder> {
    logging::log("SETUP", &format!("Initializing {} bidders...", config.simulation.total_bidders));
    let behavior = &config.bidders;
    let mut rng = rand::thread_rng();

    let bidders: Vec<Bidder> = (0..config.simulation.total_bidders)
        .map(|i| Bidder {
            id: BidderId(format!("bidder-{}", i + 1)),
            name: format!("Bidder {}", i + 1),
            bid_chance: rng.gen_range(behavior.min_bid_chance..=behavior.max_bid_chance),
            base_bid: rng.gen_range(behavior.min_base_bid..=behavior.max_base_bid),
            bid_range: rng.gen_range(behavior.min_bid_range..=behavior.max_bid_range),
            speed: Duration::from_millis(rng.gen_range(behavior.min_speed_ms..=behavior.max_speed_ms)),
            preferred_attributes: preferred_attributes(&mut rng, config.simulation.attributes_per_auction),
        })
        .collect();

    logging::log("SETUP", &format!("Initialized {} bidders", bidders.len()));
    bidders
}

/// Wraps every bidder profile in a simulated evaluator
pub fn build_evaluators(bidders: &[Bidder]) -> Vec<Arc<dyn BidEvaluator>> {
    bidders
        .iter()
        .map(|bidder| Arc::new(SimulatedEvaluator::new(bidder.clone())) as Arc<dyn BidEvaluator>)
        .collect()
}

/// A random 3-8 element subset of attribute ids the bidder favors
fn preferred_attributes(rng: &mut impl Rng, attributes_per_auction: usize) -> Vec<u32> {
    let count = rng.gen_range(3..=8);
    (0..count)
        .map(|_| rng.gen_range(0..attributes_per_auction as u32))
        .collect()
}
