use std::sync::atomic::{AtomicBool, Ordering};
use std::env;

static ENABLE_LOGGING: AtomicBool = AtomicBool::new(false);

/// Initializes logging based on the AUCTION_SIM_LOGGING environment variable.
/// - If AUCTION_SIM_LOGGING=true, logging is enabled.
/// - If AUCTION_SIM_LOGGING=false or not set, logging is disabled.
/// - To enable logging in tests, run: AUCTION_SIM_LOGGING=true cargo test -- --nocapture
pub fn init_logging() {
    match env::var("AUCTION_SIM_LOGGING") {
        Ok(value) => {
            match value.as_str() {
                "true" => ENABLE_LOGGING.store(true, Ordering::SeqCst),
                "false" => ENABLE_LOGGING.store(false, Ordering::SeqCst),
                _ => panic!("\nError: AUCTION_SIM_LOGGING environment variable must be 'true' or 'false'\n\nTo run the program, use one of:\n  AUCTION_SIM_LOGGING=true cargo run\n  AUCTION_SIM_LOGGING=false cargo run\n"),
            }
        }
        Err(_) => ENABLE_LOGGING.store(false, Ordering::SeqCst),
    }
}

pub fn log(prefix: &str, message: &str) {
    if ENABLE_LOGGING.load(Ordering::SeqCst) {
        println!("  [{}]   {}", prefix, message);
    }
}
