mod cli;
mod config;
mod model;
mod provider;
mod search;
mod storage;

use std::io;
use std::process;

use tracing_subscriber::EnvFilter;

fn main() {
    // Credentials may come from a local .env file.
    dotenv::dotenv().ok();
    init_logging();

    if let Err(e) = cli::run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

/// Logs go to stderr, filtered by `FLIGHTDROP_LOG` (default `warn`).
fn init_logging() {
    let filter = EnvFilter::try_from_env("FLIGHTDROP_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}
