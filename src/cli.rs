//! CLI interface for flightdrop.
//!
//! `flightdrop check` (the default) sweeps every configured route, prints
//! the best offers, and records the cheapest price in the history file.
//! `flightdrop history` prints what has been recorded so far.

mod format;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use jiff::{Timestamp, civil::Date};

use crate::config::{Config, RouteConfig};
use crate::model::HistoryEntry;
use crate::provider::{self, OfferSource};
use crate::search;
use crate::storage::Storage;

use format::{format_entry, format_offer, format_summary};

/// flightdrop: watch flight prices across a window of travel dates.
#[derive(Debug, Parser)]
#[command(name = "flightdrop")]
pub struct Cli {
    /// Config file. Defaults to `$FLIGHTDROP_CONFIG`, `./config.json`,
    /// then `~/.flightdrop/config.toml`.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Search every route and record the cheapest price.
    Check,

    /// Show recorded prices for every route.
    History,
}

pub fn run() -> Result<(), String> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref()).map_err(|e| e.to_string())?;
    let storage = Storage::new(config.history_path());

    match cli.command.unwrap_or(Command::Check) {
        Command::Check => cmd_check(&config, &storage),
        Command::History => cmd_history(&config, &storage),
    }
}

fn cmd_check(config: &Config, storage: &Storage) -> Result<(), String> {
    let mut source = provider::from_name(&config.provider).map_err(|e| e.to_string())?;
    let tomorrow = search::tomorrow().map_err(|e| e.to_string())?;

    let mut failed = 0;
    for route in &config.routes {
        tracing::info!(route = %route.label(), "checking route");
        match check_route(source.as_mut(), config, storage, route, tomorrow) {
            Ok(()) => tracing::info!(route = %route.label(), "route done"),
            Err(e) => {
                println!("{}: error: {e}", route.label());
                failed += 1;
            }
        }
    }

    if failed > 0 {
        return Err(format!(
            "{failed} of {} routes failed",
            config.routes.len()
        ));
    }
    Ok(())
}

/// Sweeps one route, records its cheapest offer, and prints the result.
fn check_route(
    source: &mut dyn OfferSource,
    config: &Config,
    storage: &Storage,
    route: &RouteConfig,
    tomorrow: Date,
) -> Result<(), String> {
    let request = route.to_request().map_err(|e| e.to_string())?;
    let key = request.history_key();
    let previous = storage.last_entry(&key).map_err(|e| e.to_string())?;

    let offers = search::search_top(source, &request, tomorrow, config.max_span_days, |p| {
        println!("{p}");
    })
    .map_err(|e| e.to_string())?;

    let best = search::cheapest(&offers).ok_or("no offers selected")?;
    let entry = HistoryEntry {
        checked_at: Timestamp::now(),
        currency: request.currency.clone(),
        deeplink: best.deeplink.clone(),
        price: best.price,
        provider: source.name().to_string(),
    };
    storage.append(&key, &entry).map_err(|e| e.to_string())?;

    println!(
        "{}",
        format_summary(
            &request.label(),
            &entry,
            previous.as_ref(),
            request.trip.trip_type(),
            best
        )
    );
    for offer in &offers {
        println!("{}", format_offer(offer));
    }
    Ok(())
}

fn cmd_history(config: &Config, storage: &Storage) -> Result<(), String> {
    if config.routes.is_empty() {
        println!("No routes configured.");
        return Ok(());
    }

    for route in &config.routes {
        let request = match route.to_request() {
            Ok(r) => r,
            Err(e) => {
                println!("{}: error: {e}", route.label());
                continue;
            }
        };
        let entries = storage
            .entries(&request.history_key())
            .map_err(|e| e.to_string())?;

        println!(
            "{} [{}]",
            request.label(),
            format::trip_label(request.trip.trip_type())
        );
        if entries.is_empty() {
            println!("  no checks recorded");
        }
        for entry in &entries {
            println!("{}", format_entry(entry));
        }
    }
    Ok(())
}
