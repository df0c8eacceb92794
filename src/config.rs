//! flightdrop configuration.
//!
//! The config file lists the routes to check. It is looked up in order:
//! `--config`, `$FLIGHTDROP_CONFIG`, `./config.json`, then
//! `~/.flightdrop/config.toml`. Files ending in `.json` are read as JSON,
//! anything else as TOML.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use jiff::civil::Date;
use serde::Deserialize;

use crate::model::{DepartureWindow, ReturnWindow, RouteSearchRequest, Trip, TripType};
use crate::provider::ProviderError;
use crate::search::dates::DEFAULT_MAX_SPAN_DAYS;
use crate::storage::Storage;

/// Errors that prevent any route from running.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not determine home directory")]
    NoHome,

    #[error("no config file found at {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config at {}: {message}", path.display())]
    Invalid { path: PathBuf, message: String },
}

pub type Result<T> = core::result::Result<T, ConfigError>;

/// flightdrop configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Offer provider to search with.
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Ceiling on the number of dates expanded from any one window.
    /// Defaults to `$AMADEUS_SEARCH_SPAN_DAYS`, then 30.
    #[serde(default = "default_max_span_days")]
    pub max_span_days: usize,

    /// Where price history is kept. Defaults to `./data/price_history.json`.
    #[serde(default)]
    pub history_path: Option<PathBuf>,

    #[serde(default)]
    pub routes: Vec<RouteConfig>,
}

/// One route as written in the config file.
///
/// Dates stay as strings until `to_request`, so a bad date fails only
/// its own route.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteConfig {
    pub origin: String,
    pub destination: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_days_ahead")]
    pub days_ahead: u32,
    #[serde(default = "default_trip_type")]
    pub trip_type: String,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub return_days: Option<i64>,
    pub return_date_from: Option<String>,
    pub return_date_to: Option<String>,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

fn default_provider() -> String {
    "amadeus".to_string()
}

/// Falls back to `$AMADEUS_SEARCH_SPAN_DAYS` when the key is absent.
fn default_max_span_days() -> usize {
    span_days_from_env(env::var("AMADEUS_SEARCH_SPAN_DAYS").ok().as_deref())
}

fn span_days_from_env(value: Option<&str>) -> usize {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return DEFAULT_MAX_SPAN_DAYS;
    };
    match value.parse() {
        Ok(days) => days,
        Err(e) => {
            tracing::warn!(value, "ignoring AMADEUS_SEARCH_SPAN_DAYS: {e}");
            DEFAULT_MAX_SPAN_DAYS
        }
    }
}

fn default_currency() -> String {
    "CAD".to_string()
}

fn default_days_ahead() -> u32 {
    120
}

fn default_trip_type() -> String {
    TripType::OneWay.as_str().to_string()
}

fn default_top_n() -> usize {
    5
}

impl Config {
    /// Load config from `explicit`, or from the first default location.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = Self::path(explicit)?;
        Self::load_from(&path)
    }

    /// Load config from a specific file.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let is_json = path.extension().is_some_and(|ext| ext == "json");
        Self::parse(&contents, is_json).map_err(|message| ConfigError::Invalid {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Resolves the config file path.
    pub fn path(explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = explicit {
            return Ok(path.to_path_buf());
        }
        if let Some(path) = env::var_os("FLIGHTDROP_CONFIG").filter(|p| !p.is_empty()) {
            return Ok(PathBuf::from(path));
        }
        let local = PathBuf::from("config.json");
        if local.exists() {
            return Ok(local);
        }
        dirs::home_dir()
            .map(|h| h.join(".flightdrop").join("config.toml"))
            .ok_or(ConfigError::NoHome)
    }

    /// Parses and normalizes config text.
    fn parse(contents: &str, is_json: bool) -> core::result::Result<Self, String> {
        let mut config: Self = if is_json {
            serde_json::from_str(contents).map_err(|e| e.to_string())?
        } else {
            toml::from_str(contents).map_err(|e| e.to_string())?
        };

        for route in &mut config.routes {
            route.origin = route.origin.to_uppercase();
            route.destination = route.destination.to_uppercase();
            route.currency = route.currency.to_uppercase();
            if route.top_n == 0 {
                return Err(format!("top_n must be at least 1 for {}", route.label()));
            }
        }
        if config.max_span_days == 0 {
            return Err("max_span_days must be at least 1".to_string());
        }

        Ok(config)
    }

    /// The history file path.
    pub fn history_path(&self) -> PathBuf {
        self.history_path.clone().unwrap_or_else(Storage::default_path)
    }
}

impl RouteConfig {
    /// Short route label, e.g. `YYZ->LIS`.
    pub fn label(&self) -> String {
        format!("{}->{}", self.origin, self.destination)
    }

    /// Resolves this route into a search request.
    ///
    /// A date range counts only when both of its ends are given. Round
    /// trips need either `return_days` or a full return range; the range
    /// wins when both are present.
    pub fn to_request(&self) -> core::result::Result<RouteSearchRequest, ProviderError> {
        let trip_type = TripType::parse(&self.trip_type).ok_or_else(|| {
            ProviderError::InvalidTripConfiguration(format!(
                "unsupported trip_type: {}",
                self.trip_type
            ))
        })?;

        let departure = match self.range(
            ("date_from", self.date_from.as_deref()),
            ("date_to", self.date_to.as_deref()),
        )? {
            Some((from, to)) => DepartureWindow::Between { from, to },
            None => DepartureWindow::DaysAhead(self.days_ahead),
        };

        // Checked for one-way routes too, though only round trips use it.
        let return_range = self.range(
            ("return_date_from", self.return_date_from.as_deref()),
            ("return_date_to", self.return_date_to.as_deref()),
        )?;

        let trip = match (trip_type, return_range, self.return_days) {
            (TripType::OneWay, ..) => Trip::OneWay,
            (TripType::RoundTrip, Some((from, to)), _) => {
                Trip::RoundTrip(ReturnWindow::Between { from, to })
            }
            (TripType::RoundTrip, None, Some(days)) => Trip::RoundTrip(ReturnWindow::AfterDays(days)),
            (TripType::RoundTrip, None, None) => {
                return Err(ProviderError::InvalidTripConfiguration(
                    "return_days or return_date_from/return_date_to is required for round_trip searches"
                        .to_string(),
                ));
            }
        };

        Ok(RouteSearchRequest {
            origin: self.origin.clone(),
            destination: self.destination.clone(),
            currency: self.currency.clone(),
            departure,
            trip,
            top_n: self.top_n,
        })
    }

    /// Parses a `(start, end)` pair of optional date fields.
    ///
    /// Fails if either date is malformed or the end precedes the start.
    fn range(
        &self,
        (start_key, start): (&str, Option<&str>),
        (end_key, end): (&str, Option<&str>),
    ) -> core::result::Result<Option<(Date, Date)>, ProviderError> {
        match (start, end) {
            (Some(start), Some(end)) => {
                let from = parse_date(start_key, start)?;
                let to = parse_date(end_key, end)?;
                if to < from {
                    return Err(ProviderError::InvalidDateRange(format!(
                        "{end_key} {to} is before {start_key} {from}"
                    )));
                }
                Ok(Some((from, to)))
            }
            (None, None) => Ok(None),
            _ => {
                tracing::warn!(
                    route = %self.label(),
                    "{start_key} and {end_key} must be set together; ignoring"
                );
                Ok(None)
            }
        }
    }
}

fn parse_date(key: &str, value: &str) -> core::result::Result<Date, ProviderError> {
    value
        .trim()
        .parse()
        .map_err(|e| ProviderError::InvalidDateRange(format!("invalid {key} '{value}': {e}")))
}
