//! Offer providers: remote flight searches, one date pairing at a time.
//!
//! A provider knows how to authenticate against its API and turn one
//! search response into flight offers. Sweeping across dates and
//! picking the best offers happens in `search`, independent of the provider.

mod amadeus;

use jiff::civil::Date;

pub use amadeus::AmadeusProvider;

use crate::model::FlightOffer;

/// Errors that abort the search for a route.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("invalid date range: {0}")]
    InvalidDateRange(String),

    #[error("invalid trip configuration: {0}")]
    InvalidTripConfiguration(String),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("search failed: {0}")]
    Search(String),

    #[error("no flights returned by {0}")]
    NoOffersFound(&'static str),

    #[error("unknown provider: {0}")]
    UnknownProvider(String),
}

pub type Result<T> = core::result::Result<T, ProviderError>;

/// One remote lookup: a route on a single departure date, with an
/// optional return date.
#[derive(Debug, Clone, Copy)]
pub struct SearchQuery<'a> {
    pub origin: &'a str,
    pub destination: &'a str,
    pub currency: &'a str,
    pub departure: Date,
    pub return_date: Option<Date>,
}

/// A remote source of flight offers.
pub trait OfferSource {
    /// Provider name recorded in history (e.g. `amadeus`).
    fn name(&self) -> &'static str;

    /// Performs exactly one remote lookup.
    ///
    /// Returns offers sorted by ascending price. Offers without a positive
    /// price are never returned. Failures are not retried.
    fn search_date(&mut self, query: &SearchQuery<'_>) -> Result<Vec<FlightOffer>>;
}

/// Builds the provider configured under `name` (case-insensitive).
pub fn from_name(name: &str) -> Result<Box<dyn OfferSource>> {
    match name.to_ascii_lowercase().as_str() {
        "amadeus" => Ok(Box::new(AmadeusProvider::from_env()?)),
        _ => Err(ProviderError::UnknownProvider(name.to_string())),
    }
}
