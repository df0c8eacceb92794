//! History entries: the cheapest fare seen on one check of one route.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// The cheapest offer found for a route at a point in time.
///
/// Fields are declared in alphabetical order, matching the history file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// When the check ran.
    pub checked_at: Timestamp,

    /// Currency of `price`.
    pub currency: String,

    /// Booking link for the cheapest offer, if any.
    #[serde(default)]
    pub deeplink: Option<String>,

    /// Cheapest price found.
    pub price: f64,

    /// Provider that returned the offer (e.g. `amadeus`).
    pub provider: String,
}
