//! Flight offers: one priced itinerary for one date pairing.

/// One priced itinerary returned by a provider.
///
/// Timestamps are kept as the provider sent them (ISO-8601, local to the
/// airport). Only their calendar-date prefix is interpreted.
#[derive(Debug, Clone, PartialEq)]
pub struct FlightOffer {
    /// Total price, always positive.
    pub price: f64,

    /// Currency the price is quoted in.
    pub currency: String,

    /// Booking link, when the provider offers one.
    pub deeplink: Option<String>,

    /// Departure of the first outbound segment.
    pub outbound_departure: Option<String>,

    /// Arrival of the last outbound segment.
    pub outbound_arrival: Option<String>,

    /// Departure of the first inbound segment. `None` for one-way offers.
    pub inbound_departure: Option<String>,

    /// Arrival of the last inbound segment.
    pub inbound_arrival: Option<String>,

    /// Carrier labels in first-seen order, without duplicates.
    pub carriers: Vec<String>,
}

impl FlightOffer {
    /// Calendar date (`YYYY-MM-DD`) of the outbound departure.
    pub fn outbound_date(&self) -> Option<&str> {
        self.outbound_departure.as_deref().map(date_prefix)
    }

    /// Calendar date (`YYYY-MM-DD`) of the inbound departure.
    pub fn inbound_date(&self) -> Option<&str> {
        self.inbound_departure.as_deref().map(date_prefix)
    }
}

/// The first ten characters of a timestamp, or all of it when shorter.
fn date_prefix(timestamp: &str) -> &str {
    timestamp.get(..10).unwrap_or(timestamp)
}
