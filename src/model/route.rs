//! Route search requests: what to search for and across which dates.

use std::fmt;

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

/// Whether a route is searched one way or as a round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TripType {
    OneWay,
    RoundTrip,
}

impl TripType {
    /// Parses the configuration spelling (`one_way` or `round_trip`).
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "one_way" => Some(Self::OneWay),
            "round_trip" => Some(Self::RoundTrip),
            _ => None,
        }
    }

    /// The configuration spelling, also used in history keys.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OneWay => "one_way",
            Self::RoundTrip => "round_trip",
        }
    }
}

impl fmt::Display for TripType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which departure dates to search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepartureWindow {
    /// Every day starting tomorrow, for this many days.
    DaysAhead(u32),

    /// Every day from `from` through `to`, inclusive.
    Between { from: Date, to: Date },
}

/// Which return dates to pair with each departure date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnWindow {
    /// Exactly one return date, this many days after departure.
    AfterDays(i64),

    /// Every day from `from` through `to` that is not before the departure.
    Between { from: Date, to: Date },
}

/// The shape of the trip being searched.
///
/// A round trip always carries its return window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trip {
    OneWay,
    RoundTrip(ReturnWindow),
}

impl Trip {
    pub fn trip_type(&self) -> TripType {
        match self {
            Self::OneWay => TripType::OneWay,
            Self::RoundTrip(_) => TripType::RoundTrip,
        }
    }
}

/// A fully resolved search for one configured route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteSearchRequest {
    /// Origin airport or city code, upper case.
    pub origin: String,

    /// Destination airport or city code, upper case.
    pub destination: String,

    /// Currency to quote prices in, upper case.
    pub currency: String,

    pub departure: DepartureWindow,

    pub trip: Trip,

    /// Maximum offers kept per outbound date.
    pub top_n: usize,
}

impl RouteSearchRequest {
    /// Short route label, e.g. `YYZ->LIS`.
    pub fn label(&self) -> String {
        format!("{}->{}", self.origin, self.destination)
    }

    /// Key under which this route's history is recorded.
    ///
    /// Routes that differ only in dates share a history.
    pub fn history_key(&self) -> String {
        format!(
            "{}-{}-{}-{}",
            self.origin,
            self.destination,
            self.trip.trip_type(),
            self.currency
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::civil::date;

    #[test]
    fn trip_type_parses_config_spelling() {
        assert_eq!(TripType::parse("one_way"), Some(TripType::OneWay));
        assert_eq!(TripType::parse("round_trip"), Some(TripType::RoundTrip));
        assert_eq!(TripType::parse("multi_city"), None);
        assert_eq!(TripType::parse("ONE_WAY"), None);
    }

    #[test]
    fn history_key_includes_trip_type_and_currency() {
        let request = RouteSearchRequest {
            origin: "YYZ".into(),
            destination: "LIS".into(),
            currency: "CAD".into(),
            departure: DepartureWindow::Between {
                from: date(2024, 6, 1),
                to: date(2024, 6, 2),
            },
            trip: Trip::RoundTrip(ReturnWindow::AfterDays(7)),
            top_n: 5,
        };
        assert_eq!(request.label(), "YYZ->LIS");
        assert_eq!(request.history_key(), "YYZ-LIS-round_trip-CAD");
    }
}
