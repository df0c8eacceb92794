//! Output formatting for CLI display.

use jiff::civil::Date;

use crate::model::{FlightOffer, HistoryEntry, TripType};

/// Price movement against the previous check.
#[allow(clippy::float_cmp)] // Recorded prices are compared exactly.
pub(super) fn format_delta(current: f64, previous: Option<f64>) -> String {
    let Some(previous) = previous else {
        return "baseline".to_string();
    };
    let delta = current - previous;
    if delta == 0.0 {
        return "no change".to_string();
    }
    let direction = if delta > 0.0 { "up" } else { "down" };
    format!("{direction} {:.2}", delta.abs())
}

/// One selected offer: price, each complete leg, then carriers.
pub(super) fn format_offer(offer: &FlightOffer) -> String {
    let mut parts = vec![format!("{:.2} {}", offer.price, offer.currency)];
    if let Some(leg) = format_leg(
        offer.outbound_departure.as_deref(),
        offer.outbound_arrival.as_deref(),
    ) {
        parts.push(leg);
    }
    if let Some(leg) = format_leg(
        offer.inbound_departure.as_deref(),
        offer.inbound_arrival.as_deref(),
    ) {
        parts.push(leg);
    }
    let carriers = if offer.carriers.is_empty() {
        "n/a".to_string()
    } else {
        offer.carriers.join(", ")
    };
    parts.push(format!("carriers: {carriers}"));
    parts.join(" | ")
}

fn format_leg(departure: Option<&str>, arrival: Option<&str>) -> Option<String> {
    Some(format!("{} -> {}", departure?, arrival?))
}

pub(super) fn trip_label(trip_type: TripType) -> &'static str {
    match trip_type {
        TripType::OneWay => "one way",
        TripType::RoundTrip => "round trip",
    }
}

/// `2024-06-01` as `Jun 1`. Anything that isn't a date is shown as given.
fn short_date(value: &str) -> String {
    value.parse::<Date>().map_or_else(
        |_| value.to_string(),
        |d| d.strftime("%b %-d").to_string(),
    )
}

/// The per-route summary line printed after a successful check.
pub(super) fn format_summary(
    label: &str,
    entry: &HistoryEntry,
    previous: Option<&HistoryEntry>,
    trip_type: TripType,
    best: &FlightOffer,
) -> String {
    let delta = format_delta(entry.price, previous.map(|p| p.price));
    let dates = match (best.outbound_date(), best.inbound_date()) {
        (Some(out), Some(back)) => format!(" {} - {}", short_date(out), short_date(back)),
        (Some(out), None) => format!(" {}", short_date(out)),
        (None, _) => String::new(),
    };
    format!(
        "{label}: cheapest {:.2} {} ({delta}) [{}]{dates}",
        entry.price,
        entry.currency,
        trip_label(trip_type)
    )
}

/// One stored history entry for `flightdrop history`.
pub(super) fn format_entry(entry: &HistoryEntry) -> String {
    let mut line = format!(
        "  {}  {:.2} {}  via {}",
        entry.checked_at.strftime("%Y-%m-%d %H:%M"),
        entry.price,
        entry.currency,
        entry.provider
    );
    if let Some(link) = &entry.deeplink {
        line.push_str("  ");
        line.push_str(link);
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::Timestamp;

    fn offer() -> FlightOffer {
        FlightOffer {
            price: 512.3,
            currency: "CAD".into(),
            deeplink: None,
            outbound_departure: Some("2024-06-01T09:00:00".into()),
            outbound_arrival: Some("2024-06-01T21:30:00".into()),
            inbound_departure: Some("2024-06-08T11:00:00".into()),
            inbound_arrival: Some("2024-06-08T14:10:00".into()),
            carriers: vec!["TAP PORTUGAL".into(), "AIR CANADA".into()],
        }
    }

    fn entry(price: f64) -> HistoryEntry {
        HistoryEntry {
            checked_at: Timestamp::new(1_717_200_000, 0).unwrap(),
            currency: "CAD".into(),
            deeplink: None,
            price,
            provider: "amadeus".into(),
        }
    }

    #[test]
    fn delta_wording() {
        assert_eq!(format_delta(500.0, None), "baseline");
        assert_eq!(format_delta(500.0, Some(500.0)), "no change");
        assert_eq!(format_delta(512.3, Some(500.0)), "up 12.30");
        assert_eq!(format_delta(480.0, Some(500.5)), "down 20.50");
    }

    #[test]
    fn offer_line_shows_both_legs() {
        assert_eq!(
            format_offer(&offer()),
            "512.30 CAD | 2024-06-01T09:00:00 -> 2024-06-01T21:30:00 \
             | 2024-06-08T11:00:00 -> 2024-06-08T14:10:00 | carriers: TAP PORTUGAL, AIR CANADA"
        );
    }

    #[test]
    fn offer_line_omits_incomplete_legs() {
        let mut one_way = offer();
        one_way.inbound_departure = None;
        one_way.inbound_arrival = None;
        one_way.outbound_arrival = None;
        one_way.carriers.clear();

        assert_eq!(format_offer(&one_way), "512.30 CAD | carriers: n/a");
    }

    #[test]
    fn short_dates() {
        assert_eq!(short_date("2024-06-01"), "Jun 1");
        assert_eq!(short_date("2024-12-25"), "Dec 25");
        assert_eq!(short_date("not-a-date"), "not-a-date");
    }

    #[test]
    fn summary_for_round_trip() {
        let line = format_summary(
            "YYZ->LIS",
            &entry(512.3),
            Some(&entry(530.0)),
            TripType::RoundTrip,
            &offer(),
        );
        assert_eq!(
            line,
            "YYZ->LIS: cheapest 512.30 CAD (down 17.70) [round trip] Jun 1 - Jun 8"
        );
    }

    #[test]
    fn summary_for_one_way_baseline() {
        let mut best = offer();
        best.inbound_departure = None;

        let line = format_summary("YYZ->LIS", &entry(512.3), None, TripType::OneWay, &best);
        assert_eq!(line, "YYZ->LIS: cheapest 512.30 CAD (baseline) [one way] Jun 1");
    }

    #[test]
    fn history_entry_line() {
        let mut e = entry(433.21);
        e.deeplink = Some("https://example.test/deal".into());
        assert_eq!(
            format_entry(&e),
            "  2024-06-01 00:00  433.21 CAD  via amadeus  https://example.test/deal"
        );
    }
}
