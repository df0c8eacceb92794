//! Offer selection: collapse duplicates and keep a short, varied list
//! of the cheapest offers for each departure day.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

use crate::model::FlightOffer;

/// Identity of an offer for deduplication: everything but currency and deeplink.
///
/// The price takes part by its exact bit pattern.
#[derive(PartialEq, Eq, Hash)]
struct OfferKey {
    price_bits: u64,
    outbound_departure: Option<String>,
    outbound_arrival: Option<String>,
    inbound_departure: Option<String>,
    inbound_arrival: Option<String>,
    carriers: Vec<String>,
}

impl OfferKey {
    fn of(offer: &FlightOffer) -> Self {
        Self {
            price_bits: offer.price.to_bits(),
            outbound_departure: offer.outbound_departure.clone(),
            outbound_arrival: offer.outbound_arrival.clone(),
            inbound_departure: offer.inbound_departure.clone(),
            inbound_arrival: offer.inbound_arrival.clone(),
            carriers: offer.carriers.clone(),
        }
    }
}

/// Offers grouped by outbound calendar date.
///
/// Dated buckets sort by date string. `Unknown` always sorts last.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Bucket {
    Date(String),
    Unknown,
}

impl Bucket {
    fn of(offer: &FlightOffer) -> Self {
        offer
            .outbound_date()
            .map_or(Self::Unknown, |d| Self::Date(d.to_string()))
    }
}

impl Ord for Bucket {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Date(a), Self::Date(b)) => a.cmp(b),
            (Self::Date(_), Self::Unknown) => Ordering::Less,
            (Self::Unknown, Self::Date(_)) => Ordering::Greater,
            (Self::Unknown, Self::Unknown) => Ordering::Equal,
        }
    }
}

impl PartialOrd for Bucket {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Return date (or one-way) and price: at most one offer per signature
/// is selected within a bucket.
#[derive(PartialEq, Eq, Hash)]
struct ReturnSignature {
    return_date: Option<String>,
    price_bits: u64,
}

impl ReturnSignature {
    fn of(offer: &FlightOffer) -> Self {
        Self {
            return_date: offer.inbound_date().map(String::from),
            price_bits: offer.price.to_bits(),
        }
    }
}

/// Removes exact duplicates, keeping the first occurrence of each.
pub fn dedupe(offers: Vec<FlightOffer>) -> Vec<FlightOffer> {
    let mut seen = HashSet::new();
    offers
        .into_iter()
        .filter(|offer| seen.insert(OfferKey::of(offer)))
        .collect()
}

/// Selects up to `top_n` of the cheapest offers per outbound date.
///
/// Duplicates are removed first. Buckets come out in date order with
/// undated offers last. Offers within a bucket come out cheapest first,
/// skipping any that repeat an already selected return date and price.
pub fn select_top(offers: Vec<FlightOffer>, top_n: usize) -> Vec<FlightOffer> {
    let mut buckets: BTreeMap<Bucket, Vec<FlightOffer>> = BTreeMap::new();
    for offer in dedupe(offers) {
        buckets.entry(Bucket::of(&offer)).or_default().push(offer);
    }

    let mut selected = Vec::new();
    for mut bucket in buckets.into_values() {
        bucket.sort_by(|a, b| a.price.total_cmp(&b.price));

        let mut signatures = HashSet::new();
        let mut taken = 0;
        for offer in bucket {
            if taken == top_n {
                break;
            }
            if signatures.insert(ReturnSignature::of(&offer)) {
                selected.push(offer);
                taken += 1;
            }
        }
    }
    selected
}

/// The cheapest offer, preferring the earliest on ties.
pub fn cheapest(offers: &[FlightOffer]) -> Option<&FlightOffer> {
    offers.iter().min_by(|a, b| a.price.total_cmp(&b.price))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offer(price: f64, outbound: Option<&str>, inbound: Option<&str>) -> FlightOffer {
        FlightOffer {
            price,
            currency: "CAD".into(),
            deeplink: None,
            outbound_departure: outbound.map(String::from),
            outbound_arrival: outbound.map(|d| format!("{}T23:00:00", &d[..10])),
            inbound_departure: inbound.map(String::from),
            inbound_arrival: None,
            carriers: vec!["AIR CANADA".into()],
        }
    }

    fn prices(offers: &[FlightOffer]) -> Vec<f64> {
        offers.iter().map(|o| o.price).collect()
    }

    #[test]
    fn duplicates_collapse_and_days_are_capped() {
        let offers = vec![
            offer(200.0, Some("2024-05-01T08:00:00"), None),
            offer(150.0, Some("2024-05-01T10:00:00"), None),
            offer(150.0, Some("2024-05-01T10:00:00"), None),
            offer(300.0, Some("2024-05-02T09:00:00"), None),
        ];

        let selected = select_top(offers, 2);
        assert_eq!(prices(&selected), [150.0, 200.0, 300.0]);
    }

    #[test]
    fn dedupe_keeps_first_occurrence_and_order() {
        let mut later = offer(150.0, Some("2024-05-01T10:00:00"), None);
        later.deeplink = Some("https://example.test/b".into());
        let mut first = later.clone();
        first.deeplink = Some("https://example.test/a".into());

        let deduped = dedupe(vec![
            offer(300.0, Some("2024-05-02T09:00:00"), None),
            first,
            later,
        ]);

        assert_eq!(prices(&deduped), [300.0, 150.0]);
        assert_eq!(
            deduped[1].deeplink.as_deref(),
            Some("https://example.test/a")
        );
    }

    #[test]
    fn dedupe_is_idempotent() {
        let offers = vec![
            offer(100.0, Some("2024-05-01T08:00:00"), Some("2024-05-08T08:00:00")),
            offer(100.0, Some("2024-05-01T08:00:00"), Some("2024-05-08T08:00:00")),
            offer(100.0, Some("2024-05-01T08:00:00"), Some("2024-05-09T08:00:00")),
            offer(90.0, None, None),
            offer(90.0, None, None),
        ];

        let once = dedupe(offers);
        let twice = dedupe(once.clone());
        assert_eq!(once.len(), 3);
        assert_eq!(once, twice);
    }

    #[test]
    fn offers_differing_only_in_carriers_are_distinct() {
        let a = offer(100.0, Some("2024-05-01T08:00:00"), None);
        let mut b = a.clone();
        b.carriers = vec!["WESTJET".into()];

        assert_eq!(dedupe(vec![a, b]).len(), 2);
    }

    #[test]
    fn unknown_bucket_comes_last() {
        let offers = vec![
            offer(50.0, None, None),
            offer(400.0, Some("2024-07-01T08:00:00"), None),
            offer(300.0, Some("2024-06-15T08:00:00"), None),
        ];

        let selected = select_top(offers, 5);
        assert_eq!(prices(&selected), [300.0, 400.0, 50.0]);
        assert_eq!(selected[2].outbound_departure, None);
    }

    #[test]
    fn bucket_order_is_explicit() {
        let unknown = Bucket::Unknown;
        // "unknown" would sort before "zzzz" lexically; the bucket must not.
        let late = Bucket::Date("zzzz".into());
        assert!(late < unknown);
        assert!(Bucket::Date("2024-01-01".into()) < Bucket::Date("2024-01-02".into()));
    }

    #[test]
    fn same_return_date_and_price_is_selected_once() {
        let mut cheap_a = offer(
            120.0,
            Some("2024-06-01T08:00:00"),
            Some("2024-06-08T09:00:00"),
        );
        cheap_a.carriers = vec!["AIR CANADA".into()];
        let mut cheap_b = cheap_a.clone();
        cheap_b.inbound_departure = Some("2024-06-08T19:00:00".into());
        cheap_b.carriers = vec!["WESTJET".into()];
        let other_return = offer(
            120.0,
            Some("2024-06-01T08:00:00"),
            Some("2024-06-09T09:00:00"),
        );
        let pricier = offer(
            130.0,
            Some("2024-06-01T08:00:00"),
            Some("2024-06-08T09:00:00"),
        );

        let selected = select_top(vec![cheap_a, cheap_b, other_return, pricier], 5);

        assert_eq!(selected.len(), 3);
        assert_eq!(selected[0].carriers, ["AIR CANADA"]);
        assert_eq!(selected[1].inbound_date(), Some("2024-06-09"));
        assert_eq!(selected[2].price, 130.0);
    }

    #[test]
    fn one_way_offers_with_equal_price_share_a_signature() {
        let a = offer(99.0, Some("2024-06-01T08:00:00"), None);
        let mut b = offer(99.0, Some("2024-06-01T15:00:00"), None);
        b.carriers = vec!["PORTER".into()];

        let selected = select_top(vec![a, b], 5);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].outbound_departure.as_deref(), Some("2024-06-01T08:00:00"));
    }

    #[test]
    fn buckets_respect_cap_and_ordering() {
        let mut offers = Vec::new();
        for day in ["2024-06-03", "2024-06-01", "2024-06-02"] {
            for (i, price) in [500.0, 120.0, 310.0, 95.0, 240.0, 180.0].into_iter().enumerate() {
                let departure = format!("{day}T{:02}:00:00", i + 6);
                offers.push(offer(price, Some(&departure), None));
            }
        }
        offers.push(offer(10.0, None, None));

        let top_n = 3;
        let selected = select_top(offers, top_n);

        let mut days: Vec<Option<&str>> = selected.iter().map(FlightOffer::outbound_date).collect();
        days.dedup();
        assert_eq!(
            days,
            [
                Some("2024-06-01"),
                Some("2024-06-02"),
                Some("2024-06-03"),
                None
            ]
        );

        for day in ["2024-06-01", "2024-06-02", "2024-06-03"] {
            let bucket: Vec<f64> = selected
                .iter()
                .filter(|o| o.outbound_date() == Some(day))
                .map(|o| o.price)
                .collect();
            assert_eq!(bucket.len(), top_n);
            assert!(bucket.windows(2).all(|w| w[0] <= w[1]));
            assert_eq!(bucket, [95.0, 120.0, 180.0]);
        }
    }

    #[test]
    fn cheapest_prefers_first_on_ties() {
        let mut a = offer(80.0, Some("2024-06-02T08:00:00"), None);
        a.deeplink = Some("first".into());
        let mut b = offer(80.0, Some("2024-06-01T08:00:00"), None);
        b.deeplink = Some("second".into());
        let offers = vec![offer(100.0, None, None), a, b];

        let best = cheapest(&offers).unwrap();
        assert_eq!(best.deeplink.as_deref(), Some("first"));
        assert_eq!(cheapest(&[]), None);
    }
}
