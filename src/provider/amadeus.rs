//! Amadeus Self-Service flight offers.
//!
//! Authenticates with the OAuth client-credentials grant, then issues one
//! `GET /v2/shopping/flight-offers` per date pairing. Access tokens are
//! cached on the provider and reused until shortly before they expire.

use std::collections::HashMap;
use std::env;
use std::time::Duration;

use jiff::{SignedDuration, Timestamp};
use reqwest::blocking::{Client, Response};
use serde::Deserialize;

use crate::model::FlightOffer;

use super::{OfferSource, ProviderError, Result, SearchQuery};

const DEFAULT_BASE_URL: &str = "https://test.api.amadeus.com";

/// Per-request timeout for both token and search calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Tokens are retired this long before their declared expiry.
const TOKEN_REFRESH_MARGIN: SignedDuration = SignedDuration::from_secs(30);

/// Result cap sent with every search.
const MAX_RESULTS: &str = "20";

/// API client credentials.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

impl Credentials {
    /// Reads `AMADEUS_CLIENT_ID` and `AMADEUS_CLIENT_SECRET`.
    ///
    /// Returns `None` unless both are set and non-empty.
    pub fn from_env() -> Option<Self> {
        let client_id = env::var("AMADEUS_CLIENT_ID").ok().filter(|v| !v.is_empty())?;
        let client_secret = env::var("AMADEUS_CLIENT_SECRET")
            .ok()
            .filter(|v| !v.is_empty())?;
        Some(Self {
            client_id,
            client_secret,
        })
    }
}

/// Whether a token expiring at `expires_at` may still be used at `now`.
pub fn token_is_fresh(now: Timestamp, expires_at: Timestamp) -> bool {
    expires_at
        .checked_sub(TOKEN_REFRESH_MARGIN)
        .is_ok_and(|cutoff| now < cutoff)
}

/// The most recently issued access token, if any.
#[derive(Debug, Default)]
struct TokenCache {
    token: Option<CachedToken>,
}

#[derive(Debug)]
struct CachedToken {
    value: String,
    expires_at: Timestamp,
}

impl TokenCache {
    fn get(&self, now: Timestamp) -> Option<&str> {
        self.token
            .as_ref()
            .filter(|t| token_is_fresh(now, t.expires_at))
            .map(|t| t.value.as_str())
    }

    /// Caches `value` until `expires_in_secs` after `issued_at`.
    ///
    /// The lifetime is truncated to whole seconds. Negative, non-finite or
    /// out-of-range lifetimes count as zero.
    fn store(&mut self, value: String, issued_at: Timestamp, expires_in_secs: f64) {
        let lifetime = SignedDuration::try_from_secs_f64(expires_in_secs.max(0.0).trunc())
            .unwrap_or(SignedDuration::ZERO);
        let expires_at = issued_at.checked_add(lifetime).unwrap_or(issued_at);
        self.token = Some(CachedToken { value, expires_at });
    }
}

/// Flight offer search backed by the Amadeus API.
pub struct AmadeusProvider {
    client: Client,
    base_url: String,
    credentials: Option<Credentials>,
    tokens: TokenCache,
}

impl AmadeusProvider {
    /// Creates a provider against `base_url`.
    ///
    /// Missing credentials are not an error until the first search.
    pub fn new(base_url: impl Into<String>, credentials: Option<Credentials>) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ProviderError::Search(format!("failed to create HTTP client: {e}")))?;
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self {
            client,
            base_url,
            credentials,
            tokens: TokenCache::default(),
        })
    }

    /// Creates a provider from `AMADEUS_API_BASE` and the credential variables.
    pub fn from_env() -> Result<Self> {
        let base_url =
            env::var("AMADEUS_API_BASE").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::new(base_url, Credentials::from_env())
    }

    /// Returns a usable access token, exchanging credentials if the cached one is stale.
    fn access_token(&mut self) -> Result<String> {
        let now = Timestamp::now();
        if let Some(token) = self.tokens.get(now) {
            return Ok(token.to_string());
        }

        let credentials = self.credentials.as_ref().ok_or_else(|| {
            ProviderError::Auth(
                "missing AMADEUS_CLIENT_ID or AMADEUS_CLIENT_SECRET environment variables".into(),
            )
        })?;

        let url = format!("{}/v1/security/oauth2/token", self.base_url);
        tracing::debug!(%url, "requesting access token");

        let response: TokenResponse = self
            .client
            .post(&url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", credentials.client_id.as_str()),
                ("client_secret", credentials.client_secret.as_str()),
            ])
            .send()
            .and_then(Response::error_for_status)
            .and_then(Response::json)
            .map_err(|e| ProviderError::Auth(format!("amadeus auth failed: {e}")))?;

        let value = response
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ProviderError::Auth("amadeus auth did not return an access token".into()))?;

        let expires_in = response
            .expires_in
            .as_ref()
            .and_then(Amount::value)
            .unwrap_or(0.0);
        self.tokens.store(value.clone(), now, expires_in);
        Ok(value)
    }
}

impl OfferSource for AmadeusProvider {
    fn name(&self) -> &'static str {
        "amadeus"
    }

    fn search_date(&mut self, query: &SearchQuery<'_>) -> Result<Vec<FlightOffer>> {
        let token = self.access_token()?;
        let url = format!("{}/v2/shopping/flight-offers", self.base_url);

        let mut params = vec![
            ("originLocationCode", query.origin.to_string()),
            ("destinationLocationCode", query.destination.to_string()),
            ("departureDate", query.departure.to_string()),
            ("adults", "1".to_string()),
            ("currencyCode", query.currency.to_string()),
            ("max", MAX_RESULTS.to_string()),
        ];
        if let Some(return_date) = query.return_date {
            params.push(("returnDate", return_date.to_string()));
        }

        tracing::debug!(
            origin = query.origin,
            destination = query.destination,
            departure = %query.departure,
            return_date = ?query.return_date,
            "searching flight offers"
        );

        let response: SearchResponse = self
            .client
            .get(&url)
            .bearer_auth(&token)
            .query(&params)
            .send()
            .and_then(Response::error_for_status)
            .and_then(Response::json)
            .map_err(|e| ProviderError::Search(format!("amadeus search failed: {e}")))?;

        Ok(parse_offers(response, query.currency))
    }
}

// ── Response shapes ──

/// JSON shape returned by the token endpoint.
#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<Amount>,
}

/// JSON shape returned by the flight-offers endpoint.
#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<RawOffer>,
    #[serde(default)]
    dictionaries: Dictionaries,
}

#[derive(Default, Deserialize)]
struct Dictionaries {
    /// Carrier code → carrier name.
    #[serde(default)]
    carriers: HashMap<String, String>,
}

#[derive(Deserialize)]
struct RawOffer {
    price: Option<RawPrice>,
    #[serde(default)]
    itineraries: Vec<Itinerary>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPrice {
    grand_total: Option<Amount>,
}

/// A number that may arrive as a JSON number or a decimal string.
#[derive(Deserialize)]
#[serde(untagged)]
enum Amount {
    Number(f64),
    Text(String),
}

impl Amount {
    fn value(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

#[derive(Deserialize)]
struct Itinerary {
    #[serde(default)]
    segments: Vec<Segment>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Segment {
    departure: Option<Endpoint>,
    arrival: Option<Endpoint>,
    carrier_code: Option<String>,
    operating: Option<Operating>,
}

#[derive(Deserialize)]
struct Endpoint {
    at: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Operating {
    carrier_code: Option<String>,
}

// ── Parsing ──

/// Departure of the first segment and arrival of the last.
#[derive(Default)]
struct LegTimes {
    departure: Option<String>,
    arrival: Option<String>,
}

/// Converts a search response into offers, cheapest first.
///
/// Offers without a positive total price are dropped.
fn parse_offers(response: SearchResponse, currency: &str) -> Vec<FlightOffer> {
    let SearchResponse { data, dictionaries } = response;

    let mut offers: Vec<FlightOffer> = data
        .into_iter()
        .filter_map(|raw| {
            let price = raw
                .price
                .as_ref()?
                .grand_total
                .as_ref()?
                .value()
                .filter(|p| p.is_finite() && *p > 0.0)?;

            let mut carriers = Vec::new();
            let outbound = raw
                .itineraries
                .first()
                .map(|it| read_leg(it, &dictionaries.carriers, &mut carriers))
                .unwrap_or_default();
            let inbound = raw
                .itineraries
                .get(1)
                .map(|it| read_leg(it, &dictionaries.carriers, &mut carriers))
                .unwrap_or_default();

            Some(FlightOffer {
                price,
                currency: currency.to_string(),
                deeplink: None,
                outbound_departure: outbound.departure,
                outbound_arrival: outbound.arrival,
                inbound_departure: inbound.departure,
                inbound_arrival: inbound.arrival,
                carriers,
            })
        })
        .collect();

    offers.sort_by(|a, b| a.price.total_cmp(&b.price));
    offers
}

/// Reads one itinerary's times and adds its carriers to `carriers`.
///
/// Each segment contributes its marketing carrier, then its operating
/// carrier. Codes resolve through `names`; unknown codes are kept as-is.
fn read_leg(
    itinerary: &Itinerary,
    names: &HashMap<String, String>,
    carriers: &mut Vec<String>,
) -> LegTimes {
    let (Some(first), Some(last)) = (itinerary.segments.first(), itinerary.segments.last()) else {
        return LegTimes::default();
    };

    for segment in &itinerary.segments {
        let operating = segment
            .operating
            .as_ref()
            .and_then(|o| o.carrier_code.as_deref());
        for code in [segment.carrier_code.as_deref(), operating]
            .into_iter()
            .flatten()
            .filter(|c| !c.is_empty())
        {
            let label = names
                .get(code)
                .map(String::as_str)
                .filter(|n| !n.is_empty())
                .unwrap_or(code);
            if !carriers.iter().any(|c| c == label) {
                carriers.push(label.to_string());
            }
        }
    }

    LegTimes {
        departure: first.departure.as_ref().and_then(|e| e.at.clone()),
        arrival: last.arrival.as_ref().and_then(|e| e.at.clone()),
    }
}
