//! Date sweeps: search a route across every candidate date pairing and
//! reduce the results to a short list per departure day.
//!
//! A sweep runs in two steps:
//!
//! 1. `plan_sweep` expands the route's date windows into an ordered list of
//!    (departure, return) pairings. It is pure and makes no remote calls.
//! 2. `search_top` calls the provider once per pairing, in plan order,
//!    reporting progress before each call, then hands every offer to
//!    `select::select_top`.
//!
//! Any provider error aborts the sweep. Nothing is retried.

pub mod dates;
pub mod select;

use std::fmt;

use jiff::{ToSpan, Zoned, civil::Date};

pub use select::{cheapest, select_top};

use crate::model::{DepartureWindow, FlightOffer, ReturnWindow, RouteSearchRequest, Trip};
use crate::provider::{OfferSource, ProviderError, Result, SearchQuery};

/// One remote lookup's dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatePair {
    pub departure: Date,
    pub return_date: Option<Date>,
}

/// Progress through a sweep, reported before each remote call.
#[derive(Debug, Clone, Copy)]
pub struct SweepProgress<'a> {
    pub origin: &'a str,
    pub destination: &'a str,
    pub pair: DatePair,

    /// 1-based position of this pairing in the sweep.
    pub index: usize,

    /// Number of pairings in the sweep.
    pub total: usize,
}

impl fmt::Display for SweepProgress<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}->{}: checking Departing {}",
            self.origin, self.destination, self.pair.departure
        )?;
        if let Some(return_date) = self.pair.return_date {
            write!(f, " Return {return_date}")?;
        }
        write!(f, " ({}/{})", self.index, self.total)
    }
}

/// Tomorrow's date in the system time zone: the first date of any
/// `days_ahead` window.
pub fn tomorrow() -> Result<Date> {
    Zoned::now()
        .date()
        .tomorrow()
        .map_err(|e| ProviderError::InvalidDateRange(format!("cannot compute tomorrow: {e}")))
}

/// Expands a request into its ordered date pairings.
///
/// Pairings are ordered by departure date, then return date. Explicit
/// return dates earlier than a departure are skipped for that departure.
pub fn plan_sweep(
    request: &RouteSearchRequest,
    tomorrow: Date,
    max_span: usize,
) -> Result<Vec<DatePair>> {
    let departures = match request.departure {
        DepartureWindow::DaysAhead(days) => dates::expand_days_ahead(tomorrow, days, max_span),
        DepartureWindow::Between { from, to } => dates::expand_between(from, to, max_span)?,
    };

    let pairs = match request.trip {
        Trip::OneWay => departures
            .into_iter()
            .map(|departure| DatePair {
                departure,
                return_date: None,
            })
            .collect(),
        Trip::RoundTrip(ReturnWindow::AfterDays(days)) => departures
            .into_iter()
            .map(|departure| {
                let return_date = departure.checked_add(days.days()).map_err(|e| {
                    ProviderError::InvalidDateRange(format!(
                        "return {days} days after {departure}: {e}"
                    ))
                })?;
                Ok(DatePair {
                    departure,
                    return_date: Some(return_date),
                })
            })
            .collect::<Result<Vec<_>>>()?,
        Trip::RoundTrip(ReturnWindow::Between { from, to }) => {
            let returns = dates::expand_between(from, to, max_span)?;
            departures
                .into_iter()
                .flat_map(|departure| {
                    returns
                        .iter()
                        .filter(move |r| **r >= departure)
                        .map(move |r| DatePair {
                            departure,
                            return_date: Some(*r),
                        })
                })
                .collect()
        }
    };

    Ok(pairs)
}

/// Sweeps `request` across its date pairings and selects the best offers.
///
/// `on_progress` is called before each remote call, in sweep order.
/// Fails with `NoOffersFound` if the whole sweep produced no offers.
pub fn search_top<S>(
    source: &mut S,
    request: &RouteSearchRequest,
    tomorrow: Date,
    max_span: usize,
    mut on_progress: impl FnMut(&SweepProgress<'_>),
) -> Result<Vec<FlightOffer>>
where
    S: OfferSource + ?Sized,
{
    let pairs = plan_sweep(request, tomorrow, max_span)?;
    let total = pairs.len();
    tracing::debug!(route = %request.label(), pairings = total, "planned sweep");

    let mut offers = Vec::new();
    for (i, pair) in pairs.into_iter().enumerate() {
        on_progress(&SweepProgress {
            origin: &request.origin,
            destination: &request.destination,
            pair,
            index: i + 1,
            total,
        });

        let found = source.search_date(&SearchQuery {
            origin: &request.origin,
            destination: &request.destination,
            currency: &request.currency,
            departure: pair.departure,
            return_date: pair.return_date,
        })?;
        offers.extend(found);
    }

    if offers.is_empty() {
        return Err(ProviderError::NoOffersFound(source.name()));
    }

    tracing::debug!(route = %request.label(), offers = offers.len(), "sweep complete");
    Ok(select_top(offers, request.top_n))
}
