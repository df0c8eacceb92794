//! Date range expansion: a route's date window becomes candidate dates.
//!
//! Every candidate date costs one remote call (more for round trips), so
//! expansions are always capped at a maximum span.

use jiff::{ToSpan, civil::Date};

use crate::provider::{ProviderError, Result};

/// Default ceiling on the number of dates in one expansion.
pub const DEFAULT_MAX_SPAN_DAYS: usize = 30;

/// Expands the inclusive range `[from, to]` into consecutive dates.
///
/// At most `max_span` dates are returned, starting from `from`.
/// Fails if `to` is before `from`.
pub fn expand_between(from: Date, to: Date, max_span: usize) -> Result<Vec<Date>> {
    if to < from {
        return Err(ProviderError::InvalidDateRange(format!(
            "range ends on {to}, before it starts on {from}"
        )));
    }
    Ok(from
        .series(1.day())
        .take_while(|d| *d <= to)
        .take(max_span)
        .collect())
}

/// Expands `days` consecutive dates beginning at `start`, capped at `max_span`.
pub fn expand_days_ahead(start: Date, days: u32, max_span: usize) -> Vec<Date> {
    let days = usize::try_from(days).unwrap_or(usize::MAX);
    start.series(1.day()).take(days.min(max_span)).collect()
}
