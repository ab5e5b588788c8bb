use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::constants::DEFAULT_KPI_WINDOW_DAYS;
use crate::errors::{Result, ValidationError};

/// Timezone used to derive business dates from UTC instants.
///
/// Snapshot rows are keyed by calendar date, so every "today" and every
/// event occurrence date must be resolved in the same zone.
pub const DEFAULT_BUSINESS_TZ: Tz = chrono_tz::America::New_York;

/// Converts a UTC instant to a business date in the given timezone.
pub fn business_date_from_utc(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

/// Business date of an instant in the default timezone.
pub fn business_date(instant: DateTime<Utc>) -> NaiveDate {
    business_date_from_utc(instant, DEFAULT_BUSINESS_TZ)
}

/// Today's business date.
pub fn business_date_today() -> NaiveDate {
    business_date(Utc::now())
}

/// Resolves an optional `[start, end]` KPI window.
///
/// Missing `end` defaults to today; missing `start` defaults to
/// `DEFAULT_KPI_WINDOW_DAYS` before the resolved end. Fails when that
/// default would fall outside the representable date range.
pub fn resolve_kpi_window(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<(NaiveDate, NaiveDate)> {
    let end = end.unwrap_or_else(business_date_today);
    let start = match start {
        Some(start) => start,
        None => end
            .checked_sub_signed(Duration::days(DEFAULT_KPI_WINDOW_DAYS))
            .ok_or_else(|| {
                ValidationError::InvalidInput(format!("KPI window ending {} is out of range", end))
            })?,
    };
    Ok((start, end))
}

/// Whole days from `from` to `to` (negative when `to` is earlier).
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}
