//! Text encodings for values stored in SQLite.
//!
//! Dates are `%Y-%m-%d`, instants are fixed-width UTC RFC 3339 and decimals
//! are their canonical string form. Fixed widths keep lexicographic order
//! equal to chronological order, so range filters can run in SQL.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use log::error;
use rust_decimal::Decimal;

use crate::errors::StorageError;
use lendbook_core::constants::DECIMAL_PRECISION;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, DATE_FORMAT).unwrap_or_else(|e| {
        error!("Failed to parse stored date '{}': {}", value, e);
        NaiveDate::default()
    })
}

pub fn parse_optional_date(value: Option<&str>) -> Option<NaiveDate> {
    value.map(parse_date)
}

pub fn format_timestamp(instant: DateTime<Utc>) -> String {
    instant.format(TIMESTAMP_FORMAT).to_string()
}

pub fn parse_timestamp(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|e| {
            error!("Failed to parse stored timestamp '{}': {}", value, e);
            DateTime::<Utc>::default()
        })
}

pub fn format_decimal(value: Decimal) -> String {
    value.round_dp(DECIMAL_PRECISION).normalize().to_string()
}

pub fn parse_decimal(value: &str) -> Decimal {
    Decimal::from_str(value).unwrap_or_else(|e| {
        error!("Failed to parse stored decimal '{}': {}", value, e);
        Decimal::ZERO
    })
}

pub fn parse_optional_decimal(value: Option<&str>) -> Option<Decimal> {
    value.map(parse_decimal)
}

/// Strict form of [`parse_date`] for values that feed aggregates.
pub fn decode_date(value: &str) -> Result<NaiveDate, StorageError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|e| {
        StorageError::SerializationError(format!("Invalid stored date '{}': {}", value, e))
    })
}

/// Strict form of [`parse_decimal`] for values that feed aggregates.
pub fn decode_decimal(value: &str) -> Result<Decimal, StorageError> {
    Decimal::from_str(value).map_err(|e| {
        StorageError::SerializationError(format!("Invalid stored decimal '{}': {}", value, e))
    })
}

/// Exact decimal sum of stored amounts. Fails on the first unreadable value.
pub fn sum_decimals<I, S>(values: I) -> Result<Decimal, StorageError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, v| Ok(acc + decode_decimal(v.as_ref())?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timestamps_sort_chronologically_as_text() {
        let whole = Utc.with_ymd_and_hms(2024, 3, 15, 1, 0, 0).unwrap();
        let later = whole + chrono::Duration::milliseconds(500);
        assert!(format_timestamp(whole) < format_timestamp(later));
        assert_eq!(parse_timestamp(&format_timestamp(later)), later);
    }

    #[test]
    fn test_sum_decimals_is_exact() {
        assert_eq!(
            sum_decimals(["0.1", "0.2", "100.005"]).unwrap(),
            Decimal::from_str("100.305").unwrap()
        );
    }

    #[test]
    fn test_sum_decimals_rejects_unreadable_amounts() {
        let result = sum_decimals(["500000", "1,000,000"]);
        assert!(matches!(result, Err(StorageError::SerializationError(_))));
    }

    #[test]
    fn test_decode_date_rejects_garbage() {
        assert!(decode_date("2024-13-01").is_err());
        assert_eq!(
            decode_date("2024-02-29").unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
    }
}
