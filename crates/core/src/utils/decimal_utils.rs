//! Decimal helpers shared by the snapshot aggregator and the performance calculator.

use rust_decimal::Decimal;

/// `part / whole × 100`, or zero when `whole` is zero.
pub fn percentage_or_zero(part: Decimal, whole: Decimal) -> Decimal {
    percentage(part, whole).unwrap_or(Decimal::ZERO)
}

/// `part / whole × 100`, or `None` when `whole` is zero.
pub fn percentage(part: Decimal, whole: Decimal) -> Option<Decimal> {
    ratio(part, whole).map(|r| r * Decimal::ONE_HUNDRED)
}

/// `part / whole`, or `None` when `whole` is zero.
pub fn ratio(part: Decimal, whole: Decimal) -> Option<Decimal> {
    if whole.is_zero() {
        return None;
    }
    part.checked_div(whole)
}

/// Arithmetic mean, or `None` for an empty input.
pub fn mean<I>(values: I) -> Option<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    let (sum, count) = values
        .into_iter()
        .fold((Decimal::ZERO, 0u64), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        return None;
    }
    Some(sum / Decimal::from(count))
}
