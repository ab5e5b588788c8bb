use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::errors::Result;

/// Source-of-truth aggregates over loan, commitment, allocation, payment and
/// inspection records.
///
/// One method per metric so each figure is computed by its own query. "As of"
/// methods consider records on or before `as_of`; "on" methods consider only
/// records dated exactly `date`.
pub trait LendingMetricsRepositoryTrait: Send + Sync {
    // Funds
    fn count_funds(&self, as_of: NaiveDate) -> Result<i64>;
    fn sum_active_commitments(&self, as_of: NaiveDate) -> Result<Decimal>;
    fn sum_capital_deployed(&self, as_of: NaiveDate) -> Result<Decimal>;
    fn sum_capital_returned(&self, as_of: NaiveDate) -> Result<Decimal>;
    fn average_target_yield(&self, as_of: NaiveDate) -> Result<Option<Decimal>>;

    // Loans
    fn count_active_loans(&self, as_of: NaiveDate) -> Result<i64>;
    fn count_delinquent_loans(&self, as_of: NaiveDate) -> Result<i64>;
    fn average_ltv(&self, as_of: NaiveDate) -> Result<Option<Decimal>>;
    fn sum_active_principal(&self, as_of: NaiveDate) -> Result<Decimal>;
    fn count_loans_funded_on(&self, date: NaiveDate) -> Result<i64>;

    // Payments
    fn count_payments_received_on(&self, date: NaiveDate) -> Result<i64>;
    fn sum_collected_on(&self, date: NaiveDate) -> Result<Decimal>;
    fn sum_due_on(&self, date: NaiveDate) -> Result<Decimal>;
    fn count_overdue_payments(&self, as_of: NaiveDate) -> Result<i64>;

    // Inspections
    fn count_inspections_completed_on(&self, date: NaiveDate) -> Result<i64>;
    fn count_inspections_failed_on(&self, date: NaiveDate) -> Result<i64>;
    fn count_pending_inspections(&self, as_of: NaiveDate) -> Result<i64>;
    /// Mean days from scheduling to completion for inspections completed on `date`.
    fn average_inspection_turnaround_days(&self, date: NaiveDate) -> Result<Option<Decimal>>;
}
