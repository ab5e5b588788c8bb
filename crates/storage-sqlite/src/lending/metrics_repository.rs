use std::sync::Arc;

use chrono::NaiveDate;
use diesel::prelude::*;
use log::debug;
use rust_decimal::Decimal;

use crate::db::{get_connection, DbConnection, DbPool};
use crate::errors::StorageError;
use crate::schema::{fund_commitments, funds, inspections, loan_allocations, loans, payments};
use crate::utils::{decode_date, decode_decimal, format_date, sum_decimals};
use lendbook_core::analytics::LendingMetricsRepositoryTrait;
use lendbook_core::constants::{
    INSPECTION_RESULT_FAILED, LOAN_STATUS_ACTIVE, LOAN_STATUS_DELINQUENT,
};
use lendbook_core::utils::decimal_utils::mean;
use lendbook_core::Result;

const ACTIVE_LOAN_STATUSES: [&str; 2] = [LOAN_STATUS_ACTIVE, LOAN_STATUS_DELINQUENT];

/// Aggregates over the lending tables, one query per metric.
///
/// Amounts are stored as text, so sums and means are taken in Rust over the
/// selected column rather than with SQL `SUM`, which would go through floats.
pub struct LendingMetricsRepository {
    pool: Arc<DbPool>,
}

impl LendingMetricsRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    fn conn(&self) -> Result<DbConnection> {
        get_connection(&self.pool)
    }

    fn active_loans_query(as_of: &str) -> loans::BoxedQuery<'static, diesel::sqlite::Sqlite> {
        loans::table
            .filter(loans::status.eq_any(ACTIVE_LOAN_STATUSES))
            .filter(loans::funded_date.le(as_of.to_string()))
            .into_boxed()
    }
}

fn mean_of(values: Vec<Option<String>>) -> Result<Option<Decimal>> {
    let decoded = values
        .into_iter()
        .flatten()
        .map(|v| decode_decimal(&v))
        .collect::<std::result::Result<Vec<_>, StorageError>>()?;
    Ok(mean(decoded))
}

impl LendingMetricsRepositoryTrait for LendingMetricsRepository {
    fn count_funds(&self, as_of: NaiveDate) -> Result<i64> {
        let mut conn = self.conn()?;
        let count = funds::table
            .filter(funds::inception_date.le(format_date(as_of)))
            .count()
            .get_result::<i64>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(count)
    }

    fn sum_active_commitments(&self, as_of: NaiveDate) -> Result<Decimal> {
        let mut conn = self.conn()?;
        let amounts = fund_commitments::table
            .filter(fund_commitments::is_active.eq(true))
            .filter(fund_commitments::commitment_date.le(format_date(as_of)))
            .select(fund_commitments::amount)
            .load::<String>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(sum_decimals(amounts)?)
    }

    fn sum_capital_deployed(&self, as_of: NaiveDate) -> Result<Decimal> {
        let mut conn = self.conn()?;
        let amounts = loan_allocations::table
            .filter(loan_allocations::allocation_date.le(format_date(as_of)))
            .select(loan_allocations::allocated_amount)
            .load::<String>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(sum_decimals(amounts)?)
    }

    fn sum_capital_returned(&self, as_of: NaiveDate) -> Result<Decimal> {
        let mut conn = self.conn()?;
        let amounts = loan_allocations::table
            .filter(loan_allocations::allocation_date.le(format_date(as_of)))
            .select(loan_allocations::returned_amount)
            .load::<String>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(sum_decimals(amounts)?)
    }

    fn average_target_yield(&self, as_of: NaiveDate) -> Result<Option<Decimal>> {
        let mut conn = self.conn()?;
        let yields = funds::table
            .filter(funds::inception_date.le(format_date(as_of)))
            .filter(funds::target_yield.is_not_null())
            .select(funds::target_yield)
            .load::<Option<String>>(&mut conn)
            .map_err(StorageError::from)?;
        mean_of(yields)
    }

    fn count_active_loans(&self, as_of: NaiveDate) -> Result<i64> {
        let mut conn = self.conn()?;
        let count = Self::active_loans_query(&format_date(as_of))
            .count()
            .get_result::<i64>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(count)
    }

    fn count_delinquent_loans(&self, as_of: NaiveDate) -> Result<i64> {
        let mut conn = self.conn()?;
        let count = loans::table
            .filter(loans::status.eq(LOAN_STATUS_DELINQUENT))
            .filter(loans::funded_date.le(format_date(as_of)))
            .count()
            .get_result::<i64>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(count)
    }

    fn average_ltv(&self, as_of: NaiveDate) -> Result<Option<Decimal>> {
        let mut conn = self.conn()?;
        let ltvs = Self::active_loans_query(&format_date(as_of))
            .filter(loans::ltv.is_not_null())
            .select(loans::ltv)
            .load::<Option<String>>(&mut conn)
            .map_err(StorageError::from)?;
        mean_of(ltvs)
    }

    fn sum_active_principal(&self, as_of: NaiveDate) -> Result<Decimal> {
        let mut conn = self.conn()?;
        let principals = Self::active_loans_query(&format_date(as_of))
            .select(loans::principal)
            .load::<String>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(sum_decimals(principals)?)
    }

    fn count_loans_funded_on(&self, date: NaiveDate) -> Result<i64> {
        let mut conn = self.conn()?;
        let count = loans::table
            .filter(loans::funded_date.eq(format_date(date)))
            .count()
            .get_result::<i64>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(count)
    }

    fn count_payments_received_on(&self, date: NaiveDate) -> Result<i64> {
        let mut conn = self.conn()?;
        let count = payments::table
            .filter(payments::paid_date.eq(format_date(date)))
            .count()
            .get_result::<i64>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(count)
    }

    fn sum_collected_on(&self, date: NaiveDate) -> Result<Decimal> {
        let mut conn = self.conn()?;
        let amounts = payments::table
            .filter(payments::paid_date.eq(format_date(date)))
            .select(payments::amount_paid)
            .load::<String>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(sum_decimals(amounts)?)
    }

    fn sum_due_on(&self, date: NaiveDate) -> Result<Decimal> {
        let mut conn = self.conn()?;
        let amounts = payments::table
            .filter(payments::due_date.eq(format_date(date)))
            .select(payments::amount_due)
            .load::<String>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(sum_decimals(amounts)?)
    }

    fn count_overdue_payments(&self, as_of: NaiveDate) -> Result<i64> {
        let mut conn = self.conn()?;
        let as_of = format_date(as_of);
        // Past due and not yet paid as of the day; a later payment still counts.
        let paid_dates = payments::table
            .filter(payments::due_date.lt(as_of.as_str()))
            .select(payments::paid_date)
            .load::<Option<String>>(&mut conn)
            .map_err(StorageError::from)?;
        let overdue = paid_dates
            .iter()
            .filter(|paid| paid.as_deref().map_or(true, |p| p > as_of.as_str()))
            .count();
        Ok(overdue as i64)
    }

    fn count_inspections_completed_on(&self, date: NaiveDate) -> Result<i64> {
        let mut conn = self.conn()?;
        let count = inspections::table
            .filter(inspections::completed_date.eq(format_date(date)))
            .count()
            .get_result::<i64>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(count)
    }

    fn count_inspections_failed_on(&self, date: NaiveDate) -> Result<i64> {
        let mut conn = self.conn()?;
        let results = inspections::table
            .filter(inspections::completed_date.eq(format_date(date)))
            .select(inspections::result)
            .load::<Option<String>>(&mut conn)
            .map_err(StorageError::from)?;
        let failed = results
            .iter()
            .flatten()
            .filter(|r| r.eq_ignore_ascii_case(INSPECTION_RESULT_FAILED))
            .count();
        Ok(failed as i64)
    }

    fn count_pending_inspections(&self, as_of: NaiveDate) -> Result<i64> {
        let mut conn = self.conn()?;
        let as_of = format_date(as_of);
        let completed_dates = inspections::table
            .filter(inspections::scheduled_date.le(as_of.as_str()))
            .select(inspections::completed_date)
            .load::<Option<String>>(&mut conn)
            .map_err(StorageError::from)?;
        let pending = completed_dates
            .iter()
            .filter(|done| done.as_deref().map_or(true, |d| d > as_of.as_str()))
            .count();
        Ok(pending as i64)
    }

    fn average_inspection_turnaround_days(&self, date: NaiveDate) -> Result<Option<Decimal>> {
        let mut conn = self.conn()?;
        let scheduled = inspections::table
            .filter(inspections::completed_date.eq(format_date(date)))
            .select(inspections::scheduled_date)
            .load::<String>(&mut conn)
            .map_err(StorageError::from)?;
        debug!(
            "Averaging turnaround over {} inspections completed on {}",
            scheduled.len(),
            date
        );
        let days = scheduled
            .iter()
            .map(|s| decode_date(s).map(|d| Decimal::from((date - d).num_days())))
            .collect::<std::result::Result<Vec<_>, StorageError>>()?;
        Ok(mean(days))
    }
}
