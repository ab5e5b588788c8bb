//! Database models for the four snapshot tables.

use diesel::prelude::*;

use crate::utils::{
    format_date, format_decimal, format_timestamp, parse_date, parse_decimal,
    parse_optional_decimal, parse_timestamp,
};
use lendbook_core::analytics::{FundSnapshot, InspectionSnapshot, LoanSnapshot, PaymentSnapshot};

#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::fund_snapshots)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct FundSnapshotDB {
    pub snapshot_date: String,
    pub total_funds: i64,
    pub total_commitments: String,
    pub capital_deployed: String,
    pub capital_returned: String,
    pub capital_available: String,
    pub average_investor_yield: Option<String>,
    pub calculated_at: String,
}

#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::loan_snapshots)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct LoanSnapshotDB {
    pub snapshot_date: String,
    pub active_loans: i64,
    pub delinquent_loans: i64,
    pub delinquency_rate: String,
    pub average_ltv: Option<String>,
    pub total_principal: String,
    pub loans_funded: i64,
    pub calculated_at: String,
}

#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::payment_snapshots)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PaymentSnapshotDB {
    pub snapshot_date: String,
    pub payments_received: i64,
    pub amount_collected: String,
    pub amount_due: String,
    pub collection_rate: Option<String>,
    pub overdue_payments: i64,
    pub calculated_at: String,
}

#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::inspection_snapshots)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct InspectionSnapshotDB {
    pub snapshot_date: String,
    pub inspections_completed: i64,
    pub inspections_failed: i64,
    pub inspections_pending: i64,
    pub average_turnaround_days: Option<String>,
    pub calculated_at: String,
}

// Domain -> DB

impl From<&FundSnapshot> for FundSnapshotDB {
    fn from(s: &FundSnapshot) -> Self {
        Self {
            snapshot_date: format_date(s.snapshot_date),
            total_funds: s.total_funds,
            total_commitments: format_decimal(s.total_commitments),
            capital_deployed: format_decimal(s.capital_deployed),
            capital_returned: format_decimal(s.capital_returned),
            capital_available: format_decimal(s.capital_available),
            average_investor_yield: s.average_investor_yield.map(format_decimal),
            calculated_at: format_timestamp(s.calculated_at),
        }
    }
}

impl From<&LoanSnapshot> for LoanSnapshotDB {
    fn from(s: &LoanSnapshot) -> Self {
        Self {
            snapshot_date: format_date(s.snapshot_date),
            active_loans: s.active_loans,
            delinquent_loans: s.delinquent_loans,
            delinquency_rate: format_decimal(s.delinquency_rate),
            average_ltv: s.average_ltv.map(format_decimal),
            total_principal: format_decimal(s.total_principal),
            loans_funded: s.loans_funded,
            calculated_at: format_timestamp(s.calculated_at),
        }
    }
}

impl From<&PaymentSnapshot> for PaymentSnapshotDB {
    fn from(s: &PaymentSnapshot) -> Self {
        Self {
            snapshot_date: format_date(s.snapshot_date),
            payments_received: s.payments_received,
            amount_collected: format_decimal(s.amount_collected),
            amount_due: format_decimal(s.amount_due),
            collection_rate: s.collection_rate.map(format_decimal),
            overdue_payments: s.overdue_payments,
            calculated_at: format_timestamp(s.calculated_at),
        }
    }
}

impl From<&InspectionSnapshot> for InspectionSnapshotDB {
    fn from(s: &InspectionSnapshot) -> Self {
        Self {
            snapshot_date: format_date(s.snapshot_date),
            inspections_completed: s.inspections_completed,
            inspections_failed: s.inspections_failed,
            inspections_pending: s.inspections_pending,
            average_turnaround_days: s.average_turnaround_days.map(format_decimal),
            calculated_at: format_timestamp(s.calculated_at),
        }
    }
}

// DB -> Domain

impl From<FundSnapshotDB> for FundSnapshot {
    fn from(db: FundSnapshotDB) -> Self {
        Self {
            snapshot_date: parse_date(&db.snapshot_date),
            total_funds: db.total_funds,
            total_commitments: parse_decimal(&db.total_commitments),
            capital_deployed: parse_decimal(&db.capital_deployed),
            capital_returned: parse_decimal(&db.capital_returned),
            capital_available: parse_decimal(&db.capital_available),
            average_investor_yield: parse_optional_decimal(db.average_investor_yield.as_deref()),
            calculated_at: parse_timestamp(&db.calculated_at),
        }
    }
}

impl From<LoanSnapshotDB> for LoanSnapshot {
    fn from(db: LoanSnapshotDB) -> Self {
        Self {
            snapshot_date: parse_date(&db.snapshot_date),
            active_loans: db.active_loans,
            delinquent_loans: db.delinquent_loans,
            delinquency_rate: parse_decimal(&db.delinquency_rate),
            average_ltv: parse_optional_decimal(db.average_ltv.as_deref()),
            total_principal: parse_decimal(&db.total_principal),
            loans_funded: db.loans_funded,
            calculated_at: parse_timestamp(&db.calculated_at),
        }
    }
}

impl From<PaymentSnapshotDB> for PaymentSnapshot {
    fn from(db: PaymentSnapshotDB) -> Self {
        Self {
            snapshot_date: parse_date(&db.snapshot_date),
            payments_received: db.payments_received,
            amount_collected: parse_decimal(&db.amount_collected),
            amount_due: parse_decimal(&db.amount_due),
            collection_rate: parse_optional_decimal(db.collection_rate.as_deref()),
            overdue_payments: db.overdue_payments,
            calculated_at: parse_timestamp(&db.calculated_at),
        }
    }
}

impl From<InspectionSnapshotDB> for InspectionSnapshot {
    fn from(db: InspectionSnapshotDB) -> Self {
        Self {
            snapshot_date: parse_date(&db.snapshot_date),
            inspections_completed: db.inspections_completed,
            inspections_failed: db.inspections_failed,
            inspections_pending: db.inspections_pending,
            average_turnaround_days: parse_optional_decimal(db.average_turnaround_days.as_deref()),
            calculated_at: parse_timestamp(&db.calculated_at),
        }
    }
}
