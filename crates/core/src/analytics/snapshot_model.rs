//! Daily snapshot models.
//!
//! Each variant has exactly one row per calendar date. Recomputing a date
//! replaces that row.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The four snapshot variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotKind {
    Fund,
    Loan,
    Payment,
    Inspection,
}

impl SnapshotKind {
    pub const ALL: [SnapshotKind; 4] = [
        SnapshotKind::Fund,
        SnapshotKind::Loan,
        SnapshotKind::Payment,
        SnapshotKind::Inspection,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SnapshotKind::Fund => "fund",
            SnapshotKind::Loan => "loan",
            SnapshotKind::Payment => "payment",
            SnapshotKind::Inspection => "inspection",
        }
    }
}

/// Capital position across all funds as of `snapshot_date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundSnapshot {
    pub snapshot_date: NaiveDate,
    pub total_funds: i64,
    pub total_commitments: Decimal,
    pub capital_deployed: Decimal,
    pub capital_returned: Decimal,
    /// commitments - deployed + returned
    pub capital_available: Decimal,
    pub average_investor_yield: Option<Decimal>,
    pub calculated_at: DateTime<Utc>,
}

/// Loan book state as of `snapshot_date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanSnapshot {
    pub snapshot_date: NaiveDate,
    pub active_loans: i64,
    pub delinquent_loans: i64,
    /// Percentage of active loans that are delinquent.
    pub delinquency_rate: Decimal,
    pub average_ltv: Option<Decimal>,
    pub total_principal: Decimal,
    /// Loans funded on `snapshot_date` itself.
    pub loans_funded: i64,
    pub calculated_at: DateTime<Utc>,
}

/// Collections activity on `snapshot_date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSnapshot {
    pub snapshot_date: NaiveDate,
    pub payments_received: i64,
    pub amount_collected: Decimal,
    pub amount_due: Decimal,
    /// `None` when nothing fell due that day.
    pub collection_rate: Option<Decimal>,
    pub overdue_payments: i64,
    pub calculated_at: DateTime<Utc>,
}

/// Inspection activity on `snapshot_date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectionSnapshot {
    pub snapshot_date: NaiveDate,
    pub inspections_completed: i64,
    pub inspections_failed: i64,
    pub inspections_pending: i64,
    pub average_turnaround_days: Option<Decimal>,
    pub calculated_at: DateTime<Utc>,
}

/// Result of a full recompute for one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotSet {
    pub date: NaiveDate,
    pub fund: FundSnapshot,
    pub loan: LoanSnapshot,
    pub payment: PaymentSnapshot,
    pub inspection: InspectionSnapshot,
}
