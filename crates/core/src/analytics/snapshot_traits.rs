//! Snapshot storage and aggregator traits.

use async_trait::async_trait;
use chrono::NaiveDate;

use super::snapshot_model::{
    FundSnapshot, InspectionSnapshot, LoanSnapshot, PaymentSnapshot, SnapshotSet,
};
use crate::errors::Result;
use crate::events::DomainEvent;

/// Persistence for the four snapshot tables.
///
/// Upserts must be atomic per date so concurrent recomputes never leave two
/// rows for the same day. Range reads are inclusive and ascending by date.
#[async_trait]
pub trait AnalyticsSnapshotRepositoryTrait: Send + Sync {
    async fn upsert_fund_snapshot(&self, snapshot: FundSnapshot) -> Result<FundSnapshot>;
    async fn upsert_loan_snapshot(&self, snapshot: LoanSnapshot) -> Result<LoanSnapshot>;
    async fn upsert_payment_snapshot(&self, snapshot: PaymentSnapshot) -> Result<PaymentSnapshot>;
    async fn upsert_inspection_snapshot(
        &self,
        snapshot: InspectionSnapshot,
    ) -> Result<InspectionSnapshot>;

    fn get_fund_snapshots(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<FundSnapshot>>;
    fn get_loan_snapshots(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<LoanSnapshot>>;
    fn get_payment_snapshots(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PaymentSnapshot>>;
    fn get_inspection_snapshots(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<InspectionSnapshot>>;
}

/// Snapshot aggregator operations.
#[async_trait]
pub trait AnalyticsServiceTrait: Send + Sync {
    /// Recomputes and upserts the fund snapshot for `date` (default: today).
    async fn compute_fund_snapshot(&self, date: Option<NaiveDate>) -> Result<FundSnapshot>;
    async fn compute_loan_snapshot(&self, date: Option<NaiveDate>) -> Result<LoanSnapshot>;
    async fn compute_payment_snapshot(&self, date: Option<NaiveDate>) -> Result<PaymentSnapshot>;
    async fn compute_inspection_snapshot(
        &self,
        date: Option<NaiveDate>,
    ) -> Result<InspectionSnapshot>;

    /// Recomputes all four variants for one date. Used by the batch job.
    async fn compute_all(&self, date: Option<NaiveDate>) -> Result<SnapshotSet>;

    /// Ingests `event` and recomputes only the variants its type affects, for
    /// the event's business date. Recompute failures are returned, not swallowed.
    async fn compute_from_event(&self, event: &DomainEvent) -> Result<bool>;

    // Read-only projections; they never trigger computation.
    fn get_fund_kpis(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<FundSnapshot>>;
    fn get_loan_kpis(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<LoanSnapshot>>;
    fn get_collections_kpis(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<PaymentSnapshot>>;
    fn get_inspection_kpis(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<InspectionSnapshot>>;
}
