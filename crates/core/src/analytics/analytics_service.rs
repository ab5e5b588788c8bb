use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use log::{debug, info};

use super::metrics_traits::LendingMetricsRepositoryTrait;
use super::snapshot_model::{
    FundSnapshot, InspectionSnapshot, LoanSnapshot, PaymentSnapshot, SnapshotKind, SnapshotSet,
};
use super::snapshot_traits::{AnalyticsServiceTrait, AnalyticsSnapshotRepositoryTrait};
use crate::constants::DISPLAY_DECIMAL_PRECISION;
use crate::errors::{AnalyticsError, Error, Result};
use crate::events::{DomainEvent, EventKind};
use crate::ingestion::EventIngestionServiceTrait;
use crate::utils::decimal_utils::{percentage, percentage_or_zero};
use crate::utils::time_utils::{business_date_today, resolve_kpi_window};

/// Snapshot variants an event type makes stale.
///
/// Types mapped to an empty slice are ingested for audit but trigger no recompute.
pub fn snapshots_affected_by(kind: &EventKind) -> &'static [SnapshotKind] {
    match kind {
        EventKind::LoanFunded => &[SnapshotKind::Loan, SnapshotKind::Fund],
        EventKind::PaymentReceived => &[SnapshotKind::Payment, SnapshotKind::Loan],
        EventKind::InspectionCompleted => &[SnapshotKind::Inspection],
        EventKind::FundCreated
        | EventKind::FundCapitalCommitted
        | EventKind::LoanDelinquent
        | EventKind::PaymentMissed
        | EventKind::InspectionScheduled
        | EventKind::DrawRequested
        | EventKind::Other(_) => &[],
    }
}

/// Computes, stores and serves the daily snapshots.
pub struct AnalyticsService {
    metrics: Arc<dyn LendingMetricsRepositoryTrait>,
    snapshots: Arc<dyn AnalyticsSnapshotRepositoryTrait>,
    ingestion: Arc<dyn EventIngestionServiceTrait>,
}

impl AnalyticsService {
    pub fn new(
        metrics: Arc<dyn LendingMetricsRepositoryTrait>,
        snapshots: Arc<dyn AnalyticsSnapshotRepositoryTrait>,
        ingestion: Arc<dyn EventIngestionServiceTrait>,
    ) -> Self {
        Self {
            metrics,
            snapshots,
            ingestion,
        }
    }

    async fn compute_kind(&self, kind: SnapshotKind, date: NaiveDate) -> Result<()> {
        match kind {
            SnapshotKind::Fund => self.compute_fund_snapshot(Some(date)).await.map(|_| ()),
            SnapshotKind::Loan => self.compute_loan_snapshot(Some(date)).await.map(|_| ()),
            SnapshotKind::Payment => self.compute_payment_snapshot(Some(date)).await.map(|_| ()),
            SnapshotKind::Inspection => {
                self.compute_inspection_snapshot(Some(date)).await.map(|_| ())
            }
        }
    }
}

/// Runs one metric query, tagging any failure with the metric it belongs to.
fn metric<T, F>(snapshot: SnapshotKind, name: &'static str, date: NaiveDate, query: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    debug!("Computing {} for {} snapshot on {}", name, snapshot.as_str(), date);
    query().map_err(|e| {
        AnalyticsError::MetricQuery {
            snapshot: snapshot.as_str(),
            metric: name,
            date,
            reason: e.to_string(),
        }
        .into()
    })
}

fn write_failed(snapshot: SnapshotKind, date: NaiveDate) -> impl FnOnce(Error) -> Error {
    move |e| {
        AnalyticsError::SnapshotWrite {
            snapshot: snapshot.as_str(),
            date,
            reason: e.to_string(),
        }
        .into()
    }
}

#[async_trait]
impl AnalyticsServiceTrait for AnalyticsService {
    async fn compute_fund_snapshot(&self, date: Option<NaiveDate>) -> Result<FundSnapshot> {
        let date = date.unwrap_or_else(business_date_today);
        let kind = SnapshotKind::Fund;
        let m = &self.metrics;

        let total_funds = metric(kind, "total_funds", date, || m.count_funds(date))?;
        let total_commitments =
            metric(kind, "total_commitments", date, || m.sum_active_commitments(date))?;
        let capital_deployed =
            metric(kind, "capital_deployed", date, || m.sum_capital_deployed(date))?;
        let capital_returned =
            metric(kind, "capital_returned", date, || m.sum_capital_returned(date))?;
        let average_investor_yield =
            metric(kind, "average_investor_yield", date, || m.average_target_yield(date))?;

        let snapshot = FundSnapshot {
            snapshot_date: date,
            total_funds,
            total_commitments,
            capital_deployed,
            capital_returned,
            capital_available: total_commitments - capital_deployed + capital_returned,
            average_investor_yield: average_investor_yield
                .map(|y| y.round_dp(DISPLAY_DECIMAL_PRECISION)),
            calculated_at: Utc::now(),
        };

        self.snapshots
            .upsert_fund_snapshot(snapshot)
            .await
            .map_err(write_failed(kind, date))
    }

    async fn compute_loan_snapshot(&self, date: Option<NaiveDate>) -> Result<LoanSnapshot> {
        let date = date.unwrap_or_else(business_date_today);
        let kind = SnapshotKind::Loan;
        let m = &self.metrics;

        let active_loans = metric(kind, "active_loans", date, || m.count_active_loans(date))?;
        let delinquent_loans =
            metric(kind, "delinquent_loans", date, || m.count_delinquent_loans(date))?;
        let average_ltv = metric(kind, "average_ltv", date, || m.average_ltv(date))?;
        let total_principal =
            metric(kind, "total_principal", date, || m.sum_active_principal(date))?;
        let loans_funded = metric(kind, "loans_funded", date, || m.count_loans_funded_on(date))?;

        let snapshot = LoanSnapshot {
            snapshot_date: date,
            active_loans,
            delinquent_loans,
            delinquency_rate: percentage_or_zero(delinquent_loans.into(), active_loans.into())
                .round_dp(DISPLAY_DECIMAL_PRECISION),
            average_ltv: average_ltv.map(|v| v.round_dp(DISPLAY_DECIMAL_PRECISION)),
            total_principal,
            loans_funded,
            calculated_at: Utc::now(),
        };

        self.snapshots
            .upsert_loan_snapshot(snapshot)
            .await
            .map_err(write_failed(kind, date))
    }

    async fn compute_payment_snapshot(&self, date: Option<NaiveDate>) -> Result<PaymentSnapshot> {
        let date = date.unwrap_or_else(business_date_today);
        let kind = SnapshotKind::Payment;
        let m = &self.metrics;

        let payments_received =
            metric(kind, "payments_received", date, || m.count_payments_received_on(date))?;
        let amount_collected = metric(kind, "amount_collected", date, || m.sum_collected_on(date))?;
        let amount_due = metric(kind, "amount_due", date, || m.sum_due_on(date))?;
        let overdue_payments =
            metric(kind, "overdue_payments", date, || m.count_overdue_payments(date))?;

        let snapshot = PaymentSnapshot {
            snapshot_date: date,
            payments_received,
            amount_collected,
            amount_due,
            collection_rate: percentage(amount_collected, amount_due)
                .map(|r| r.round_dp(DISPLAY_DECIMAL_PRECISION)),
            overdue_payments,
            calculated_at: Utc::now(),
        };

        self.snapshots
            .upsert_payment_snapshot(snapshot)
            .await
            .map_err(write_failed(kind, date))
    }

    async fn compute_inspection_snapshot(
        &self,
        date: Option<NaiveDate>,
    ) -> Result<InspectionSnapshot> {
        let date = date.unwrap_or_else(business_date_today);
        let kind = SnapshotKind::Inspection;
        let m = &self.metrics;

        let inspections_completed = metric(kind, "inspections_completed", date, || {
            m.count_inspections_completed_on(date)
        })?;
        let inspections_failed =
            metric(kind, "inspections_failed", date, || m.count_inspections_failed_on(date))?;
        let inspections_pending =
            metric(kind, "inspections_pending", date, || m.count_pending_inspections(date))?;
        let average_turnaround_days = metric(kind, "average_turnaround_days", date, || {
            m.average_inspection_turnaround_days(date)
        })?;

        let snapshot = InspectionSnapshot {
            snapshot_date: date,
            inspections_completed,
            inspections_failed,
            inspections_pending,
            average_turnaround_days: average_turnaround_days
                .map(|d| d.round_dp(DISPLAY_DECIMAL_PRECISION)),
            calculated_at: Utc::now(),
        };

        self.snapshots
            .upsert_inspection_snapshot(snapshot)
            .await
            .map_err(write_failed(kind, date))
    }

    async fn compute_all(&self, date: Option<NaiveDate>) -> Result<SnapshotSet> {
        let date = date.unwrap_or_else(business_date_today);
        let set = SnapshotSet {
            date,
            fund: self.compute_fund_snapshot(Some(date)).await?,
            loan: self.compute_loan_snapshot(Some(date)).await?,
            payment: self.compute_payment_snapshot(Some(date)).await?,
            inspection: self.compute_inspection_snapshot(Some(date)).await?,
        };
        info!("Computed all snapshots for {}", date);
        Ok(set)
    }

    async fn compute_from_event(&self, event: &DomainEvent) -> Result<bool> {
        self.ingestion.ingest(event).await?;

        let affected = snapshots_affected_by(&event.event_type);
        if affected.is_empty() {
            debug!(
                "Event {} ({}) ingested; no snapshot depends on it",
                event.id, event.event_type
            );
            return Ok(true);
        }

        let date = event.occurrence_date();
        for kind in affected {
            self.compute_kind(*kind, date).await?;
        }
        debug!(
            "Recomputed {} snapshot(s) for {} after event {}",
            affected.len(),
            date,
            event.id
        );
        Ok(true)
    }

    fn get_fund_kpis(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<FundSnapshot>> {
        let (start, end) = resolve_kpi_window(start, end)?;
        if start > end {
            return Ok(Vec::new());
        }
        self.snapshots.get_fund_snapshots(start, end)
    }

    fn get_loan_kpis(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<LoanSnapshot>> {
        let (start, end) = resolve_kpi_window(start, end)?;
        if start > end {
            return Ok(Vec::new());
        }
        self.snapshots.get_loan_snapshots(start, end)
    }

    fn get_collections_kpis(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<PaymentSnapshot>> {
        let (start, end) = resolve_kpi_window(start, end)?;
        if start > end {
            return Ok(Vec::new());
        }
        self.snapshots.get_payment_snapshots(start, end)
    }

    fn get_inspection_kpis(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<InspectionSnapshot>> {
        let (start, end) = resolve_kpi_window(start, end)?;
        if start > end {
            return Ok(Vec::new());
        }
        self.snapshots.get_inspection_snapshots(start, end)
    }
}
