//! Unit tests for the snapshot aggregator.

use super::*;
use crate::errors::{AnalyticsError, Error, Result};
use crate::events::{DomainEvent, EventKind};
use crate::ingestion::{EventIngestionRecord, EventIngestionServiceTrait};
use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};

// ============================================================================
// Mock Implementations
// ============================================================================

struct MockMetrics {
    fail_metric: Option<&'static str>,
}

impl MockMetrics {
    fn new() -> Self {
        Self { fail_metric: None }
    }

    fn failing(metric: &'static str) -> Self {
        Self {
            fail_metric: Some(metric),
        }
    }

    fn check(&self, metric: &'static str) -> Result<()> {
        if self.fail_metric == Some(metric) {
            return Err(Error::Repository(format!("{} query failed", metric)));
        }
        Ok(())
    }
}

impl LendingMetricsRepositoryTrait for MockMetrics {
    fn count_funds(&self, _as_of: NaiveDate) -> Result<i64> {
        self.check("count_funds")?;
        Ok(3)
    }
    fn sum_active_commitments(&self, _as_of: NaiveDate) -> Result<Decimal> {
        self.check("sum_active_commitments")?;
        Ok(dec!(1000000))
    }
    fn sum_capital_deployed(&self, _as_of: NaiveDate) -> Result<Decimal> {
        self.check("sum_capital_deployed")?;
        Ok(dec!(750000))
    }
    fn sum_capital_returned(&self, _as_of: NaiveDate) -> Result<Decimal> {
        Ok(dec!(100000))
    }
    fn average_target_yield(&self, _as_of: NaiveDate) -> Result<Option<Decimal>> {
        Ok(Some(dec!(9.126)))
    }
    fn count_active_loans(&self, _as_of: NaiveDate) -> Result<i64> {
        Ok(8)
    }
    fn count_delinquent_loans(&self, _as_of: NaiveDate) -> Result<i64> {
        Ok(1)
    }
    fn average_ltv(&self, _as_of: NaiveDate) -> Result<Option<Decimal>> {
        self.check("average_ltv")?;
        Ok(Some(dec!(64.333)))
    }
    fn sum_active_principal(&self, _as_of: NaiveDate) -> Result<Decimal> {
        Ok(dec!(2400000))
    }
    fn count_loans_funded_on(&self, _date: NaiveDate) -> Result<i64> {
        Ok(2)
    }
    fn count_payments_received_on(&self, _date: NaiveDate) -> Result<i64> {
        Ok(4)
    }
    fn sum_collected_on(&self, _date: NaiveDate) -> Result<Decimal> {
        Ok(dec!(4500))
    }
    fn sum_due_on(&self, _date: NaiveDate) -> Result<Decimal> {
        Ok(dec!(6000))
    }
    fn count_overdue_payments(&self, _as_of: NaiveDate) -> Result<i64> {
        Ok(2)
    }
    fn count_inspections_completed_on(&self, _date: NaiveDate) -> Result<i64> {
        Ok(3)
    }
    fn count_inspections_failed_on(&self, _date: NaiveDate) -> Result<i64> {
        Ok(1)
    }
    fn count_pending_inspections(&self, _as_of: NaiveDate) -> Result<i64> {
        Ok(5)
    }
    fn average_inspection_turnaround_days(&self, _date: NaiveDate) -> Result<Option<Decimal>> {
        Ok(None)
    }
}

#[derive(Default)]
struct MockSnapshotRepository {
    fund: Mutex<BTreeMap<NaiveDate, FundSnapshot>>,
    loan: Mutex<BTreeMap<NaiveDate, LoanSnapshot>>,
    payment: Mutex<BTreeMap<NaiveDate, PaymentSnapshot>>,
    inspection: Mutex<BTreeMap<NaiveDate, InspectionSnapshot>>,
}

fn in_range<T: Clone>(
    rows: &Mutex<BTreeMap<NaiveDate, T>>,
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<T> {
    rows.lock()
        .unwrap()
        .range(start..=end)
        .map(|(_, v)| v.clone())
        .collect()
}

#[async_trait]
impl AnalyticsSnapshotRepositoryTrait for MockSnapshotRepository {
    async fn upsert_fund_snapshot(&self, snapshot: FundSnapshot) -> Result<FundSnapshot> {
        self.fund
            .lock()
            .unwrap()
            .insert(snapshot.snapshot_date, snapshot.clone());
        Ok(snapshot)
    }
    async fn upsert_loan_snapshot(&self, snapshot: LoanSnapshot) -> Result<LoanSnapshot> {
        self.loan
            .lock()
            .unwrap()
            .insert(snapshot.snapshot_date, snapshot.clone());
        Ok(snapshot)
    }
    async fn upsert_payment_snapshot(&self, snapshot: PaymentSnapshot) -> Result<PaymentSnapshot> {
        self.payment
            .lock()
            .unwrap()
            .insert(snapshot.snapshot_date, snapshot.clone());
        Ok(snapshot)
    }
    async fn upsert_inspection_snapshot(
        &self,
        snapshot: InspectionSnapshot,
    ) -> Result<InspectionSnapshot> {
        self.inspection
            .lock()
            .unwrap()
            .insert(snapshot.snapshot_date, snapshot.clone());
        Ok(snapshot)
    }

    fn get_fund_snapshots(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<FundSnapshot>> {
        Ok(in_range(&self.fund, start, end))
    }
    fn get_loan_snapshots(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<LoanSnapshot>> {
        Ok(in_range(&self.loan, start, end))
    }
    fn get_payment_snapshots(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PaymentSnapshot>> {
        Ok(in_range(&self.payment, start, end))
    }
    fn get_inspection_snapshots(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<InspectionSnapshot>> {
        Ok(in_range(&self.inspection, start, end))
    }
}

#[derive(Default)]
struct MockIngestion {
    seen: Mutex<HashSet<String>>,
    calls: Mutex<usize>,
}

#[async_trait]
impl EventIngestionServiceTrait for MockIngestion {
    async fn ingest(&self, event: &DomainEvent) -> Result<()> {
        *self.calls.lock().unwrap() += 1;
        self.seen.lock().unwrap().insert(event.id.clone());
        Ok(())
    }
    fn get_ingested(&self, _event_id: &str) -> Result<Option<EventIngestionRecord>> {
        unimplemented!()
    }
    fn list_ingested(&self, _start: NaiveDate, _end: NaiveDate) -> Result<Vec<EventIngestionRecord>> {
        unimplemented!()
    }
}

struct Fixture {
    service: AnalyticsService,
    snapshots: Arc<MockSnapshotRepository>,
    ingestion: Arc<MockIngestion>,
}

fn fixture(metrics: MockMetrics) -> Fixture {
    let snapshots = Arc::new(MockSnapshotRepository::default());
    let ingestion = Arc::new(MockIngestion::default());
    let service = AnalyticsService::new(Arc::new(metrics), snapshots.clone(), ingestion.clone());
    Fixture {
        service,
        snapshots,
        ingestion,
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ============================================================================
// Snapshot computation
// ============================================================================

#[tokio::test]
async fn test_fund_snapshot_derives_available_capital() {
    let f = fixture(MockMetrics::new());
    let snapshot = f
        .service
        .compute_fund_snapshot(Some(date(2024, 6, 1)))
        .await
        .unwrap();

    assert_eq!(snapshot.total_funds, 3);
    assert_eq!(snapshot.capital_available, dec!(350000));
    assert_eq!(snapshot.average_investor_yield, Some(dec!(9.13)));
}

#[tokio::test]
async fn test_recompute_same_date_replaces_row() {
    let f = fixture(MockMetrics::new());
    let day = date(2024, 6, 1);

    f.service.compute_fund_snapshot(Some(day)).await.unwrap();
    f.service.compute_fund_snapshot(Some(day)).await.unwrap();

    assert_eq!(f.snapshots.fund.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_loan_and_payment_rates() {
    let f = fixture(MockMetrics::new());
    let day = date(2024, 6, 1);

    let loan = f.service.compute_loan_snapshot(Some(day)).await.unwrap();
    assert_eq!(loan.delinquency_rate, dec!(12.50));
    assert_eq!(loan.average_ltv, Some(dec!(64.33)));

    let payment = f.service.compute_payment_snapshot(Some(day)).await.unwrap();
    assert_eq!(payment.collection_rate, Some(dec!(75.00)));

    let inspection = f.service.compute_inspection_snapshot(Some(day)).await.unwrap();
    assert_eq!(inspection.inspections_pending, 5);
    assert_eq!(inspection.average_turnaround_days, None);
}

#[tokio::test]
async fn test_metric_failure_propagates_with_context() {
    let f = fixture(MockMetrics::failing("average_ltv"));
    let err = f
        .service
        .compute_loan_snapshot(Some(date(2024, 6, 1)))
        .await
        .unwrap_err();

    match err {
        Error::Analytics(AnalyticsError::MetricQuery {
            snapshot, metric, ..
        }) => {
            assert_eq!(snapshot, "loan");
            assert_eq!(metric, "average_ltv");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(f.snapshots.loan.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_compute_all_writes_every_variant() {
    let f = fixture(MockMetrics::new());
    let day = date(2024, 6, 2);
    let set = f.service.compute_all(Some(day)).await.unwrap();

    assert_eq!(set.date, day);
    assert_eq!(f.snapshots.fund.lock().unwrap().len(), 1);
    assert_eq!(f.snapshots.loan.lock().unwrap().len(), 1);
    assert_eq!(f.snapshots.payment.lock().unwrap().len(), 1);
    assert_eq!(f.snapshots.inspection.lock().unwrap().len(), 1);
}

// ============================================================================
// Incremental recompute
// ============================================================================

#[test]
fn test_affected_snapshots_by_event_type() {
    assert_eq!(
        snapshots_affected_by(&EventKind::LoanFunded),
        &[SnapshotKind::Loan, SnapshotKind::Fund]
    );
    assert_eq!(
        snapshots_affected_by(&EventKind::PaymentReceived),
        &[SnapshotKind::Payment, SnapshotKind::Loan]
    );
    assert_eq!(
        snapshots_affected_by(&EventKind::InspectionCompleted),
        &[SnapshotKind::Inspection]
    );
    assert!(snapshots_affected_by(&EventKind::FundCreated).is_empty());
    assert!(snapshots_affected_by(&EventKind::parse("Borrower.Updated")).is_empty());
}

#[tokio::test]
async fn test_compute_from_event_recomputes_on_occurrence_date() {
    let f = fixture(MockMetrics::new());
    // 03:30 UTC on the 11th is the evening of the 10th in New York.
    let event = DomainEvent::payment_received("pay-1", "loan-1", dec!(1500))
        .with_occurred_at(Utc.with_ymd_and_hms(2024, 7, 11, 3, 30, 0).unwrap());

    assert!(f.service.compute_from_event(&event).await.unwrap());

    let payments = f.snapshots.payment.lock().unwrap();
    assert_eq!(payments.keys().copied().collect::<Vec<_>>(), vec![date(2024, 7, 10)]);
    assert_eq!(f.snapshots.loan.lock().unwrap().len(), 1);
    assert!(f.snapshots.fund.lock().unwrap().is_empty());
    assert!(f.snapshots.inspection.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_event_is_ingested_without_recompute() {
    let f = fixture(MockMetrics::new());
    let event = DomainEvent::new(
        EventKind::parse("Borrower.Updated"),
        "Borrower",
        "b-1",
        serde_json::Value::Null,
    );

    assert!(f.service.compute_from_event(&event).await.unwrap());
    assert!(f.ingestion.seen.lock().unwrap().contains(&event.id));
    assert!(f.snapshots.fund.lock().unwrap().is_empty());
    assert!(f.snapshots.loan.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_compute_from_event_ingests_before_failing_recompute() {
    let f = fixture(MockMetrics::failing("count_funds"));
    let event = DomainEvent::loan_funded("loan-1", "fund-1", dec!(200000));

    let result = f.service.compute_from_event(&event).await;
    assert!(matches!(result, Err(Error::Analytics(_))));
    assert_eq!(*f.ingestion.calls.lock().unwrap(), 1);
}

// ============================================================================
// KPI reads
// ============================================================================

#[tokio::test]
async fn test_kpis_return_window_ascending() {
    let f = fixture(MockMetrics::new());
    for day in [date(2024, 5, 3), date(2024, 5, 1), date(2024, 5, 2), date(2024, 4, 1)] {
        f.service.compute_fund_snapshot(Some(day)).await.unwrap();
    }

    let rows = f
        .service
        .get_fund_kpis(Some(date(2024, 5, 1)), Some(date(2024, 5, 3)))
        .unwrap();
    let dates: Vec<_> = rows.iter().map(|s| s.snapshot_date).collect();
    assert_eq!(dates, vec![date(2024, 5, 1), date(2024, 5, 2), date(2024, 5, 3)]);

    // Default start is 30 days before the end.
    let trailing = f.service.get_fund_kpis(None, Some(date(2024, 5, 3))).unwrap();
    assert_eq!(trailing.len(), 3);
}

#[tokio::test]
async fn test_kpis_with_inverted_window_are_empty() {
    let f = fixture(MockMetrics::new());
    f.service.compute_all(Some(date(2024, 5, 2))).await.unwrap();

    let rows = f
        .service
        .get_collections_kpis(Some(date(2024, 5, 3)), Some(date(2024, 5, 1)))
        .unwrap();
    assert!(rows.is_empty());
    assert!(f
        .service
        .get_inspection_kpis(Some(date(2024, 5, 3)), Some(date(2024, 5, 1)))
        .unwrap()
        .is_empty());
}

#[test]
fn test_kpi_reads_do_not_compute() {
    let f = fixture(MockMetrics::new());
    let rows = f
        .service
        .get_loan_kpis(Some(date(2024, 1, 1)), Some(date(2024, 1, 31)))
        .unwrap();
    assert!(rows.is_empty());
    assert!(f.snapshots.loan.lock().unwrap().is_empty());
}

#[test]
fn test_kpi_window_default_before_min_date_is_a_validation_error() {
    let f = fixture(MockMetrics::new());
    let result = f.service.get_fund_kpis(None, Some(NaiveDate::MIN));
    assert!(matches!(result, Err(Error::Validation(_))));
}
