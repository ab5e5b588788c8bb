use super::*;
use crate::analytics::{
    FundSnapshot, InspectionSnapshot, LoanSnapshot, PaymentSnapshot, SnapshotSet,
};
use crate::errors::{Error, Result};
use crate::events::{DomainEvent, EventBus, EventKind};
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal_macros::dec;
use std::sync::{Arc, Mutex};

// ============================================================================
// Mock collaborators
// ============================================================================

/// Shared journal recording which collaborator was called, in order.
type Journal = Arc<Mutex<Vec<String>>>;

struct MockAudit(Journal);

#[async_trait]
impl AuditTrailTrait for MockAudit {
    async fn record(&self, entry: AuditEntry) -> Result<()> {
        self.0.lock().unwrap().push(format!("audit:{}", entry.event_type));
        Ok(())
    }
}

struct MockSchedules(Journal);

#[async_trait]
impl PaymentScheduleGeneratorTrait for MockSchedules {
    async fn generate_schedule(&self, loan_id: &str, _funded_on: NaiveDate) -> Result<()> {
        self.0.lock().unwrap().push(format!("schedule:{}", loan_id));
        Ok(())
    }
}

struct MockAlerts(Journal, Mutex<Vec<Alert>>);

#[async_trait]
impl AlertNotifierTrait for MockAlerts {
    async fn notify(&self, alert: Alert) -> Result<()> {
        self.0.lock().unwrap().push(format!("alert:{}", alert.subject_id));
        self.1.lock().unwrap().push(alert);
        Ok(())
    }
}

/// Analytics stub that records refreshes and can be told to fail.
struct MockAnalytics {
    journal: Journal,
    fail: bool,
}

#[async_trait]
impl AnalyticsServiceTrait for MockAnalytics {
    async fn compute_fund_snapshot(&self, _date: Option<NaiveDate>) -> Result<FundSnapshot> {
        unimplemented!()
    }
    async fn compute_loan_snapshot(&self, _date: Option<NaiveDate>) -> Result<LoanSnapshot> {
        unimplemented!()
    }
    async fn compute_payment_snapshot(&self, _date: Option<NaiveDate>) -> Result<PaymentSnapshot> {
        unimplemented!()
    }
    async fn compute_inspection_snapshot(
        &self,
        _date: Option<NaiveDate>,
    ) -> Result<InspectionSnapshot> {
        unimplemented!()
    }
    async fn compute_all(&self, _date: Option<NaiveDate>) -> Result<SnapshotSet> {
        unimplemented!()
    }
    async fn compute_from_event(&self, event: &DomainEvent) -> Result<bool> {
        if self.fail {
            return Err(Error::Repository("snapshot store offline".to_string()));
        }
        self.journal
            .lock()
            .unwrap()
            .push(format!("refresh:{}", event.event_type));
        Ok(true)
    }
    fn get_fund_kpis(&self, _s: Option<NaiveDate>, _e: Option<NaiveDate>) -> Result<Vec<FundSnapshot>> {
        unimplemented!()
    }
    fn get_loan_kpis(&self, _s: Option<NaiveDate>, _e: Option<NaiveDate>) -> Result<Vec<LoanSnapshot>> {
        unimplemented!()
    }
    fn get_collections_kpis(
        &self,
        _s: Option<NaiveDate>,
        _e: Option<NaiveDate>,
    ) -> Result<Vec<PaymentSnapshot>> {
        unimplemented!()
    }
    fn get_inspection_kpis(
        &self,
        _s: Option<NaiveDate>,
        _e: Option<NaiveDate>,
    ) -> Result<Vec<InspectionSnapshot>> {
        unimplemented!()
    }
}

struct Harness {
    bus: EventBus,
    journal: Journal,
    alerts: Arc<MockAlerts>,
}

fn harness(analytics_fails: bool) -> Harness {
    let journal: Journal = Arc::new(Mutex::new(Vec::new()));
    let alerts = Arc::new(MockAlerts(journal.clone(), Mutex::new(Vec::new())));
    let bus = EventBus::new();
    register_default_handlers(
        &bus,
        DefaultHandlerDeps {
            audit_trail: Arc::new(MockAudit(journal.clone())),
            analytics: Arc::new(MockAnalytics {
                journal: journal.clone(),
                fail: analytics_fails,
            }),
            schedule_generator: Arc::new(MockSchedules(journal.clone())),
            alert_notifier: alerts.clone(),
        },
    )
    .unwrap();
    Harness {
        bus,
        journal,
        alerts,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn test_default_registrations() {
    let h = harness(false);
    let registrations = h.bus.registrations();

    let audit_count = registrations
        .iter()
        .filter(|r| r.handler_name == COMPLIANCE_AUDIT_HANDLER)
        .count();
    assert_eq!(audit_count, EventKind::KNOWN.len());

    let funded: Vec<(&str, i32)> = registrations
        .iter()
        .filter(|r| r.event_type == EventKind::LoanFunded)
        .map(|r| (r.handler_name.as_str(), r.priority))
        .collect();
    assert_eq!(
        funded,
        vec![
            (COMPLIANCE_AUDIT_HANDLER, COMPLIANCE_AUDIT_PRIORITY),
            (SNAPSHOT_REFRESH_HANDLER, SNAPSHOT_REFRESH_PRIORITY),
            (SCHEDULE_GENERATION_HANDLER, SCHEDULE_GENERATION_PRIORITY),
        ]
    );
}

#[tokio::test]
async fn test_loan_funded_runs_audit_refresh_then_schedule() {
    let h = harness(false);
    let event = DomainEvent::loan_funded("loan-9", "fund-1", dec!(300000));

    let summary = h.bus.publish(&event).await.unwrap();

    assert!(summary.all_succeeded());
    assert_eq!(
        *h.journal.lock().unwrap(),
        vec!["audit:Loan.Funded", "refresh:Loan.Funded", "schedule:loan-9"]
    );
}

#[tokio::test]
async fn test_refresh_failure_does_not_stop_schedule_generation() {
    let h = harness(true);
    let event = DomainEvent::loan_funded("loan-9", "fund-1", dec!(300000));

    let summary = h.bus.publish(&event).await.unwrap();

    assert_eq!(summary.failed, vec![SNAPSHOT_REFRESH_HANDLER]);
    assert_eq!(
        *h.journal.lock().unwrap(),
        vec!["audit:Loan.Funded", "schedule:loan-9"]
    );
}

#[tokio::test]
async fn test_failed_inspection_raises_alert_after_refresh() {
    let h = harness(false);
    let event = DomainEvent::inspection_completed("insp-4", "loan-2", "FAILED");

    h.bus.publish(&event).await.unwrap();

    assert_eq!(
        *h.journal.lock().unwrap(),
        vec![
            "audit:Inspection.Completed",
            "refresh:Inspection.Completed",
            "alert:insp-4"
        ]
    );
    let alerts = h.alerts.1.lock().unwrap();
    assert_eq!(alerts[0].severity, AlertSeverity::Warning);
}

#[tokio::test]
async fn test_passed_inspection_raises_no_alert() {
    let h = harness(false);
    let event = DomainEvent::inspection_completed("insp-5", "loan-2", "PASSED");
    h.bus.publish(&event).await.unwrap();
    assert!(h.alerts.1.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_delinquency_is_critical() {
    let h = harness(false);
    let event = DomainEvent::new(
        EventKind::LoanDelinquent,
        "Loan",
        "loan-3",
        serde_json::json!({ "daysPastDue": 45 }),
    );
    h.bus.publish(&event).await.unwrap();

    let alerts = h.alerts.1.lock().unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].severity, AlertSeverity::Critical);
    assert_eq!(alerts[0].subject_id, "loan-3");
}

#[tokio::test]
async fn test_unknown_event_type_reaches_no_default_handler() {
    let h = harness(false);
    let event = DomainEvent::new(
        EventKind::parse("Borrower.Updated"),
        "Borrower",
        "b-1",
        serde_json::Value::Null,
    );
    let summary = h.bus.publish(&event).await.unwrap();
    assert!(summary.invoked.is_empty());
}
