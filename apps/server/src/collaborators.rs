//! Log-backed collaborators for the default event handlers.
//!
//! The server has no downstream audit store, scheduler or pager of its own;
//! these write structured log records that an operator's log pipeline picks up.

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::{error, info, warn};

use lendbook_core::handlers::{
    Alert, AlertNotifierTrait, AlertSeverity, AuditEntry, AuditTrailTrait,
    PaymentScheduleGeneratorTrait,
};
use lendbook_core::Result;

pub struct LogAuditTrail;

#[async_trait]
impl AuditTrailTrait for LogAuditTrail {
    async fn record(&self, entry: AuditEntry) -> Result<()> {
        info!(
            target: "lendbook::audit",
            event_id = %entry.event_id,
            event_type = %entry.event_type,
            aggregate_type = %entry.aggregate_type,
            aggregate_id = %entry.aggregate_id,
            organization_id = entry.organization_id.as_deref().unwrap_or(""),
            occurred_at = %entry.occurred_at,
            "Domain event recorded"
        );
        Ok(())
    }
}

pub struct LogPaymentScheduleGenerator;

#[async_trait]
impl PaymentScheduleGeneratorTrait for LogPaymentScheduleGenerator {
    async fn generate_schedule(&self, loan_id: &str, funded_on: NaiveDate) -> Result<()> {
        info!(
            target: "lendbook::schedules",
            loan_id,
            funded_on = %funded_on,
            "Payment schedule generation requested"
        );
        Ok(())
    }
}

pub struct LogAlertNotifier;

#[async_trait]
impl AlertNotifierTrait for LogAlertNotifier {
    async fn notify(&self, alert: Alert) -> Result<()> {
        match alert.severity {
            AlertSeverity::Critical => error!(
                target: "lendbook::alerts",
                event_id = %alert.event_id,
                subject_id = %alert.subject_id,
                "{}",
                alert.message
            ),
            AlertSeverity::Warning => warn!(
                target: "lendbook::alerts",
                event_id = %alert.event_id,
                subject_id = %alert.subject_id,
                "{}",
                alert.message
            ),
        }
        Ok(())
    }
}
