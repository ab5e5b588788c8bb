use std::sync::Arc;

use async_trait::async_trait;
use log::debug;

use super::handlers_traits::{
    Alert, AlertNotifierTrait, AlertSeverity, AuditEntry, AuditTrailTrait,
    PaymentScheduleGeneratorTrait,
};
use crate::analytics::AnalyticsServiceTrait;
use crate::constants::INSPECTION_RESULT_FAILED;
use crate::errors::{Result, ValidationError};
use crate::events::{DomainEvent, DomainEventHandler, EventKind};

/// Id of the entity an event is about: the payload field when present,
/// otherwise the aggregate id.
fn subject_id<'a>(event: &'a DomainEvent, field: &str) -> Result<&'a str> {
    event
        .payload_str(field)
        .or_else(|| Some(event.aggregate_id.as_str()).filter(|id| !id.is_empty()))
        .ok_or_else(|| ValidationError::MissingField(field.to_string()).into())
}

/// Writes every known event to the compliance audit trail.
pub struct ComplianceAuditHandler {
    audit_trail: Arc<dyn AuditTrailTrait>,
}

impl ComplianceAuditHandler {
    pub fn new(audit_trail: Arc<dyn AuditTrailTrait>) -> Self {
        Self { audit_trail }
    }
}

#[async_trait]
impl DomainEventHandler for ComplianceAuditHandler {
    async fn handle(&self, event: &DomainEvent) -> Result<()> {
        self.audit_trail.record(AuditEntry::from_event(event)).await
    }
}

/// Keeps snapshots current by routing events through the incremental recompute.
pub struct SnapshotRefreshHandler {
    analytics: Arc<dyn AnalyticsServiceTrait>,
}

impl SnapshotRefreshHandler {
    pub fn new(analytics: Arc<dyn AnalyticsServiceTrait>) -> Self {
        Self { analytics }
    }
}

#[async_trait]
impl DomainEventHandler for SnapshotRefreshHandler {
    async fn handle(&self, event: &DomainEvent) -> Result<()> {
        self.analytics.compute_from_event(event).await.map(|_| ())
    }
}

pub struct ScheduleGenerationHandler {
    generator: Arc<dyn PaymentScheduleGeneratorTrait>,
}

impl ScheduleGenerationHandler {
    pub fn new(generator: Arc<dyn PaymentScheduleGeneratorTrait>) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl DomainEventHandler for ScheduleGenerationHandler {
    async fn handle(&self, event: &DomainEvent) -> Result<()> {
        if event.event_type != EventKind::LoanFunded {
            return Ok(());
        }
        let loan_id = subject_id(event, "loanId")?;
        self.generator
            .generate_schedule(loan_id, event.occurrence_date())
            .await
    }
}

/// Raises alerts for delinquencies, missed payments and failed inspections.
pub struct AlertHandler {
    notifier: Arc<dyn AlertNotifierTrait>,
}

impl AlertHandler {
    pub fn new(notifier: Arc<dyn AlertNotifierTrait>) -> Self {
        Self { notifier }
    }

    fn alert_for(event: &DomainEvent) -> Result<Option<Alert>> {
        let (severity, subject, message) = match &event.event_type {
            EventKind::LoanDelinquent => {
                let loan_id = subject_id(event, "loanId")?;
                (
                    AlertSeverity::Critical,
                    loan_id,
                    format!("Loan {} is delinquent", loan_id),
                )
            }
            EventKind::PaymentMissed => {
                let payment_id = subject_id(event, "paymentId")?;
                (
                    AlertSeverity::Warning,
                    payment_id,
                    format!("Payment {} was missed", payment_id),
                )
            }
            EventKind::InspectionCompleted => {
                let failed = event
                    .payload_str("result")
                    .is_some_and(|r| r.eq_ignore_ascii_case(INSPECTION_RESULT_FAILED));
                if !failed {
                    return Ok(None);
                }
                let inspection_id = subject_id(event, "inspectionId")?;
                (
                    AlertSeverity::Warning,
                    inspection_id,
                    format!("Inspection {} failed", inspection_id),
                )
            }
            _ => return Ok(None),
        };

        Ok(Some(Alert {
            severity,
            event_id: event.id.clone(),
            event_type: event.event_type.to_string(),
            subject_id: subject.to_string(),
            message,
        }))
    }
}

#[async_trait]
impl DomainEventHandler for AlertHandler {
    async fn handle(&self, event: &DomainEvent) -> Result<()> {
        match Self::alert_for(event)? {
            Some(alert) => self.notifier.notify(alert).await,
            None => {
                debug!("No alert for {} event {}", event.event_type, event.id);
                Ok(())
            }
        }
    }
}
