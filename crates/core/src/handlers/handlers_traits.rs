//! Contracts for the collaborators behind the default handlers.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::events::DomainEvent;

/// Compliance record of an observed event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub event_id: String,
    pub event_type: String,
    pub aggregate_type: String,
    pub aggregate_id: String,
    pub organization_id: Option<String>,
    pub correlation_id: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

impl AuditEntry {
    pub fn from_event(event: &DomainEvent) -> Self {
        let metadata = event.metadata.as_ref();
        Self {
            event_id: event.id.clone(),
            event_type: event.event_type.to_string(),
            aggregate_type: event.aggregate_type.clone(),
            aggregate_id: event.aggregate_id.clone(),
            organization_id: metadata.and_then(|m| m.organization_id.clone()),
            correlation_id: metadata.and_then(|m| m.correlation_id.clone()),
            occurred_at: event.occurred_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Warning,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub severity: AlertSeverity,
    pub event_id: String,
    pub event_type: String,
    /// Loan, payment or inspection the alert is about.
    pub subject_id: String,
    pub message: String,
}

#[async_trait]
pub trait AuditTrailTrait: Send + Sync {
    async fn record(&self, entry: AuditEntry) -> Result<()>;
}

/// Builds the repayment schedule of a newly funded loan.
#[async_trait]
pub trait PaymentScheduleGeneratorTrait: Send + Sync {
    async fn generate_schedule(&self, loan_id: &str, funded_on: NaiveDate) -> Result<()>;
}

#[async_trait]
pub trait AlertNotifierTrait: Send + Sync {
    async fn notify(&self, alert: Alert) -> Result<()>;
}
