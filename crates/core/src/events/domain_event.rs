//! Domain event types.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::errors::{Result, ValidationError};
use crate::utils::time_utils::business_date;

/// Tag identifying what happened, in `Aggregate.Verb` form.
///
/// Known tags get their own variant so dispatch on them is exhaustive; any
/// other tag is carried verbatim in `Other` and still flows through the bus
/// and the ingestion ledger. Serialises as the plain string tag.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventKind {
    FundCreated,
    FundCapitalCommitted,
    LoanFunded,
    LoanDelinquent,
    PaymentReceived,
    PaymentMissed,
    InspectionScheduled,
    InspectionCompleted,
    DrawRequested,
    Other(String),
}

impl EventKind {
    /// Every tag with a dedicated variant.
    pub const KNOWN: [EventKind; 9] = [
        EventKind::FundCreated,
        EventKind::FundCapitalCommitted,
        EventKind::LoanFunded,
        EventKind::LoanDelinquent,
        EventKind::PaymentReceived,
        EventKind::PaymentMissed,
        EventKind::InspectionScheduled,
        EventKind::InspectionCompleted,
        EventKind::DrawRequested,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            EventKind::FundCreated => "Fund.Created",
            EventKind::FundCapitalCommitted => "Fund.CapitalCommitted",
            EventKind::LoanFunded => "Loan.Funded",
            EventKind::LoanDelinquent => "Loan.Delinquent",
            EventKind::PaymentReceived => "Payment.Received",
            EventKind::PaymentMissed => "Payment.Missed",
            EventKind::InspectionScheduled => "Inspection.Scheduled",
            EventKind::InspectionCompleted => "Inspection.Completed",
            EventKind::DrawRequested => "Draw.Requested",
            EventKind::Other(tag) => tag,
        }
    }

    pub fn parse(tag: &str) -> Self {
        match tag {
            "Fund.Created" => EventKind::FundCreated,
            "Fund.CapitalCommitted" => EventKind::FundCapitalCommitted,
            "Loan.Funded" => EventKind::LoanFunded,
            "Loan.Delinquent" => EventKind::LoanDelinquent,
            "Payment.Received" => EventKind::PaymentReceived,
            "Payment.Missed" => EventKind::PaymentMissed,
            "Inspection.Scheduled" => EventKind::InspectionScheduled,
            "Inspection.Completed" => EventKind::InspectionCompleted,
            "Draw.Requested" => EventKind::DrawRequested,
            other => EventKind::Other(other.to_string()),
        }
    }
}

impl From<String> for EventKind {
    fn from(tag: String) -> Self {
        EventKind::parse(&tag)
    }
}

impl From<&str> for EventKind {
    fn from(tag: &str) -> Self {
        EventKind::parse(tag)
    }
}

impl From<EventKind> for String {
    fn from(kind: EventKind) -> Self {
        match kind {
            EventKind::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Correlation and scoping information attached by the publisher.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventMetadata {
    pub correlation_id: Option<String>,
    pub causation_id: Option<String>,
    pub organization_id: Option<String>,
}

/// An immutable fact about the lending domain.
///
/// Created once by a publisher and never mutated; consumed by zero or more
/// handlers. The payload shape is determined by `event_type`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainEvent {
    pub id: String,
    pub event_type: EventKind,
    #[serde(default)]
    pub aggregate_type: String,
    #[serde(default)]
    pub aggregate_id: String,
    #[serde(default)]
    pub payload: Value,
    pub occurred_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<EventMetadata>,
}

impl DomainEvent {
    /// Creates an event with a fresh time-ordered id, occurring now.
    pub fn new(
        event_type: EventKind,
        aggregate_type: impl Into<String>,
        aggregate_id: impl Into<String>,
        payload: Value,
    ) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            event_type,
            aggregate_type: aggregate_type.into(),
            aggregate_id: aggregate_id.into(),
            payload,
            occurred_at: Utc::now(),
            metadata: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_occurred_at(mut self, occurred_at: DateTime<Utc>) -> Self {
        self.occurred_at = occurred_at;
        self
    }

    pub fn with_metadata(mut self, metadata: EventMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Creates a Loan.Funded event.
    pub fn loan_funded(loan_id: &str, fund_id: &str, amount: rust_decimal::Decimal) -> Self {
        Self::new(
            EventKind::LoanFunded,
            "Loan",
            loan_id,
            json!({ "loanId": loan_id, "fundId": fund_id, "amount": amount }),
        )
    }

    /// Creates a Payment.Received event.
    pub fn payment_received(payment_id: &str, loan_id: &str, amount: rust_decimal::Decimal) -> Self {
        Self::new(
            EventKind::PaymentReceived,
            "Payment",
            payment_id,
            json!({ "paymentId": payment_id, "loanId": loan_id, "amount": amount }),
        )
    }

    /// Creates an Inspection.Completed event. `result` is the inspector's verdict
    /// (e.g. "PASSED" or "FAILED").
    pub fn inspection_completed(inspection_id: &str, loan_id: &str, result: &str) -> Self {
        Self::new(
            EventKind::InspectionCompleted,
            "Inspection",
            inspection_id,
            json!({ "inspectionId": inspection_id, "loanId": loan_id, "result": result }),
        )
    }

    /// Calendar date the event occurred on, in the business timezone.
    pub fn occurrence_date(&self) -> NaiveDate {
        business_date(self.occurred_at)
    }

    /// Organization scope from the metadata, when the publisher provided one.
    pub fn organization_id(&self) -> Option<&str> {
        self.metadata
            .as_ref()
            .and_then(|m| m.organization_id.as_deref())
    }

    /// Reads a string field from the payload.
    pub fn payload_str(&self, field: &str) -> Option<&str> {
        self.payload.get(field).and_then(Value::as_str)
    }

    /// Checks that the event can be dispatched and ingested.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(ValidationError::MissingField("id".to_string()).into());
        }
        if self.event_type.as_str().trim().is_empty() {
            return Err(ValidationError::MissingField("eventType".to_string()).into());
        }
        Ok(())
    }
}
