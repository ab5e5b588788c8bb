//! Ingestion ledger models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::events::DomainEvent;

/// One row per domain event observed by the analytics engine.
///
/// Keyed by `event_id`; never updated or deleted once written.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventIngestionRecord {
    pub event_id: String,
    pub event_type: String,
    pub aggregate_type: String,
    pub aggregate_id: String,
    pub payload: Value,
    pub occurred_at: DateTime<Utc>,
    pub ingested_at: DateTime<Utc>,
}

impl EventIngestionRecord {
    pub fn from_event(event: &DomainEvent, ingested_at: DateTime<Utc>) -> Self {
        Self {
            event_id: event.id.clone(),
            event_type: event.event_type.to_string(),
            aggregate_type: event.aggregate_type.clone(),
            aggregate_id: event.aggregate_id.clone(),
            payload: event.payload.clone(),
            occurred_at: event.occurred_at,
            ingested_at,
        }
    }
}
