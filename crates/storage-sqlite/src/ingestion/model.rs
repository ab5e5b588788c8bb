//! Database model for ingestion ledger rows.

use diesel::prelude::*;
use log::error;

use crate::utils::{format_timestamp, parse_timestamp};
use lendbook_core::ingestion::EventIngestionRecord;

#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::domain_event_ingestions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct EventIngestionDB {
    pub event_id: String,
    pub event_type: String,
    pub aggregate_type: String,
    pub aggregate_id: String,
    pub payload: String,
    pub occurred_at: String,
    pub ingested_at: String,
}

impl From<EventIngestionRecord> for EventIngestionDB {
    fn from(record: EventIngestionRecord) -> Self {
        Self {
            event_id: record.event_id,
            event_type: record.event_type,
            aggregate_type: record.aggregate_type,
            aggregate_id: record.aggregate_id,
            payload: record.payload.to_string(),
            occurred_at: format_timestamp(record.occurred_at),
            ingested_at: format_timestamp(record.ingested_at),
        }
    }
}

impl From<EventIngestionDB> for EventIngestionRecord {
    fn from(db: EventIngestionDB) -> Self {
        let payload = serde_json::from_str(&db.payload).unwrap_or_else(|e| {
            error!("Failed to parse payload of event {}: {}", db.event_id, e);
            serde_json::Value::Null
        });
        Self {
            occurred_at: parse_timestamp(&db.occurred_at),
            ingested_at: parse_timestamp(&db.ingested_at),
            event_id: db.event_id,
            event_type: db.event_type,
            aggregate_type: db.aggregate_type,
            aggregate_id: db.aggregate_id,
            payload,
        }
    }
}
