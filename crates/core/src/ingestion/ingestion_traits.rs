use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use super::ingestion_model::EventIngestionRecord;
use crate::errors::Result;
use crate::events::DomainEvent;

/// Storage for the ingestion ledger.
#[async_trait]
pub trait EventIngestionRepositoryTrait: Send + Sync {
    /// Inserts `record` unless a row with the same event id exists.
    ///
    /// Must be atomic at the storage layer. Returns `true` when a row was written.
    async fn insert_if_absent(&self, record: EventIngestionRecord) -> Result<bool>;

    fn get_by_event_id(&self, event_id: &str) -> Result<Option<EventIngestionRecord>>;

    /// Records whose `occurred_at` lies in `[from, to)`, oldest first.
    fn list_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<EventIngestionRecord>>;
}

/// Ledger operations used by the snapshot aggregator and the audit API.
#[async_trait]
pub trait EventIngestionServiceTrait: Send + Sync {
    /// Records `event` once. Replays of the same id are silent no-ops.
    async fn ingest(&self, event: &DomainEvent) -> Result<()>;
    fn get_ingested(&self, event_id: &str) -> Result<Option<EventIngestionRecord>>;
    /// Records that occurred on business dates `start..=end`.
    fn list_ingested(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<EventIngestionRecord>>;
}
