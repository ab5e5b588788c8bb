use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::SqliteConnection;

use super::model::EventIngestionDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::domain_event_ingestions;
use crate::utils::format_timestamp;
use lendbook_core::ingestion::{EventIngestionRecord, EventIngestionRepositoryTrait};
use lendbook_core::Result;

pub struct EventIngestionRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl EventIngestionRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl EventIngestionRepositoryTrait for EventIngestionRepository {
    async fn insert_if_absent(&self, record: EventIngestionRecord) -> Result<bool> {
        let row: EventIngestionDB = record.into();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<bool> {
                // INSERT OR IGNORE: the primary key turns a replay into a no-op.
                let inserted = diesel::insert_or_ignore_into(domain_event_ingestions::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(inserted > 0)
            })
            .await
    }

    fn get_by_event_id(&self, event_id: &str) -> Result<Option<EventIngestionRecord>> {
        let mut conn = get_connection(&self.pool)?;
        let row = domain_event_ingestions::table
            .find(event_id)
            .select(EventIngestionDB::as_select())
            .first::<EventIngestionDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(EventIngestionRecord::from))
    }

    fn list_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<EventIngestionRecord>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = domain_event_ingestions::table
            .filter(domain_event_ingestions::occurred_at.ge(format_timestamp(from)))
            .filter(domain_event_ingestions::occurred_at.lt(format_timestamp(to)))
            .order(domain_event_ingestions::occurred_at.asc())
            .select(EventIngestionDB::as_select())
            .load::<EventIngestionDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(EventIngestionRecord::from).collect())
    }
}
