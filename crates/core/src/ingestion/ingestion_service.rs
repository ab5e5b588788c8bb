use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use log::debug;

use super::ingestion_model::EventIngestionRecord;
use super::ingestion_traits::{EventIngestionRepositoryTrait, EventIngestionServiceTrait};
use crate::errors::{Result, ValidationError};
use crate::events::DomainEvent;
use crate::utils::time_utils::DEFAULT_BUSINESS_TZ;

pub struct EventIngestionService {
    repository: Arc<dyn EventIngestionRepositoryTrait>,
}

impl EventIngestionService {
    pub fn new(repository: Arc<dyn EventIngestionRepositoryTrait>) -> Self {
        Self { repository }
    }
}

/// UTC instant at which business date `date` begins.
fn start_of_business_day(date: NaiveDate) -> Result<chrono::DateTime<Utc>> {
    DEFAULT_BUSINESS_TZ
        .from_local_datetime(&date.and_time(NaiveTime::MIN))
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| {
            ValidationError::InvalidInput(format!("No local midnight on {}", date)).into()
        })
}

#[async_trait]
impl EventIngestionServiceTrait for EventIngestionService {
    async fn ingest(&self, event: &DomainEvent) -> Result<()> {
        event.validate()?;
        let record = EventIngestionRecord::from_event(event, Utc::now());
        let inserted = self.repository.insert_if_absent(record).await?;
        if inserted {
            debug!("Ingested {} event {}", event.event_type, event.id);
        } else {
            debug!("Event {} already ingested, skipping", event.id);
        }
        Ok(())
    }

    fn get_ingested(&self, event_id: &str) -> Result<Option<EventIngestionRecord>> {
        self.repository.get_by_event_id(event_id)
    }

    fn list_ingested(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<EventIngestionRecord>> {
        if start > end {
            return Ok(Vec::new());
        }
        let from = start_of_business_day(start)?;
        let next_day = end.checked_add_signed(Duration::days(1)).ok_or_else(|| {
            ValidationError::InvalidInput(format!("Ledger window ending {} is out of range", end))
        })?;
        let to = start_of_business_day(next_day)?;
        self.repository.list_between(from, to)
    }
}
