//! Event ingestion ledger - append-only, deduplicated record of observed events.

mod ingestion_model;
mod ingestion_service;
mod ingestion_traits;


pub use ingestion_model::EventIngestionRecord;
pub use ingestion_service::EventIngestionService;
pub use ingestion_traits::{EventIngestionRepositoryTrait, EventIngestionServiceTrait};
