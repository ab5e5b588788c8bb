//! SQLite storage for the event ingestion ledger.

mod model;
mod repository;

pub use model::EventIngestionDB;
pub use repository::EventIngestionRepository;
