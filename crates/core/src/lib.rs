//! Lendbook Core - event-driven analytics and fund performance engine.
//!
//! This crate contains the domain logic: the domain event bus and its default
//! handlers, the idempotent ingestion ledger, the daily snapshot aggregator
//! and the fund performance calculator with its IRR solver. It is
//! database-agnostic and defines traits that are implemented by the
//! `storage-sqlite` crate.

pub mod analytics;
pub mod constants;
pub mod errors;
pub mod events;
pub mod funds;
pub mod handlers;
pub mod ingestion;
pub mod utils;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
