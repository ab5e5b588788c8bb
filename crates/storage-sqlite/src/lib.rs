//! SQLite storage implementation for Lendbook.
//!
//! This crate provides all database-related functionality using Diesel ORM with SQLite.
//! It implements the repository traits defined in `lendbook-core` and contains:
//! - Database connection pooling and management
//! - Embedded Diesel migrations
//! - A single-writer actor that serialises writes in immediate transactions
//! - Repositories for the ingestion ledger, snapshots and lending records
//!
//! # Architecture
//!
//! This crate is the only place in the application where Diesel dependencies exist.
//! The core crate is database-agnostic and works with traits.
//!
//! ```text
//!        core (domain)
//!              │
//!              ▼
//!   storage-sqlite (this crate)
//!              │
//!              ▼
//!          SQLite DB
//! ```

pub mod db;
pub mod errors;
pub mod schema;
pub mod utils;

// Repository implementations
pub mod analytics;
pub mod ingestion;
pub mod lending;

#[cfg(test)]
mod test_utils;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, init, run_migrations, spawn_writer, DbConnection, DbPool,
    WriteHandle,
};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

// Re-export from lendbook-core for convenience
pub use lendbook_core::errors::{DatabaseError, Error, Result};
