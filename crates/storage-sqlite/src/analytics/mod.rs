//! SQLite storage for daily analytics snapshots.

mod model;
mod repository;

pub use model::{FundSnapshotDB, InspectionSnapshotDB, LoanSnapshotDB, PaymentSnapshotDB};
pub use repository::AnalyticsSnapshotRepository;
