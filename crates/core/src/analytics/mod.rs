//! Snapshot aggregator - daily fund, loan, payment and inspection aggregates.

mod analytics_service;
mod metrics_traits;
mod snapshot_model;
mod snapshot_traits;

#[cfg(test)]
mod analytics_service_tests;

pub use analytics_service::{snapshots_affected_by, AnalyticsService};
pub use metrics_traits::LendingMetricsRepositoryTrait;
pub use snapshot_model::{
    FundSnapshot, InspectionSnapshot, LoanSnapshot, PaymentSnapshot, SnapshotKind, SnapshotSet,
};
pub use snapshot_traits::{AnalyticsServiceTrait, AnalyticsSnapshotRepositoryTrait};
