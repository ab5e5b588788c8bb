//! Read-side storage for the lending records that analytics and fund
//! performance are computed from.

mod fund_repository;
mod metrics_repository;
mod model;


pub use fund_repository::FundRepository;
pub use metrics_repository::LendingMetricsRepository;
pub use model::{CapitalCommitmentDB, FundDB, InspectionDB, LoanAllocationDB, LoanDB, PaymentDB};
