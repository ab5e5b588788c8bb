//! Fund performance - cash flows, IRR and fund/portfolio metrics.

mod cash_flow;
mod fund_model;
mod fund_performance_service;
mod fund_traits;
pub mod irr;

#[cfg(test)]
mod fund_performance_service_tests;

pub use cash_flow::{CashFlow, FlowDirection};
pub use fund_model::{
    CapitalCommitment, DeploymentPoint, Fund, FundPerformance, FundType, FundTypeSummary,
    LoanAllocation, LoanSummary, PortfolioSummary, TopInvestment,
};
pub use fund_performance_service::FundPerformanceService;
pub use fund_traits::{FundPerformanceServiceTrait, FundRepositoryTrait};
pub use irr::{solve_irr, IrrOutcome, IrrSolverLimits, DEFAULT_IRR_LIMITS};
