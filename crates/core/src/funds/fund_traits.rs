use chrono::NaiveDate;

use super::fund_model::{
    CapitalCommitment, DeploymentPoint, Fund, FundPerformance, LoanAllocation, LoanSummary,
    PortfolioSummary, TopInvestment,
};
use crate::errors::Result;

/// Read access to fund, commitment, allocation and loan records.
///
/// Optional bounds are inclusive; `None` leaves that side open.
pub trait FundRepositoryTrait: Send + Sync {
    fn get_fund(&self, fund_id: &str) -> Result<Option<Fund>>;
    fn list_funds_by_organization(&self, organization_id: &str) -> Result<Vec<Fund>>;
    /// Active commitments filtered by commitment date.
    fn list_active_commitments(
        &self,
        fund_id: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<CapitalCommitment>>;
    /// Allocations filtered by allocation date, oldest first.
    fn list_allocations(
        &self,
        fund_id: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<LoanAllocation>>;
    fn get_loan(&self, loan_id: &str) -> Result<Option<LoanSummary>>;
}

/// Fund and portfolio performance queries. All are read-only and recompute
/// from current records on every call.
pub trait FundPerformanceServiceTrait: Send + Sync {
    /// `None` when the fund does not exist. Window defaults to inception through today.
    fn calculate_fund_performance(
        &self,
        fund_id: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Option<FundPerformance>>;

    /// `None` when the organization has no funds.
    fn get_portfolio_summary(&self, organization_id: &str) -> Result<Option<PortfolioSummary>>;

    /// Performance for each fund that exists, in input order.
    fn get_fund_comparison(
        &self,
        fund_ids: &[String],
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<FundPerformance>>;

    fn get_deployment_timeline(
        &self,
        fund_id: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<DeploymentPoint>>;

    fn get_top_investments(&self, fund_id: &str, limit: Option<usize>) -> Result<Vec<TopInvestment>>;
}
