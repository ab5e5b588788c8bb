use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::NaiveDate;
use log::{debug, warn};
use rayon::prelude::*;
use rust_decimal::{Decimal, MathematicalOps};

use super::cash_flow::CashFlow;
use super::fund_model::{
    DeploymentPoint, FundPerformance, FundType, FundTypeSummary, PortfolioSummary, TopInvestment,
};
use super::fund_traits::{FundPerformanceServiceTrait, FundRepositoryTrait};
use super::irr::solve_irr;
use crate::constants::{
    DAYS_PER_YEAR, DEFAULT_TOP_INVESTMENTS_LIMIT, DISPLAY_DECIMAL_PRECISION,
    PORTFOLIO_TOP_FUNDS, RATIO_DECIMAL_PRECISION,
};
use crate::errors::Result;
use crate::utils::decimal_utils::{mean, percentage_or_zero, ratio};
use crate::utils::time_utils::{business_date_today, days_between};

pub struct FundPerformanceService {
    repository: Arc<dyn FundRepositoryTrait>,
}

impl FundPerformanceService {
    pub fn new(repository: Arc<dyn FundRepositoryTrait>) -> Self {
        Self { repository }
    }
}

/// MOIC descending, then IRR descending; missing values sort last.
fn rank_funds(a: &FundPerformance, b: &FundPerformance) -> Ordering {
    desc_nulls_last(a.moic, b.moic).then_with(|| desc_nulls_last(a.irr, b.irr))
}

fn desc_nulls_last(a: Option<Decimal>, b: Option<Decimal>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// `(MOIC^(1/years) - 1) × 100`, or `None` when no time elapsed.
fn annualized_return(moic: Decimal, days: i64) -> Option<Decimal> {
    if days <= 0 {
        return None;
    }
    if moic.is_zero() {
        return Some(-Decimal::ONE_HUNDRED);
    }
    let exponent = Decimal::from(DAYS_PER_YEAR).checked_div(Decimal::from(days))?;
    let growth = moic.checked_powd(exponent)?;
    Some(((growth - Decimal::ONE) * Decimal::ONE_HUNDRED).round_dp(DISPLAY_DECIMAL_PRECISION))
}

impl FundPerformanceServiceTrait for FundPerformanceService {
    fn calculate_fund_performance(
        &self,
        fund_id: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Option<FundPerformance>> {
        let Some(fund) = self.repository.get_fund(fund_id)? else {
            debug!("Fund {} not found", fund_id);
            return Ok(None);
        };
        let start = start_date.unwrap_or(fund.inception_date);
        let end = end_date.unwrap_or_else(business_date_today);

        let commitments =
            self.repository
                .list_active_commitments(fund_id, Some(start), Some(end))?;
        let deployed = self
            .repository
            .list_allocations(fund_id, Some(start), Some(end))?;
        // Returns count for every allocation made by the window end, whenever they came back.
        let through_end = self.repository.list_allocations(fund_id, None, Some(end))?;

        let total_committed: Decimal = commitments.iter().map(|c| c.amount).sum();
        let total_deployed: Decimal = deployed.iter().map(|a| a.allocated_amount).sum();
        let total_returned: Decimal = through_end.iter().map(|a| a.returned_amount).sum();

        // Each allocation pairs with the commitment it was drawn from.
        let commitment_dates: HashMap<String, NaiveDate> = self
            .repository
            .list_active_commitments(fund_id, None, None)?
            .into_iter()
            .map(|c| (c.id, c.commitment_date))
            .collect();
        let avg_deployment_days = mean(deployed.iter().filter_map(|a| {
            let committed_on = commitment_dates.get(a.commitment_id.as_deref()?)?;
            Some(Decimal::from(days_between(*committed_on, a.allocation_date)))
        }))
        .map(|d| d.round_dp(DISPLAY_DECIMAL_PRECISION));
        let avg_return_days = mean(deployed.iter().filter_map(|a| {
            a.full_return_date
                .filter(|returned_on| *returned_on <= end)
                .map(|returned_on| Decimal::from(days_between(a.allocation_date, returned_on)))
        }))
        .map(|d| d.round_dp(DISPLAY_DECIMAL_PRECISION));

        let mut flows: Vec<CashFlow> = commitments
            .iter()
            .map(|c| CashFlow::outflow(c.commitment_date, c.amount))
            .chain(through_end.iter().filter_map(|a| {
                a.full_return_date
                    .filter(|d| *d >= start && *d <= end)
                    .map(|d| CashFlow::inflow(d, a.returned_amount))
            }))
            .collect();
        flows.sort_by_key(|f| f.date);
        let irr = solve_irr(&flows)
            .map(|r| (r * Decimal::ONE_HUNDRED).round_dp(DISPLAY_DECIMAL_PRECISION));
        if irr.is_none() {
            debug!("No IRR for fund {} over {} cash flow(s)", fund_id, flows.len());
        }

        Ok(Some(FundPerformance {
            fund_id: fund.id,
            fund_name: fund.name,
            fund_type: fund.fund_type,
            total_committed,
            total_deployed,
            total_returned,
            net_deployed: total_deployed - total_returned,
            deployment_rate: percentage_or_zero(total_deployed, total_committed)
                .round_dp(DISPLAY_DECIMAL_PRECISION),
            return_rate: percentage_or_zero(total_returned, total_deployed)
                .round_dp(DISPLAY_DECIMAL_PRECISION),
            irr,
            moic: ratio(total_returned, total_deployed).map(|m| m.round_dp(RATIO_DECIMAL_PRECISION)),
            avg_deployment_days,
            avg_return_days,
            start_date: start,
            end_date: end,
        }))
    }

    fn get_portfolio_summary(&self, organization_id: &str) -> Result<Option<PortfolioSummary>> {
        let funds = self.repository.list_funds_by_organization(organization_id)?;
        if funds.is_empty() {
            debug!("Organization {} has no funds", organization_id);
            return Ok(None);
        }

        let mut performances = Vec::with_capacity(funds.len());
        for fund in &funds {
            match self.calculate_fund_performance(&fund.id, None, None)? {
                Some(performance) => performances.push(performance),
                None => warn!("Fund {} disappeared while summarising portfolio", fund.id),
            }
        }

        let total_committed: Decimal = performances.iter().map(|p| p.total_committed).sum();
        let total_deployed: Decimal = performances.iter().map(|p| p.total_deployed).sum();
        let total_returned: Decimal = performances.iter().map(|p| p.total_returned).sum();
        let total_aum: Decimal = performances.iter().map(|p| p.net_deployed).sum();

        let (weighted_irr, irr_weight) = performances
            .iter()
            .filter_map(|p| p.irr.map(|irr| (irr, p.total_deployed)))
            .fold((Decimal::ZERO, Decimal::ZERO), |(sum, weight), (irr, deployed)| {
                (sum + irr * deployed, weight + deployed)
            });
        let portfolio_irr =
            ratio(weighted_irr, irr_weight).map(|r| r.round_dp(DISPLAY_DECIMAL_PRECISION));

        let by_fund_type = FundType::ALL
            .into_iter()
            .map(|fund_type| {
                let group: Vec<&FundPerformance> = performances
                    .iter()
                    .filter(|p| p.fund_type == fund_type)
                    .collect();
                FundTypeSummary {
                    fund_type,
                    fund_count: group.len(),
                    aum: group.iter().map(|p| p.net_deployed).sum(),
                    average_irr: mean(group.iter().filter_map(|p| p.irr))
                        .map(|r| r.round_dp(DISPLAY_DECIMAL_PRECISION)),
                }
            })
            .collect();

        let mut top_funds = performances.clone();
        top_funds.sort_by(rank_funds);
        top_funds.truncate(PORTFOLIO_TOP_FUNDS);

        Ok(Some(PortfolioSummary {
            organization_id: organization_id.to_string(),
            fund_count: performances.len(),
            total_aum,
            total_committed,
            total_deployed,
            total_returned,
            portfolio_irr,
            portfolio_moic: ratio(total_returned, total_deployed)
                .map(|m| m.round_dp(RATIO_DECIMAL_PRECISION)),
            by_fund_type,
            top_funds,
        }))
    }

    fn get_fund_comparison(
        &self,
        fund_ids: &[String],
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<FundPerformance>> {
        let results: Vec<Option<FundPerformance>> = fund_ids
            .par_iter()
            .map(|id| self.calculate_fund_performance(id, start_date, end_date))
            .collect::<Result<_>>()?;
        Ok(results.into_iter().flatten().collect())
    }

    fn get_deployment_timeline(
        &self,
        fund_id: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<DeploymentPoint>> {
        let Some(fund) = self.repository.get_fund(fund_id)? else {
            return Ok(Vec::new());
        };
        let start = start_date.unwrap_or(fund.inception_date);
        let end = end_date.unwrap_or_else(business_date_today);
        let in_window = |d: NaiveDate| d >= start && d <= end;

        let mut days: BTreeMap<NaiveDate, (Decimal, Decimal)> = BTreeMap::new();
        for allocation in self.repository.list_allocations(fund_id, None, Some(end))? {
            if in_window(allocation.allocation_date) {
                days.entry(allocation.allocation_date).or_default().0 +=
                    allocation.allocated_amount;
            }
            if let Some(returned_on) = allocation.full_return_date.filter(|d| in_window(*d)) {
                days.entry(returned_on).or_default().1 += allocation.returned_amount;
            }
        }

        Ok(days
            .into_iter()
            .map(|(date, (allocated, returned))| DeploymentPoint {
                date,
                allocated,
                returned,
            })
            .collect())
    }

    fn get_top_investments(&self, fund_id: &str, limit: Option<usize>) -> Result<Vec<TopInvestment>> {
        let limit = limit.unwrap_or(DEFAULT_TOP_INVESTMENTS_LIMIT);
        let mut investments = Vec::new();

        for allocation in self.repository.list_allocations(fund_id, None, None)? {
            let Some(loan) = self.repository.get_loan(&allocation.loan_id)? else {
                warn!(
                    "Skipping allocation {}: loan {} not found",
                    allocation.id, allocation.loan_id
                );
                continue;
            };
            let moic = ratio(allocation.returned_amount, allocation.allocated_amount)
                .unwrap_or(Decimal::ZERO)
                .round_dp(RATIO_DECIMAL_PRECISION);
            let irr = allocation.full_return_date.and_then(|returned_on| {
                annualized_return(moic, days_between(allocation.allocation_date, returned_on))
            });

            investments.push(TopInvestment {
                allocation_id: allocation.id,
                loan_id: allocation.loan_id,
                loan_number: loan.loan_number,
                borrower_name: loan.borrower_name,
                allocated_amount: allocation.allocated_amount,
                returned_amount: allocation.returned_amount,
                allocation_date: allocation.allocation_date,
                full_return_date: allocation.full_return_date,
                moic,
                irr,
            });
        }

        investments.sort_by(|a, b| b.moic.cmp(&a.moic));
        investments.truncate(limit);
        Ok(investments)
    }
}
