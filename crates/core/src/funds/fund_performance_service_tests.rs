//! Unit tests for the fund performance calculator.

use super::*;
use crate::errors::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

// ============================================================================
// Mock Repository
// ============================================================================

#[derive(Default)]
struct MockFundRepository {
    funds: Vec<Fund>,
    commitments: Vec<CapitalCommitment>,
    allocations: Vec<LoanAllocation>,
    loans: Vec<LoanSummary>,
}

fn within(d: NaiveDate, start: Option<NaiveDate>, end: Option<NaiveDate>) -> bool {
    start.map_or(true, |s| d >= s) && end.map_or(true, |e| d <= e)
}

impl FundRepositoryTrait for MockFundRepository {
    fn get_fund(&self, fund_id: &str) -> Result<Option<Fund>> {
        Ok(self.funds.iter().find(|f| f.id == fund_id).cloned())
    }

    fn list_funds_by_organization(&self, organization_id: &str) -> Result<Vec<Fund>> {
        Ok(self
            .funds
            .iter()
            .filter(|f| f.organization_id == organization_id)
            .cloned()
            .collect())
    }

    fn list_active_commitments(
        &self,
        fund_id: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<CapitalCommitment>> {
        Ok(self
            .commitments
            .iter()
            .filter(|c| c.fund_id == fund_id && c.is_active)
            .filter(|c| within(c.commitment_date, start, end))
            .cloned()
            .collect())
    }

    fn list_allocations(
        &self,
        fund_id: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<LoanAllocation>> {
        let mut found: Vec<_> = self
            .allocations
            .iter()
            .filter(|a| a.fund_id == fund_id)
            .filter(|a| within(a.allocation_date, start, end))
            .cloned()
            .collect();
        found.sort_by_key(|a| a.allocation_date);
        Ok(found)
    }

    fn get_loan(&self, loan_id: &str) -> Result<Option<LoanSummary>> {
        Ok(self.loans.iter().find(|l| l.id == loan_id).cloned())
    }
}

// ============================================================================
// Fixtures
// ============================================================================

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn fund(id: &str, org: &str, fund_type: FundType) -> Fund {
    Fund {
        id: id.to_string(),
        organization_id: org.to_string(),
        name: format!("Fund {}", id),
        fund_type,
        inception_date: date(2023, 1, 1),
        target_yield: Some(dec!(9)),
        status: "ACTIVE".to_string(),
    }
}

fn commitment(id: &str, fund_id: &str, amount: Decimal, on: NaiveDate) -> CapitalCommitment {
    CapitalCommitment {
        id: id.to_string(),
        fund_id: fund_id.to_string(),
        investor_id: "inv-1".to_string(),
        amount,
        commitment_date: on,
        is_active: true,
    }
}

fn allocation(
    id: &str,
    fund_id: &str,
    commitment_id: Option<&str>,
    allocated: Decimal,
    on: NaiveDate,
    returned: Decimal,
    returned_on: Option<NaiveDate>,
) -> LoanAllocation {
    LoanAllocation {
        id: id.to_string(),
        fund_id: fund_id.to_string(),
        loan_id: format!("loan-{}", id),
        commitment_id: commitment_id.map(str::to_string),
        allocated_amount: allocated,
        allocation_date: on,
        returned_amount: returned,
        full_return_date: returned_on,
    }
}

fn loan_for(allocation_id: &str) -> LoanSummary {
    LoanSummary {
        id: format!("loan-{}", allocation_id),
        loan_number: format!("LN-{}", allocation_id),
        borrower_name: "Borrower".to_string(),
        principal: dec!(100000),
        status: "ACTIVE".to_string(),
    }
}

fn service(repo: MockFundRepository) -> FundPerformanceService {
    FundPerformanceService::new(Arc::new(repo))
}

fn window() -> (Option<NaiveDate>, Option<NaiveDate>) {
    (Some(date(2023, 1, 1)), Some(date(2024, 12, 31)))
}

// ============================================================================
// calculate_fund_performance
// ============================================================================

#[test]
fn test_unknown_fund_is_none() {
    let svc = service(MockFundRepository::default());
    assert!(svc
        .calculate_fund_performance("missing", None, None)
        .unwrap()
        .is_none());
}

#[test]
fn test_rates_and_moic() {
    let repo = MockFundRepository {
        funds: vec![fund("f1", "org", FundType::Debt)],
        commitments: vec![commitment("c1", "f1", dec!(1000000), date(2023, 1, 10))],
        allocations: vec![
            allocation("a1", "f1", Some("c1"), dec!(500000), date(2023, 2, 9), dec!(100000), Some(date(2023, 12, 1))),
            allocation("a2", "f1", Some("c1"), dec!(250000), date(2023, 3, 11), Decimal::ZERO, None),
        ],
        ..Default::default()
    };
    let (start, end) = window();
    let perf = service(repo)
        .calculate_fund_performance("f1", start, end)
        .unwrap()
        .unwrap();

    assert_eq!(perf.total_committed, dec!(1000000));
    assert_eq!(perf.total_deployed, dec!(750000));
    assert_eq!(perf.total_returned, dec!(100000));
    assert_eq!(perf.net_deployed, dec!(650000));
    assert_eq!(perf.deployment_rate, dec!(75));
    assert_eq!(perf.return_rate, dec!(13.33));
    assert_eq!(perf.moic, Some(dec!(0.1333)));
    // 30 and 60 days after the commitment
    assert_eq!(perf.avg_deployment_days, Some(dec!(45)));
    assert_eq!(perf.avg_return_days, Some(dec!(295)));
}

#[test]
fn test_moic_of_one_and_a_half() {
    let repo = MockFundRepository {
        funds: vec![fund("f1", "org", FundType::Debt)],
        commitments: vec![commitment("c1", "f1", dec!(1000000), date(2023, 1, 1))],
        allocations: vec![allocation(
            "a1",
            "f1",
            Some("c1"),
            dec!(1000000),
            date(2023, 1, 1),
            dec!(1500000),
            Some(date(2024, 1, 1)),
        )],
        ..Default::default()
    };
    let (start, end) = window();
    let perf = service(repo)
        .calculate_fund_performance("f1", start, end)
        .unwrap()
        .unwrap();
    assert_eq!(perf.moic, Some(dec!(1.5)));
    let irr = perf.irr.unwrap();
    assert!((irr - dec!(50)).abs() < dec!(0.5), "irr was {}", irr);
}

#[test]
fn test_nothing_deployed_gives_zero_rates_and_no_moic() {
    let repo = MockFundRepository {
        funds: vec![fund("f1", "org", FundType::Equity)],
        ..Default::default()
    };
    let (start, end) = window();
    let perf = service(repo)
        .calculate_fund_performance("f1", start, end)
        .unwrap()
        .unwrap();
    assert_eq!(perf.deployment_rate, Decimal::ZERO);
    assert_eq!(perf.return_rate, Decimal::ZERO);
    assert_eq!(perf.moic, None);
    assert_eq!(perf.irr, None);
    assert_eq!(perf.avg_deployment_days, None);
    assert_eq!(perf.avg_return_days, None);
}

#[test]
fn test_returns_count_for_allocations_before_window_end_only() {
    let repo = MockFundRepository {
        funds: vec![fund("f1", "org", FundType::Debt)],
        commitments: vec![commitment("c1", "f1", dec!(100), date(2023, 1, 1))],
        allocations: vec![
            allocation("early", "f1", None, dec!(50), date(2022, 6, 1), dec!(20), None),
            allocation("late", "f1", None, dec!(50), date(2025, 6, 1), dec!(40), None),
        ],
        ..Default::default()
    };
    let (start, end) = window();
    let perf = service(repo)
        .calculate_fund_performance("f1", start, end)
        .unwrap()
        .unwrap();
    // Deployed only counts allocations inside the window; returned counts
    // everything allocated on or before its end.
    assert_eq!(perf.total_deployed, Decimal::ZERO);
    assert_eq!(perf.total_returned, dec!(20));
}

#[test]
fn test_allocation_without_commitment_is_left_out_of_latency() {
    let repo = MockFundRepository {
        funds: vec![fund("f1", "org", FundType::Debt)],
        commitments: vec![
            commitment("c1", "f1", dec!(500), date(2023, 1, 1)),
            commitment("c2", "f1", dec!(500), date(2023, 6, 1)),
        ],
        allocations: vec![
            allocation("a1", "f1", Some("c2"), dec!(100), date(2023, 6, 11), Decimal::ZERO, None),
            allocation("a2", "f1", None, dec!(100), date(2023, 7, 1), Decimal::ZERO, None),
            allocation("a3", "f1", Some("gone"), dec!(100), date(2023, 7, 1), Decimal::ZERO, None),
        ],
        ..Default::default()
    };
    let (start, end) = window();
    let perf = service(repo)
        .calculate_fund_performance("f1", start, end)
        .unwrap()
        .unwrap();
    assert_eq!(perf.avg_deployment_days, Some(dec!(10)));
}

#[test]
fn test_return_latency_ignores_returns_after_window_end() {
    let repo = MockFundRepository {
        funds: vec![fund("f1", "org", FundType::Debt)],
        commitments: vec![commitment("c1", "f1", dec!(1000), date(2023, 1, 1))],
        allocations: vec![
            allocation("a1", "f1", Some("c1"), dec!(500), date(2023, 1, 1), dec!(500), Some(date(2023, 1, 31))),
            allocation("a2", "f1", Some("c1"), dec!(500), date(2023, 2, 1), dec!(500), Some(date(2025, 2, 1))),
        ],
        ..Default::default()
    };
    let (start, end) = window();
    let perf = service(repo)
        .calculate_fund_performance("f1", start, end)
        .unwrap()
        .unwrap();
    assert_eq!(perf.avg_return_days, Some(dec!(30)));
}

// ============================================================================
// Portfolio
// ============================================================================

fn portfolio_repo() -> MockFundRepository {
    MockFundRepository {
        funds: vec![
            fund("f1", "org", FundType::Debt),
            fund("f2", "org", FundType::Debt),
            fund("f3", "org", FundType::Equity),
            fund("other", "org-2", FundType::Hybrid),
        ],
        commitments: vec![
            commitment("c1", "f1", dec!(1000), date(2023, 1, 1)),
            commitment("c2", "f2", dec!(1000), date(2023, 1, 1)),
            commitment("c3", "f3", dec!(1000), date(2023, 1, 1)),
        ],
        allocations: vec![
            // f1: 10% over a year
            allocation("a1", "f1", Some("c1"), dec!(1000), date(2023, 1, 1), dec!(1100), Some(date(2024, 1, 1))),
            // f2: nothing returned yet, so no IRR
            allocation("a2", "f2", Some("c2"), dec!(600), date(2023, 2, 1), Decimal::ZERO, None),
            // f3: 20% over a year
            allocation("a3", "f3", Some("c3"), dec!(500), date(2023, 1, 1), dec!(1200), Some(date(2024, 1, 1))),
        ],
        ..Default::default()
    }
}

#[test]
fn test_portfolio_summary_for_org_without_funds_is_none() {
    let svc = service(portfolio_repo());
    assert!(svc.get_portfolio_summary("nobody").unwrap().is_none());
}

#[test]
fn test_portfolio_irr_is_deployment_weighted_over_defined_irrs() {
    let svc = service(portfolio_repo());
    let summary = svc.get_portfolio_summary("org").unwrap().unwrap();

    assert_eq!(summary.fund_count, 3);
    assert_eq!(summary.total_committed, dec!(3000));
    assert_eq!(summary.total_deployed, dec!(2100));
    assert_eq!(summary.total_returned, dec!(2300));
    assert_eq!(summary.total_aum, dec!(-200));

    let f1 = svc.calculate_fund_performance("f1", None, None).unwrap().unwrap();
    let f2 = svc.calculate_fund_performance("f2", None, None).unwrap().unwrap();
    let f3 = svc.calculate_fund_performance("f3", None, None).unwrap().unwrap();
    assert!(f2.irr.is_none());

    let expected = (f1.irr.unwrap() * dec!(1000) + f3.irr.unwrap() * dec!(500)) / dec!(1500);
    assert_eq!(summary.portfolio_irr, Some(expected.round_dp(2)));
}

#[test]
fn test_portfolio_groups_every_fund_type() {
    let summary = service(portfolio_repo())
        .get_portfolio_summary("org")
        .unwrap()
        .unwrap();

    assert_eq!(summary.by_fund_type.len(), FundType::ALL.len());
    let debt = summary
        .by_fund_type
        .iter()
        .find(|g| g.fund_type == FundType::Debt)
        .unwrap();
    assert_eq!(debt.fund_count, 2);
    assert_eq!(debt.aum, dec!(500));
    let hybrid = summary
        .by_fund_type
        .iter()
        .find(|g| g.fund_type == FundType::Hybrid)
        .unwrap();
    assert_eq!(hybrid.fund_count, 0);
    assert_eq!(hybrid.average_irr, None);
}

#[test]
fn test_top_funds_rank_by_moic_with_missing_last() {
    let summary = service(portfolio_repo())
        .get_portfolio_summary("org")
        .unwrap()
        .unwrap();
    let order: Vec<&str> = summary.top_funds.iter().map(|p| p.fund_id.as_str()).collect();
    assert_eq!(order, vec!["f3", "f1", "f2"]);
}

// ============================================================================
// Comparison, timeline and top investments
// ============================================================================

#[test]
fn test_comparison_skips_unknown_funds_and_keeps_order() {
    let svc = service(portfolio_repo());
    let ids = vec!["f3".to_string(), "missing".to_string(), "f1".to_string()];
    let results = svc.get_fund_comparison(&ids, None, None).unwrap();
    let order: Vec<&str> = results.iter().map(|p| p.fund_id.as_str()).collect();
    assert_eq!(order, vec!["f3", "f1"]);
}

#[test]
fn test_deployment_timeline_merges_same_day_activity() {
    let repo = MockFundRepository {
        funds: vec![fund("f1", "org", FundType::Debt)],
        allocations: vec![
            allocation("a1", "f1", None, dec!(100), date(2023, 3, 1), dec!(120), Some(date(2023, 9, 1))),
            allocation("a2", "f1", None, dec!(50), date(2023, 3, 1), Decimal::ZERO, None),
            allocation("a3", "f1", None, dec!(70), date(2023, 9, 1), Decimal::ZERO, None),
        ],
        ..Default::default()
    };
    let points = service(repo)
        .get_deployment_timeline("f1", None, Some(date(2023, 12, 31)))
        .unwrap();

    assert_eq!(points.len(), 2);
    assert_eq!(points[0].date, date(2023, 3, 1));
    assert_eq!(points[0].allocated, dec!(150));
    assert_eq!(points[0].returned, Decimal::ZERO);
    assert_eq!(points[1].date, date(2023, 9, 1));
    assert_eq!(points[1].allocated, dec!(70));
    assert_eq!(points[1].returned, dec!(120));
}

#[test]
fn test_deployment_timeline_for_unknown_fund_is_empty() {
    let svc = service(MockFundRepository::default());
    assert!(svc.get_deployment_timeline("missing", None, None).unwrap().is_empty());
}

#[test]
fn test_top_investments_sorted_and_limited() {
    let repo = MockFundRepository {
        funds: vec![fund("f1", "org", FundType::Debt)],
        allocations: vec![
            allocation("a1", "f1", None, dec!(100), date(2023, 1, 1), dec!(110), Some(date(2024, 1, 1))),
            allocation("a2", "f1", None, dec!(100), date(2023, 1, 1), dec!(150), None),
            allocation("a3", "f1", None, dec!(100), date(2023, 1, 1), dec!(90), None),
            allocation("a4", "f1", None, Decimal::ZERO, date(2023, 1, 1), Decimal::ZERO, None),
            allocation("orphan", "f1", None, dec!(100), date(2023, 1, 1), dec!(500), None),
        ],
        loans: vec![loan_for("a1"), loan_for("a2"), loan_for("a3"), loan_for("a4")],
        ..Default::default()
    };
    let svc = service(repo);

    let top = svc.get_top_investments("f1", Some(2)).unwrap();
    assert_eq!(top.len(), 2);
    assert_eq!(top[0].allocation_id, "a2");
    assert_eq!(top[0].irr, None);
    assert_eq!(top[1].allocation_id, "a1");
    assert_eq!(top[1].irr, Some(dec!(10)));

    let all = svc.get_top_investments("f1", None).unwrap();
    assert_eq!(all.len(), 4);
    assert!(all.windows(2).all(|w| w[0].moic >= w[1].moic));
    assert_eq!(all[3].moic, Decimal::ZERO);
}
