//! Fund domain models and computed performance results.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, ValidationError};

/// Fund categories used for portfolio rollups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FundType {
    Debt,
    Equity,
    Mezzanine,
    Hybrid,
}

impl FundType {
    pub const ALL: [FundType; 4] = [
        FundType::Debt,
        FundType::Equity,
        FundType::Mezzanine,
        FundType::Hybrid,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FundType::Debt => "DEBT",
            FundType::Equity => "EQUITY",
            FundType::Mezzanine => "MEZZANINE",
            FundType::Hybrid => "HYBRID",
        }
    }
}

impl fmt::Display for FundType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FundType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FundType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ValidationError::InvalidInput(format!("Unknown fund type '{}'", s)).into())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fund {
    pub id: String,
    pub organization_id: String,
    pub name: String,
    pub fund_type: FundType,
    pub inception_date: NaiveDate,
    /// Target investor yield, as a percentage.
    pub target_yield: Option<Decimal>,
    pub status: String,
}

/// An investor's pledge of capital to a fund.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapitalCommitment {
    pub id: String,
    pub fund_id: String,
    pub investor_id: String,
    pub amount: Decimal,
    pub commitment_date: NaiveDate,
    pub is_active: bool,
}

/// Capital a fund deployed into a loan, and what has come back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanAllocation {
    pub id: String,
    pub fund_id: String,
    pub loan_id: String,
    /// Commitment the capital was drawn from, when known.
    pub commitment_id: Option<String>,
    pub allocated_amount: Decimal,
    pub allocation_date: NaiveDate,
    pub returned_amount: Decimal,
    pub full_return_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanSummary {
    pub id: String,
    pub loan_number: String,
    pub borrower_name: String,
    pub principal: Decimal,
    pub status: String,
}

/// Performance of one fund over `[start_date, end_date]`.
///
/// Rates are percentages rounded to two places; `moic` is a raw multiple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundPerformance {
    pub fund_id: String,
    pub fund_name: String,
    pub fund_type: FundType,
    pub total_committed: Decimal,
    pub total_deployed: Decimal,
    pub total_returned: Decimal,
    pub net_deployed: Decimal,
    pub deployment_rate: Decimal,
    pub return_rate: Decimal,
    pub irr: Option<Decimal>,
    pub moic: Option<Decimal>,
    pub avg_deployment_days: Option<Decimal>,
    pub avg_return_days: Option<Decimal>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundTypeSummary {
    pub fund_type: FundType,
    pub fund_count: usize,
    pub aum: Decimal,
    /// Mean IRR of the group's funds that have one.
    pub average_irr: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub organization_id: String,
    pub fund_count: usize,
    pub total_aum: Decimal,
    pub total_committed: Decimal,
    pub total_deployed: Decimal,
    pub total_returned: Decimal,
    /// Deployment-weighted IRR over funds with a defined IRR.
    pub portfolio_irr: Option<Decimal>,
    pub portfolio_moic: Option<Decimal>,
    pub by_fund_type: Vec<FundTypeSummary>,
    pub top_funds: Vec<FundPerformance>,
}

/// Capital moved on one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentPoint {
    pub date: NaiveDate,
    pub allocated: Decimal,
    pub returned: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopInvestment {
    pub allocation_id: String,
    pub loan_id: String,
    pub loan_number: String,
    pub borrower_name: String,
    pub allocated_amount: Decimal,
    pub returned_amount: Decimal,
    pub allocation_date: NaiveDate,
    pub full_return_date: Option<NaiveDate>,
    pub moic: Decimal,
    /// Simple annualised return; `None` until the allocation is fully returned.
    pub irr: Option<Decimal>,
}
