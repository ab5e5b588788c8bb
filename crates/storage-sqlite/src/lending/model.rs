//! Database models for funds, commitments, loans, allocations, payments and
//! inspections.

use diesel::prelude::*;
use log::error;

use crate::utils::{
    format_date, format_decimal, parse_date, parse_decimal, parse_optional_date,
    parse_optional_decimal,
};
use lendbook_core::funds::{CapitalCommitment, Fund, FundType, LoanAllocation, LoanSummary};

#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::funds)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct FundDB {
    pub id: String,
    pub organization_id: String,
    pub name: String,
    pub fund_type: String,
    pub inception_date: String,
    pub target_yield: Option<String>,
    pub status: String,
}

#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::fund_commitments)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CapitalCommitmentDB {
    pub id: String,
    pub fund_id: String,
    pub investor_id: String,
    pub amount: String,
    pub commitment_date: String,
    pub is_active: bool,
}

#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::loans)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct LoanDB {
    pub id: String,
    pub loan_number: String,
    pub borrower_name: String,
    pub principal: String,
    pub ltv: Option<String>,
    pub status: String,
    pub funded_date: Option<String>,
}

#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::loan_allocations)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct LoanAllocationDB {
    pub id: String,
    pub fund_id: String,
    pub loan_id: String,
    pub commitment_id: Option<String>,
    pub allocated_amount: String,
    pub allocation_date: String,
    pub returned_amount: String,
    pub full_return_date: Option<String>,
}

#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::payments)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PaymentDB {
    pub id: String,
    pub loan_id: String,
    pub due_date: String,
    pub amount_due: String,
    pub paid_date: Option<String>,
    pub amount_paid: String,
    pub status: String,
}

#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::inspections)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct InspectionDB {
    pub id: String,
    pub loan_id: String,
    pub scheduled_date: String,
    pub completed_date: Option<String>,
    pub result: Option<String>,
}

impl From<FundDB> for Fund {
    fn from(db: FundDB) -> Self {
        let fund_type = db.fund_type.parse::<FundType>().unwrap_or_else(|e| {
            error!("Fund {} has unreadable type '{}': {}", db.id, db.fund_type, e);
            FundType::Debt
        });
        Self {
            id: db.id,
            organization_id: db.organization_id,
            name: db.name,
            fund_type,
            inception_date: parse_date(&db.inception_date),
            target_yield: parse_optional_decimal(db.target_yield.as_deref()),
            status: db.status,
        }
    }
}

impl From<&Fund> for FundDB {
    fn from(fund: &Fund) -> Self {
        Self {
            id: fund.id.clone(),
            organization_id: fund.organization_id.clone(),
            name: fund.name.clone(),
            fund_type: fund.fund_type.as_str().to_string(),
            inception_date: format_date(fund.inception_date),
            target_yield: fund.target_yield.map(format_decimal),
            status: fund.status.clone(),
        }
    }
}

impl From<CapitalCommitmentDB> for CapitalCommitment {
    fn from(db: CapitalCommitmentDB) -> Self {
        Self {
            id: db.id,
            fund_id: db.fund_id,
            investor_id: db.investor_id,
            amount: parse_decimal(&db.amount),
            commitment_date: parse_date(&db.commitment_date),
            is_active: db.is_active,
        }
    }
}

impl From<&CapitalCommitment> for CapitalCommitmentDB {
    fn from(c: &CapitalCommitment) -> Self {
        Self {
            id: c.id.clone(),
            fund_id: c.fund_id.clone(),
            investor_id: c.investor_id.clone(),
            amount: format_decimal(c.amount),
            commitment_date: format_date(c.commitment_date),
            is_active: c.is_active,
        }
    }
}

impl From<LoanAllocationDB> for LoanAllocation {
    fn from(db: LoanAllocationDB) -> Self {
        Self {
            id: db.id,
            fund_id: db.fund_id,
            loan_id: db.loan_id,
            commitment_id: db.commitment_id,
            allocated_amount: parse_decimal(&db.allocated_amount),
            allocation_date: parse_date(&db.allocation_date),
            returned_amount: parse_decimal(&db.returned_amount),
            full_return_date: parse_optional_date(db.full_return_date.as_deref()),
        }
    }
}

impl From<&LoanAllocation> for LoanAllocationDB {
    fn from(a: &LoanAllocation) -> Self {
        Self {
            id: a.id.clone(),
            fund_id: a.fund_id.clone(),
            loan_id: a.loan_id.clone(),
            commitment_id: a.commitment_id.clone(),
            allocated_amount: format_decimal(a.allocated_amount),
            allocation_date: format_date(a.allocation_date),
            returned_amount: format_decimal(a.returned_amount),
            full_return_date: a.full_return_date.map(format_date),
        }
    }
}

impl From<LoanDB> for LoanSummary {
    fn from(db: LoanDB) -> Self {
        Self {
            id: db.id,
            loan_number: db.loan_number,
            borrower_name: db.borrower_name,
            principal: parse_decimal(&db.principal),
            status: db.status,
        }
    }
}
