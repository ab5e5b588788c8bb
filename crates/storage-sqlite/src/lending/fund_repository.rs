use std::sync::Arc;

use chrono::NaiveDate;
use diesel::prelude::*;

use super::model::{CapitalCommitmentDB, FundDB, LoanAllocationDB, LoanDB};
use crate::db::{get_connection, DbPool};
use crate::errors::StorageError;
use crate::schema::{fund_commitments, funds, loan_allocations, loans};
use crate::utils::format_date;
use lendbook_core::funds::{
    CapitalCommitment, Fund, FundRepositoryTrait, LoanAllocation, LoanSummary,
};
use lendbook_core::Result;

pub struct FundRepository {
    pool: Arc<DbPool>,
}

impl FundRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

impl FundRepositoryTrait for FundRepository {
    fn get_fund(&self, fund_id: &str) -> Result<Option<Fund>> {
        let mut conn = get_connection(&self.pool)?;
        let row = funds::table
            .find(fund_id)
            .select(FundDB::as_select())
            .first::<FundDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(Fund::from))
    }

    fn list_funds_by_organization(&self, organization_id: &str) -> Result<Vec<Fund>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = funds::table
            .filter(funds::organization_id.eq(organization_id))
            .order((funds::inception_date.asc(), funds::id.asc()))
            .select(FundDB::as_select())
            .load::<FundDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(Fund::from).collect())
    }

    fn list_active_commitments(
        &self,
        fund_id: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<CapitalCommitment>> {
        let mut conn = get_connection(&self.pool)?;
        let mut query = fund_commitments::table
            .filter(fund_commitments::fund_id.eq(fund_id))
            .filter(fund_commitments::is_active.eq(true))
            .into_boxed();
        if let Some(start) = start {
            query = query.filter(fund_commitments::commitment_date.ge(format_date(start)));
        }
        if let Some(end) = end {
            query = query.filter(fund_commitments::commitment_date.le(format_date(end)));
        }
        let rows = query
            .order((fund_commitments::commitment_date.asc(), fund_commitments::id.asc()))
            .select(CapitalCommitmentDB::as_select())
            .load::<CapitalCommitmentDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(CapitalCommitment::from).collect())
    }

    fn list_allocations(
        &self,
        fund_id: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<LoanAllocation>> {
        let mut conn = get_connection(&self.pool)?;
        let mut query = loan_allocations::table
            .filter(loan_allocations::fund_id.eq(fund_id))
            .into_boxed();
        if let Some(start) = start {
            query = query.filter(loan_allocations::allocation_date.ge(format_date(start)));
        }
        if let Some(end) = end {
            query = query.filter(loan_allocations::allocation_date.le(format_date(end)));
        }
        let rows = query
            .order((loan_allocations::allocation_date.asc(), loan_allocations::id.asc()))
            .select(LoanAllocationDB::as_select())
            .load::<LoanAllocationDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(LoanAllocation::from).collect())
    }

    fn get_loan(&self, loan_id: &str) -> Result<Option<LoanSummary>> {
        let mut conn = get_connection(&self.pool)?;
        let row = loans::table
            .find(loan_id)
            .select(LoanDB::as_select())
            .first::<LoanDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(LoanSummary::from))
    }
}
