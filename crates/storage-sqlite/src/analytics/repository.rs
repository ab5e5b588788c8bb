use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::prelude::*;
use diesel::SqliteConnection;

use super::model::{FundSnapshotDB, InspectionSnapshotDB, LoanSnapshotDB, PaymentSnapshotDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{fund_snapshots, inspection_snapshots, loan_snapshots, payment_snapshots};
use crate::utils::format_date;
use lendbook_core::analytics::{
    AnalyticsSnapshotRepositoryTrait, FundSnapshot, InspectionSnapshot, LoanSnapshot,
    PaymentSnapshot,
};
use lendbook_core::Result;

/// Snapshot tables keyed by `snapshot_date`. Upserts use `REPLACE INTO`, so a
/// recompute atomically swaps the row for its date.
pub struct AnalyticsSnapshotRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl AnalyticsSnapshotRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl AnalyticsSnapshotRepositoryTrait for AnalyticsSnapshotRepository {
    async fn upsert_fund_snapshot(&self, snapshot: FundSnapshot) -> Result<FundSnapshot> {
        let row = FundSnapshotDB::from(&snapshot);
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                diesel::replace_into(fund_snapshots::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await?;
        Ok(snapshot)
    }

    async fn upsert_loan_snapshot(&self, snapshot: LoanSnapshot) -> Result<LoanSnapshot> {
        let row = LoanSnapshotDB::from(&snapshot);
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                diesel::replace_into(loan_snapshots::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await?;
        Ok(snapshot)
    }

    async fn upsert_payment_snapshot(&self, snapshot: PaymentSnapshot) -> Result<PaymentSnapshot> {
        let row = PaymentSnapshotDB::from(&snapshot);
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                diesel::replace_into(payment_snapshots::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await?;
        Ok(snapshot)
    }

    async fn upsert_inspection_snapshot(
        &self,
        snapshot: InspectionSnapshot,
    ) -> Result<InspectionSnapshot> {
        let row = InspectionSnapshotDB::from(&snapshot);
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                diesel::replace_into(inspection_snapshots::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await?;
        Ok(snapshot)
    }

    fn get_fund_snapshots(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<FundSnapshot>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = fund_snapshots::table
            .filter(fund_snapshots::snapshot_date.between(format_date(start), format_date(end)))
            .order(fund_snapshots::snapshot_date.asc())
            .select(FundSnapshotDB::as_select())
            .load::<FundSnapshotDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(FundSnapshot::from).collect())
    }

    fn get_loan_snapshots(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<LoanSnapshot>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = loan_snapshots::table
            .filter(loan_snapshots::snapshot_date.between(format_date(start), format_date(end)))
            .order(loan_snapshots::snapshot_date.asc())
            .select(LoanSnapshotDB::as_select())
            .load::<LoanSnapshotDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(LoanSnapshot::from).collect())
    }

    fn get_payment_snapshots(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PaymentSnapshot>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = payment_snapshots::table
            .filter(payment_snapshots::snapshot_date.between(format_date(start), format_date(end)))
            .order(payment_snapshots::snapshot_date.asc())
            .select(PaymentSnapshotDB::as_select())
            .load::<PaymentSnapshotDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(PaymentSnapshot::from).collect())
    }

    fn get_inspection_snapshots(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<InspectionSnapshot>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = inspection_snapshots::table
            .filter(
                inspection_snapshots::snapshot_date.between(format_date(start), format_date(end)),
            )
            .order(inspection_snapshots::snapshot_date.asc())
            .select(InspectionSnapshotDB::as_select())
            .load::<InspectionSnapshotDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(InspectionSnapshot::from).collect())
    }
}
