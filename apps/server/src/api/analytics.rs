use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::{error::ApiResult, main_lib::AppState};
use lendbook_core::analytics::{
    FundSnapshot, InspectionSnapshot, LoanSnapshot, PaymentSnapshot, SnapshotSet,
};

/// Inclusive date window; omitted bounds fall back to the trailing default window.
#[derive(Debug, Default, Deserialize)]
struct KpiQuery {
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
struct ComputeRequest {
    #[serde(default)]
    date: Option<NaiveDate>,
}

async fn get_fund_kpis(
    State(state): State<Arc<AppState>>,
    Query(q): Query<KpiQuery>,
) -> ApiResult<Json<Vec<FundSnapshot>>> {
    Ok(Json(state.analytics_service.get_fund_kpis(q.start, q.end)?))
}

async fn get_loan_kpis(
    State(state): State<Arc<AppState>>,
    Query(q): Query<KpiQuery>,
) -> ApiResult<Json<Vec<LoanSnapshot>>> {
    Ok(Json(state.analytics_service.get_loan_kpis(q.start, q.end)?))
}

async fn get_collections_kpis(
    State(state): State<Arc<AppState>>,
    Query(q): Query<KpiQuery>,
) -> ApiResult<Json<Vec<PaymentSnapshot>>> {
    Ok(Json(
        state.analytics_service.get_collections_kpis(q.start, q.end)?,
    ))
}

async fn get_inspection_kpis(
    State(state): State<Arc<AppState>>,
    Query(q): Query<KpiQuery>,
) -> ApiResult<Json<Vec<InspectionSnapshot>>> {
    Ok(Json(
        state.analytics_service.get_inspection_kpis(q.start, q.end)?,
    ))
}

/// Batch trigger; recomputes all four snapshots for one date (today by default).
async fn compute_snapshots(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ComputeRequest>,
) -> ApiResult<Json<SnapshotSet>> {
    let set = state.analytics_service.compute_all(body.date).await?;
    Ok(Json(set))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/analytics/kpis/fund", get(get_fund_kpis))
        .route("/analytics/kpis/loans", get(get_loan_kpis))
        .route("/analytics/kpis/collections", get(get_collections_kpis))
        .route("/analytics/kpis/inspections", get(get_inspection_kpis))
        .route("/analytics/compute", post(compute_snapshots))
}
