use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
};
use lendbook_core::funds::{DeploymentPoint, FundPerformance, PortfolioSummary, TopInvestment};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PeriodQuery {
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
struct TopInvestmentsQuery {
    limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompareRequest {
    fund_ids: Vec<String>,
    #[serde(default)]
    start_date: Option<NaiveDate>,
    #[serde(default)]
    end_date: Option<NaiveDate>,
}

async fn get_fund_performance(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Query(q): Query<PeriodQuery>,
) -> ApiResult<Json<FundPerformance>> {
    state
        .fund_performance_service
        .calculate_fund_performance(&id, q.start_date, q.end_date)?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

async fn get_deployment_timeline(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Query(q): Query<PeriodQuery>,
) -> ApiResult<Json<Vec<DeploymentPoint>>> {
    let timeline = state
        .fund_performance_service
        .get_deployment_timeline(&id, q.start_date, q.end_date)?;
    Ok(Json(timeline))
}

async fn get_top_investments(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Query(q): Query<TopInvestmentsQuery>,
) -> ApiResult<Json<Vec<TopInvestment>>> {
    let top = state
        .fund_performance_service
        .get_top_investments(&id, q.limit)?;
    Ok(Json(top))
}

async fn compare_funds(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CompareRequest>,
) -> ApiResult<Json<Vec<FundPerformance>>> {
    if body.fund_ids.is_empty() {
        return Err(ApiError::BadRequest("fundIds must not be empty".to_string()));
    }
    let comparison = state.fund_performance_service.get_fund_comparison(
        &body.fund_ids,
        body.start_date,
        body.end_date,
    )?;
    Ok(Json(comparison))
}

async fn get_portfolio_summary(
    Path(organization_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<PortfolioSummary>> {
    state
        .fund_performance_service
        .get_portfolio_summary(&organization_id)?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/funds/compare", post(compare_funds))
        .route("/funds/{id}/performance", get(get_fund_performance))
        .route("/funds/{id}/timeline", get(get_deployment_timeline))
        .route("/funds/{id}/top-investments", get(get_top_investments))
        .route(
            "/organizations/{id}/portfolio",
            get(get_portfolio_summary),
        )
}
