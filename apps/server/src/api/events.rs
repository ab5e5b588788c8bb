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
use lendbook_core::events::{DispatchSummary, DomainEvent};
use lendbook_core::ingestion::EventIngestionRecord;
use lendbook_core::utils::time_utils::business_date_today;

#[derive(Debug, Deserialize)]
struct LedgerQuery {
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
}

/// Records an inbound event in the ledger, then publishes it onto the shared bus.
///
/// Every accepted event is ingested, whether or not a handler subscribes to
/// its type. Handler failures are reported in the summary, not as an error status.
async fn publish_event(
    State(state): State<Arc<AppState>>,
    Json(event): Json<DomainEvent>,
) -> ApiResult<Json<DispatchSummary>> {
    state.ingestion_service.ingest(&event).await?;
    let summary = state.event_bus.publish(&event).await?;
    if !summary.all_succeeded() {
        tracing::warn!(
            "Event {} dispatched with failed handlers: {:?}",
            summary.event_id,
            summary.failed
        );
    }
    Ok(Json(summary))
}

async fn get_ingested_event(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<EventIngestionRecord>> {
    state
        .ingestion_service
        .get_ingested(&id)?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

async fn list_ingested_events(
    State(state): State<Arc<AppState>>,
    Query(q): Query<LedgerQuery>,
) -> ApiResult<Json<Vec<EventIngestionRecord>>> {
    let end = q.end.unwrap_or_else(business_date_today);
    let start = q.start.unwrap_or(end);
    Ok(Json(state.ingestion_service.list_ingested(start, end)?))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/events", post(publish_event).get(list_ingested_events))
        .route("/events/{id}", get(get_ingested_event))
}
