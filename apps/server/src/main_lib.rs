use std::sync::Arc;

use crate::collaborators::{LogAlertNotifier, LogAuditTrail, LogPaymentScheduleGenerator};
use crate::config::Config;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};
use lendbook_core::{
    analytics::{AnalyticsService, AnalyticsServiceTrait},
    events::EventBus,
    funds::{FundPerformanceService, FundPerformanceServiceTrait},
    handlers::{register_default_handlers, DefaultHandlerDeps},
    ingestion::{EventIngestionService, EventIngestionServiceTrait},
};
use lendbook_storage_sqlite::{
    analytics::AnalyticsSnapshotRepository,
    db,
    ingestion::EventIngestionRepository,
    lending::{FundRepository, LendingMetricsRepository},
};

pub struct AppState {
    pub event_bus: Arc<EventBus>,
    pub ingestion_service: Arc<dyn EventIngestionServiceTrait>,
    pub analytics_service: Arc<dyn AnalyticsServiceTrait>,
    pub fund_performance_service: Arc<dyn FundPerformanceServiceTrait>,
}

pub fn init_tracing() {
    let log_format = std::env::var("LB_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    // `init` also bridges `log` records from the library crates.
    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = db::spawn_writer((*pool).clone());

    let ingestion_repository = Arc::new(EventIngestionRepository::new(pool.clone(), writer.clone()));
    let ingestion_service: Arc<dyn EventIngestionServiceTrait> =
        Arc::new(EventIngestionService::new(ingestion_repository));

    let metrics_repository = Arc::new(LendingMetricsRepository::new(pool.clone()));
    let snapshot_repository = Arc::new(AnalyticsSnapshotRepository::new(pool.clone(), writer.clone()));
    let analytics_service: Arc<dyn AnalyticsServiceTrait> = Arc::new(AnalyticsService::new(
        metrics_repository,
        snapshot_repository,
        ingestion_service.clone(),
    ));

    let fund_repository = Arc::new(FundRepository::new(pool.clone()));
    let fund_performance_service: Arc<dyn FundPerformanceServiceTrait> =
        Arc::new(FundPerformanceService::new(fund_repository));

    // One bus per process; every publisher shares it through the state.
    let event_bus = Arc::new(EventBus::new());
    register_default_handlers(
        &event_bus,
        DefaultHandlerDeps {
            audit_trail: Arc::new(LogAuditTrail),
            analytics: analytics_service.clone(),
            schedule_generator: Arc::new(LogPaymentScheduleGenerator),
            alert_notifier: Arc::new(LogAlertNotifier),
        },
    )?;

    Ok(Arc::new(AppState {
        event_bus,
        ingestion_service,
        analytics_service,
        fund_performance_service,
    }))
}
