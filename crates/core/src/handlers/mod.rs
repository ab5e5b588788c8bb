//! Default handler registry wired onto the event bus.

mod default_handlers;
mod handlers_traits;

#[cfg(test)]
mod default_handlers_tests;

use std::sync::Arc;

use log::info;

use crate::analytics::AnalyticsServiceTrait;
use crate::errors::Result;
use crate::events::{EventBus, EventKind};

pub use default_handlers::{
    AlertHandler, ComplianceAuditHandler, ScheduleGenerationHandler, SnapshotRefreshHandler,
};
pub use handlers_traits::{
    Alert, AlertNotifierTrait, AlertSeverity, AuditEntry, AuditTrailTrait,
    PaymentScheduleGeneratorTrait,
};

pub const COMPLIANCE_AUDIT_HANDLER: &str = "compliance-audit";
pub const SNAPSHOT_REFRESH_HANDLER: &str = "snapshot-refresh";
pub const SCHEDULE_GENERATION_HANDLER: &str = "payment-schedule-generation";
pub const ALERTING_HANDLER: &str = "alerting";

pub const COMPLIANCE_AUDIT_PRIORITY: i32 = 0;
pub const SNAPSHOT_REFRESH_PRIORITY: i32 = 10;
pub const SCHEDULE_GENERATION_PRIORITY: i32 = 20;
pub const ALERTING_PRIORITY: i32 = 50;

/// Collaborators the default handlers delegate to.
#[derive(Clone)]
pub struct DefaultHandlerDeps {
    pub audit_trail: Arc<dyn AuditTrailTrait>,
    pub analytics: Arc<dyn AnalyticsServiceTrait>,
    pub schedule_generator: Arc<dyn PaymentScheduleGeneratorTrait>,
    pub alert_notifier: Arc<dyn AlertNotifierTrait>,
}

/// Subscribes the standard handler set to `bus`.
pub fn register_default_handlers(bus: &EventBus, deps: DefaultHandlerDeps) -> Result<()> {
    bus.subscribe_many(
        COMPLIANCE_AUDIT_HANDLER,
        &EventKind::KNOWN,
        COMPLIANCE_AUDIT_PRIORITY,
        Arc::new(ComplianceAuditHandler::new(deps.audit_trail)),
    )?;
    bus.subscribe_many(
        SNAPSHOT_REFRESH_HANDLER,
        &[
            EventKind::LoanFunded,
            EventKind::PaymentReceived,
            EventKind::InspectionCompleted,
        ],
        SNAPSHOT_REFRESH_PRIORITY,
        Arc::new(SnapshotRefreshHandler::new(deps.analytics)),
    )?;
    bus.subscribe_many(
        SCHEDULE_GENERATION_HANDLER,
        &[EventKind::LoanFunded],
        SCHEDULE_GENERATION_PRIORITY,
        Arc::new(ScheduleGenerationHandler::new(deps.schedule_generator)),
    )?;
    bus.subscribe_many(
        ALERTING_HANDLER,
        &[
            EventKind::LoanDelinquent,
            EventKind::PaymentMissed,
            EventKind::InspectionCompleted,
        ],
        ALERTING_PRIORITY,
        Arc::new(AlertHandler::new(deps.alert_notifier)),
    )?;

    info!("Registered {} default handler subscriptions", bus.registrations().len());
    Ok(())
}
