//! Background scheduler for the batch snapshot run.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::interval;
use tracing::{error, info};

use crate::main_lib::AppState;

/// Starts the periodic `compute_all` for the current business date.
///
/// A failed run is logged and retried on the next tick. Earlier snapshots are
/// left untouched either way.
pub fn start_snapshot_scheduler(state: Arc<AppState>, initial_delay: Duration, every: Duration) {
    tokio::spawn(async move {
        info!(
            "Snapshot scheduler started ({}s interval, first run in {}s)",
            every.as_secs(),
            initial_delay.as_secs()
        );

        tokio::time::sleep(initial_delay).await;

        // First tick is immediate, subsequent ticks are `every` apart.
        let mut ticker = interval(every);
        loop {
            ticker.tick().await;
            run_scheduled_snapshots(&state).await;
        }
    });
}

async fn run_scheduled_snapshots(state: &Arc<AppState>) {
    info!("Running scheduled snapshot computation...");
    match state.analytics_service.compute_all(None).await {
        Ok(set) => info!("Scheduled snapshots computed for {}", set.date),
        Err(e) => error!("Scheduled snapshot computation failed: {}", e),
    }
}
