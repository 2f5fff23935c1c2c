//! Background worker driving the poll cycle.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::stores::LobbyRegistry;
use crate::use_cases::{PollError, RunTick};

/// Run ticks every `interval` until `cancel` fires.
///
/// The first tick runs immediately. A tick that overruns its slot delays the
/// next one instead of bursting to catch up. Cancellation abandons an
/// in-flight tick; the registry is returned for inspection.
pub async fn poll_worker(
    tick: Arc<RunTick>,
    mut registry: LobbyRegistry,
    interval: Duration,
    cancel: CancellationToken,
) -> LobbyRegistry {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tracing::info!(interval_secs = interval.as_secs(), "Poll worker started");

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let result = tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Shutdown during tick, abandoning it");
                break;
            }
            result = tick.execute(&mut registry) => result,
        };

        match result {
            Ok(report) => {
                let transitioned = report.opened + report.closed > 0;
                if transitioned || report.renders_failed > 0 {
                    tracing::info!(
                        source = %report.source,
                        relevant = report.relevant,
                        open = registry.open_count(),
                        opened = report.opened,
                        reopened = report.reopened,
                        closed = report.closed,
                        renders = report.renders_attempted,
                        render_failures = report.renders_failed,
                        "Tick complete"
                    );
                }
                tracing::debug!(
                    source = %report.source,
                    fetched = report.fetched,
                    relevant = report.relevant,
                    active = ?report.active,
                    renders = report.renders_attempted,
                    pruned = report.pruned,
                    "Tick detail"
                );
            }
            Err(PollError::AllSourcesFailed(failures)) => {
                for failure in &failures {
                    tracing::debug!(
                        source = %failure.source,
                        error = %failure.error,
                        "Source failure"
                    );
                }
                tracing::warn!(sources = failures.len(), "All feed sources failed, skipping tick");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Tick skipped");
            }
        }
    }

    tracing::info!("Poll worker shutting down");
    registry
}
