//! Push changed lobby snapshots to the display surface.

use std::sync::Arc;

use futures_util::future::join_all;
use lobbywatch_domain::RenderHandle;

use crate::infrastructure::ports::{LobbyRenderer, RenderError};
use crate::stores::{LobbyRegistry, PendingRender};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderReport {
    pub attempted: usize,
    pub failed: usize,
}

/// Render every record whose snapshot changed since its last delivery.
///
/// Calls run concurrently; results are written back one at a time once all
/// of them have finished. A failed call leaves the record untouched, so the
/// same snapshot is retried on the next tick. A message deleted on the display
/// side loses its handle and is created anew on the next tick.
pub struct RenderLobbies {
    renderer: Arc<dyn LobbyRenderer>,
}

impl RenderLobbies {
    pub fn new(renderer: Arc<dyn LobbyRenderer>) -> Self {
        Self { renderer }
    }

    pub async fn execute(&self, registry: &mut LobbyRegistry) -> RenderReport {
        let pending = registry.pending_renders();
        let mut report = RenderReport {
            attempted: pending.len(),
            failed: 0,
        };
        if pending.is_empty() {
            return report;
        }

        let results = join_all(pending.into_iter().map(|job| self.render_one(job))).await;

        for (job, result) in results {
            match result {
                Ok(handle) => {
                    if !registry.record_render(job.tracking_id, job.lobby_id, handle, job.snapshot)
                    {
                        tracing::warn!(
                            lobby_id = %job.lobby_id,
                            tracking_id = %job.tracking_id,
                            "Rendered record no longer tracked"
                        );
                    }
                }
                Err(RenderError::Gone) => {
                    report.failed += 1;
                    registry.forget_render(job.tracking_id, job.lobby_id);
                    tracing::warn!(
                        lobby_id = %job.lobby_id,
                        tracking_id = %job.tracking_id,
                        "Rendered message was deleted, recreating next tick"
                    );
                }
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!(
                        lobby_id = %job.lobby_id,
                        tracking_id = %job.tracking_id,
                        error = %e,
                        "Failed to render lobby, will retry next tick"
                    );
                }
            }
        }

        report
    }

    async fn render_one(
        &self,
        job: PendingRender,
    ) -> (PendingRender, Result<RenderHandle, RenderError>) {
        let result = match &job.handle {
            Some(handle) => self
                .renderer
                .update(handle, &job.snapshot)
                .await
                .map(|()| handle.clone()),
            None => self.renderer.create(&job.snapshot).await,
        };
        (job, result)
    }
}
