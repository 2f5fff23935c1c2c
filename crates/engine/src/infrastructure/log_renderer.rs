//! Renderer that only logs. Used when no display surface is configured.

use async_trait::async_trait;
use lobbywatch_domain::{LobbySnapshot, RenderHandle};
use uuid::Uuid;

use crate::infrastructure::ports::{LobbyRenderer, RenderError};

#[derive(Debug, Default)]
pub struct LogRenderer;

impl LogRenderer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl LobbyRenderer for LogRenderer {
    async fn create(&self, snapshot: &LobbySnapshot) -> Result<RenderHandle, RenderError> {
        let handle = RenderHandle::new(Uuid::new_v4().to_string());
        tracing::info!(
            handle = %handle,
            title = %snapshot.title,
            map = %snapshot.map,
            players = %snapshot.players_text,
            uptime = %snapshot.uptime_text,
            closed = snapshot.closed,
            "Lobby posted"
        );
        Ok(handle)
    }

    async fn update(
        &self,
        handle: &RenderHandle,
        snapshot: &LobbySnapshot,
    ) -> Result<(), RenderError> {
        tracing::info!(
            handle = %handle,
            title = %snapshot.title,
            players = %snapshot.players_text,
            uptime = %snapshot.uptime_text,
            closed = snapshot.closed,
            "Lobby updated"
        );
        Ok(())
    }
}
