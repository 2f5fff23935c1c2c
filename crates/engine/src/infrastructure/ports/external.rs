//! External service port traits (lobby feed, display surface).

use async_trait::async_trait;
use lobbywatch_domain::{LobbySnapshot, RawLobby, RenderHandle};

use super::error::{FeedError, RenderError};

// =============================================================================
// Feed
// =============================================================================

/// One candidate source of the lobby list.
///
/// Sources are tried in configured order; the first one returning lobbies wins.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Short label used in logs and tick reports.
    fn name(&self) -> String;

    /// Fetch the full current lobby list.
    async fn fetch(&self) -> Result<Vec<RawLobby>, FeedError>;
}

// =============================================================================
// Display Surface
// =============================================================================

/// Display surface that shows one editable resource (message) per lobby.
///
/// The adapter owns all formatting; it receives only the field snapshot.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LobbyRenderer: Send + Sync {
    /// Create the resource for a lobby and return a handle to it.
    async fn create(&self, snapshot: &LobbySnapshot) -> Result<RenderHandle, RenderError>;

    /// Replace the content of a previously created resource.
    async fn update(
        &self,
        handle: &RenderHandle,
        snapshot: &LobbySnapshot,
    ) -> Result<(), RenderError>;
}
