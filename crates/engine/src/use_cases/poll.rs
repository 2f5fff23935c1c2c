//! Feed polling with ordered failover.

use std::sync::Arc;
use std::time::Duration;

use lobbywatch_domain::RawLobby;

use crate::infrastructure::ports::{FeedError, FeedSource};

/// Lobby list from the first source that answered usefully.
#[derive(Debug, Clone)]
pub struct FeedBatch {
    pub source: String,
    pub lobbies: Vec<RawLobby>,
}

#[derive(Debug)]
pub struct SourceFailure {
    pub source: String,
    pub error: FeedError,
}

#[derive(Debug, thiserror::Error)]
pub enum PollError {
    #[error("No feed sources configured")]
    NoSources,

    #[error("All {} feed sources failed", .0.len())]
    AllSourcesFailed(Vec<SourceFailure>),
}

/// Try each configured source in order; the first usable payload wins.
///
/// Every source gets its own time budget, so one hanging source cannot
/// stall the tick past `sources * timeout`.
pub struct PollFeed {
    sources: Vec<Arc<dyn FeedSource>>,
    timeout: Duration,
    empty_is_failure: bool,
}

impl PollFeed {
    pub fn new(
        sources: Vec<Arc<dyn FeedSource>>,
        timeout: Duration,
        empty_is_failure: bool,
    ) -> Self {
        Self {
            sources,
            timeout,
            empty_is_failure,
        }
    }

    pub async fn execute(&self) -> Result<FeedBatch, PollError> {
        if self.sources.is_empty() {
            return Err(PollError::NoSources);
        }

        let mut failures = Vec::new();
        for source in &self.sources {
            let name = source.name();
            let result = match tokio::time::timeout(self.timeout, source.fetch()).await {
                Ok(result) => result,
                Err(_) => Err(FeedError::Timeout(self.timeout)),
            };

            match result {
                Ok(lobbies) if lobbies.is_empty() && self.empty_is_failure => {
                    tracing::warn!(source = %name, "Feed returned no lobbies, trying next source");
                    failures.push(SourceFailure {
                        source: name,
                        error: FeedError::Empty,
                    });
                }
                Ok(lobbies) => {
                    tracing::debug!(source = %name, count = lobbies.len(), "Feed fetched");
                    return Ok(FeedBatch {
                        source: name,
                        lobbies,
                    });
                }
                Err(e) => {
                    tracing::warn!(
                        source = %name,
                        error = %e,
                        "Feed source failed, trying next source"
                    );
                    failures.push(SourceFailure {
                        source: name,
                        error: e,
                    });
                }
            }
        }

        Err(PollError::AllSourcesFailed(failures))
    }
}
