//! Error types for port operations.

use std::time::Duration;

/// Failure of one feed source on one tick. Never fatal: the caller falls
/// through to the next source or skips the tick.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// Network-level failure (connect, TLS, body read).
    #[error("Feed request failed: {0}")]
    Request(String),

    /// Source did not answer within the per-source budget.
    #[error("Feed timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// Source answered with a non-success HTTP status.
    #[error("Feed returned HTTP {0}")]
    Status(u16),

    /// Body was not the expected JSON shape.
    #[error("Malformed feed payload: {0}")]
    Malformed(String),

    /// Well-formed payload without a single lobby.
    #[error("Feed payload contained no lobbies")]
    Empty,
}

/// Failure of one create or update call against the display surface.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Render request failed: {0}")]
    RequestFailed(String),

    #[error("Render rejected with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Invalid render response: {0}")]
    InvalidResponse(String),

    /// The message behind a render handle was deleted on the display side.
    #[error("Rendered message no longer exists")]
    Gone,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_message_includes_budget() {
        let err = FeedError::Timeout(Duration::from_millis(1500));
        assert_eq!(err.to_string(), "Feed timed out after 1500ms");
    }

    #[test]
    fn rejected_message_carries_status_and_body() {
        let err = RenderError::Rejected {
            status: 429,
            body: "You are being rate limited.".into(),
        };
        assert_eq!(
            err.to_string(),
            "Render rejected with HTTP 429: You are being rate limited."
        );
    }
}
