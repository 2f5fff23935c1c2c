//! HTTP JSON lobby feed.

use std::time::Duration;

use async_trait::async_trait;
use lobbywatch_domain::RawLobby;
use reqwest::Client;
use serde_json::Value;

use crate::infrastructure::ports::{FeedError, FeedSource};

/// Keys the lobby list has been published under, tried after the configured one.
const KNOWN_PAYLOAD_KEYS: [&str; 2] = ["body", "result"];

/// Feed source fetching `GET {url}` and reading the lobby list from one
/// top-level key of the JSON body.
#[derive(Clone)]
pub struct HttpFeedSource {
    client: Client,
    url: String,
    payload_key: String,
    timeout: Duration,
}

impl HttpFeedSource {
    pub fn new(url: &str, payload_key: &str, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("lobbywatch/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            url: url.trim().to_string(),
            payload_key: payload_key.to_string(),
            timeout,
        }
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    fn name(&self) -> String {
        self.url.clone()
    }

    async fn fetch(&self) -> Result<Vec<RawLobby>, FeedError> {
        let response = self.client.get(&self.url).send().await.map_err(|e| {
            if e.is_timeout() {
                FeedError::Timeout(self.timeout)
            } else {
                FeedError::Request(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FeedError::Request(e.to_string()))?;

        parse_payload(&body, &self.payload_key)
    }
}

/// Extract the lobby list from a feed body.
///
/// The list is looked up under `payload_key`, then under the other known keys;
/// a bare top-level array is accepted too. Individual records that are not
/// JSON objects are skipped.
pub fn parse_payload(body: &str, payload_key: &str) -> Result<Vec<RawLobby>, FeedError> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| FeedError::Malformed(e.to_string()))?;

    let list = match &value {
        Value::Array(items) => items,
        Value::Object(map) => std::iter::once(payload_key)
            .chain(KNOWN_PAYLOAD_KEYS)
            .find_map(|key| map.get(key).and_then(Value::as_array))
            .ok_or_else(|| {
                FeedError::Malformed(format!("no lobby list under \"{payload_key}\""))
            })?,
        other => {
            return Err(FeedError::Malformed(format!(
                "expected object or array, got {}",
                json_kind(other)
            )))
        }
    };

    let mut skipped = 0usize;
    let lobbies: Vec<RawLobby> = list
        .iter()
        .filter_map(|item| {
            let parsed = item
                .is_object()
                .then(|| serde_json::from_value::<RawLobby>(item.clone()).ok())
                .flatten();
            if parsed.is_none() {
                skipped += 1;
            }
            parsed
        })
        .collect();

    if skipped > 0 {
        tracing::debug!(skipped, kept = lobbies.len(), "Skipped unreadable feed records");
    }
    Ok(lobbies)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
