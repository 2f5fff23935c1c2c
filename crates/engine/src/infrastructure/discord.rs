//! Discord webhook renderer.
//!
//! Each lobby is one webhook message holding a single embed. Creating posts
//! with `?wait=true` so Discord returns the message id, which becomes the
//! render handle; updates `PATCH` that message in place.

use std::time::Duration;

use async_trait::async_trait;
use lobbywatch_domain::{Category, LobbySnapshot, RenderHandle};
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};

use crate::infrastructure::ports::{LobbyRenderer, RenderError};

const COLOR_STANDARD: u32 = 0x2E_CC_71;
const COLOR_BETA: u32 = 0xF1_C4_0F;
const COLOR_CLOSED: u32 = 0xE7_4C_3C;

// Discord embed limits
const TITLE_MAX_CHARS: usize = 256;
const FIELD_MAX_CHARS: usize = 1024;

/// Discord rejects empty field values.
const EMPTY_VALUE: &str = "-";

pub struct DiscordWebhookRenderer {
    client: Client,
    webhook: Url,
}

impl DiscordWebhookRenderer {
    pub fn new(webhook_url: &str, timeout: Duration) -> Result<Self, RenderError> {
        let webhook = Url::parse(webhook_url.trim())
            .map_err(|e| RenderError::RequestFailed(format!("invalid webhook url: {e}")))?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Ok(Self { client, webhook })
    }

    fn message_url(&self, handle: &RenderHandle) -> Result<Url, RenderError> {
        let mut url = self.webhook.clone();
        url.path_segments_mut()
            .map_err(|_| RenderError::RequestFailed("webhook url cannot be a base".into()))?
            .pop_if_empty()
            .push("messages")
            .push(handle.as_str());
        Ok(url)
    }
}

#[async_trait]
impl LobbyRenderer for DiscordWebhookRenderer {
    async fn create(&self, snapshot: &LobbySnapshot) -> Result<RenderHandle, RenderError> {
        let response = self
            .client
            .post(self.webhook.clone())
            .query(&[("wait", "true")])
            .json(&WebhookMessage::from_snapshot(snapshot))
            .send()
            .await
            .map_err(|e| RenderError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RenderError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let created: CreatedMessage = response
            .json()
            .await
            .map_err(|e| RenderError::InvalidResponse(e.to_string()))?;
        Ok(RenderHandle::new(created.id))
    }

    async fn update(
        &self,
        handle: &RenderHandle,
        snapshot: &LobbySnapshot,
    ) -> Result<(), RenderError> {
        let response = self
            .client
            .patch(self.message_url(handle)?)
            .json(&WebhookMessage::from_snapshot(snapshot))
            .send()
            .await
            .map_err(|e| RenderError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(update_rejection(status, body));
        }
        Ok(())
    }
}

/// A deleted message answers `PATCH` with 404 and stays deleted.
fn update_rejection(status: StatusCode, body: String) -> RenderError {
    if status == StatusCode::NOT_FOUND {
        return RenderError::Gone;
    }
    RenderError::Rejected {
        status: status.as_u16(),
        body,
    }
}

// =============================================================================
// Webhook wire types
// =============================================================================

#[derive(Debug, Serialize)]
struct WebhookMessage {
    embeds: Vec<Embed>,
    allowed_mentions: AllowedMentions,
}

#[derive(Debug, Serialize)]
struct AllowedMentions {
    parse: Vec<String>,
}

#[derive(Debug, Serialize)]
struct Embed {
    title: String,
    color: u32,
    fields: Vec<EmbedField>,
    footer: EmbedFooter,
}

#[derive(Debug, Serialize)]
struct EmbedField {
    name: &'static str,
    value: String,
    inline: bool,
}

#[derive(Debug, Serialize)]
struct EmbedFooter {
    text: String,
}

#[derive(Debug, Deserialize)]
struct CreatedMessage {
    id: String,
}

impl WebhookMessage {
    fn from_snapshot(snapshot: &LobbySnapshot) -> Self {
        Self {
            embeds: vec![Embed::from_snapshot(snapshot)],
            allowed_mentions: AllowedMentions { parse: Vec::new() },
        }
    }
}

impl Embed {
    fn from_snapshot(snapshot: &LobbySnapshot) -> Self {
        let footer = if snapshot.closed {
            format!("Closed · {}", snapshot.uptime_text)
        } else {
            format!("Uptime: {}", snapshot.uptime_text)
        };

        let title = truncate(&snapshot.title, TITLE_MAX_CHARS);
        Self {
            title: if title.is_empty() {
                "Unnamed lobby".to_string()
            } else {
                title
            },
            color: embed_color(snapshot),
            fields: vec![
                field("Map", &snapshot.map, false),
                field("Host", &snapshot.host, true),
                field("Realm", &snapshot.realm, true),
                field("Players", &snapshot.players_text, true),
            ],
            footer: EmbedFooter { text: footer },
        }
    }
}

fn embed_color(snapshot: &LobbySnapshot) -> u32 {
    if snapshot.closed {
        return COLOR_CLOSED;
    }
    match snapshot.category {
        Category::Standard => COLOR_STANDARD,
        Category::Beta => COLOR_BETA,
    }
}

fn field(name: &'static str, value: &str, inline: bool) -> EmbedField {
    let value = truncate(value.trim(), FIELD_MAX_CHARS);
    EmbedField {
        name,
        value: if value.is_empty() {
            EMPTY_VALUE.to_string()
        } else {
            value
        },
        inline,
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
