//! Application state and composition.

use std::sync::Arc;

use lobbywatch_domain::{DomainError, LobbyClassifier};
use tokio_util::sync::CancellationToken;

use crate::infrastructure::{
    app_settings::WatcherSettings,
    clock::SystemClock,
    discord::DiscordWebhookRenderer,
    http_feed::HttpFeedSource,
    log_renderer::LogRenderer,
    ports::{ClockPort, FeedSource, LobbyRenderer},
};
use crate::stores::LobbyRegistry;
use crate::use_cases::{PollFeed, ReconcileLobbies, RenderLobbies, RunTick};
use crate::workers::poll_worker;

/// Main application state.
///
/// Holds the composed tick and the settings it was built from.
pub struct App {
    pub settings: WatcherSettings,
    pub tick: Arc<RunTick>,
}

impl App {
    /// Compose the application from already-built adapters.
    pub fn new(
        settings: WatcherSettings,
        sources: Vec<Arc<dyn FeedSource>>,
        renderer: Arc<dyn LobbyRenderer>,
        clock: Arc<dyn ClockPort>,
    ) -> Result<Self, DomainError> {
        let classifier = LobbyClassifier::new(&settings.classifier)?;

        let tick = RunTick::new(
            PollFeed::new(
                sources,
                settings.feed_timeout(),
                settings.feed_empty_is_failure,
            ),
            classifier,
            ReconcileLobbies::new(settings.uptime_source, settings.grace_period()),
            RenderLobbies::new(renderer),
            clock,
            settings.closed_retention,
        );

        Ok(Self {
            settings,
            tick: Arc::new(tick),
        })
    }

    /// Build the production adapters named by the settings.
    ///
    /// Renders to the Discord webhook when one is configured and only logs
    /// otherwise.
    pub fn from_settings(settings: WatcherSettings) -> anyhow::Result<Self> {
        let sources: Vec<Arc<dyn FeedSource>> = settings
            .feed_urls
            .iter()
            .map(|url| {
                Arc::new(HttpFeedSource::new(
                    url,
                    &settings.feed_payload_key,
                    settings.feed_timeout(),
                )) as Arc<dyn FeedSource>
            })
            .collect();

        let renderer: Arc<dyn LobbyRenderer> = match &settings.discord_webhook_url {
            Some(url) => {
                tracing::info!("Rendering lobbies to Discord webhook");
                Arc::new(DiscordWebhookRenderer::new(url, settings.feed_timeout())?)
            }
            None => {
                tracing::warn!("DISCORD_WEBHOOK_URL not set, lobbies will only be logged");
                Arc::new(LogRenderer::new())
            }
        };

        Ok(Self::new(settings, sources, renderer, Arc::new(SystemClock::new()))?)
    }

    /// Poll until `cancel` fires, starting from an empty registry.
    pub async fn run(&self, cancel: CancellationToken) -> LobbyRegistry {
        poll_worker(
            self.tick.clone(),
            LobbyRegistry::new(),
            self.settings.poll_interval(),
            cancel,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lobbywatch_domain::ClassifierRules;

    #[test]
    fn builds_log_only_app_without_webhook() {
        let app = App::from_settings(WatcherSettings::default()).unwrap();
        assert_eq!(app.settings.feed_urls.len(), 1);
    }

    #[test]
    fn rejects_invalid_webhook_url() {
        let settings = WatcherSettings {
            discord_webhook_url: Some("not a url".into()),
            ..WatcherSettings::default()
        };
        assert!(App::from_settings(settings).is_err());
    }

    #[test]
    fn empty_token_lists_are_accepted() {
        let settings = WatcherSettings {
            classifier: ClassifierRules {
                include: Vec::new(),
                exclude: Vec::new(),
                beta: Vec::new(),
            },
            ..WatcherSettings::default()
        };
        assert!(App::from_settings(settings).is_ok());
    }
}
