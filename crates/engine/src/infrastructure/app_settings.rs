//! Watcher settings.
//!
//! Read once at startup from the process environment (after `.env` files are
//! loaded by `main`). Every value has a default; a value that fails to parse
//! falls back to its default with a warning rather than aborting startup.
//!
//! | Variable | Default |
//! |---|---|
//! | `FEED_URLS` | `https://api.wc3stats.com/gamelist` |
//! | `FEED_PAYLOAD_KEY` | `body` |
//! | `FEED_TIMEOUT_SECS` | `5` |
//! | `FEED_EMPTY_IS_FAILURE` | `true` |
//! | `POLL_INTERVAL_SECS` | `10` |
//! | `GRACE_PERIOD_SECS` | `25` |
//! | `UPTIME_SOURCE` | `feed` |
//! | `MATCH_TOKENS` / `EXCLUDE_TOKENS` / `BETA_TOKENS` | see [`ClassifierRules::default`] |
//! | `DISCORD_WEBHOOK_URL` | unset (log-only rendering) |
//! | `CLOSED_RETENTION` | `200` |

use std::str::FromStr;
use std::time::Duration;

use lobbywatch_domain::{ClassifierRules, UptimeSource};
use serde::{Deserialize, Serialize};

/// Default lobby feed.
pub const DEFAULT_FEED_URL: &str = "https://api.wc3stats.com/gamelist";

/// Default top-level key holding the lobby list.
pub const DEFAULT_PAYLOAD_KEY: &str = "body";

/// Longest accepted grace period (one day).
pub const MAX_GRACE_PERIOD_SECS: u64 = 86_400;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatcherSettings {
    /// Feed sources in failover order.
    pub feed_urls: Vec<String>,
    pub feed_payload_key: String,
    pub feed_timeout_secs: u64,
    /// Treat a well-formed but empty lobby list as a source failure.
    pub feed_empty_is_failure: bool,
    pub poll_interval_secs: u64,
    pub grace_period_secs: u64,
    pub uptime_source: UptimeSource,
    pub classifier: ClassifierRules,
    #[serde(skip_serializing)]
    pub discord_webhook_url: Option<String>,
    /// Closed records kept after their final render was delivered.
    pub closed_retention: usize,
}

impl Default for WatcherSettings {
    fn default() -> Self {
        Self {
            feed_urls: vec![DEFAULT_FEED_URL.to_string()],
            feed_payload_key: DEFAULT_PAYLOAD_KEY.to_string(),
            feed_timeout_secs: 5,
            feed_empty_is_failure: true,
            poll_interval_secs: 10,
            grace_period_secs: 25,
            uptime_source: UptimeSource::Feed,
            classifier: ClassifierRules::default(),
            discord_webhook_url: None,
            closed_retention: 200,
        }
    }
}

impl WatcherSettings {
    /// Load settings from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let feed_urls = get("FEED_URLS")
            .map(|v| split_list(&v))
            .filter(|urls| !urls.is_empty())
            .unwrap_or(defaults.feed_urls);

        let classifier = ClassifierRules {
            include: get("MATCH_TOKENS")
                .map(|v| split_list(&v))
                .unwrap_or(defaults.classifier.include),
            exclude: get("EXCLUDE_TOKENS")
                .map(|v| split_list(&v))
                .unwrap_or(defaults.classifier.exclude),
            beta: get("BETA_TOKENS")
                .map(|v| split_list(&v))
                .unwrap_or(defaults.classifier.beta),
        };

        Self {
            feed_urls,
            feed_payload_key: get("FEED_PAYLOAD_KEY").unwrap_or(defaults.feed_payload_key),
            feed_timeout_secs: parse_or(
                "FEED_TIMEOUT_SECS",
                get("FEED_TIMEOUT_SECS"),
                defaults.feed_timeout_secs,
            ),
            feed_empty_is_failure: parse_flag_or(
                "FEED_EMPTY_IS_FAILURE",
                get("FEED_EMPTY_IS_FAILURE"),
                defaults.feed_empty_is_failure,
            ),
            poll_interval_secs: parse_or(
                "POLL_INTERVAL_SECS",
                get("POLL_INTERVAL_SECS"),
                defaults.poll_interval_secs,
            ),
            grace_period_secs: clamp_grace(parse_or(
                "GRACE_PERIOD_SECS",
                get("GRACE_PERIOD_SECS"),
                defaults.grace_period_secs,
            )),
            uptime_source: get("UPTIME_SOURCE")
                .and_then(|v| {
                    let parsed = v.parse::<UptimeSource>().ok();
                    if parsed.is_none() {
                        tracing::warn!(value = %v, "Invalid UPTIME_SOURCE, using default");
                    }
                    parsed
                })
                .unwrap_or(defaults.uptime_source),
            classifier,
            discord_webhook_url: get("DISCORD_WEBHOOK_URL"),
            closed_retention: parse_or(
                "CLOSED_RETENTION",
                get("CLOSED_RETENTION"),
                defaults.closed_retention,
            ),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    pub fn feed_timeout(&self) -> Duration {
        Duration::from_secs(self.feed_timeout_secs.max(1))
    }

    pub fn grace_period(&self) -> chrono::Duration {
        let secs = self.grace_period_secs.min(MAX_GRACE_PERIOD_SECS);
        chrono::Duration::try_seconds(i64::try_from(secs).unwrap_or_default())
            .unwrap_or_else(chrono::Duration::zero)
    }
}

fn clamp_grace(secs: u64) -> u64 {
    if secs > MAX_GRACE_PERIOD_SECS {
        tracing::warn!(
            value = secs,
            max = MAX_GRACE_PERIOD_SECS,
            "GRACE_PERIOD_SECS too large, clamping"
        );
        return MAX_GRACE_PERIOD_SECS;
    }
    secs
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_or<T: FromStr + Copy>(key: &str, value: Option<String>, default: T) -> T {
    match value {
        None => default,
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "Invalid numeric setting, using default");
            default
        }),
    }
}

fn parse_flag_or(key: &str, value: Option<String>, default: bool) -> bool {
    match value.as_deref().map(str::to_ascii_lowercase).as_deref() {
        None => default,
        Some("1" | "true" | "yes" | "on") => true,
        Some("0" | "false" | "no" | "off") => false,
        Some(other) => {
            tracing::warn!(key, value = %other, "Invalid flag setting, using default");
            default
        }
    }
}
