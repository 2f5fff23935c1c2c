//! Lobby uptime: where it comes from, how it is formatted, and how it is kept
//! monotonic across polls.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a lobby's uptime is taken from. Fixed per lobby at first sighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UptimeSource {
    /// Duration field reported by the feed, taken verbatim.
    Feed,
    /// Elapsed wall time since the lobby was first seen.
    Local,
}

impl fmt::Display for UptimeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UptimeSource::Feed => write!(f, "feed"),
            UptimeSource::Local => write!(f, "local"),
        }
    }
}

impl std::str::FromStr for UptimeSource {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "feed" | "remote" => Ok(UptimeSource::Feed),
            "local" | "elapsed" => Ok(UptimeSource::Local),
            _ => Err(()),
        }
    }
}

/// Whole seconds a lobby has been up. Displays as `"7m 42s"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Uptime(u64);

impl Uptime {
    pub fn from_secs(secs: u64) -> Self {
        Self(secs)
    }

    pub fn as_secs(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Uptime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}m {}s", self.0 / 60, self.0 % 60)
    }
}

/// Per-lobby uptime candidate, recomputed on every sighting.
///
/// The candidate never decreases: a feed reading lower than the current value
/// (or an absent one) keeps the previous value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UptimeTracker {
    source: UptimeSource,
    first_seen_at: DateTime<Utc>,
    current: Uptime,
}

impl UptimeTracker {
    pub fn new(source: UptimeSource, first_seen_at: DateTime<Utc>) -> Self {
        Self {
            source,
            first_seen_at,
            current: Uptime::default(),
        }
    }

    /// Recompute the candidate from one sighting.
    pub fn observe(&mut self, feed_secs: Option<u64>, now: DateTime<Utc>) -> Uptime {
        let next = match self.source {
            UptimeSource::Feed => feed_secs.map(Uptime::from_secs),
            UptimeSource::Local => {
                let elapsed = now.signed_duration_since(self.first_seen_at).num_seconds();
                Some(Uptime::from_secs(u64::try_from(elapsed).unwrap_or(0)))
            }
        };

        if let Some(next) = next {
            self.current = self.current.max(next);
        }
        self.current
    }

    pub fn source(&self) -> UptimeSource {
        self.source
    }

    pub fn first_seen_at(&self) -> DateTime<Utc> {
        self.first_seen_at
    }

    pub fn current(&self) -> Uptime {
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 18, 0, 0).unwrap()
    }

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(Uptime::from_secs(462).to_string(), "7m 42s");
        assert_eq!(Uptime::from_secs(0).to_string(), "0m 0s");
        assert_eq!(Uptime::from_secs(3725).to_string(), "62m 5s");
    }

    #[test]
    fn local_source_counts_from_first_sighting() {
        let mut tracker = UptimeTracker::new(UptimeSource::Local, t0());
        assert_eq!(tracker.observe(Some(9999), t0()).to_string(), "0m 0s");
        let later = t0() + Duration::seconds(95);
        assert_eq!(tracker.observe(None, later).to_string(), "1m 35s");
    }

    #[test]
    fn feed_source_takes_reported_duration() {
        let mut tracker = UptimeTracker::new(UptimeSource::Feed, t0());
        assert_eq!(tracker.observe(Some(61), t0()).as_secs(), 61);
        assert_eq!(tracker.observe(Some(71), t0()).as_secs(), 71);
    }

    #[test]
    fn feed_source_never_goes_backwards() {
        let mut tracker = UptimeTracker::new(UptimeSource::Feed, t0());
        tracker.observe(Some(300), t0());
        assert_eq!(tracker.observe(Some(0), t0()).as_secs(), 300);
        assert_eq!(tracker.observe(None, t0()).as_secs(), 300);
    }

    #[test]
    fn local_source_ignores_clock_skew() {
        let mut tracker = UptimeTracker::new(UptimeSource::Local, t0());
        let earlier = t0() - Duration::seconds(30);
        assert_eq!(tracker.observe(None, earlier).as_secs(), 0);
    }

    #[test]
    fn parses_source_names() {
        assert_eq!("feed".parse::<UptimeSource>(), Ok(UptimeSource::Feed));
        assert_eq!(" LOCAL ".parse::<UptimeSource>(), Ok(UptimeSource::Local));
        assert!("sundial".parse::<UptimeSource>().is_err());
    }
}
