//! The authoritative per-lobby record and its lifecycle.
//!
//! ```text
//! (none) --sighted--> Open --absent--> Open(missing) --absent >= grace--> Closed
//!                      ^                    |
//!                      +----reappears-------+
//! ```
//!
//! Closed is terminal. A record is never re-derived from anything it rendered.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::lobby::Lobby;
use crate::error::DomainError;
use crate::ids::{LobbyId, TrackingId};
use crate::snapshot::LobbySnapshot;
use crate::value_objects::{DenoiseOutcome, Occupancy, OccupancyDenoiser, UptimeSource, UptimeTracker};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LobbyState {
    /// Listed by the feed, or absent for less than the grace period.
    Open,
    /// Absent for at least the grace period. Terminal.
    Closed,
}

/// Opaque reference to the display resource created for a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RenderHandle(String);

impl RenderHandle {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RenderHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Result of a sighting of an open record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Refreshed { occupancy: DenoiseOutcome },
    /// The lobby was missing and came back inside the grace period.
    Recovered {
        occupancy: DenoiseOutcome,
        missing_for: Duration,
    },
}

/// Result of a poll in which an open record's lobby was absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissingOutcome {
    /// First absent poll; `missing_since` was just set.
    Pending,
    /// Still absent, grace period not yet elapsed.
    StillMissing { missing_for: Duration },
    /// Grace period elapsed; the record is now Closed.
    Closed { frozen_uptime: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedRecord {
    tracking_id: TrackingId,
    lobby: Lobby,
    state: LobbyState,
    first_seen_at: DateTime<Utc>,
    denoiser: OccupancyDenoiser,
    uptime: UptimeTracker,
    missing_since: Option<DateTime<Utc>>,
    frozen_uptime_text: Option<String>,
    closed_at: Option<DateTime<Utc>>,
    render_handle: Option<RenderHandle>,
    last_rendered: Option<LobbySnapshot>,
}

impl TrackedRecord {
    /// Start tracking a lobby on its first relevant sighting.
    pub fn open(lobby: Lobby, uptime_source: UptimeSource, now: DateTime<Utc>) -> Self {
        let mut denoiser = OccupancyDenoiser::new();
        denoiser.observe(lobby.occupancy);
        let mut uptime = UptimeTracker::new(uptime_source, now);
        uptime.observe(lobby.uptime_secs, now);

        Self {
            tracking_id: TrackingId::new(),
            lobby,
            state: LobbyState::Open,
            first_seen_at: now,
            denoiser,
            uptime,
            missing_since: None,
            frozen_uptime_text: None,
            closed_at: None,
            render_handle: None,
            last_rendered: None,
        }
    }

    /// Apply a sighting: display fields, denoised occupancy, uptime candidate.
    pub fn refresh(
        &mut self,
        lobby: Lobby,
        now: DateTime<Utc>,
    ) -> Result<RefreshOutcome, DomainError> {
        self.ensure_open("refresh")?;
        if lobby.id != self.lobby.id {
            return Err(DomainError::invalid_transition(format!(
                "refresh of lobby {} with data for lobby {}",
                self.lobby.id, lobby.id
            )));
        }

        let occupancy = self.denoiser.observe(lobby.occupancy);
        self.uptime.observe(lobby.uptime_secs, now);
        self.lobby = lobby;

        Ok(match self.missing_since.take() {
            Some(since) => RefreshOutcome::Recovered {
                occupancy,
                missing_for: now.signed_duration_since(since),
            },
            None => RefreshOutcome::Refreshed { occupancy },
        })
    }

    /// Apply a poll in which the lobby was absent.
    ///
    /// Closes the record once it has been missing for at least `grace`,
    /// freezing the last computed uptime.
    pub fn mark_missing(
        &mut self,
        now: DateTime<Utc>,
        grace: Duration,
    ) -> Result<MissingOutcome, DomainError> {
        self.ensure_open("mark_missing")?;

        let Some(since) = self.missing_since else {
            self.missing_since = Some(now);
            return Ok(MissingOutcome::Pending);
        };

        let missing_for = now.signed_duration_since(since);
        if missing_for < grace {
            return Ok(MissingOutcome::StillMissing { missing_for });
        }

        let frozen = self.uptime.current().to_string();
        self.frozen_uptime_text = Some(frozen.clone());
        self.state = LobbyState::Closed;
        self.closed_at = Some(now);
        self.missing_since = None;
        Ok(MissingOutcome::Closed {
            frozen_uptime: frozen,
        })
    }

    fn ensure_open(&self, operation: &str) -> Result<(), DomainError> {
        match self.state {
            LobbyState::Open => Ok(()),
            LobbyState::Closed => Err(DomainError::invalid_transition(format!(
                "{operation} on closed lobby {} ({})",
                self.lobby.id, self.tracking_id
            ))),
        }
    }

    /// The field set a render adapter should currently show.
    pub fn snapshot(&self) -> LobbySnapshot {
        let uptime_text = match &self.frozen_uptime_text {
            Some(frozen) => frozen.clone(),
            None => self.uptime.current().to_string(),
        };

        LobbySnapshot {
            title: self.lobby.name.clone(),
            map: self.lobby.map.clone(),
            host: self.lobby.host.clone(),
            realm: self.lobby.realm.clone(),
            players_text: self.denoiser.display(),
            uptime_text,
            closed: self.is_closed(),
            category: self.lobby.category,
        }
    }

    /// True when the current snapshot has not been delivered yet.
    pub fn needs_render(&self) -> bool {
        self.last_rendered.as_ref() != Some(&self.snapshot())
    }

    /// Remember a successful create or update.
    pub fn record_render(&mut self, handle: RenderHandle, delivered: LobbySnapshot) {
        self.render_handle = Some(handle);
        self.last_rendered = Some(delivered);
    }

    /// Drop the handle of a message that no longer exists. The next render
    /// creates a new one.
    pub fn forget_render(&mut self) {
        self.render_handle = None;
        self.last_rendered = None;
    }

    pub fn tracking_id(&self) -> TrackingId {
        self.tracking_id
    }

    pub fn lobby_id(&self) -> LobbyId {
        self.lobby.id
    }

    pub fn lobby(&self) -> &Lobby {
        &self.lobby
    }

    pub fn state(&self) -> LobbyState {
        self.state
    }

    pub fn is_closed(&self) -> bool {
        self.state == LobbyState::Closed
    }

    pub fn first_seen_at(&self) -> DateTime<Utc> {
        self.first_seen_at
    }

    pub fn last_confirmed_occupancy(&self) -> Option<Occupancy> {
        self.denoiser.confirmed()
    }

    pub fn low_reading_streak(&self) -> u32 {
        self.denoiser.low_streak()
    }

    pub fn missing_since(&self) -> Option<DateTime<Utc>> {
        self.missing_since
    }

    pub fn frozen_uptime_text(&self) -> Option<&str> {
        self.frozen_uptime_text.as_deref()
    }

    pub fn closed_at(&self) -> Option<DateTime<Utc>> {
        self.closed_at
    }

    pub fn render_handle(&self) -> Option<&RenderHandle> {
        self.render_handle.as_ref()
    }
}
