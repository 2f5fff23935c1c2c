//! Reconcile one poll's relevant lobbies into the registry.

use std::collections::{BTreeSet, HashSet};

use chrono::{DateTime, Duration, Utc};
use lobbywatch_domain::{
    DenoiseOutcome, DomainError, Lobby, LobbyId, MissingOutcome, RefreshOutcome, TrackedRecord,
    UptimeSource,
};

use crate::stores::LobbyRegistry;

/// What one reconciliation pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Feed ids present and relevant in this poll.
    pub active: BTreeSet<LobbyId>,
    pub opened: usize,
    /// Opened under an id whose earlier generation had closed.
    pub reopened: usize,
    pub recovered: usize,
    pub went_missing: usize,
    pub closed: usize,
    pub suppressed_readings: usize,
    /// Repeated ids in the same payload; the first occurrence was used.
    pub duplicates: usize,
    pub violations: usize,
}

pub struct ReconcileLobbies {
    uptime_source: UptimeSource,
    grace: Duration,
}

impl ReconcileLobbies {
    pub fn new(uptime_source: UptimeSource, grace: Duration) -> Self {
        Self {
            uptime_source,
            grace,
        }
    }

    /// Apply the lobbies seen at `now`.
    ///
    /// Seen ids are refreshed or opened; open records not seen are marked
    /// missing and close once the grace period has elapsed. A record that
    /// rejects a transition is logged and skipped so the rest of the poll
    /// still applies.
    pub fn execute(
        &self,
        registry: &mut LobbyRegistry,
        lobbies: Vec<Lobby>,
        now: DateTime<Utc>,
    ) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        let mut seen = HashSet::new();

        for lobby in lobbies {
            let id = lobby.id;
            if !seen.insert(id) {
                report.duplicates += 1;
                tracing::debug!(lobby_id = %id, "Duplicate lobby id in payload, keeping first");
                continue;
            }
            report.active.insert(id);

            match registry.open_record_mut(id) {
                Some(record) => match record.refresh(lobby, now) {
                    Ok(outcome) => self.note_refresh(&mut report, id, outcome),
                    Err(e) => note_violation(&mut report, id, &e),
                },
                None => {
                    let reopened = registry.has_closed_generation(id);
                    let record = TrackedRecord::open(lobby, self.uptime_source, now);
                    tracing::info!(
                        lobby_id = %id,
                        tracking_id = %record.tracking_id(),
                        reopened,
                        "Lobby opened"
                    );
                    registry.insert_open(record);
                    report.opened += 1;
                    if reopened {
                        report.reopened += 1;
                    }
                }
            }
        }

        for id in registry.open_ids() {
            if report.active.contains(&id) {
                continue;
            }
            let Some(record) = registry.open_record_mut(id) else {
                continue;
            };

            match record.mark_missing(now, self.grace) {
                Ok(MissingOutcome::Pending) => {
                    report.went_missing += 1;
                    tracing::debug!(lobby_id = %id, "Lobby missing from feed, grace period started");
                }
                Ok(MissingOutcome::StillMissing { missing_for }) => {
                    tracing::debug!(
                        lobby_id = %id,
                        missing_secs = missing_for.num_seconds(),
                        "Lobby still missing"
                    );
                }
                Ok(MissingOutcome::Closed { frozen_uptime }) => {
                    report.closed += 1;
                    if let Some(tracking_id) = registry.retire(id) {
                        tracing::info!(
                            lobby_id = %id,
                            tracking_id = %tracking_id,
                            uptime = %frozen_uptime,
                            "Lobby closed"
                        );
                    }
                }
                Err(e) => note_violation(&mut report, id, &e),
            }
        }

        report
    }

    fn note_refresh(&self, report: &mut ReconcileReport, id: LobbyId, outcome: RefreshOutcome) {
        let occupancy = match outcome {
            RefreshOutcome::Refreshed { occupancy } => occupancy,
            RefreshOutcome::Recovered {
                occupancy,
                missing_for,
            } => {
                report.recovered += 1;
                tracing::info!(
                    lobby_id = %id,
                    missing_secs = missing_for.num_seconds(),
                    "Lobby back within grace period"
                );
                occupancy
            }
        };

        if let DenoiseOutcome::Suppressed { streak } = occupancy {
            report.suppressed_readings += 1;
            tracing::debug!(lobby_id = %id, streak, "Low occupancy reading held back");
        }
    }
}

fn note_violation(report: &mut ReconcileReport, id: LobbyId, error: &DomainError) {
    report.violations += 1;
    tracing::error!(lobby_id = %id, error = %error, "Lobby record rejected transition");
}
