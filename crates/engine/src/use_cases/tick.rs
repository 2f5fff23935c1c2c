//! One full poll cycle: fetch, classify, reconcile, render, prune.

use std::collections::BTreeSet;
use std::sync::Arc;

use lobbywatch_domain::{Classification, IrrelevantReason, LobbyClassifier, LobbyId};

use crate::infrastructure::ports::ClockPort;
use crate::stores::LobbyRegistry;
use crate::use_cases::poll::{PollError, PollFeed};
use crate::use_cases::reconcile::ReconcileLobbies;
use crate::use_cases::render::RenderLobbies;

/// Summary of one completed tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub source: String,
    pub fetched: usize,
    pub relevant: usize,
    /// Relevant records that carried no id.
    pub missing_id: usize,
    pub active: BTreeSet<LobbyId>,
    pub opened: usize,
    pub reopened: usize,
    pub closed: usize,
    pub renders_attempted: usize,
    pub renders_failed: usize,
    pub pruned: usize,
}

pub struct RunTick {
    poll: PollFeed,
    classifier: LobbyClassifier,
    reconcile: ReconcileLobbies,
    render: RenderLobbies,
    clock: Arc<dyn ClockPort>,
    closed_retention: usize,
}

impl RunTick {
    pub fn new(
        poll: PollFeed,
        classifier: LobbyClassifier,
        reconcile: ReconcileLobbies,
        render: RenderLobbies,
        clock: Arc<dyn ClockPort>,
        closed_retention: usize,
    ) -> Self {
        Self {
            poll,
            classifier,
            reconcile,
            render,
            clock,
            closed_retention,
        }
    }

    /// Run one tick against the registry.
    ///
    /// When no source answers, the registry is left exactly as it was: no
    /// record goes missing and nothing is rendered.
    pub async fn execute(&self, registry: &mut LobbyRegistry) -> Result<TickReport, PollError> {
        let batch = self.poll.execute().await?;

        let fetched = batch.lobbies.len();
        let mut missing_id = 0;
        let lobbies: Vec<_> = batch
            .lobbies
            .iter()
            .filter_map(|raw| match self.classifier.classify(raw) {
                Classification::Relevant(lobby) => Some(lobby),
                Classification::Irrelevant(IrrelevantReason::MissingId) => {
                    missing_id += 1;
                    None
                }
                Classification::Irrelevant(_) => None,
            })
            .collect();
        if missing_id > 0 {
            tracing::warn!(count = missing_id, "Relevant lobbies without an id were skipped");
        }

        let relevant = lobbies.len();
        let now = self.clock.now();
        let reconciled = self.reconcile.execute(registry, lobbies, now);
        let rendered = self.render.execute(registry).await;
        let pruned = registry.prune_closed(self.closed_retention);

        Ok(TickReport {
            source: batch.source,
            fetched,
            relevant,
            missing_id,
            active: reconciled.active,
            opened: reconciled.opened,
            reopened: reconciled.reopened,
            closed: reconciled.closed,
            renders_attempted: rendered.attempted,
            renders_failed: rendered.failed,
            pruned,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::FixedClock;
    use crate::infrastructure::ports::{FeedError, FeedSource, MockFeedSource, MockLobbyRenderer};
    use chrono::{Duration, TimeZone, Utc};
    use lobbywatch_domain::{ClassifierRules, RawLobby, RenderHandle, UptimeSource};
    use std::sync::Mutex;

    fn raw(id: u64, name: &str, map: &str, taken: u64) -> RawLobby {
        RawLobby {
            id: Some(id),
            name: Some(name.into()),
            map: Some(map.into()),
            host: Some("host".into()),
            server: Some("europe".into()),
            slots_taken: Some(taken),
            slots_total: Some(12),
            uptime: Some(120),
        }
    }

    /// Feed whose answer the test swaps between ticks.
    fn scripted_feed(script: Arc<Mutex<Result<Vec<RawLobby>, ()>>>) -> Arc<dyn FeedSource> {
        let mut feed = MockFeedSource::new();
        feed.expect_name().return_const("primary".to_string());
        feed.expect_fetch().returning(move || {
            let current = script.lock().unwrap().clone();
            current.map_err(|()| FeedError::Status(503))
        });
        Arc::new(feed)
    }

    fn tick(feed: Arc<dyn FeedSource>, clock: Arc<FixedClock>) -> RunTick {
        let mut renderer = MockLobbyRenderer::new();
        renderer
            .expect_create()
            .returning(|s| Ok(RenderHandle::new(format!("msg-{}", s.title))));
        renderer.expect_update().returning(|_, _| Ok(()));

        RunTick::new(
            PollFeed::new(vec![feed], std::time::Duration::from_secs(5), true),
            LobbyClassifier::new(&ClassifierRules::default()).unwrap(),
            ReconcileLobbies::new(UptimeSource::Feed, Duration::seconds(25)),
            RenderLobbies::new(Arc::new(renderer)),
            clock,
            200,
        )
    }

    #[tokio::test]
    async fn tick_tracks_only_relevant_lobbies() {
        let script = Arc::new(Mutex::new(Ok(vec![
            raw(1, "HLW 6v6", "HeroLineWars v8.3", 5),
            raw(2, "dota allpick", "DotA v6.83", 9),
            raw(3, "old version", "Hero Line Wars W8.1", 4),
        ])));
        let clock = Arc::new(FixedClock::at(Utc.with_ymd_and_hms(2025, 3, 1, 20, 0, 0).unwrap()));
        let tick = tick(scripted_feed(script), clock);
        let mut registry = LobbyRegistry::new();

        let report = tick.execute(&mut registry).await.unwrap();

        assert_eq!(report.source, "primary");
        assert_eq!(report.fetched, 3);
        assert_eq!(report.relevant, 1);
        assert_eq!(report.active, BTreeSet::from([LobbyId::new(1)]));
        assert_eq!(report.renders_attempted, 1);
        assert!(!registry.open_record(LobbyId::new(1)).unwrap().needs_render());
    }

    #[tokio::test]
    async fn feed_outage_changes_nothing() {
        let script = Arc::new(Mutex::new(Ok(vec![raw(1, "HLW 6v6", "HeroLineWars", 5)])));
        let clock = Arc::new(FixedClock::at(Utc.with_ymd_and_hms(2025, 3, 1, 20, 0, 0).unwrap()));
        let tick = tick(scripted_feed(script.clone()), clock.clone());
        let mut registry = LobbyRegistry::new();
        tick.execute(&mut registry).await.unwrap();

        *script.lock().unwrap() = Err(());
        for _ in 0..10 {
            clock.advance(Duration::seconds(10));
            assert!(matches!(
                tick.execute(&mut registry).await,
                Err(PollError::AllSourcesFailed(_))
            ));
        }

        let record = registry.open_record(LobbyId::new(1)).unwrap();
        assert!(!record.is_closed());
        assert_eq!(record.missing_since(), None);
        let tracking_id = record.tracking_id();

        *script.lock().unwrap() = Ok(vec![raw(1, "HLW 6v6", "HeroLineWars", 5)]);
        clock.advance(Duration::seconds(10));
        let report = tick.execute(&mut registry).await.unwrap();

        assert_eq!(report.opened, 0);
        assert_eq!(report.closed, 0);
        let record = registry.open_record(LobbyId::new(1)).unwrap();
        assert_eq!(record.tracking_id(), tracking_id);
        assert_eq!(record.missing_since(), None);
        assert_eq!(registry.closed_count(), 0);
    }

    #[tokio::test]
    async fn lobby_leaving_feed_closes_after_grace() {
        let script = Arc::new(Mutex::new(Ok(vec![
            raw(1, "HLW 6v6", "HeroLineWars", 5),
            raw(2, "HLW 3v3", "HeroLineWars", 4),
        ])));
        let clock = Arc::new(FixedClock::at(Utc.with_ymd_and_hms(2025, 3, 1, 20, 0, 0).unwrap()));
        let tick = tick(scripted_feed(script.clone()), clock.clone());
        let mut registry = LobbyRegistry::new();
        tick.execute(&mut registry).await.unwrap();

        *script.lock().unwrap() = Ok(vec![raw(2, "HLW 3v3", "HeroLineWars", 4)]);
        let mut closed = 0;
        for _ in 0..4 {
            clock.advance(Duration::seconds(10));
            closed += tick.execute(&mut registry).await.unwrap().closed;
        }

        assert_eq!(closed, 1);
        let record = registry.latest_closed(LobbyId::new(1)).unwrap();
        assert_eq!(record.frozen_uptime_text(), Some("2m 0s"));
        assert!(!record.needs_render());
    }
}
