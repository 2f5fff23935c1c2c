//! In-memory lobby registry.
//!
//! Owned by the poll worker and passed by `&mut` into each tick, so there is
//! no locking and no concurrent mutation of a record. State is not persisted;
//! a restart re-opens every listed lobby.

use std::collections::{HashMap, VecDeque};

use lobbywatch_domain::{LobbyId, LobbySnapshot, RenderHandle, TrackedRecord, TrackingId};

/// A record whose current snapshot has not been delivered yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRender {
    pub tracking_id: TrackingId,
    pub lobby_id: LobbyId,
    pub handle: Option<RenderHandle>,
    pub snapshot: LobbySnapshot,
}

#[derive(Debug, Default)]
pub struct LobbyRegistry {
    /// Open records, at most one per feed id.
    open: HashMap<LobbyId, TrackedRecord>,
    /// Closed records, oldest first.
    closed: VecDeque<TrackedRecord>,
}

impl LobbyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_record(&self, id: LobbyId) -> Option<&TrackedRecord> {
        self.open.get(&id)
    }

    pub fn open_record_mut(&mut self, id: LobbyId) -> Option<&mut TrackedRecord> {
        self.open.get_mut(&id)
    }

    pub fn open_ids(&self) -> Vec<LobbyId> {
        let mut ids: Vec<LobbyId> = self.open.keys().copied().collect();
        ids.sort();
        ids
    }

    /// Start tracking a new record. Returns the record it displaced, if any.
    pub fn insert_open(&mut self, record: TrackedRecord) -> Option<TrackedRecord> {
        self.open.insert(record.lobby_id(), record)
    }

    /// Move a record that just closed out of the open set.
    pub fn retire(&mut self, id: LobbyId) -> Option<TrackingId> {
        let record = self.open.remove(&id)?;
        let tracking_id = record.tracking_id();
        self.closed.push_back(record);
        Some(tracking_id)
    }

    /// True if some earlier generation of this feed id has closed.
    pub fn has_closed_generation(&self, id: LobbyId) -> bool {
        self.closed.iter().any(|r| r.lobby_id() == id)
    }

    /// Latest closed generation of a feed id.
    pub fn latest_closed(&self, id: LobbyId) -> Option<&TrackedRecord> {
        self.closed.iter().rev().find(|r| r.lobby_id() == id)
    }

    pub fn closed_records(&self) -> impl Iterator<Item = &TrackedRecord> {
        self.closed.iter()
    }

    pub fn open_count(&self) -> usize {
        self.open.len()
    }

    pub fn closed_count(&self) -> usize {
        self.closed.len()
    }

    /// Snapshots of every record, open or closed, that still needs rendering.
    pub fn pending_renders(&self) -> Vec<PendingRender> {
        let mut pending: Vec<PendingRender> = self
            .open
            .values()
            .chain(self.closed.iter())
            .filter(|r| r.needs_render())
            .map(|r| PendingRender {
                tracking_id: r.tracking_id(),
                lobby_id: r.lobby_id(),
                handle: r.render_handle().cloned(),
                snapshot: r.snapshot(),
            })
            .collect();
        pending.sort_by_key(|p| p.lobby_id);
        pending
    }

    /// Store the outcome of a successful render on the record it was made for.
    ///
    /// Returns false if that record generation is no longer held.
    pub fn record_render(
        &mut self,
        tracking_id: TrackingId,
        lobby_id: LobbyId,
        handle: RenderHandle,
        delivered: LobbySnapshot,
    ) -> bool {
        match self.generation_mut(tracking_id, lobby_id) {
            Some(record) => {
                record.record_render(handle, delivered);
                true
            }
            None => false,
        }
    }

    /// Forget the rendered message of one record generation so the next
    /// render creates a fresh one.
    pub fn forget_render(&mut self, tracking_id: TrackingId, lobby_id: LobbyId) -> bool {
        match self.generation_mut(tracking_id, lobby_id) {
            Some(record) => {
                record.forget_render();
                true
            }
            None => false,
        }
    }

    fn generation_mut(
        &mut self,
        tracking_id: TrackingId,
        lobby_id: LobbyId,
    ) -> Option<&mut TrackedRecord> {
        match self.open.get_mut(&lobby_id) {
            Some(r) if r.tracking_id() == tracking_id => Some(r),
            _ => self
                .closed
                .iter_mut()
                .find(|r| r.tracking_id() == tracking_id),
        }
    }

    /// Drop the oldest closed records whose final render was delivered,
    /// keeping at most `limit` closed records. Undelivered ones are kept.
    pub fn prune_closed(&mut self, limit: usize) -> usize {
        let mut excess = self.closed.len().saturating_sub(limit);
        if excess == 0 {
            return 0;
        }

        let before = self.closed.len();
        self.closed.retain(|record| {
            if excess > 0 && !record.needs_render() {
                excess -= 1;
                false
            } else {
                true
            }
        });
        before - self.closed.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use lobbywatch_domain::{Category, Lobby, Occupancy, UptimeSource};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 20, 0, 0).unwrap()
    }

    fn record(id: u64) -> TrackedRecord {
        TrackedRecord::open(
            Lobby {
                id: LobbyId::new(id),
                name: format!("HLW #{id}"),
                map: "HeroLineWars".into(),
                host: "h".into(),
                realm: "europe".into(),
                occupancy: Occupancy::new(4, 12),
                uptime_secs: Some(60),
                category: Category::Standard,
            },
            UptimeSource::Feed,
            t0(),
        )
    }

    fn close(registry: &mut LobbyRegistry, id: u64) {
        let lobby_id = LobbyId::new(id);
        let record = registry.open_record_mut(lobby_id).unwrap();
        record.mark_missing(t0(), Duration::zero()).unwrap();
        record
            .mark_missing(t0() + Duration::seconds(1), Duration::zero())
            .unwrap();
        registry.retire(lobby_id).unwrap();
    }

    fn deliver_all(registry: &mut LobbyRegistry) {
        for pending in registry.pending_renders() {
            assert!(registry.record_render(
                pending.tracking_id,
                pending.lobby_id,
                RenderHandle::new(format!("m-{}", pending.lobby_id)),
                pending.snapshot,
            ));
        }
    }

    #[test]
    fn retire_moves_record_to_closed() {
        let mut registry = LobbyRegistry::new();
        registry.insert_open(record(1));
        close(&mut registry, 1);
        assert_eq!(registry.open_count(), 0);
        assert_eq!(registry.closed_count(), 1);
        assert!(registry.has_closed_generation(LobbyId::new(1)));
        assert!(registry.latest_closed(LobbyId::new(1)).unwrap().is_closed());
    }

    #[test]
    fn pending_renders_cover_open_and_closed() {
        let mut registry = LobbyRegistry::new();
        registry.insert_open(record(1));
        registry.insert_open(record(2));
        close(&mut registry, 2);

        let pending = registry.pending_renders();
        assert_eq!(pending.len(), 2);
        assert!(pending[1].snapshot.closed);

        deliver_all(&mut registry);
        assert!(registry.pending_renders().is_empty());
    }

    #[test]
    fn render_result_goes_to_the_right_generation() {
        let mut registry = LobbyRegistry::new();
        registry.insert_open(record(7));
        let old = registry.pending_renders().remove(0);
        close(&mut registry, 7);
        registry.insert_open(record(7));

        assert!(registry.record_render(
            old.tracking_id,
            old.lobby_id,
            RenderHandle::new("old"),
            old.snapshot,
        ));
        let reopened = registry.open_record(LobbyId::new(7)).unwrap();
        assert!(reopened.render_handle().is_none());
    }

    #[test]
    fn unknown_generation_is_reported() {
        let mut registry = LobbyRegistry::new();
        registry.insert_open(record(1));
        let pending = registry.pending_renders().remove(0);
        assert!(!registry.record_render(
            TrackingId::new(),
            pending.lobby_id,
            RenderHandle::new("x"),
            pending.snapshot,
        ));
    }

    #[test]
    fn prune_keeps_undelivered_and_newest() {
        let mut registry = LobbyRegistry::new();
        for id in 1..=4 {
            registry.insert_open(record(id));
        }
        deliver_all(&mut registry);
        for id in 1..=4 {
            close(&mut registry, id);
        }
        // final render of lobby 1 and 2 delivered, 3 and 4 still pending
        for pending in registry.pending_renders() {
            if pending.lobby_id.get() <= 2 {
                registry.record_render(
                    pending.tracking_id,
                    pending.lobby_id,
                    RenderHandle::new("m"),
                    pending.snapshot,
                );
            }
        }

        assert_eq!(registry.prune_closed(1), 2);
        let left: Vec<u64> = registry.closed_records().map(|r| r.lobby_id().get()).collect();
        assert_eq!(left, vec![3, 4]);
        assert_eq!(registry.prune_closed(10), 0);
    }

    #[test]
    fn forgotten_closed_render_blocks_pruning_until_recreated() {
        let mut registry = LobbyRegistry::new();
        registry.insert_open(record(1));
        registry.insert_open(record(2));
        close(&mut registry, 1);
        close(&mut registry, 2);
        deliver_all(&mut registry);

        let gone = registry.latest_closed(LobbyId::new(1)).unwrap().tracking_id();
        assert!(registry.forget_render(gone, LobbyId::new(1)));
        assert_eq!(registry.pending_renders().len(), 1);
        assert_eq!(registry.pending_renders()[0].handle, None);
        assert_eq!(registry.prune_closed(1), 1);

        deliver_all(&mut registry);
        assert_eq!(registry.prune_closed(0), 1);
        assert!(!registry.forget_render(gone, LobbyId::new(1)));
    }
}
