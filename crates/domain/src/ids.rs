use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier assigned by the lobby feed.
///
/// Unique among currently listed lobbies only; the feed may hand the same
/// number to a new lobby once the old one is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LobbyId(u64);

impl LobbyId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for LobbyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for LobbyId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// One tracking generation of a lobby. A feed id reused after closure gets a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackingId(Uuid);

impl TrackingId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TrackingId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TrackingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lobby_id_displays_raw_number() {
        assert_eq!(LobbyId::new(4711).to_string(), "4711");
        assert_eq!(LobbyId::from(7).get(), 7);
    }

    #[test]
    fn tracking_ids_are_unique_per_generation() {
        assert_ne!(TrackingId::new(), TrackingId::new());
    }

    #[test]
    fn tracking_id_serializes_as_bare_uuid() {
        let id = TrackingId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
        assert_eq!(serde_json::from_str::<TrackingId>(&json).unwrap(), id);
    }
}
