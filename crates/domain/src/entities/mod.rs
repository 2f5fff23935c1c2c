//! Domain entities

mod lobby;
mod tracked_record;

pub use lobby::{Lobby, RawLobby};
pub use tracked_record::{
    LobbyState, MissingOutcome, RefreshOutcome, RenderHandle, TrackedRecord,
};
