//! In-memory state storage modules.
//!
//! Stores manage runtime state that is rebuilt from the feed after a restart:
//! - `LobbyRegistry` - every tracked lobby record, open and closed

pub mod lobby_registry;

pub use lobby_registry::{LobbyRegistry, PendingRender};
