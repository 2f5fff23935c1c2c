//! Field set handed to a render adapter. The adapter owns all formatting.

use serde::{Deserialize, Serialize};

use crate::value_objects::Category;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LobbySnapshot {
    pub title: String,
    pub map: String,
    pub host: String,
    pub realm: String,
    /// `"taken/total"` or the placeholder.
    pub players_text: String,
    /// `"7m 42s"`; frozen once closed.
    pub uptime_text: String,
    pub closed: bool,
    pub category: Category,
}
