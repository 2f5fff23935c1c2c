use std::fmt;

use serde::{Deserialize, Serialize};

/// Presentation tag derived from the map label on every update.
///
/// Not sticky: a lobby whose map label changes is re-tagged on the next poll.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    #[default]
    Standard,
    /// Map label names a beta or test build.
    Beta,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Standard => write!(f, "standard"),
            Category::Beta => write!(f, "beta"),
        }
    }
}
