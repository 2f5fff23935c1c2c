//! Lobbywatch Domain.
//!
//! Pure types and rules for tracking live game lobbies polled from a noisy feed:
//!
//! - `classifier` - decides which raw feed records are relevant lobbies
//! - `value_objects` - occupancy denoising, uptime tracking, presentation category
//! - `entities` - the polled [`Lobby`] and the authoritative [`TrackedRecord`]
//! - `snapshot` - the field set handed to a render adapter
//!
//! Nothing in this crate performs I/O; time is always passed in by the caller.

pub mod classifier;
pub mod entities;
pub mod error;
pub mod ids;
pub mod snapshot;
pub mod value_objects;

pub use classifier::{Classification, ClassifierRules, IrrelevantReason, LobbyClassifier};
pub use entities::{
    Lobby, LobbyState, MissingOutcome, RawLobby, RefreshOutcome, RenderHandle, TrackedRecord,
};
pub use error::DomainError;
pub use ids::{LobbyId, TrackingId};
pub use snapshot::LobbySnapshot;
pub use value_objects::{
    Category, DenoiseOutcome, Occupancy, OccupancyDenoiser, Uptime, UptimeSource, UptimeTracker,
    LOW_STREAK_TO_ACCEPT, OCCUPANCY_PLACEHOLDER,
};
