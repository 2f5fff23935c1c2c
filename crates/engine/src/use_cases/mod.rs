//! Use cases - one poll cycle, split into its stages.
//!
//! `RunTick` chains the others; each stage is usable and tested on its own.

pub mod poll;
pub mod reconcile;
pub mod render;
pub mod tick;

pub use poll::{FeedBatch, PollError, PollFeed, SourceFailure};
pub use reconcile::{ReconcileLobbies, ReconcileReport};
pub use render::{RenderLobbies, RenderReport};
pub use tick::{RunTick, TickReport};
