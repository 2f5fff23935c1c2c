//! Value objects - Immutable objects defined by their attributes, plus the
//! small per-lobby trackers that smooth them across polls.

mod category;
mod occupancy;
mod uptime;

// Presentation tag derived from the map label
pub use category::Category;

// Player count and its debounce rule
pub use occupancy::{
    DenoiseOutcome, Occupancy, OccupancyDenoiser, LOW_STREAK_TO_ACCEPT, OCCUPANCY_PLACEHOLDER,
};

pub use uptime::{Uptime, UptimeSource, UptimeTracker};
