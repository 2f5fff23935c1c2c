//! Lobbywatch Engine library.
//!
//! Polls a lobby feed, reconciles the relevant lobbies into tracked records
//! and keeps one display message per lobby up to date.
//!
//! ## Structure
//!
//! - `infrastructure/` - Port traits and their adapters (HTTP feed, Discord, clock, settings)
//! - `stores/` - In-memory lobby registry owned by the poll worker
//! - `use_cases/` - Poll with failover, reconcile, render, and the tick that chains them
//! - `workers` - The interval loop driving ticks until shutdown
//! - `app` - Application composition

pub mod app;
pub mod infrastructure;
pub mod stores;
pub mod use_cases;
pub mod workers;

pub use app::App;
