//! Infrastructure implementations.
//!
//! Contains port trait implementations for external dependencies.

pub mod app_settings;
pub mod clock;
pub mod discord;
pub mod http_feed;
pub mod log_renderer;
pub mod ports;
