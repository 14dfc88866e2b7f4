//! Places directory core: venue listings with staff curation, user reviews,
//! derived ratings, and photo galleries.
//!
//! The crate exposes a framework-level [`directory`] module (domain types,
//! policy, service facade, and an axum router) alongside the service plumbing
//! shared with the API binary (config, telemetry, top-level errors).

pub mod config;
pub mod directory;
pub mod error;
pub mod telemetry;
