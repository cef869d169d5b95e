//! Core planning functionality shared by the library and the CLI

pub mod advisor;
pub mod catalog;
pub mod config;
pub mod conflict;
pub mod error;
pub mod export;
pub mod models;
pub mod preferences;
pub mod requirements;
pub mod scheduler;

/// Returns the current version of the `course-planner` crate
#[must_use]
pub const fn get_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
