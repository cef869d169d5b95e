//! Error type shared by the planning library

use std::path::PathBuf;

use thiserror::Error;

/// Failures that stop a planning request.
///
/// Infeasible courses or areas are not errors: they are reported as reason
/// strings on the schedule result.
#[derive(Debug, Error)]
pub enum PlannerError {
    /// A structured course or section table is missing
    #[error("{table} table unavailable at {}", path.display())]
    TablesUnavailable {
        /// Which table ("courses" or "sections")
        table: &'static str,
        /// Where it was expected
        path: PathBuf,
    },
    /// A structured table lacks a required column
    #[error("{table} table is missing required column '{column}'")]
    MissingColumn {
        /// Which table ("courses" or "sections")
        table: &'static str,
        /// The missing header
        column: &'static str,
    },
    /// No catalog snapshot has been installed yet
    #[error("course tables unavailable: no catalog snapshot is loaded")]
    NoCatalog,
    /// I/O failure while reading or writing a collaborator file
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Malformed CSV structure (not a single bad cell)
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    /// JSON encoding or decoding failure
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    /// TOML decoding failure
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
    /// Requirement rule tables failed validation
    #[error("invalid requirement rules: {0}")]
    InvalidRules(String),
    /// Programmatic preferences violate `min_credits <= max_credits`
    #[error("invalid preferences: {0}")]
    InvalidPreferences(String),
    /// A built schedule broke one of its own invariants
    #[error("internal scheduling error: {0}")]
    Internal(String),
}

impl PlannerError {
    /// True for both flavours of the "tables unavailable" condition.
    #[must_use]
    pub const fn is_tables_unavailable(&self) -> bool {
        matches!(self, Self::TablesUnavailable { .. } | Self::NoCatalog)
    }
}

/// Result alias used across the library.
pub type PlannerResult<T> = std::result::Result<T, PlannerError>;
