//! Student scheduling preferences

use crate::core::conflict::ClockTime;
use crate::core::error::{PlannerError, PlannerResult};
use crate::core::models::course::normalize_code;
use crate::core::models::Weekday;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Default credit floor when none is requested
pub const DEFAULT_MIN_CREDITS: u32 = 12;

/// Default credit ceiling when none is requested
pub const DEFAULT_MAX_CREDITS: u32 = 15;

/// Resolved preferences for one scheduling request
///
/// Built fresh per request, either by a [`crate::core::preferences::PreferenceParser`]
/// or programmatically through [`Preferences::new`] and the `with_*` setters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    /// Credit floor
    pub min_credits: u32,
    /// Credit ceiling (never exceeded)
    pub max_credits: u32,
    /// Days that disqualify a section outright
    pub avoid_days: BTreeSet<Weekday>,
    /// Days that raise a section's score; empty means no preference
    pub preferred_days: BTreeSet<Weekday>,
    /// Sections must start at or after this time
    pub earliest_start: Option<ClockTime>,
    /// Sections must end at or before this time
    #[serde(default)]
    pub latest_end: Option<ClockTime>,
    /// Course codes the student asked for explicitly
    pub must_include: BTreeSet<String>,
    /// Whether to try to schedule the capstone course
    pub include_capstone: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            min_credits: DEFAULT_MIN_CREDITS,
            max_credits: DEFAULT_MAX_CREDITS,
            avoid_days: BTreeSet::new(),
            preferred_days: BTreeSet::new(),
            earliest_start: None,
            latest_end: None,
            must_include: BTreeSet::new(),
            include_capstone: false,
        }
    }
}

impl Preferences {
    /// Create preferences with the given credit bounds and nothing else set
    ///
    /// # Errors
    /// Returns [`PlannerError::InvalidPreferences`] when `min_credits > max_credits`
    pub fn new(min_credits: u32, max_credits: u32) -> PlannerResult<Self> {
        if min_credits > max_credits {
            return Err(PlannerError::InvalidPreferences(format!(
                "min_credits ({min_credits}) exceeds max_credits ({max_credits})"
            )));
        }
        Ok(Self {
            min_credits,
            max_credits,
            ..Self::default()
        })
    }

    /// Add days to avoid
    #[must_use]
    pub fn with_avoid_days(mut self, days: impl IntoIterator<Item = Weekday>) -> Self {
        self.avoid_days.extend(days);
        self
    }

    /// Add preferred days
    #[must_use]
    pub fn with_preferred_days(mut self, days: impl IntoIterator<Item = Weekday>) -> Self {
        self.preferred_days.extend(days);
        self
    }

    /// Set the earliest allowed start
    #[must_use]
    pub const fn with_earliest_start(mut self, time: ClockTime) -> Self {
        self.earliest_start = Some(time);
        self
    }

    /// Set the latest allowed end
    #[must_use]
    pub const fn with_latest_end(mut self, time: ClockTime) -> Self {
        self.latest_end = Some(time);
        self
    }

    /// Request specific course codes (whitespace is stripped)
    #[must_use]
    pub fn with_must_include<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.must_include
            .extend(codes.into_iter().map(|c| normalize_code(c.as_ref())));
        self
    }

    /// Ask for the capstone course
    #[must_use]
    pub const fn with_capstone(mut self, include: bool) -> Self {
        self.include_capstone = include;
        self
    }

    /// Check the credit-bound invariant of a value built by hand or deserialized
    ///
    /// # Errors
    /// Returns [`PlannerError::InvalidPreferences`] when `min_credits > max_credits`
    pub fn validate(&self) -> PlannerResult<()> {
        if self.min_credits > self.max_credits {
            return Err(PlannerError::InvalidPreferences(format!(
                "min_credits ({}) exceeds max_credits ({})",
                self.min_credits, self.max_credits
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let prefs = Preferences::default();
        assert_eq!(prefs.min_credits, 12);
        assert_eq!(prefs.max_credits, 15);
        assert!(prefs.preferred_days.is_empty());
        assert!(prefs.earliest_start.is_none());
        assert!(!prefs.include_capstone);
    }

    #[test]
    fn test_new_rejects_inverted_bounds() {
        assert!(Preferences::new(15, 12).is_err());
        assert!(Preferences::new(12, 12).is_ok());
    }

    #[test]
    fn test_builder_setters() {
        let prefs = Preferences::new(9, 12)
            .unwrap()
            .with_avoid_days([Weekday::Fr])
            .with_preferred_days([Weekday::Tu, Weekday::Th])
            .with_must_include(["ACCT 1011"])
            .with_capstone(true);

        assert!(prefs.avoid_days.contains(&Weekday::Fr));
        assert_eq!(prefs.preferred_days.len(), 2);
        assert!(prefs.must_include.contains("ACCT1011"));
        assert!(prefs.include_capstone);
        assert!(prefs.validate().is_ok());
    }

    #[test]
    fn test_serializes_times_as_hhmm() {
        let prefs = Preferences::default().with_earliest_start(ClockTime::from_hm(10, 0).unwrap());
        let json = serde_json::to_string(&prefs).unwrap();
        assert!(json.contains("\"earliest_start\":\"10:00\""));
        assert!(json.contains("\"latest_end\":null"));

        let back: Preferences = serde_json::from_str(&json).unwrap();
        assert_eq!(back, prefs);
    }
}
