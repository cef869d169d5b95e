//! Section and weekday models

use serde::{Deserialize, Serialize};
use std::fmt;

/// Two-letter weekday code used by the section table
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Weekday {
    /// Monday
    Mo,
    /// Tuesday
    Tu,
    /// Wednesday
    We,
    /// Thursday
    Th,
    /// Friday
    Fr,
    /// Saturday
    Sa,
    /// Sunday
    Su,
}

impl Weekday {
    /// All days, Monday first
    pub const ALL: [Self; 7] = [
        Self::Mo,
        Self::Tu,
        Self::We,
        Self::Th,
        Self::Fr,
        Self::Sa,
        Self::Su,
    ];

    /// Parse an exact two-character token ("Tu"); anything else is `None`
    #[must_use]
    pub fn from_code(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|day| day.code() == token)
    }

    /// The two-character code
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Mo => "Mo",
            Self::Tu => "Tu",
            Self::We => "We",
            Self::Th => "Th",
            Self::Fr => "Fr",
            Self::Sa => "Sa",
            Self::Su => "Su",
        }
    }

    /// Lowercase full English name ("tuesday")
    #[must_use]
    pub const fn full_name(self) -> &'static str {
        match self {
            Self::Mo => "monday",
            Self::Tu => "tuesday",
            Self::We => "wednesday",
            Self::Th => "thursday",
            Self::Fr => "friday",
            Self::Sa => "saturday",
            Self::Su => "sunday",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One meeting instance of a course
///
/// Day and time fields are kept exactly as the table provides them; they are
/// interpreted by [`crate::core::conflict`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Unique section identifier (e.g., "ACCT1011-01")
    pub section_id: String,
    /// Owning course identifier
    pub course_id: String,
    /// Concatenated two-letter day tokens (e.g., "TuTh")
    pub days: String,
    /// Start time, "HH:MM" 24-hour, or a blank/unparseable sentinel
    pub start_time: String,
    /// End time, same format as `start_time`
    pub end_time: String,
    /// Seat capacity (0 means not limited)
    pub capacity: u32,
    /// Seats already taken
    pub seats_taken: u32,
    /// Instructor name
    pub instructor: String,
    /// Delivery modality (e.g., "in-person")
    pub modality: String,
}

impl Section {
    /// Create a section with the meeting pattern filled and the rest defaulted
    #[must_use]
    pub fn new(
        section_id: impl Into<String>,
        course_id: impl Into<String>,
        days: impl Into<String>,
        start_time: impl Into<String>,
        end_time: impl Into<String>,
    ) -> Self {
        Self {
            section_id: section_id.into(),
            course_id: course_id.into(),
            days: days.into(),
            start_time: start_time.into(),
            end_time: end_time.into(),
            capacity: 0,
            seats_taken: 0,
            instructor: String::new(),
            modality: "in-person".to_string(),
        }
    }

    /// Whether every seat is taken. A zero capacity is treated as unlimited.
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.capacity > 0 && self.seats_taken >= self.capacity
    }
}
