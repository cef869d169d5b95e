//! Course model

use serde::{Deserialize, Serialize};

/// A course offered this term, as read from the course table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    /// Unique course identifier from the course table
    pub course_id: String,

    /// Human course code (e.g., "ACCT1011", "DATA1101L")
    pub code: String,

    /// Course title (e.g., "Introduction to Financial Accounting")
    pub title: String,

    /// Credit units
    pub units: u32,
}

impl Course {
    /// Create a new course
    ///
    /// # Arguments
    /// * `course_id` - Unique identifier
    /// * `code` - Human course code, any internal whitespace is kept as given
    /// * `title` - Course title
    /// * `units` - Credit units
    #[must_use]
    pub fn new(
        course_id: impl Into<String>,
        code: impl Into<String>,
        title: impl Into<String>,
        units: u32,
    ) -> Self {
        Self {
            course_id: course_id.into(),
            code: code.into(),
            title: title.into(),
            units,
        }
    }

    /// Get the course key used for every comparison (code without whitespace)
    ///
    /// # Returns
    /// A string like "ACCT1011" for a code written "ACCT 1011"
    #[must_use]
    pub fn key(&self) -> String {
        normalize_code(&self.code)
    }
}

/// Normalize a course code by removing all internal whitespace
///
/// Handles "ACCT 1011", " ACCT1011 ", "ACCT\t1011"
#[must_use]
pub fn normalize_code(code: &str) -> String {
    code.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Leading subject prefix of a code: 3 or 4 uppercase letters, else empty
///
/// A longer letter run is truncated to its first four letters.
#[must_use]
pub fn course_prefix(code: &str) -> String {
    let normalized = normalize_code(code);
    let letters = normalized
        .chars()
        .take_while(char::is_ascii_uppercase)
        .take(4)
        .count();
    if letters >= 3 {
        normalized[..letters].to_string()
    } else {
        String::new()
    }
}

/// Course level: the first digit group of the code rounded down to the thousand
///
/// "HIST2210" -> 2000, "ENGL1001" -> 1000, "ABC" -> 0
#[must_use]
pub fn course_level(code: &str) -> u32 {
    let digits: String = code
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse::<u32>().map_or(0, |n| (n / 1000) * 1000)
}
