//! Schedule result and degree-progress snapshot

use super::{Course, Preferences, Section};
use serde::{Deserialize, Serialize};

/// A chosen section together with the course it belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledSection {
    /// Course identifier
    pub course_id: String,
    /// Human course code
    pub code: String,
    /// Course title
    pub title: String,
    /// Credit units counted toward the total
    pub units: u32,
    /// Section identifier
    pub section_id: String,
    /// Day tokens as given by the section table
    pub days: String,
    /// Start time as given by the section table
    pub start_time: String,
    /// End time as given by the section table
    pub end_time: String,
    /// Instructor name
    pub instructor: String,
}

impl ScheduledSection {
    /// Combine a course and one of its sections
    #[must_use]
    pub fn new(course: &Course, section: &Section) -> Self {
        Self {
            course_id: course.course_id.clone(),
            code: course.code.clone(),
            title: course.title.clone(),
            units: course.units,
            section_id: section.section_id.clone(),
            days: section.days.clone(),
            start_time: section.start_time.clone(),
            end_time: section.end_time.clone(),
            instructor: section.instructor.clone(),
        }
    }

    /// Display line: `<code> - <title> | <section id> | <days> <start>-<end>`
    #[must_use]
    pub fn display_line(&self) -> String {
        format!(
            "{} - {} | {} | {} {}-{}",
            self.code, self.title, self.section_id, self.days, self.start_time, self.end_time
        )
    }
}

/// Unmet distribution areas per tier, in rule order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierUnmet {
    /// Unmet orientation-tier areas
    pub orientation: Vec<String>,
    /// Unmet exploration-tier areas
    pub exploration: Vec<String>,
}

/// Which requirements are still open for a completed-course list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    /// Required core courses not yet completed, sorted
    pub core_missing: Vec<String>,
    /// Distribution areas whose count is below the need
    pub tier_unmet: TierUnmet,
}

impl Progress {
    /// Whether every core course and area is satisfied
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.core_missing.is_empty()
            && self.tier_unmet.orientation.is_empty()
            && self.tier_unmet.exploration.is_empty()
    }
}

/// Output of one build call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleResult {
    /// Chosen sections in acceptance order, one per course
    pub schedule: Vec<ScheduledSection>,
    /// Sum of the chosen courses' credit units
    pub credits: u32,
    /// Why each course was chosen or skipped, in decision order
    pub reasons: Vec<String>,
    /// Preferences the schedule was built against
    pub preferences: Preferences,
    /// Requirement progress for the completed-course input
    pub progress: Progress,
}

impl ScheduleResult {
    /// Schedule as formatted display lines
    #[must_use]
    pub fn display_lines(&self) -> Vec<String> {
        self.schedule
            .iter()
            .map(ScheduledSection::display_line)
            .collect()
    }

    /// Whether the credit floor was reached
    #[must_use]
    pub const fn meets_minimum(&self) -> bool {
        self.credits >= self.preferences.min_credits
    }
}
