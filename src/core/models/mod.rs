//! Data models for course planning

pub mod course;
pub mod preferences;
pub mod schedule;
pub mod section;

pub use course::Course;
pub use preferences::Preferences;
pub use schedule::{Progress, ScheduleResult, ScheduledSection, TierUnmet};
pub use section::{Section, Weekday};
