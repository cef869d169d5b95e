//! Degree requirement tracking
//!
//! [`rules`] holds the immutable rule tables, [`engine`] tags courses and
//! computes progress against them.

pub mod engine;
pub mod rules;

pub use engine::{AnnotatedCourse, AreaTag, RequirementsEngine};
pub use rules::{AreaRule, CoreRule, LevelRule, RequirementRules, Tier};
