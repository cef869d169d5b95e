//! Course schedule builder
//!
//! Turns a plain-English request and a completed-course list into a
//! conflict-free, credit-bounded schedule for one term, and reports which
//! degree requirements remain open.

pub mod logger;

pub mod core;

pub use crate::core::advisor::{Advisor, PreferenceInput};
pub use crate::core::catalog::{Catalog, CatalogStore};
pub use crate::core::config;
pub use crate::core::error::{PlannerError, PlannerResult};
pub use crate::core::get_version;
pub use crate::core::preferences::{KeywordParser, PreferenceParser};
pub use crate::core::requirements::{RequirementRules, RequirementsEngine};
pub use crate::core::scheduler::{BuilderOptions, ScheduleBuilder};
