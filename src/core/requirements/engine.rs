//! Requirement annotation and progress computation

use super::rules::{RequirementRules, Tier};
use crate::core::models::course::normalize_code;
use crate::core::models::{Course, Progress, TierUnmet};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// A distribution-area tag attached to a course
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AreaTag {
    /// Tier the area belongs to
    pub tier: Tier,
    /// Area name
    pub area: String,
}

/// Read-only view of a course with its requirement tags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedCourse<'a> {
    /// The underlying course row
    pub course: &'a Course,
    /// Normalized course code
    pub key: String,
    /// Distribution areas the course counts toward
    pub areas: Vec<AreaTag>,
    /// Whether the course is on the core list
    pub is_core: bool,
}

impl AnnotatedCourse<'_> {
    /// Whether the course carries the given (tier, area) tag
    #[must_use]
    pub fn has_area(&self, tier: Tier, area: &str) -> bool {
        self.areas.iter().any(|t| t.tier == tier && t.area == area)
    }
}

/// Tags courses against the requirement tables and reports what remains
#[derive(Debug, Clone)]
pub struct RequirementsEngine {
    rules: Arc<RequirementRules>,
}

impl RequirementsEngine {
    /// Create an engine over shared rule tables
    #[must_use]
    pub const fn new(rules: Arc<RequirementRules>) -> Self {
        Self { rules }
    }

    /// The rule tables in use
    #[must_use]
    pub fn rules(&self) -> &RequirementRules {
        &self.rules
    }

    /// Distribution tags for one course code, tiers in order, areas in rule order
    #[must_use]
    pub fn area_tags(&self, code: &str) -> Vec<AreaTag> {
        Tier::ALL
            .into_iter()
            .flat_map(|tier| {
                self.rules
                    .tier(tier)
                    .iter()
                    .filter(|area| area.matches(code))
                    .map(move |area| AreaTag {
                        tier,
                        area: area.name.clone(),
                    })
            })
            .collect()
    }

    /// Tag every course; the input slice is not modified
    #[must_use]
    pub fn annotate<'a>(&self, courses: &'a [Course]) -> Vec<AnnotatedCourse<'a>> {
        courses
            .iter()
            .map(|course| {
                let key = course.key();
                AnnotatedCourse {
                    areas: self.area_tags(&key),
                    is_core: self.rules.core.requires(&key),
                    key,
                    course,
                }
            })
            .collect()
    }

    /// Compute which core courses and distribution areas remain unmet
    ///
    /// Each distinct completed code counts once. Tags come from the annotated
    /// catalog when the course is offered, otherwise from the rules directly,
    /// so courses completed in earlier terms still count.
    #[must_use]
    pub fn progress<S: AsRef<str>>(
        &self,
        completed_codes: &[S],
        annotated: &[AnnotatedCourse<'_>],
    ) -> Progress {
        let completed: BTreeSet<String> = completed_codes
            .iter()
            .map(|c| normalize_code(c.as_ref()))
            .filter(|c| !c.is_empty())
            .collect();

        let core_missing: Vec<String> = self
            .rules
            .core
            .required
            .iter()
            .filter(|code| !completed.contains(*code))
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let catalog_tags: HashMap<&str, &[AreaTag]> = annotated
            .iter()
            .map(|a| (a.key.as_str(), a.areas.as_slice()))
            .collect();

        let mut have: HashMap<(Tier, &str), u32> = HashMap::new();
        for code in &completed {
            let computed;
            let tags = if let Some(tags) = catalog_tags.get(code.as_str()) {
                *tags
            } else {
                computed = self.area_tags(code);
                computed.as_slice()
            };
            for tag in tags {
                if let Some(area) = self
                    .rules
                    .tier(tag.tier)
                    .iter()
                    .find(|area| area.name == tag.area)
                {
                    *have.entry((tag.tier, area.name.as_str())).or_insert(0) += 1;
                }
            }
        }

        let unmet = |tier: Tier| -> Vec<String> {
            self.rules
                .tier(tier)
                .iter()
                .filter(|area| have.get(&(tier, area.name.as_str())).copied().unwrap_or(0) < area.need)
                .map(|area| area.name.clone())
                .collect()
        };

        Progress {
            core_missing,
            tier_unmet: TierUnmet {
                orientation: unmet(Tier::Orientation),
                exploration: unmet(Tier::Exploration),
            },
        }
    }
}
