//! Degree requirement rule tables
//!
//! Two rule families: a fixed core course list with co-requisites, and tiered
//! distribution areas matched by exact course or by subject prefix plus level.
//! Both are immutable once built and shared behind an `Arc`.

use crate::core::error::{PlannerError, PlannerResult};
use crate::core::models::course::{course_level, course_prefix, normalize_code};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use std::fs;
use std::path::Path;

/// Compiled-in requirement tables (Business Core + Magis Core)
const DEFAULT_RULES: &str = include_str!("../../../assets/DefaultRequirements.toml");

/// Distribution tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Tier I
    Orientation,
    /// Tier II
    Exploration,
}

impl Tier {
    /// Tiers in processing order
    pub const ALL: [Self; 2] = [Self::Orientation, Self::Exploration];

    /// Lowercase tier name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Orientation => "orientation",
            Self::Exploration => "exploration",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Level constraint applied to prefix matches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelRule {
    /// Exactly the 1000 level
    #[serde(rename = "1000")]
    Exactly1000,
    /// 2000 level or above
    #[serde(rename = "2000+")]
    AtLeast2000,
}

impl LevelRule {
    /// Whether a computed course level satisfies the rule
    #[must_use]
    pub const fn accepts(self, level: u32) -> bool {
        match self {
            Self::Exactly1000 => level == 1000,
            Self::AtLeast2000 => level >= 2000,
        }
    }
}

/// The fixed core course list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreRule {
    /// Display name (e.g., "Business Core")
    #[serde(default)]
    pub name: String,
    /// Required course codes
    pub required: Vec<String>,
    /// Designated capstone code, scheduled on request
    #[serde(default)]
    pub capstone: Option<String>,
    /// Course code -> co-requisite codes that go with it
    #[serde(default)]
    pub corequisites: BTreeMap<String, Vec<String>>,
    /// Free-form notes per course
    #[serde(default)]
    pub notes: BTreeMap<String, String>,
}

impl CoreRule {
    /// Whether `code` is on the required list
    #[must_use]
    pub fn requires(&self, code: &str) -> bool {
        let key = normalize_code(code);
        self.required.iter().any(|r| *r == key)
    }

    /// Co-requisites registered for `code` (empty when none)
    #[must_use]
    pub fn corequisites_of(&self, code: &str) -> &[String] {
        self.corequisites
            .get(&normalize_code(code))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// One named distribution area
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaRule {
    /// Area name (e.g., "Natural Sciences")
    pub name: String,
    /// Number of matching completed courses required
    pub need: u32,
    /// Exact course codes that count
    #[serde(default)]
    pub courses: Vec<String>,
    /// Subject prefixes that count, subject to `level`
    #[serde(default)]
    pub prefixes: Vec<String>,
    /// Optional level constraint for prefix matches
    #[serde(default)]
    pub level: Option<LevelRule>,
}

impl AreaRule {
    /// Whether a course code counts toward this area
    ///
    /// Exact-code membership always counts; otherwise the subject prefix must be
    /// listed and the level constraint (if any) must hold.
    #[must_use]
    pub fn matches(&self, code: &str) -> bool {
        let code = normalize_code(code);
        if self.courses.iter().any(|c| *c == code) {
            return true;
        }
        let prefix = course_prefix(&code);
        if prefix.is_empty() || !self.prefixes.iter().any(|p| *p == prefix) {
            return false;
        }
        self.level
            .map_or(true, |level| level.accepts(course_level(&code)))
    }
}

/// All requirement tables, validated and normalized
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementRules {
    /// Core course list
    pub core: CoreRule,
    /// Tier I areas, in processing order
    #[serde(default)]
    pub orientation: Vec<AreaRule>,
    /// Tier II areas, in processing order
    #[serde(default)]
    pub exploration: Vec<AreaRule>,
}

impl RequirementRules {
    /// Load the compiled-in requirement tables
    ///
    /// # Panics
    /// Panics if the embedded rules are invalid. They are compiled into the
    /// binary and covered by tests, so this indicates a packaging error.
    #[must_use]
    pub fn builtin() -> Self {
        Self::from_toml(DEFAULT_RULES).expect("Failed to parse compiled-in requirement rules")
    }

    /// Parse, normalize and validate rules from a TOML string
    ///
    /// # Errors
    /// Returns an error if the TOML does not match the schema or fails validation
    pub fn from_toml(toml_str: &str) -> PlannerResult<Self> {
        let mut rules: Self = toml::from_str(toml_str)?;
        rules.normalize();
        rules.validate()?;
        Ok(rules)
    }

    /// Read rules from a TOML file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or the rules are invalid
    pub fn from_file(path: &Path) -> PlannerResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Areas of one tier, in processing order
    #[must_use]
    pub fn tier(&self, tier: Tier) -> &[AreaRule] {
        match tier {
            Tier::Orientation => &self.orientation,
            Tier::Exploration => &self.exploration,
        }
    }

    fn normalize(&mut self) {
        let strip = |codes: &mut Vec<String>| {
            for code in codes.iter_mut() {
                *code = normalize_code(code);
            }
        };

        strip(&mut self.core.required);
        self.core.capstone = self.core.capstone.as_deref().map(normalize_code);
        self.core.corequisites = std::mem::take(&mut self.core.corequisites)
            .into_iter()
            .map(|(code, mut coreqs)| {
                strip(&mut coreqs);
                (normalize_code(&code), coreqs)
            })
            .collect();

        for area in self.orientation.iter_mut().chain(self.exploration.iter_mut()) {
            strip(&mut area.courses);
            for prefix in &mut area.prefixes {
                *prefix = prefix.trim().to_ascii_uppercase();
            }
        }
    }

    fn validate(&self) -> PlannerResult<()> {
        let required: BTreeSet<&str> = self.core.required.iter().map(String::as_str).collect();
        if let Some(code) = self
            .core
            .corequisites
            .keys()
            .find(|code| !required.contains(code.as_str()))
        {
            return Err(PlannerError::InvalidRules(format!(
                "co-requisites listed for {code}, which is not a required core course"
            )));
        }

        for tier in Tier::ALL {
            let mut seen = HashSet::new();
            for area in self.tier(tier) {
                if area.name.trim().is_empty() {
                    return Err(PlannerError::InvalidRules(format!(
                        "{tier} area with an empty name"
                    )));
                }
                if !seen.insert(area.name.as_str()) {
                    return Err(PlannerError::InvalidRules(format!(
                        "duplicate {tier} area '{}'",
                        area.name
                    )));
                }
                if area.need == 0 {
                    return Err(PlannerError::InvalidRules(format!(
                        "{tier} area '{}' needs at least one course",
                        area.name
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_rules_load() {
        let rules = RequirementRules::builtin();

        assert_eq!(rules.core.required.len(), 12);
        assert_eq!(rules.core.capstone.as_deref(), Some("MGMT4300"));
        assert_eq!(rules.core.corequisites_of("DATA1101"), ["DATA1101L"]);
        assert!(rules.core.corequisites_of("ACCT1011").is_empty());
        assert_eq!(rules.orientation.len(), 7);
        assert_eq!(rules.exploration.len(), 5);
        assert_eq!(rules.orientation[0].name, "English");
    }

    #[test]
    fn test_area_exact_course_match() {
        let rules = RequirementRules::builtin();
        let calc = &rules.orientation[2];

        assert!(calc.matches("MATH1121"));
        assert!(calc.matches("MATH 1172"));
        assert!(!calc.matches("MATH2217"));
    }

    #[test]
    fn test_area_prefix_and_level_match() {
        let rules = RequirementRules::builtin();
        let history = &rules.orientation[1];
        let hpr = &rules.exploration[1];
        let language = &rules.orientation[4];

        assert!(history.matches("HIST1100"));
        assert!(!history.matches("HIST2210"));
        assert!(hpr.matches("HIST2210"));
        assert!(hpr.matches("RLST3305"));
        assert!(!hpr.matches("PHIL1101"));
        // no level constraint
        assert!(language.matches("SPAN2210"));
        assert!(language.matches("GRK1001"));
    }

    #[test]
    fn test_rules_normalize_codes() {
        let rules = RequirementRules::from_toml(
            r#"
[core]
required = ["ACCT 1011", "DATA 1101", "DATA1101L"]

[core.corequisites]
"DATA 1101" = ["DATA 1101L"]

[[orientation]]
name = "Art"
need = 1
prefixes = ["art"]
"#,
        )
        .expect("rules should parse");

        assert!(rules.core.requires("ACCT1011"));
        assert_eq!(rules.core.corequisites_of("DATA1101"), ["DATA1101L"]);
        assert!(rules.orientation[0].matches("ART1010"));
        assert!(rules.exploration.is_empty());
    }

    #[test]
    fn test_rules_validation_errors() {
        let orphan_coreq = r#"
[core]
required = ["ACCT1011"]
[core.corequisites]
DATA1101 = ["DATA1101L"]
"#;
        assert!(matches!(
            RequirementRules::from_toml(orphan_coreq),
            Err(PlannerError::InvalidRules(_))
        ));

        let zero_need = r#"
[core]
required = []
[[exploration]]
name = "Literature"
need = 0
"#;
        assert!(RequirementRules::from_toml(zero_need).is_err());

        let duplicate = r#"
[core]
required = []
[[orientation]]
name = "English"
need = 1
[[orientation]]
name = "English"
need = 1
"#;
        assert!(RequirementRules::from_toml(duplicate).is_err());
    }

    #[test]
    fn test_level_rule_serde_names() {
        let area: AreaRule =
            toml::from_str("name = \"x\"\nneed = 1\nlevel = \"2000+\"").expect("area parses");
        assert_eq!(area.level, Some(LevelRule::AtLeast2000));
    }
}
