//! Request-level facade over the catalog, rules, parser and builder

use crate::core::catalog::CatalogStore;
use crate::core::error::PlannerResult;
use crate::core::models::course::normalize_code;
use crate::core::models::{Preferences, Progress, ScheduleResult};
use crate::core::preferences::{KeywordParser, PreferenceParser};
use crate::core::requirements::{RequirementRules, RequirementsEngine};
use crate::core::scheduler::{BuilderOptions, ScheduleBuilder};
use crate::{debug, info};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// How a request states its preferences
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreferenceInput {
    /// Free text, run through the preference parser
    Text(String),
    /// Already-resolved preferences, used as given
    Structured(Preferences),
}

impl From<&str> for PreferenceInput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<Preferences> for PreferenceInput {
    fn from(prefs: Preferences) -> Self {
        Self::Structured(prefs)
    }
}

/// Answers schedule and progress requests against the current catalog
pub struct Advisor {
    engine: RequirementsEngine,
    builder: ScheduleBuilder,
    parser: Box<dyn PreferenceParser>,
    store: Arc<CatalogStore>,
}

impl Advisor {
    /// Create an advisor using the keyword parser with default credit bounds
    #[must_use]
    pub fn new(rules: Arc<RequirementRules>, store: Arc<CatalogStore>, options: BuilderOptions) -> Self {
        Self {
            engine: RequirementsEngine::new(Arc::clone(&rules)),
            builder: ScheduleBuilder::new(rules, options),
            parser: Box::new(KeywordParser::new()),
            store,
        }
    }

    /// Replace the preference parser
    #[must_use]
    pub fn with_parser(mut self, parser: impl PreferenceParser + 'static) -> Self {
        self.parser = Box::new(parser);
        self
    }

    /// The catalog store requests read from
    #[must_use]
    pub fn store(&self) -> &CatalogStore {
        &self.store
    }

    /// Resolve a request's preferences without building anything
    #[must_use]
    pub fn resolve(&self, input: PreferenceInput) -> Preferences {
        match input {
            PreferenceInput::Text(text) => self.parser.parse(&text),
            PreferenceInput::Structured(prefs) => prefs,
        }
    }

    /// Build a schedule for one request
    ///
    /// # Errors
    /// Fails when no catalog is loaded, when structured preferences are
    /// invalid, or on an internal scheduling error
    pub fn recommend<S: AsRef<str>>(
        &self,
        input: PreferenceInput,
        completed: &[S],
    ) -> PlannerResult<ScheduleResult> {
        let catalog = self.store.snapshot()?;
        let prefs = self.resolve(input);
        debug!("Resolved preferences: {prefs:?}");

        let annotated = self.engine.annotate(&catalog.courses);
        let result = self
            .builder
            .build(&annotated, &catalog.sections, prefs, completed)?;
        info!(
            "Recommended {} sections ({} credits)",
            result.schedule.len(),
            result.credits
        );
        Ok(result)
    }

    /// Degree progress for a completed-course list
    ///
    /// # Errors
    /// Fails when no catalog is loaded
    pub fn progress<S: AsRef<str>>(&self, completed: &[S]) -> PlannerResult<Progress> {
        let catalog = self.store.snapshot()?;
        let annotated = self.engine.annotate(&catalog.courses);
        Ok(self.engine.progress(completed, &annotated))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CompletedJson {
    List(Vec<String>),
    Wrapped { completed: Vec<String> },
}

/// Drop blanks and repeats (by normalized code), keeping first-seen order
#[must_use]
pub fn dedup_codes<I, S>(codes: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    codes
        .into_iter()
        .map(|c| normalize_code(c.as_ref()))
        .filter(|c| !c.is_empty() && seen.insert(c.clone()))
        .collect()
}

/// Read a completed-course list
///
/// `.json` files hold either a list of codes or `{ "completed": [...] }`.
/// Anything else is read as CSV, using the `code` column when present and
/// the first column otherwise.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed
pub fn read_completed_codes(path: &Path) -> PlannerResult<Vec<String>> {
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        let content = fs::read_to_string(path)?;
        let codes = match serde_json::from_str::<CompletedJson>(&content)? {
            CompletedJson::List(codes) | CompletedJson::Wrapped { completed: codes } => codes,
        };
        return Ok(dedup_codes(codes));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;
    let column = reader
        .headers()?
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case("code"))
        .unwrap_or(0);

    let mut codes = Vec::new();
    for record in reader.records() {
        if let Some(code) = record?.get(column) {
            codes.push(code.to_string());
        }
    }
    Ok(dedup_codes(codes))
}
