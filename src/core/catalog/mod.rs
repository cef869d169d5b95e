//! Term catalog: the course and section tables for one term
//!
//! A [`Catalog`] is immutable once built. [`CatalogStore`] hands out shared
//! snapshots and replaces them whole, so a build in flight keeps the tables it
//! started with.

pub mod csv_parser;

use crate::core::error::{PlannerError, PlannerResult};
use crate::core::models::{Course, Section};
use crate::info;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

pub use csv_parser::{load_courses, load_sections, parse_courses, parse_sections};

/// Course and section tables of one term
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    /// Course table rows
    pub courses: Vec<Course>,
    /// Section table rows
    pub sections: Vec<Section>,
}

impl Catalog {
    /// Create a catalog from already-parsed rows
    #[must_use]
    pub const fn new(courses: Vec<Course>, sections: Vec<Section>) -> Self {
        Self { courses, sections }
    }

    /// Load both tables from CSV files
    ///
    /// # Errors
    /// Returns [`PlannerError::TablesUnavailable`] naming the first missing
    /// table, or a parse error
    pub fn load(courses_csv: &Path, sections_csv: &Path) -> PlannerResult<Self> {
        let courses = load_courses(courses_csv)?;
        let sections = load_sections(sections_csv)?;
        info!(
            "Loaded {} courses from {} and {} sections from {}",
            courses.len(),
            courses_csv.display(),
            sections.len(),
            sections_csv.display()
        );
        Ok(Self::new(courses, sections))
    }
}

/// Holder of the current catalog snapshot
#[derive(Debug, Default)]
pub struct CatalogStore {
    current: RwLock<Option<Arc<Catalog>>>,
}

impl CatalogStore {
    /// An empty store; [`CatalogStore::snapshot`] fails until a catalog is installed
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store with `catalog` already installed
    #[must_use]
    pub fn with_catalog(catalog: Catalog) -> Self {
        Self {
            current: RwLock::new(Some(Arc::new(catalog))),
        }
    }

    /// Replace the whole snapshot, returning the previous one
    pub fn install(&self, catalog: Catalog) -> Option<Arc<Catalog>> {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        info!(
            "Installing catalog snapshot ({} courses, {} sections)",
            catalog.courses.len(),
            catalog.sections.len()
        );
        guard.replace(Arc::new(catalog))
    }

    /// The current snapshot
    ///
    /// # Errors
    /// Returns [`PlannerError::NoCatalog`] if nothing has been installed
    pub fn snapshot(&self) -> PlannerResult<Arc<Catalog>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(PlannerError::NoCatalog)
    }

    /// Whether a snapshot is installed
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_store_reports_tables_unavailable() {
        let store = CatalogStore::new();
        assert!(!store.is_loaded());
        let err = store.snapshot().expect_err("empty store has no snapshot");
        assert!(err.is_tables_unavailable());
    }

    #[test]
    fn test_install_swaps_whole_snapshot() {
        let store = CatalogStore::with_catalog(Catalog::new(
            vec![Course::new("A", "ENGL1001", "Texts", 3)],
            Vec::new(),
        ));
        let before = store.snapshot().expect("snapshot installed");

        let previous = store.install(Catalog::default());
        assert!(previous.is_some_and(|p| Arc::ptr_eq(&p, &before)));

        // the old snapshot is untouched for holders
        assert_eq!(before.courses.len(), 1);
        assert!(store.snapshot().expect("snapshot installed").courses.is_empty());
    }
}
