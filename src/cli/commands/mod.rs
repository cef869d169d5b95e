//! CLI command handlers for `courseplanner`.
//!
//! Each command is implemented in its own submodule; this module holds the
//! setup they share.

pub mod config;
pub mod progress;
pub mod schedule;

use crate::args::CompletedArgs;
use course_planner::config::Config;
use course_planner::core::advisor::{dedup_codes, read_completed_codes};
use course_planner::core::preferences::KeywordParser;
use course_planner::{Advisor, Catalog, CatalogStore, PlannerError};
use std::path::Path;
use std::sync::Arc;

/// Exit code when the structured tables are missing
pub const EXIT_TABLES_UNAVAILABLE: i32 = 2;

/// Print an error and exit with the matching status code
pub fn fail(context: &str, err: &PlannerError) -> ! {
    eprintln!("✗ {context}: {err}");
    if err.is_tables_unavailable() {
        eprintln!("  Expected the structured course and section tables.");
        eprintln!("  Point `courses_csv`/`sections_csv` at them or pass --courses/--sections.");
        std::process::exit(EXIT_TABLES_UNAVAILABLE);
    }
    std::process::exit(1);
}

/// Completed codes from `-c` flags followed by the optional file, de-duplicated
pub fn completed_codes(args: &CompletedArgs) -> Vec<String> {
    let mut codes = args.codes.clone();
    if let Some(path) = &args.completed_file {
        match read_completed_codes(path) {
            Ok(from_file) => codes.extend(from_file),
            Err(e) => fail(
                &format!("Failed to read completed courses from {}", path.display()),
                &e,
            ),
        }
    }
    dedup_codes(codes)
}

/// Load rules and tables from the effective config and wire up an advisor
pub fn advisor(config: &Config) -> Advisor {
    let rules = match config.load_rules() {
        Ok(rules) => rules,
        Err(e) => fail("Failed to load requirement rules", &e),
    };
    let catalog = match Catalog::load(
        Path::new(&config.paths.courses_csv),
        Path::new(&config.paths.sections_csv),
    ) {
        Ok(catalog) => catalog,
        Err(e) => fail("Course tables unavailable", &e),
    };

    Advisor::new(
        Arc::new(rules),
        Arc::new(CatalogStore::with_catalog(catalog)),
        config.builder_options(),
    )
    .with_parser(KeywordParser::with_credit_defaults(
        config.planner.min_credits,
        config.planner.max_credits,
    ))
}
