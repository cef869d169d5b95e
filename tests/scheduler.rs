//! Integration tests for schedule building against the sample term tables

use course_planner::core::conflict::{overlaps, time_to_minutes, ClockTime, Footprint, TimePolicy};
use course_planner::core::models::{Course, Preferences, ScheduleResult, Section, Weekday};
use course_planner::{
    Advisor, BuilderOptions, Catalog, CatalogStore, KeywordParser, PreferenceInput,
    PreferenceParser, RequirementRules, RequirementsEngine, ScheduleBuilder,
};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

const REFERENCE_REQUEST: &str = "15 credits, prefer Tu/Th, avoid Friday, no classes before 10am";

fn sample_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("samples")
        .join("catalog")
        .join(name)
}

fn sample_catalog() -> Catalog {
    Catalog::load(&sample_path("courses.csv"), &sample_path("sections.csv"))
        .expect("Failed to load sample catalog")
}

fn rules() -> Arc<RequirementRules> {
    Arc::new(RequirementRules::builtin())
}

fn build(catalog: &Catalog, prefs: Preferences, completed: &[&str]) -> ScheduleResult {
    let annotated = RequirementsEngine::new(rules()).annotate(&catalog.courses);
    ScheduleBuilder::new(rules(), BuilderOptions::default())
        .build(&annotated, &catalog.sections, prefs, completed)
        .expect("Failed to build schedule")
}

fn section<'a>(catalog: &'a Catalog, id: &str) -> &'a Section {
    catalog
        .sections
        .iter()
        .find(|s| s.section_id == id)
        .expect("scheduled section should exist in catalog")
}

/// Properties every result must satisfy
fn assert_schedule_invariants(catalog: &Catalog, result: &ScheduleResult) {
    let ids: HashSet<&str> = result.schedule.iter().map(|s| s.course_id.as_str()).collect();
    assert_eq!(ids.len(), result.schedule.len(), "a course appears twice");

    let units: u32 = result.schedule.iter().map(|s| s.units).sum();
    assert_eq!(units, result.credits, "credit total does not match units");
    assert!(
        result.credits <= result.preferences.max_credits,
        "credit ceiling exceeded"
    );

    let footprints: Vec<Footprint> = result
        .schedule
        .iter()
        .map(|s| Footprint::of(section(catalog, &s.section_id), TimePolicy::Lenient))
        .collect();
    for (i, a) in footprints.iter().enumerate() {
        for b in &footprints[i + 1..] {
            assert!(!overlaps(a, b), "two scheduled sections overlap");
        }
    }
}

#[test]
fn test_reference_request_respects_hard_constraints() {
    let catalog = sample_catalog();
    let prefs = KeywordParser::new().parse(REFERENCE_REQUEST);
    let result = build(&catalog, prefs, &[]);

    assert_schedule_invariants(&catalog, &result);
    assert!(!result.schedule.is_empty());
    for scheduled in &result.schedule {
        assert!(!scheduled.days.contains("Fr"), "{scheduled:?} meets Friday");
        let start = time_to_minutes(&scheduled.start_time, TimePolicy::Lenient)
            .expect("start time must be known under an earliest-start bound");
        assert!(start >= 600, "{} starts before 10:00", scheduled.section_id);
    }
    // the Tu/Th accounting section wins over the early Mo/We one
    assert!(result.schedule.iter().any(|s| s.section_id == "ACCT1011-02"));
    assert!(result
        .reasons
        .iter()
        .any(|r| r.starts_with("Added co-requisite: DATA1101L (DATA1101L-02)")));
}

#[test]
fn test_minimum_reachable_with_sample_tables() {
    let catalog = sample_catalog();
    let prefs = KeywordParser::new().parse("12-15 credits");
    let result = build(&catalog, prefs, &[]);

    assert_schedule_invariants(&catalog, &result);
    assert!(result.meets_minimum(), "reasons: {:#?}", result.reasons);
    assert_eq!(result.credits, 15);
    // the lab would break the ceiling once DATA1101 fills it
    assert!(result
        .reasons
        .iter()
        .any(|r| r.starts_with("Skipped co-requisite DATA1101L")));
}

#[test]
fn test_accepting_core_course_adds_corequisite() {
    let catalog = sample_catalog();
    let completed = [
        "ACCT1011", "ACCT1012", "AETH2291", "BUSN1101", "BUSN3211", "FNCE2101", "INTL2101",
        "MGMT2101", "MGMT4300", "MKTG1101",
    ];
    let result = build(&catalog, Preferences::default(), &completed);

    assert_eq!(result.progress.core_missing, ["DATA1101", "DATA1101L"]);
    let first_two: Vec<&str> = result
        .schedule
        .iter()
        .take(2)
        .map(|s| s.code.as_str())
        .collect();
    assert_eq!(first_two, ["DATA1101", "DATA1101L"]);
    assert_schedule_invariants(&catalog, &result);
}

#[test]
fn test_empty_section_table_yields_empty_result() {
    let catalog = Catalog::new(sample_catalog().courses, Vec::new());
    let result = build(&catalog, Preferences::default(), &[]);

    assert!(result.schedule.is_empty());
    assert_eq!(result.credits, 0);
    assert!(!result.reasons.is_empty());
    assert_eq!(result.progress.core_missing.len(), 12);
}

#[test]
fn test_unknown_times_are_never_paired_on_a_shared_day() {
    let courses = vec![
        Course::new("MUSC1101", "MUSC1101", "Music Appreciation", 3),
        Course::new("ART1010", "ART1010", "Drawing I", 3),
        Course::new("ECON1011", "ECON1011", "Microeconomics", 3),
    ];
    let sections = vec![
        Section::new("MUSC1101-01", "MUSC1101", "Tu", "TBA", "TBA"),
        Section::new("ART1010-01", "ART1010", "TuTh", "18:00", "19:15"),
        Section::new("ECON1011-01", "ECON1011", "MoWe", "18:00", "19:15"),
    ];
    let catalog = Catalog::new(courses, sections);
    let prefs = Preferences::new(9, 9).expect("valid bounds");
    let result = build(&catalog, prefs, &[]);

    let chosen: HashSet<&str> = result
        .schedule
        .iter()
        .map(|s| s.section_id.as_str())
        .collect();
    assert!(!(chosen.contains("MUSC1101-01") && chosen.contains("ART1010-01")));
    // a different day never conflicts
    assert!(chosen.contains("ECON1011-01"));
    assert_eq!(result.credits, 6);
}

#[test]
fn test_time_policy_is_fixed_at_construction() {
    let courses = vec![Course::new("ENGL1001", "ENGL1001", "Texts", 3)];
    let sections = vec![Section::new("ENGL1001-01", "ENGL1001", "Mo", "11:00 am", "12:15 pm")];
    let annotated = RequirementsEngine::new(rules()).annotate(&courses);
    let prefs = Preferences::default()
        .with_earliest_start(ClockTime::from_hm(10, 0).expect("valid time"))
        .with_must_include(["ENGL1001"]);

    let lenient = ScheduleBuilder::new(rules(), BuilderOptions::default())
        .build::<&str>(&annotated, &sections, prefs.clone(), &[])
        .expect("Failed to build schedule");
    assert_eq!(lenient.schedule.len(), 1);

    let strict = ScheduleBuilder::new(
        rules(),
        BuilderOptions {
            time_policy: TimePolicy::Strict,
            respect_capacity: false,
        },
    )
    .build::<&str>(&annotated, &sections, prefs, &[])
    .expect("Failed to build schedule");
    assert!(strict.schedule.is_empty());
    assert!(strict
        .reasons
        .contains(&"No section fits for requested ENGL1001.".to_string()));
}

#[test]
fn test_only_days_restrict_ranking_not_eligibility() {
    let catalog = sample_catalog();
    let prefs = KeywordParser::new().parse("only Tuesdays and Thursdays, 6 credits, include ACCT 1011");
    assert_eq!(
        prefs.preferred_days,
        [Weekday::Tu, Weekday::Th].into_iter().collect()
    );
    let result = build(&catalog, prefs, &[]);

    assert_eq!(result.schedule[0].section_id, "ACCT1011-02");
    assert_schedule_invariants(&catalog, &result);
}

#[test]
fn test_advisor_serves_concurrent_requests_across_snapshot_swap() {
    let store = Arc::new(CatalogStore::with_catalog(sample_catalog()));
    let advisor = Advisor::new(rules(), Arc::clone(&store), BuilderOptions::default());

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                scope.spawn(|| {
                    advisor
                        .recommend::<&str>(PreferenceInput::from(REFERENCE_REQUEST), &[])
                        .expect("Failed to build schedule")
                })
            })
            .collect();
        store.install(sample_catalog());
        for handle in handles {
            let result = handle.join().expect("worker panicked");
            assert!(result.credits <= 15);
        }
    });

    let first = advisor
        .recommend::<&str>(REFERENCE_REQUEST.into(), &[])
        .expect("Failed to build schedule");
    let second = advisor
        .recommend::<&str>(REFERENCE_REQUEST.into(), &[])
        .expect("Failed to build schedule");
    assert_eq!(first, second, "builds are deterministic");
}

#[test]
fn test_oversized_unit_count_is_skipped_without_overflow() {
    let courses = vec![
        Course::new("ECON1011", "ECON1011", "Microeconomics", 3),
        Course::new("ECON1012", "ECON1012", "Macroeconomics", u32::MAX),
    ];
    let sections = vec![
        Section::new("ECON1011-01", "ECON1011", "Mo", "09:00", "10:15"),
        Section::new("ECON1012-01", "ECON1012", "Tu", "09:00", "10:15"),
    ];
    let catalog = Catalog::new(courses, sections);
    let prefs = Preferences::new(12, 15)
        .expect("valid bounds")
        .with_must_include(["ECON1011", "ECON1012"]);
    let result = build(&catalog, prefs, &[]);

    assert_eq!(result.credits, 3);
    assert_eq!(result.schedule.len(), 1);
    assert!(result
        .reasons
        .contains(&"Skipped requested ECON1012: 4294967295 more credits would exceed 15.".to_string()));
    assert_schedule_invariants(&catalog, &result);
}

#[test]
fn test_unnormalized_requested_code_is_matched() {
    let catalog = sample_catalog();
    let mut prefs = Preferences::default();
    prefs.must_include.insert("ACCT 1011".to_string());
    let result = build(&catalog, prefs, &[]);

    assert!(
        result
            .reasons
            .iter()
            .any(|r| r.starts_with("Included requested ACCT1011 (")),
        "reasons: {:#?}",
        result.reasons
    );
    assert!(result.schedule.iter().any(|s| s.code == "ACCT1011"));
    assert_schedule_invariants(&catalog, &result);
}
