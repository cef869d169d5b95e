//! Integration tests for configuration management

use course_planner::config::{Config, ConfigOverrides};
use course_planner::core::conflict::TimePolicy;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_config_from_defaults() {
    let config = Config::from_defaults();

    assert!(
        !config.logging.level.is_empty(),
        "Default log level should not be empty"
    );
    assert!(
        !config.paths.courses_csv.is_empty(),
        "Default courses_csv should not be empty"
    );
    assert!(
        !config.paths.sections_csv.is_empty(),
        "Default sections_csv should not be empty"
    );
    assert!(config.planner.min_credits <= config.planner.max_credits);
    assert!(
        config.paths.rules_file.is_empty(),
        "Built-in rules are the default"
    );
}

#[test]
fn test_config_from_toml_basic() {
    let toml_str = r#"
[logging]
level = "info"
file = "/tmp/planner.log"
verbose = true

[paths]
courses_csv = "./data/courses.csv"
sections_csv = "./data/sections.csv"
rules_file = "./rules.toml"
out_dir = "./out"

[planner]
min_credits = 9
max_credits = 18
time_policy = "strict"
respect_capacity = true
"#;

    let config = Config::from_toml(toml_str).expect("Failed to parse TOML");

    assert_eq!(config.logging.level, "info");
    assert_eq!(config.logging.file, "/tmp/planner.log");
    assert!(config.logging.verbose);
    assert_eq!(config.paths.courses_csv, "./data/courses.csv");
    assert_eq!(config.paths.rules_file, "./rules.toml");
    assert_eq!(config.planner.min_credits, 9);
    assert_eq!(config.planner.max_credits, 18);

    let options = config.builder_options();
    assert_eq!(options.time_policy, TimePolicy::Strict);
    assert!(options.respect_capacity);
}

#[test]
fn test_config_from_toml_partial() {
    let toml_str = r#"
[logging]
level = "error"

[paths]
"#;

    let config = Config::from_toml(toml_str).expect("Failed to parse partial TOML");

    assert_eq!(config.logging.level, "error");
    assert_eq!(config.logging.file, "");
    assert!(!config.logging.verbose);
    assert_eq!(config.paths.out_dir, "");
    assert_eq!(config.planner.min_credits, 12);
    assert_eq!(config.planner.max_credits, 15);
}

#[test]
fn test_config_variable_expansion() {
    let toml_str = r#"
[logging]
file = "$COURSE_PLANNER/test.log"

[paths]
courses_csv = "$COURSE_PLANNER/data/courses.csv"
"#;

    let config = Config::from_toml(toml_str).expect("Failed to parse TOML with variables");

    assert!(config.logging.file.contains("courseplanner"));
    assert!(!config.logging.file.contains("$COURSE_PLANNER"));
    assert!(config.paths.courses_csv.ends_with("courses.csv"));
    assert!(!config.paths.courses_csv.contains("$COURSE_PLANNER"));
}

#[test]
fn test_config_get_set() {
    let mut config = Config::from_defaults();

    assert!(config.get("level").is_some());

    config.set("level", "debug").expect("Failed to set level");
    assert_eq!(config.get("level").as_deref(), Some("debug"));

    config
        .set("max-credits", "18")
        .expect("Failed to set max_credits");
    assert_eq!(config.planner.max_credits, 18);
    assert_eq!(config.get("max_credits").as_deref(), Some("18"));

    config
        .set("respect_capacity", "true")
        .expect("Failed to set respect_capacity");
    assert!(config.planner.respect_capacity);

    assert!(config.set("min_credits", "a dozen").is_err());
    assert!(config.set("verbose", "maybe").is_err());
    assert!(config.get("unknown_key").is_none());
    assert!(config.set("unknown_key", "value").is_err());
}

#[test]
fn test_config_unset() {
    let mut config = Config::from_defaults();
    let defaults = Config::from_defaults();

    config
        .set("courses_csv", "/elsewhere.csv")
        .expect("Failed to set courses_csv");
    config.set("min_credits", "3").expect("Failed to set min");

    config
        .unset("courses_csv", &defaults)
        .expect("Failed to unset courses_csv");
    config
        .unset("min_credits", &defaults)
        .expect("Failed to unset min");

    assert_eq!(config.paths.courses_csv, defaults.paths.courses_csv);
    assert_eq!(config.planner.min_credits, defaults.planner.min_credits);
    assert!(config.unset("nope", &defaults).is_err());
}

#[test]
fn test_config_save_to_and_reload() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_file = temp_dir.path().join("nested").join("config.toml");

    let mut config = Config::from_defaults();
    config.set("time_policy", "strict").expect("Failed to set policy");
    config.save_to(&config_file).expect("Failed to save config");

    let content = fs::read_to_string(&config_file).expect("Failed to read config");
    let loaded = Config::from_toml(&content).expect("Failed to parse saved config");

    assert_eq!(loaded.planner.time_policy, "strict");
    assert_eq!(loaded.planner.max_credits, config.planner.max_credits);
}

#[test]
fn test_config_overrides_apply() {
    let mut config = Config::from_defaults();

    let overrides = ConfigOverrides {
        level: Some("error".to_string()),
        file: Some("/custom/path.log".to_string()),
        verbose: Some(true),
        courses_csv: Some("/tables/courses.csv".to_string()),
        sections_csv: Some("/tables/sections.csv".to_string()),
        rules_file: Some("/rules/business.toml".to_string()),
    };

    config.apply_overrides(&overrides);

    assert_eq!(config.logging.level, "error");
    assert_eq!(config.logging.file, "/custom/path.log");
    assert!(config.logging.verbose);
    assert_eq!(config.paths.courses_csv, "/tables/courses.csv");
    assert_eq!(config.paths.sections_csv, "/tables/sections.csv");
    assert_eq!(config.paths.rules_file, "/rules/business.toml");
}

#[test]
fn test_config_overrides_partial() {
    let mut config = Config::from_defaults();
    let before = config.paths.sections_csv.clone();

    config.apply_overrides(&ConfigOverrides {
        level: Some("debug".to_string()),
        ..ConfigOverrides::default()
    });

    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.paths.sections_csv, before);
}

#[test]
fn test_config_display_format() {
    let display_str = Config::from_defaults().to_string();

    assert!(display_str.contains("[logging]"));
    assert!(display_str.contains("[paths]"));
    assert!(display_str.contains("[planner]"));
    assert!(display_str.contains("courses_csv"));
    assert!(display_str.contains("max_credits"));
}

#[test]
fn test_merge_defaults_adds_missing_fields() {
    let toml_str = r#"
[logging]
level = "error"

[paths]
courses_csv = ""
"#;

    let mut config = Config::from_toml(toml_str).expect("Failed to parse minimal config");
    let defaults = Config::from_defaults();

    assert!(
        config.merge_defaults(&defaults),
        "merge_defaults should return true when fields are added"
    );
    assert_eq!(config.paths.courses_csv, defaults.paths.courses_csv);
    assert_eq!(config.logging.level, "error");
}

#[test]
fn test_merge_defaults_preserves_existing() {
    let toml_str = r#"
[logging]
level = "error"
file = "/my/custom/path.log"

[paths]
courses_csv = "/my/courses.csv"
"#;

    let mut config = Config::from_toml(toml_str).expect("Failed to parse config");
    config.merge_defaults(&Config::from_defaults());

    assert_eq!(config.logging.file, "/my/custom/path.log");
    assert_eq!(config.paths.courses_csv, "/my/courses.csv");
}

#[test]
fn test_rules_file_is_loaded() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let rules_path = temp_dir.path().join("rules.toml");
    fs::write(
        &rules_path,
        r#"
[core]
name = "Minor"
required = ["ACCT1011"]

[[orientation]]
name = "Writing"
need = 1
courses = ["ENGL1001"]
"#,
    )
    .expect("Failed to write rules");

    let mut config = Config::from_defaults();
    config
        .set("rules_file", &rules_path.to_string_lossy())
        .expect("Failed to set rules_file");
    let rules = config.load_rules().expect("Failed to load rules file");

    assert_eq!(rules.core.name, "Minor");
    assert_eq!(rules.orientation.len(), 1);

    config
        .set("rules_file", &temp_dir.path().join("missing.toml").to_string_lossy())
        .expect("Failed to set rules_file");
    assert!(config.load_rules().is_err());
}

#[test]
fn test_get_config_file_path() {
    let path = Config::get_config_file_path();
    let path_str = path.to_string_lossy();

    assert!(path_str.ends_with("config.toml") || path_str.ends_with("dconfig.toml"));
    assert!(Config::get_planner_dir().ends_with("courseplanner"));
}
