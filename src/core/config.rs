//! Configuration module for the course planner CLI

use crate::core::conflict::TimePolicy;
use crate::core::error::PlannerResult;
use crate::core::requirements::RequirementRules;
use crate::core::scheduler::BuilderOptions;
use crate::warn;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Default CLI configuration loaded based on build profile.
/// Uses release defaults in release mode, debug defaults in debug mode.
#[cfg(not(debug_assertions))]
const CONFIG_DEFAULTS: &str = include_str!("../../assets/DefaultCLIConfigRelease.toml");

#[cfg(debug_assertions)]
const CONFIG_DEFAULTS: &str = include_str!("../../assets/DefaultCLIConfigDebug.toml");

#[cfg(not(debug_assertions))]
const CONFIG_FILE_NAME: &str = "config.toml";

#[cfg(debug_assertions)]
const CONFIG_FILE_NAME: &str = "dconfig.toml";

const DIR_VARIABLE: &str = "$COURSE_PLANNER";

/// Logging configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug)
    #[serde(default)]
    pub level: String,
    /// Log file path
    #[serde(default)]
    pub file: String,
    /// Enable verbose output
    #[serde(default)]
    pub verbose: bool,
}

/// Input and output locations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Structured course table
    #[serde(default)]
    pub courses_csv: String,
    /// Structured section table
    #[serde(default)]
    pub sections_csv: String,
    /// Requirement rules TOML; empty selects the built-in rules
    #[serde(default)]
    pub rules_file: String,
    /// Directory for exported schedules
    #[serde(default)]
    pub out_dir: String,
}

const fn default_min_credits() -> u32 {
    crate::core::models::preferences::DEFAULT_MIN_CREDITS
}

const fn default_max_credits() -> u32 {
    crate::core::models::preferences::DEFAULT_MAX_CREDITS
}

/// Scheduling defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Credit floor when the request does not name one
    #[serde(default = "default_min_credits")]
    pub min_credits: u32,
    /// Credit ceiling when the request does not name one
    #[serde(default = "default_max_credits")]
    pub max_credits: u32,
    /// Section time parsing: "lenient" or "strict"
    #[serde(default)]
    pub time_policy: String,
    /// Skip sections with no free seats
    #[serde(default)]
    pub respect_capacity: bool,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            min_credits: default_min_credits(),
            max_credits: default_max_credits(),
            time_policy: String::new(),
            respect_capacity: false,
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Logging settings
    pub logging: LoggingConfig,
    /// Path settings
    #[serde(default)]
    pub paths: PathsConfig,
    /// Scheduling settings
    #[serde(default)]
    pub planner: PlannerConfig,
}

/// Optional CLI overrides for configuration values
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Override logging level
    pub level: Option<String>,
    /// Override log file path
    pub file: Option<String>,
    /// Override verbose flag
    pub verbose: Option<bool>,
    /// Override course table path
    pub courses_csv: Option<String>,
    /// Override section table path
    pub sections_csv: Option<String>,
    /// Override rules file path
    pub rules_file: Option<String>,
}

impl Config {
    /// Get the `$COURSE_PLANNER` directory path
    ///
    /// Returns:
    /// - Linux: `~/.config/courseplanner`
    /// - macOS: `~/Library/Application Support/courseplanner`
    /// - Windows: `%APPDATA%\courseplanner`
    #[must_use]
    pub fn get_planner_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("courseplanner")
    }

    /// Merge missing fields from defaults into this config
    ///
    /// Only string fields that are empty here and non-empty in `defaults` are
    /// filled, so upgrades pick up new settings without touching user values.
    ///
    /// # Returns
    ///
    /// `true` if any fields were added/changed, `false` otherwise
    pub fn merge_defaults(&mut self, defaults: &Self) -> bool {
        let mut changed = false;
        let mut fill = |field: &mut String, default: &String| {
            if field.is_empty() && !default.is_empty() {
                field.clone_from(default);
                changed = true;
            }
        };

        fill(&mut self.logging.level, &defaults.logging.level);
        fill(&mut self.logging.file, &defaults.logging.file);
        fill(&mut self.paths.courses_csv, &defaults.paths.courses_csv);
        fill(&mut self.paths.sections_csv, &defaults.paths.sections_csv);
        fill(&mut self.paths.rules_file, &defaults.paths.rules_file);
        fill(&mut self.paths.out_dir, &defaults.paths.out_dir);
        fill(&mut self.planner.time_policy, &defaults.planner.time_policy);

        changed
    }

    /// Apply CLI-provided overrides onto the loaded configuration
    ///
    /// Overrides affect this run only; the config file is not modified.
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(level) = &overrides.level {
            self.logging.level.clone_from(level);
        }
        if let Some(file) = &overrides.file {
            self.logging.file.clone_from(file);
        }
        if let Some(verbose) = overrides.verbose {
            self.logging.verbose = verbose;
        }
        if let Some(courses) = &overrides.courses_csv {
            self.paths.courses_csv.clone_from(courses);
        }
        if let Some(sections) = &overrides.sections_csv {
            self.paths.sections_csv.clone_from(sections);
        }
        if let Some(rules) = &overrides.rules_file {
            self.paths.rules_file.clone_from(rules);
        }
    }

    /// Get the user config file path
    ///
    /// `config.toml` for release builds, `dconfig.toml` for debug builds, inside
    /// [`get_planner_dir`](Self::get_planner_dir).
    #[must_use]
    pub fn get_config_file_path() -> PathBuf {
        Self::get_planner_dir().join(CONFIG_FILE_NAME)
    }

    /// Expand `$COURSE_PLANNER` to the planner config directory
    #[must_use]
    fn expand_variables(value: &str) -> String {
        if value.contains(DIR_VARIABLE) {
            let dir = Self::get_planner_dir();
            value.replace(DIR_VARIABLE, dir.to_str().unwrap_or("."))
        } else {
            value.to_string()
        }
    }

    /// Initialize config from a TOML string
    ///
    /// `$COURSE_PLANNER` is expanded in every path-like value. Missing fields
    /// take their serde defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML cannot be parsed or doesn't match the expected schema
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        let mut config: Self = toml::from_str(toml_str)?;

        for value in [
            &mut config.logging.file,
            &mut config.paths.courses_csv,
            &mut config.paths.sections_csv,
            &mut config.paths.rules_file,
            &mut config.paths.out_dir,
        ] {
            *value = Self::expand_variables(value);
        }

        Ok(config)
    }

    /// Load configuration from embedded defaults
    ///
    /// # Panics
    /// Panics if the embedded default configuration is invalid TOML. The
    /// defaults are compiled into the binary, so this indicates a packaging error.
    #[must_use]
    pub fn from_defaults() -> Self {
        Self::from_toml(CONFIG_DEFAULTS).expect("Failed to parse compiled-in default configuration")
    }

    /// Load configuration from file, or create from defaults if not found
    ///
    /// An existing file is merged with defaults and re-saved when new fields
    /// were added. On first run the defaults are written out. Any read or
    /// parse failure falls back to the defaults.
    #[must_use]
    pub fn load() -> Self {
        let config_file = Self::get_config_file_path();
        let defaults = Self::from_defaults();

        if config_file.exists() {
            if let Ok(content) = fs::read_to_string(&config_file) {
                if let Ok(mut config) = Self::from_toml(&content) {
                    if config.merge_defaults(&defaults) {
                        let _ = config.save();
                    }
                    return config;
                }
            }
            warn!(
                "Could not read {}, using default configuration",
                config_file.display()
            );
        } else {
            if let Some(parent) = config_file.parent() {
                let _ = fs::create_dir_all(parent);
            }
            let _ = defaults.save();
            return defaults;
        }

        defaults
    }

    /// Save configuration to the platform config file
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created or the file written
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.save_to(&Self::get_config_file_path())
    }

    /// Save configuration to an explicit path
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created or the file written
    pub fn save_to(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let toml_str = toml::to_string_pretty(self)?;
        fs::write(path, toml_str)?;
        Ok(())
    }

    /// Get a configuration value by key
    ///
    /// Keys: `level`, `file`, `verbose`, `courses_csv`, `sections_csv`,
    /// `rules_file`, `out_dir`, `min_credits`, `max_credits`, `time_policy`,
    /// `respect_capacity`. Dashes may be used in place of underscores.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        let value = match key.replace('-', "_").as_str() {
            "level" => self.logging.level.clone(),
            "file" => self.logging.file.clone(),
            "verbose" => self.logging.verbose.to_string(),
            "courses_csv" => self.paths.courses_csv.clone(),
            "sections_csv" => self.paths.sections_csv.clone(),
            "rules_file" => self.paths.rules_file.clone(),
            "out_dir" => self.paths.out_dir.clone(),
            "min_credits" => self.planner.min_credits.to_string(),
            "max_credits" => self.planner.max_credits.to_string(),
            "time_policy" => self.planner.time_policy.clone(),
            "respect_capacity" => self.planner.respect_capacity.to_string(),
            _ => return None,
        };
        Some(value)
    }

    /// Set a configuration value by key
    ///
    /// Updates the in-memory config. Call [`save()`](Config::save) to persist.
    ///
    /// # Errors
    /// Returns an error if the key is not recognized or the value does not
    /// parse for that key
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        let parse_bool = |name: &str| {
            value
                .parse::<bool>()
                .map_err(|_| format!("Invalid boolean value for '{name}': '{value}'"))
        };
        let parse_credits = |name: &str| {
            value
                .parse::<u32>()
                .map_err(|_| format!("Invalid credit count for '{name}': '{value}'"))
        };

        match key.replace('-', "_").as_str() {
            "level" => self.logging.level = value.to_string(),
            "file" => self.logging.file = value.to_string(),
            "verbose" => self.logging.verbose = parse_bool("verbose")?,
            "courses_csv" => self.paths.courses_csv = value.to_string(),
            "sections_csv" => self.paths.sections_csv = value.to_string(),
            "rules_file" => self.paths.rules_file = value.to_string(),
            "out_dir" => self.paths.out_dir = value.to_string(),
            "min_credits" => self.planner.min_credits = parse_credits("min_credits")?,
            "max_credits" => self.planner.max_credits = parse_credits("max_credits")?,
            "time_policy" => {
                let policy: TimePolicy = value.parse()?;
                self.planner.time_policy = policy.to_string();
            }
            "respect_capacity" => self.planner.respect_capacity = parse_bool("respect_capacity")?,
            _ => return Err(format!("Unknown config key: '{key}'")),
        }
        Ok(())
    }

    /// Unset a configuration value by key (reset to its default)
    ///
    /// # Errors
    /// Returns an error if the key is not recognized.
    pub fn unset(&mut self, key: &str, defaults: &Self) -> Result<(), String> {
        match key.replace('-', "_").as_str() {
            "level" => self.logging.level.clone_from(&defaults.logging.level),
            "file" => self.logging.file.clone_from(&defaults.logging.file),
            "verbose" => self.logging.verbose = defaults.logging.verbose,
            "courses_csv" => self.paths.courses_csv.clone_from(&defaults.paths.courses_csv),
            "sections_csv" => self.paths.sections_csv.clone_from(&defaults.paths.sections_csv),
            "rules_file" => self.paths.rules_file.clone_from(&defaults.paths.rules_file),
            "out_dir" => self.paths.out_dir.clone_from(&defaults.paths.out_dir),
            "min_credits" => self.planner.min_credits = defaults.planner.min_credits,
            "max_credits" => self.planner.max_credits = defaults.planner.max_credits,
            "time_policy" => self
                .planner
                .time_policy
                .clone_from(&defaults.planner.time_policy),
            "respect_capacity" => self.planner.respect_capacity = defaults.planner.respect_capacity,
            _ => return Err(format!("Unknown config key: '{key}'")),
        }
        Ok(())
    }

    /// Reset all configuration to defaults by deleting the config file
    ///
    /// Succeeds without doing anything when no file exists.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be deleted
    pub fn reset() -> Result<(), std::io::Error> {
        let config_file = Self::get_config_file_path();
        if config_file.exists() {
            fs::remove_file(config_file)?;
        }
        Ok(())
    }

    /// Configured time policy; unknown values fall back to lenient
    #[must_use]
    pub fn time_policy(&self) -> TimePolicy {
        if self.planner.time_policy.is_empty() {
            return TimePolicy::default();
        }
        self.planner.time_policy.parse().unwrap_or_else(|err| {
            warn!("{err}; using lenient time parsing");
            TimePolicy::default()
        })
    }

    /// Builder options derived from the `[planner]` section
    #[must_use]
    pub fn builder_options(&self) -> BuilderOptions {
        BuilderOptions {
            time_policy: self.time_policy(),
            respect_capacity: self.planner.respect_capacity,
        }
    }

    /// Requirement rules: the configured file, or the built-in tables
    ///
    /// # Errors
    /// Returns an error if the configured rules file cannot be read or is invalid
    pub fn load_rules(&self) -> PlannerResult<RequirementRules> {
        if self.paths.rules_file.is_empty() {
            Ok(RequirementRules::builtin())
        } else {
            RequirementRules::from_file(Path::new(&self.paths.rules_file))
        }
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[logging]")?;
        writeln!(f, "  level = \"{}\"", self.logging.level)?;
        writeln!(f, "  file = \"{}\"", self.logging.file)?;
        writeln!(f, "  verbose = {}", self.logging.verbose)?;

        writeln!(f, "\n[paths]")?;
        writeln!(f, "  courses_csv = \"{}\"", self.paths.courses_csv)?;
        writeln!(f, "  sections_csv = \"{}\"", self.paths.sections_csv)?;
        writeln!(f, "  rules_file = \"{}\"", self.paths.rules_file)?;
        writeln!(f, "  out_dir = \"{}\"", self.paths.out_dir)?;

        writeln!(f, "\n[planner]")?;
        writeln!(f, "  min_credits = {}", self.planner.min_credits)?;
        writeln!(f, "  max_credits = {}", self.planner.max_credits)?;
        writeln!(f, "  time_policy = \"{}\"", self.planner.time_policy)?;
        writeln!(f, "  respect_capacity = {}", self.planner.respect_capacity)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_planner_section_defaults() {
        let config = Config::from_toml("[logging]\nlevel = \"warn\"\n").expect("valid TOML");

        assert_eq!(config.planner.min_credits, 12);
        assert_eq!(config.planner.max_credits, 15);
        assert_eq!(config.time_policy(), TimePolicy::Lenient);
        assert!(!config.builder_options().respect_capacity);
    }

    #[test]
    fn test_set_time_policy_validates() {
        let mut config = Config::from_defaults();

        config.set("time-policy", "STRICT").expect("strict is valid");
        assert_eq!(config.planner.time_policy, "strict");
        assert_eq!(config.builder_options().time_policy, TimePolicy::Strict);
        assert!(config.set("time_policy", "sometimes").is_err());
    }

    #[test]
    fn test_unknown_time_policy_falls_back() {
        let config = Config::from_toml("[logging]\n[planner]\ntime_policy = \"fuzzy\"\n")
            .expect("valid TOML");
        assert_eq!(config.time_policy(), TimePolicy::Lenient);
    }

    #[test]
    fn test_builtin_rules_when_unset() {
        let mut config = Config::from_defaults();
        config.paths.rules_file.clear();
        let rules = config.load_rules().expect("built-in rules load");
        assert_eq!(rules.core.required.len(), 12);
    }
}
