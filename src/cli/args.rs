//! CLI argument definitions for `courseplanner`

use clap::{builder::BoolishValueParser, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use course_planner::config::ConfigOverrides;
use course_planner::logger::Level;

/// Request used when `schedule` is given no text
pub const DEFAULT_REQUEST: &str = "15 credits, prefer Tu/Th, avoid Friday, no classes before 10am";

/// CLI log level argument
///
/// Converts to lowercase strings for config storage and to `logger::Level`
/// for runtime use.
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogLevelArg {
    /// Error-level logging
    Error,
    /// Warning-level logging
    Warn,
    /// Info-level logging
    Info,
    /// Debug-level logging
    Debug,
}

impl From<LogLevelArg> for Level {
    fn from(arg: LogLevelArg) -> Self {
        match arg {
            LogLevelArg::Error => Self::Error,
            LogLevelArg::Warn => Self::Warn,
            LogLevelArg::Info => Self::Info,
            LogLevelArg::Debug => Self::Debug,
        }
    }
}

impl std::fmt::Display for LogLevelArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let as_str = match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
        };
        write!(f, "{as_str}")
    }
}

#[derive(Debug, Subcommand)]
pub enum ConfigSubcommand {
    /// Display configuration values.
    ///
    /// If a KEY is provided, displays only that configuration value.
    /// If no KEY is provided, displays all configuration values.
    Get {
        /// Optional configuration key to display (e.g., `level`, `courses_csv`, `max_credits`)
        #[arg(value_name = "KEY")]
        key: Option<String>,
    },
    /// Set a configuration value.
    Set {
        /// Configuration key to set
        #[arg(value_name = "KEY")]
        key: String,
        /// Value to set
        #[arg(value_name = "VALUE")]
        value: String,
    },
    /// Unset a configuration value.
    Unset {
        /// Configuration key to unset
        #[arg(value_name = "KEY")]
        key: String,
    },
    /// Reset configuration to defaults (requires confirmation).
    Reset,
}

/// Where the term tables and requirement rules come from
#[derive(Debug, Clone, Default, Args)]
pub struct CatalogArgs {
    /// Course table CSV (overrides config `courses_csv`)
    #[arg(long, value_name = "FILE")]
    pub courses: Option<PathBuf>,

    /// Section table CSV (overrides config `sections_csv`)
    #[arg(long, value_name = "FILE")]
    pub sections: Option<PathBuf>,

    /// Requirement rules TOML (overrides config `rules_file`)
    #[arg(long, value_name = "FILE")]
    pub rules: Option<PathBuf>,
}

/// Courses the student has already completed
#[derive(Debug, Clone, Default, Args)]
pub struct CompletedArgs {
    /// Completed course code (repeatable, spaces allowed: -c "ACCT 1011")
    #[arg(short = 'c', long = "completed", value_name = "CODE")]
    pub codes: Vec<String>,

    /// File of completed codes: CSV with a `code` column, or JSON
    #[arg(long, value_name = "FILE")]
    pub completed_file: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage configuration.
    ///
    /// If no subcommand is provided, displays all configuration values.
    Config {
        #[command(subcommand)]
        subcommand: Option<ConfigSubcommand>,
    },
    /// Build a schedule from a plain-English request.
    ///
    /// Example: courseplanner schedule "12-15 credits, only Tu/Th, include capstone"
    Schedule {
        /// Request text (defaults to a sample request)
        #[arg(value_name = "REQUEST", num_args = 0..)]
        request: Vec<String>,

        #[command(flatten)]
        completed: CompletedArgs,

        #[command(flatten)]
        catalog: CatalogArgs,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,

        /// Export the schedule as CSV; without a value writes `schedule.csv` in config `out_dir`
        #[arg(
            short,
            long,
            value_name = "FILE",
            num_args = 0..=1,
            default_missing_value = ""
        )]
        output: Option<String>,
    },
    /// Show degree progress for a completed-course list.
    Progress {
        #[command(flatten)]
        completed: CompletedArgs,

        #[command(flatten)]
        catalog: CatalogArgs,

        /// Print the progress snapshot as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Command {
    fn catalog(&self) -> Option<&CatalogArgs> {
        match self {
            Self::Schedule { catalog, .. } | Self::Progress { catalog, .. } => Some(catalog),
            Self::Config { .. } => None,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "courseplanner",
    about = "Course schedule builder command-line interface",
    version = env!("CARGO_PKG_VERSION")
)]
pub struct Cli {
    /// Set the runtime log level (error|warn|info|debug). Falls back to config if omitted.
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevelArg>,

    /// Enable verbose output (runtime only)
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Enable debug-level logging and runtime debug flag (shorthand)
    #[arg(long = "debug")]
    pub debug_flag: bool,

    /// Write runtime logs to a file
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    // --- Config overrides ---
    /// Override config logging level
    #[arg(long = "config-level", value_enum)]
    pub config_level: Option<LogLevelArg>,

    /// Override config log file path
    #[arg(long = "config-log-file", value_name = "PATH")]
    pub config_log_file: Option<PathBuf>,

    /// Override config verbose flag (true/false)
    #[arg(long = "config-verbose", value_parser = BoolishValueParser::new())]
    pub config_verbose: Option<bool>,

    /// Subcommand to execute.
    /// A subcommand is required to run the CLI.
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Convert CLI flags into config overrides
    ///
    /// Catalog paths given on `schedule`/`progress` override the configured
    /// `[paths]` for this run only. `None` means no override.
    pub fn to_config_overrides(&self) -> ConfigOverrides {
        let path = |p: &Option<PathBuf>| p.as_ref().map(|p| p.to_string_lossy().to_string());
        let catalog = self.command.catalog().cloned().unwrap_or_default();

        ConfigOverrides {
            level: self.config_level.map(|lvl| lvl.to_string().to_lowercase()),
            file: path(&self.config_log_file),
            verbose: self.config_verbose,
            courses_csv: path(&catalog.courses),
            sections_csv: path(&catalog.sections),
            rules_file: path(&catalog.rules),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(command: Command) -> Cli {
        Cli {
            log_level: None,
            verbose: false,
            debug_flag: false,
            log_file: None,
            config_level: None,
            config_log_file: None,
            config_verbose: None,
            command,
        }
    }

    #[test]
    fn test_log_level_display() {
        assert_eq!(LogLevelArg::Error.to_string(), "error");
        assert_eq!(LogLevelArg::Warn.to_string(), "warn");
        assert_eq!(LogLevelArg::Info.to_string(), "info");
        assert_eq!(LogLevelArg::Debug.to_string(), "debug");
    }

    #[test]
    fn test_log_level_to_logger_level() {
        assert_eq!(Level::from(LogLevelArg::Error), Level::Error);
        assert_eq!(Level::from(LogLevelArg::Warn), Level::Warn);
        assert_eq!(Level::from(LogLevelArg::Info), Level::Info);
        assert_eq!(Level::from(LogLevelArg::Debug), Level::Debug);
    }

    #[test]
    fn test_to_config_overrides_empty() {
        let overrides = cli(Command::Config { subcommand: None }).to_config_overrides();
        assert!(overrides.level.is_none());
        assert!(overrides.file.is_none());
        assert!(overrides.verbose.is_none());
        assert!(overrides.courses_csv.is_none());
        assert!(overrides.sections_csv.is_none());
        assert!(overrides.rules_file.is_none());
    }

    #[test]
    fn test_catalog_paths_become_overrides() {
        let mut args = cli(Command::Progress {
            completed: CompletedArgs::default(),
            catalog: CatalogArgs {
                courses: Some(PathBuf::from("/data/courses.csv")),
                sections: None,
                rules: Some(PathBuf::from("rules.toml")),
            },
            json: false,
        });
        args.config_level = Some(LogLevelArg::Debug);
        args.config_verbose = Some(true);

        let overrides = args.to_config_overrides();
        assert_eq!(overrides.level, Some("debug".to_string()));
        assert_eq!(overrides.verbose, Some(true));
        assert_eq!(overrides.courses_csv, Some("/data/courses.csv".to_string()));
        assert!(overrides.sections_csv.is_none());
        assert_eq!(overrides.rules_file, Some("rules.toml".to_string()));
    }

    #[test]
    fn test_parse_schedule_command() {
        let args = Cli::try_parse_from([
            "courseplanner",
            "schedule",
            "12-15",
            "credits,",
            "avoid",
            "Friday",
            "-c",
            "ACCT 1011",
            "-c",
            "MKTG1101",
            "--json",
            "-o",
        ])
        .expect("arguments should parse");

        match args.command {
            Command::Schedule {
                request,
                completed,
                json,
                output,
                ..
            } => {
                assert_eq!(request.join(" "), "12-15 credits, avoid Friday");
                assert_eq!(completed.codes, ["ACCT 1011", "MKTG1101"]);
                assert!(json);
                assert_eq!(output.as_deref(), Some(""));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
