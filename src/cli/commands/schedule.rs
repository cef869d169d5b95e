//! `schedule` command: build and print a schedule for one request

use super::{advisor, completed_codes, fail};
use crate::args::{CompletedArgs, DEFAULT_REQUEST};
use course_planner::config::Config;
use course_planner::core::export::{export_schedule_csv, schedule_to_json};
use course_planner::core::models::{Progress, ScheduleResult};
use course_planner::PreferenceInput;
use std::path::PathBuf;

/// Options of one `schedule` invocation
#[derive(Debug)]
pub struct ScheduleOptions<'a> {
    /// Request words, joined with spaces
    pub request: &'a [String],
    /// Completed-course sources
    pub completed: &'a CompletedArgs,
    /// Print JSON instead of the text report
    pub json: bool,
    /// CSV export target; empty means `<out_dir>/schedule.csv`
    pub output: Option<&'a str>,
}

/// Run the schedule command
pub fn run(opts: &ScheduleOptions<'_>, config: &Config) {
    let text = if opts.request.is_empty() {
        DEFAULT_REQUEST.to_string()
    } else {
        opts.request.join(" ")
    };
    let completed = completed_codes(opts.completed);
    let advisor = advisor(config);

    let result = match advisor.recommend(PreferenceInput::Text(text.clone()), &completed) {
        Ok(result) => result,
        Err(e) => fail("Failed to build schedule", &e),
    };

    if opts.json {
        match schedule_to_json(&result) {
            Ok(json) => println!("{json}"),
            Err(e) => fail("Failed to encode result", &e),
        }
    } else {
        print_report(&text, &completed, &result);
    }

    if let Some(output) = opts.output {
        let path = export_path(output, config);
        match export_schedule_csv(&result, &path) {
            Ok(()) => eprintln!("✓ Schedule written to {}", path.display()),
            Err(e) => fail(&format!("Failed to write {}", path.display()), &e),
        }
    }
}

fn export_path(output: &str, config: &Config) -> PathBuf {
    if output.is_empty() {
        PathBuf::from(&config.paths.out_dir).join("schedule.csv")
    } else {
        PathBuf::from(output)
    }
}

fn print_report(text: &str, completed: &[String], result: &ScheduleResult) {
    println!("Request: {text}");
    if !completed.is_empty() {
        println!("Completed: {}", completed.join(", "));
    }

    println!("\nProposed schedule:");
    if result.schedule.is_empty() {
        println!("  (no feasible schedule found given constraints)");
    }
    for line in result.display_lines() {
        println!("  {line}");
    }
    println!("Total credits: {}", result.credits);

    println!("\nWhy chosen:");
    for reason in &result.reasons {
        println!(" - {reason}");
    }

    println!("\nProgress snapshot:");
    print_progress(&result.progress);
}

/// Indented progress lines shared with the `progress` command
pub fn print_progress(progress: &Progress) {
    println!("  Core missing: {:?}", progress.core_missing);
    println!("  Orientation unmet: {:?}", progress.tier_unmet.orientation);
    println!("  Exploration unmet: {:?}", progress.tier_unmet.exploration);
}
