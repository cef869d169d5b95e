//! `progress` command: degree progress without building a schedule

use super::{advisor, completed_codes, fail, schedule::print_progress};
use crate::args::CompletedArgs;
use course_planner::config::Config;

/// Run the progress command
pub fn run(completed: &CompletedArgs, json: bool, config: &Config) {
    let completed = completed_codes(completed);
    let progress = match advisor(config).progress(&completed) {
        Ok(progress) => progress,
        Err(e) => fail("Failed to compute progress", &e),
    };

    if json {
        match serde_json::to_string_pretty(&progress) {
            Ok(text) => println!("{text}"),
            Err(e) => fail("Failed to encode progress", &e.into()),
        }
        return;
    }

    println!("Completed: {} course(s)", completed.len());
    print_progress(&progress);
    if progress.is_complete() {
        println!("✓ All tracked requirements are met");
    }
}
