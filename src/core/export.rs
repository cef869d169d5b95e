//! Schedule export as CSV or JSON

use crate::core::error::PlannerResult;
use crate::core::models::ScheduleResult;
use crate::info;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Column headers of the exported schedule
pub const SCHEDULE_HEADERS: [&str; 6] = ["Code", "Title", "Section", "Days", "Start", "End"];

/// Write one row per scheduled section
///
/// # Errors
/// Returns an error if writing fails
pub fn write_schedule_csv<W: Write>(result: &ScheduleResult, writer: W) -> PlannerResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(SCHEDULE_HEADERS)?;
    for s in &result.schedule {
        wtr.write_record([
            s.code.as_str(),
            s.title.as_str(),
            s.section_id.as_str(),
            s.days.as_str(),
            s.start_time.as_str(),
            s.end_time.as_str(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Export the schedule to a CSV file, creating parent directories
///
/// # Errors
/// Returns an error if the directory or file cannot be written
pub fn export_schedule_csv(result: &ScheduleResult, path: &Path) -> PlannerResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    write_schedule_csv(result, fs::File::create(path)?)?;
    info!(
        "Exported {} sections to {}",
        result.schedule.len(),
        path.display()
    );
    Ok(())
}

/// The full result as pretty-printed JSON
///
/// # Errors
/// Returns an error if serialization fails
pub fn schedule_to_json(result: &ScheduleResult) -> PlannerResult<String> {
    Ok(serde_json::to_string_pretty(result)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{Course, Preferences, Progress, ScheduledSection, Section};

    fn result() -> ScheduleResult {
        let course = Course::new("ACCT1011", "ACCT1011", "Financial Accounting, I", 3);
        let section = Section::new("ACCT1011-01", "ACCT1011", "TuTh", "11:00", "12:15");
        ScheduleResult {
            schedule: vec![ScheduledSection::new(&course, &section)],
            credits: 3,
            reasons: vec!["Included requested ACCT1011 (ACCT1011-01).".to_string()],
            preferences: Preferences::default(),
            progress: Progress::default(),
        }
    }

    #[test]
    fn test_csv_quotes_commas() {
        let mut buf = Vec::new();
        write_schedule_csv(&result(), &mut buf).expect("write should succeed");
        let text = String::from_utf8(buf).expect("utf8 output");

        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("Code,Title,Section,Days,Start,End"));
        assert_eq!(
            lines.next(),
            Some("ACCT1011,\"Financial Accounting, I\",ACCT1011-01,TuTh,11:00,12:15")
        );
    }

    #[test]
    fn test_json_has_result_fields() {
        let json = schedule_to_json(&result()).expect("serialize");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");

        assert_eq!(value["credits"], 3);
        assert_eq!(value["schedule"][0]["section_id"], "ACCT1011-01");
        assert!(value["progress"]["tier_unmet"]["orientation"].is_array());
        assert_eq!(value["preferences"]["min_credits"], 12);
    }
}
