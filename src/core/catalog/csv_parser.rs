//! CSV readers for the structured course and section tables

use crate::core::error::{PlannerError, PlannerResult};
use crate::core::models::{Course, Section};
use crate::warn;
use csv::{ReaderBuilder, StringRecord};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Header name -> column index, keys lowercased and trimmed
struct Columns {
    table: &'static str,
    index: HashMap<String, usize>,
}

impl Columns {
    fn from_headers(table: &'static str, headers: &StringRecord) -> Self {
        let index = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.trim().trim_start_matches('\u{feff}').to_lowercase(), i))
            .collect();
        Self { table, index }
    }

    fn require(&self, column: &'static str) -> PlannerResult<usize> {
        self.index
            .get(column)
            .copied()
            .ok_or(PlannerError::MissingColumn {
                table: self.table,
                column,
            })
    }

    /// Trimmed cell value, empty when the column or cell is absent
    fn get<'r>(&self, record: &'r StringRecord, column: &str) -> &'r str {
        self.index
            .get(column)
            .and_then(|&i| record.get(i))
            .map_or("", str::trim)
    }
}

/// Parse a non-negative integer cell. Accepts "3" and "3.0"; anything else is 0.
fn parse_count(value: &str, what: &str, row: &str) -> u32 {
    if value.is_empty() {
        return 0;
    }
    if let Ok(n) = value.parse::<u32>() {
        return n;
    }
    match value.parse::<f64>() {
        Ok(f) if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= f64::from(u32::MAX) => {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let n = f as u32;
            n
        }
        _ => {
            warn!("Unparsable {what} '{value}' for {row}, using 0");
            0
        }
    }
}

fn open_table(path: &Path, table: &'static str) -> PlannerResult<File> {
    if !path.is_file() {
        return Err(PlannerError::TablesUnavailable {
            table,
            path: path.to_path_buf(),
        });
    }
    Ok(File::open(path)?)
}

/// Read the course table from any reader
///
/// Required headers: `course_id`. Optional: `code` (defaults to the id),
/// `title`, `units`. Extra columns are ignored.
///
/// # Errors
/// Returns an error on malformed CSV structure or a missing `course_id` header
pub fn parse_courses<R: Read>(reader: R) -> PlannerResult<Vec<Course>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    let columns = Columns::from_headers("courses", reader.headers()?);
    columns.require("course_id")?;

    let mut courses = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record?;
        let course_id = columns.get(&record, "course_id");
        if course_id.is_empty() {
            if record.iter().any(|v| !v.trim().is_empty()) {
                warn!("Course row {} has no course_id, skipping", line + 2);
            }
            continue;
        }
        let code = match columns.get(&record, "code") {
            "" => course_id,
            code => code,
        };
        let units = parse_count(columns.get(&record, "units"), "units", course_id);
        courses.push(Course::new(
            course_id,
            code,
            columns.get(&record, "title"),
            units,
        ));
    }
    Ok(courses)
}

/// Read the section table from any reader
///
/// Required headers: `section_id`, `course_id`. Missing optional columns take
/// the [`Section::new`] defaults.
///
/// # Errors
/// Returns an error on malformed CSV structure or a missing required header
pub fn parse_sections<R: Read>(reader: R) -> PlannerResult<Vec<Section>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    let columns = Columns::from_headers("sections", reader.headers()?);
    columns.require("section_id")?;
    columns.require("course_id")?;

    let mut sections = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record?;
        let section_id = columns.get(&record, "section_id");
        let course_id = columns.get(&record, "course_id");
        if section_id.is_empty() || course_id.is_empty() {
            if record.iter().any(|v| !v.trim().is_empty()) {
                warn!("Section row {} lacks section_id or course_id, skipping", line + 2);
            }
            continue;
        }

        let mut section = Section::new(
            section_id,
            course_id,
            columns.get(&record, "days"),
            columns.get(&record, "start_time"),
            columns.get(&record, "end_time"),
        );
        section.capacity = parse_count(columns.get(&record, "capacity"), "capacity", section_id);
        section.seats_taken =
            parse_count(columns.get(&record, "seats_taken"), "seats_taken", section_id);
        section.instructor = columns.get(&record, "instructor").to_string();
        let modality = columns.get(&record, "modality");
        if !modality.is_empty() {
            section.modality = modality.to_string();
        }
        sections.push(section);
    }
    Ok(sections)
}

/// Load the course table from a file
///
/// # Errors
/// Returns [`PlannerError::TablesUnavailable`] if the file does not exist,
/// otherwise any parse error from [`parse_courses`]
pub fn load_courses(path: &Path) -> PlannerResult<Vec<Course>> {
    parse_courses(open_table(path, "courses")?)
}

/// Load the section table from a file
///
/// # Errors
/// Returns [`PlannerError::TablesUnavailable`] if the file does not exist,
/// otherwise any parse error from [`parse_sections`]
pub fn load_sections(path: &Path) -> PlannerResult<Vec<Section>> {
    parse_sections(open_table(path, "sections")?)
}
