//! Tabular roster ingestion with row-level error recovery
//!
//! Roster data arrives as fixed-column tables (CSV files or a spreadsheet
//! export). A malformed row is rejected individually and reported as a
//! [`RowError`]; it never aborts the load. A missing column is structural
//! and does abort, since no row can be interpreted without it.

#![warn(missing_docs)]

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use skycoord_domain::{
    AvailabilityStatus, CapabilityTag, Drone, Mission, MissionStatus, MissionType, Pilot, Priority,
    SkillTag, TimeWindow,
};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;
use tracing::warn;

/// Structural ingestion errors (whole-table failures)
#[derive(Debug, Error)]
pub enum IngestError {
    /// Header lacks a required column
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// Table has no header line
    #[error("Empty table")]
    EmptyTable,

    /// IO error reading the table
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A single rejected row, reported but never fatal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("row {line}: {reason}")]
pub struct RowError {
    /// 1-based line number in the source table
    pub line: usize,
    /// Why the row was rejected
    pub reason: String,
}

/// Values the legacy sheets use for "no assignment"
const EMPTY_ASSIGNMENT_MARKERS: [&str; 3] = ["", "-", "\u{2013}"];

fn parse_assignment(value: &str) -> Option<String> {
    let cleaned = value.trim();
    if EMPTY_ASSIGNMENT_MARKERS.contains(&cleaned) {
        None
    } else {
        Some(cleaned.to_string())
    }
}

/// Split one CSV record, honoring double-quoted fields
fn split_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(field.trim().to_string());
                field.clear();
            }
            _ => field.push(c),
        }
    }
    fields.push(field.trim().to_string());
    fields
}

/// Header with resolved column positions
struct Header {
    columns: Vec<String>,
}

impl Header {
    fn parse(line: &str) -> Self {
        Self {
            columns: split_line(line)
                .into_iter()
                .map(|c| c.to_ascii_lowercase())
                .collect(),
        }
    }

    fn index(&self, name: &str) -> Result<usize, IngestError> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| IngestError::MissingColumn(name.to_string()))
    }
}

fn field<'a>(row: &'a [String], idx: usize) -> &'a str {
    row.get(idx).map(String::as_str).unwrap_or("")
}

/// Split a comma-delimited cell into trimmed, non-empty items
fn split_cell(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|s| !s.is_empty())
}

/// Split table content into records, honoring quoted fields that span
/// physical lines (the write-back path quotes embedded newlines). Each
/// record is tagged with the physical line it starts on.
fn table_records(content: &str) -> Vec<(usize, String)> {
    let mut records = Vec::new();
    let mut record = String::new();
    let mut in_quotes = false;
    let mut line = 1;
    let mut record_start = 1;

    for c in content.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                record.push(c);
            }
            '\n' if !in_quotes => {
                if !record.trim().is_empty() {
                    records.push((record_start, std::mem::take(&mut record)));
                } else {
                    record.clear();
                }
                line += 1;
                record_start = line;
            }
            '\r' if !in_quotes => {}
            '\n' => {
                record.push(c);
                line += 1;
            }
            _ => record.push(c),
        }
    }
    if !record.trim().is_empty() {
        records.push((record_start, record));
    }
    records
}

/// Parse a pilot table (columns: id, name, location, skills, status,
/// current_assignment), returning accepted pilots and per-row rejections
pub fn parse_pilots(content: &str) -> Result<(Vec<Pilot>, Vec<RowError>), IngestError> {
    let mut records = table_records(content).into_iter();
    let (_, header_line) = records.next().ok_or(IngestError::EmptyTable)?;
    let header = Header::parse(&header_line);

    let id_col = header.index("id")?;
    let name_col = header.index("name")?;
    let location_col = header.index("location")?;
    let skills_col = header.index("skills")?;
    let status_col = header.index("status")?;
    let assignment_col = header.index("current_assignment")?;

    let mut pilots = Vec::new();
    let mut errors = Vec::new();
    let mut seen_ids = HashSet::new();

    for (line, raw) in records {
        let row = split_line(&raw);
        let parsed = (|| -> Result<Pilot, String> {
            let id = field(&row, id_col).to_string();
            if id.is_empty() {
                return Err("missing id".to_string());
            }
            if !seen_ids.insert(id.clone()) {
                return Err(format!("duplicate id {}", id));
            }

            let skills = split_cell(field(&row, skills_col))
                .map(|s| s.parse::<SkillTag>())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| e.to_string())?;
            let status = field(&row, status_col)
                .parse::<AvailabilityStatus>()
                .map_err(|e| e.to_string())?;

            Ok(Pilot {
                id,
                name: field(&row, name_col).to_string(),
                location: field(&row, location_col).to_string(),
                skills,
                status,
                current_assignment: parse_assignment(field(&row, assignment_col)),
            })
        })();

        match parsed {
            Ok(pilot) => pilots.push(pilot),
            Err(reason) => {
                warn!(line, %reason, "rejected pilot row");
                errors.push(RowError { line, reason });
            }
        }
    }
    Ok((pilots, errors))
}

/// Parse a drone table (columns: id, model, capabilities, location, status,
/// current_assignment)
pub fn parse_drones(content: &str) -> Result<(Vec<Drone>, Vec<RowError>), IngestError> {
    let mut records = table_records(content).into_iter();
    let (_, header_line) = records.next().ok_or(IngestError::EmptyTable)?;
    let header = Header::parse(&header_line);

    let id_col = header.index("id")?;
    let model_col = header.index("model")?;
    let capabilities_col = header.index("capabilities")?;
    let location_col = header.index("location")?;
    let status_col = header.index("status")?;
    let assignment_col = header.index("current_assignment")?;

    let mut drones = Vec::new();
    let mut errors = Vec::new();
    let mut seen_ids = HashSet::new();

    for (line, raw) in records {
        let row = split_line(&raw);
        let parsed = (|| -> Result<Drone, String> {
            let id = field(&row, id_col).to_string();
            if id.is_empty() {
                return Err("missing id".to_string());
            }
            if !seen_ids.insert(id.clone()) {
                return Err(format!("duplicate id {}", id));
            }

            let capabilities = split_cell(field(&row, capabilities_col))
                .map(|c| c.parse::<CapabilityTag>())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| e.to_string())?;
            let status = field(&row, status_col)
                .parse::<AvailabilityStatus>()
                .map_err(|e| e.to_string())?;

            Ok(Drone {
                id,
                model: field(&row, model_col).to_string(),
                location: field(&row, location_col).to_string(),
                capabilities,
                status,
                current_assignment: parse_assignment(field(&row, assignment_col)),
            })
        })();

        match parsed {
            Ok(drone) => drones.push(drone),
            Err(reason) => {
                warn!(line, %reason, "rejected drone row");
                errors.push(RowError { line, reason });
            }
        }
    }
    Ok((drones, errors))
}

/// Parse a mission table (columns: id, type, location, start, end, priority,
/// status)
pub fn parse_missions(content: &str) -> Result<(Vec<Mission>, Vec<RowError>), IngestError> {
    let mut records = table_records(content).into_iter();
    let (_, header_line) = records.next().ok_or(IngestError::EmptyTable)?;
    let header = Header::parse(&header_line);

    let id_col = header.index("id")?;
    let type_col = header.index("type")?;
    let location_col = header.index("location")?;
    let start_col = header.index("start")?;
    let end_col = header.index("end")?;
    let priority_col = header.index("priority")?;
    let status_col = header.index("status")?;

    let mut missions = Vec::new();
    let mut errors = Vec::new();
    let mut seen_ids = HashSet::new();

    for (line, raw) in records {
        let row = split_line(&raw);
        let parsed = (|| -> Result<Mission, String> {
            let id = field(&row, id_col).to_string();
            if id.is_empty() {
                return Err("missing id".to_string());
            }
            if !seen_ids.insert(id.clone()) {
                return Err(format!("duplicate id {}", id));
            }

            let mission_type = field(&row, type_col)
                .parse::<MissionType>()
                .map_err(|e| e.to_string())?;
            let start = parse_date(field(&row, start_col))?;
            let end = parse_date(field(&row, end_col))?;
            let window = TimeWindow::new(start, end).map_err(|e| e.to_string())?;
            let priority = field(&row, priority_col)
                .parse::<Priority>()
                .map_err(|e| e.to_string())?;
            let status = field(&row, status_col)
                .parse::<MissionStatus>()
                .map_err(|e| e.to_string())?;

            Ok(Mission {
                id,
                mission_type,
                location: field(&row, location_col).to_string(),
                window,
                priority,
                status,
            })
        })();

        match parsed {
            Ok(mission) => missions.push(mission),
            Err(reason) => {
                warn!(line, %reason, "rejected mission row");
                errors.push(RowError { line, reason });
            }
        }
    }
    Ok((missions, errors))
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| format!("invalid date: {}", value))
}

/// Load a pilot table from disk
pub fn load_pilots<P: AsRef<Path>>(path: P) -> Result<(Vec<Pilot>, Vec<RowError>), IngestError> {
    let content = std::fs::read_to_string(path)?;
    parse_pilots(&content)
}

/// Load a drone table from disk
pub fn load_drones<P: AsRef<Path>>(path: P) -> Result<(Vec<Drone>, Vec<RowError>), IngestError> {
    let content = std::fs::read_to_string(path)?;
    parse_drones(&content)
}

/// Load a mission table from disk
pub fn load_missions<P: AsRef<Path>>(
    path: P,
) -> Result<(Vec<Mission>, Vec<RowError>), IngestError> {
    let content = std::fs::read_to_string(path)?;
    parse_missions(&content)
}
