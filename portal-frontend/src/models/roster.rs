//! Bulk student import: CSV parsing and per-row checks before anything is
//! sent to the backend.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One CSV row. Columns are matched by header; unknown columns are ignored
/// and missing ones read as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterRow {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub class: String,
    #[serde(default)]
    pub student_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub section: String,
}

/// A problem on one row, numbered from 1 (the header is not counted).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowError {
    pub row: usize,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RosterReport {
    pub errors: Vec<RowError>,
    /// Distinct offending rows, ascending.
    pub invalid_rows: Vec<usize>,
}

impl RosterReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn is_invalid(&self, row: usize) -> bool {
        self.invalid_rows.binary_search(&row).is_ok()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImportError {
    #[error("No rows to save")]
    Empty,

    #[error("Failed to parse CSV: {0}")]
    Malformed(String),

    #[error("{} row(s) need fixing before upload", .0.invalid_rows.len())]
    InvalidRows(RosterReport),
}

pub fn parse_roster(bytes: &[u8]) -> Result<Vec<RosterRow>, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let mut rows = Vec::new();
    for record in reader.deserialize::<RosterRow>() {
        let row = record.map_err(|e| ImportError::Malformed(e.to_string()))?;
        rows.push(row);
    }
    Ok(rows)
}

pub fn validate_roster(rows: &[RosterRow], classes: &[String]) -> RosterReport {
    let mut report = RosterReport::default();
    let class_message = format!("Invalid or missing class (Allowed: {})", classes.join(", "));

    for (i, row) in rows.iter().enumerate() {
        let row_number = i + 1;
        let mut fail = |message: &str| {
            report.errors.push(RowError {
                row: row_number,
                message: message.to_string(),
            });
            if report.invalid_rows.last() != Some(&row_number) {
                report.invalid_rows.push(row_number);
            }
        };

        if row.name.trim().is_empty() {
            fail("Missing student name");
        }
        if !classes.iter().any(|c| c == row.class.trim()) {
            fail(&class_message);
        }
        if row.student_id.trim().is_empty() {
            fail("Missing student ID");
        }
    }
    report
}

/// A parsed upload and its check results, shown to the user before saving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterUpload {
    pub rows: Vec<RosterRow>,
    pub report: RosterReport,
}

impl RosterUpload {
    pub fn parse(bytes: &[u8], classes: &[String]) -> Result<Self, ImportError> {
        Self::check(parse_roster(bytes)?, classes)
    }

    /// Empty uploads are refused outright; anything else is reported row by row.
    pub fn check(rows: Vec<RosterRow>, classes: &[String]) -> Result<Self, ImportError> {
        if rows.is_empty() {
            return Err(ImportError::Empty);
        }
        let report = validate_roster(&rows, classes);
        Ok(Self { rows, report })
    }

    /// Only a fully valid upload yields rows to send.
    pub fn into_rows(self) -> Result<Vec<RosterRow>, ImportError> {
        if self.report.is_valid() {
            Ok(self.rows)
        } else {
            Err(ImportError::InvalidRows(self.report))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classes() -> Vec<String> {
        vec!["1".to_string(), "2".to_string()]
    }

    #[test]
    fn headers_map_to_fields_in_any_order() {
        let rows = parse_roster(b"studentId,class,name\nS-1, 1 ,Asha\n").unwrap();
        assert_eq!(
            rows,
            vec![RosterRow {
                name: "Asha".to_string(),
                class: "1".to_string(),
                student_id: "S-1".to_string(),
                section: String::new(),
            }]
        );
    }

    #[test]
    fn blank_lines_are_skipped() {
        let rows = parse_roster(b"name,class,studentId\nAsha,1,S-1\n\nRavi,2,S-2\n").unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn header_only_file_is_empty() {
        assert_eq!(
            RosterUpload::parse(b"name,class,studentId\n", &classes()),
            Err(ImportError::Empty)
        );
    }
}
