//! Spreadsheet rows to quiz items.
//!
//! The data source is a two-dimensional table of strings: the first row holds
//! field names, every following row is one question. Cells are matched to
//! field names by position.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::QuizItem;

pub const FIELD_TITLE: &str = "title";
pub const FIELD_OPTIONS: &str = "options";
pub const FIELD_CORRECT_OPTION: &str = "correctOption";
pub const FIELD_VIDEO_ID: &str = "videoId";
pub const FIELD_REVEAL_TIMESTAMP: &str = "revealTimestamp";
/// Answer state is never read from the table.
const FIELD_IS_CORRECT: &str = "isCorrect";

const OPTION_DELIMITER: char = ',';

/// Response body of the Sheets `values.get` call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetValues {
    #[serde(default)]
    pub range: Option<String>,
    #[serde(default)]
    pub major_dimension: Option<String>,
    /// Absent entirely when the range is empty.
    #[serde(default)]
    pub values: Vec<Vec<String>>,
}

impl SheetValues {
    /// Split into the header row and the data rows.
    pub fn split_header(&self) -> (&[String], &[Vec<String>]) {
        match self.values.split_first() {
            Some((headers, rows)) => (headers.as_slice(), rows),
            None => (&[], &[]),
        }
    }
}

/// A data row that cannot become a quiz item.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordError {
    /// A required column is absent from the row.
    MissingField { row: usize, field: &'static str },
    /// A numeric column holds something that is not a non-negative integer.
    Parse {
        row: usize,
        field: &'static str,
        value: String,
    },
}

impl RecordError {
    /// 1-based number of the data row the error refers to.
    pub fn row(&self) -> usize {
        match self {
            RecordError::MissingField { row, .. } | RecordError::Parse { row, .. } => *row,
        }
    }
}

impl std::fmt::Display for RecordError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordError::MissingField { row, field } => {
                write!(f, "row {}: missing field '{}'", row, field)
            }
            RecordError::Parse { row, field, value } => {
                write!(f, "row {}: field '{}' is not an integer: {:?}", row, field, value)
            }
        }
    }
}

impl std::error::Error for RecordError {}

/// Convert every data row, stopping at the first malformed one.
pub fn transform(headers: &[String], rows: &[Vec<String>]) -> Result<Vec<QuizItem>, RecordError> {
    rows.iter()
        .enumerate()
        .map(|(i, row)| record_from_row(headers, row, i + 1))
        .collect()
}

/// Convert a single data row. `row_number` is only used in error reports.
pub fn record_from_row(
    headers: &[String],
    row: &[String],
    row_number: usize,
) -> Result<QuizItem, RecordError> {
    let mut fields: BTreeMap<String, String> = headers
        .iter()
        .zip(row.iter())
        .map(|(header, cell)| (header.clone(), cell.clone()))
        .collect();

    let mut take = |field: &'static str| {
        fields.remove(field).ok_or(RecordError::MissingField {
            row: row_number,
            field,
        })
    };

    let options = split_options(&take(FIELD_OPTIONS)?);
    let raw_timestamp = take(FIELD_REVEAL_TIMESTAMP)?;
    let reveal_timestamp = parse_timestamp(&raw_timestamp).ok_or_else(|| RecordError::Parse {
        row: row_number,
        field: FIELD_REVEAL_TIMESTAMP,
        value: raw_timestamp.clone(),
    })?;
    let title = take(FIELD_TITLE)?;
    let correct_option = take(FIELD_CORRECT_OPTION)?;
    let video_id = take(FIELD_VIDEO_ID)?;
    fields.remove(FIELD_IS_CORRECT);

    Ok(QuizItem {
        title,
        options,
        correct_option,
        video_id,
        reveal_timestamp,
        is_correct: None,
        extra: fields,
    })
}

fn split_options(cell: &str) -> Vec<String> {
    cell.split(OPTION_DELIMITER)
        .map(|option| option.trim().to_string())
        .collect()
}

fn parse_timestamp(cell: &str) -> Option<f64> {
    cell.trim().parse::<u32>().ok().map(f64::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    fn headers() -> Vec<String> {
        strings(&["title", "options", "correctOption", "videoId", "revealTimestamp"])
    }

    #[test]
    fn test_transform_row() {
        let rows = vec![strings(&["Q1", "A, B, C", "B", "xyz123", "42"])];
        let items = transform(&headers(), &rows).unwrap();

        assert_eq!(items.len(), 1);
        let item = &items[0];
        assert_eq!(item.title, "Q1");
        assert_eq!(item.options, strings(&["A", "B", "C"]));
        assert_eq!(item.correct_option, "B");
        assert_eq!(item.video_id, "xyz123");
        assert_eq!(item.reveal_timestamp, 42.0);
        assert_eq!(item.is_correct, None);
        assert!(item.extra.is_empty());
    }

    #[test]
    fn test_missing_options_cell() {
        // Sheets drops trailing empty cells, so a short row loses its last columns.
        let headers = strings(&["title", "correctOption", "videoId", "revealTimestamp", "options"]);
        let rows = vec![strings(&["Q1", "B", "xyz123", "42"])];

        assert_eq!(
            transform(&headers, &rows),
            Err(RecordError::MissingField {
                row: 1,
                field: FIELD_OPTIONS
            })
        );
    }

    #[test]
    fn test_bad_timestamp() {
        let rows = vec![
            strings(&["Q1", "A, B", "B", "xyz123", "12"]),
            strings(&["Q2", "A, B", "B", "xyz123", "soon"]),
        ];
        let err = transform(&headers(), &rows).unwrap_err();

        assert_eq!(err.row(), 2);
        assert!(matches!(err, RecordError::Parse { field: FIELD_REVEAL_TIMESTAMP, .. }));
        assert!(record_from_row(&headers(), &strings(&["Q", "A", "A", "v", "-3"]), 1).is_err());
        assert!(record_from_row(&headers(), &strings(&["Q", "A", "A", "v", " 7 "]), 1).is_ok());
    }

    #[test]
    fn test_extra_columns_and_duplicates() {
        let mut headers = headers();
        headers.push("speaker".to_string());
        let row = strings(&["Q", "Yes,Yes , No", "No", "v1", "5", "Lee", "ignored"]);

        let item = record_from_row(&headers, &row, 1).unwrap();
        assert_eq!(item.options, strings(&["Yes", "Yes", "No"]));
        assert_eq!(item.extra.get("speaker").map(String::as_str), Some("Lee"));
        assert_eq!(item.extra.len(), 1);
    }

    #[test]
    fn test_answer_column_is_dropped() {
        let mut headers = headers();
        headers.push("isCorrect".to_string());
        let row = strings(&["Q", "A, B", "A", "v1", "5", "true"]);

        let item = record_from_row(&headers, &row, 1).unwrap();
        assert_eq!(item.is_correct, None);
        assert!(item.extra.is_empty());
        assert!(!serde_json::to_string(&item).unwrap().contains("isCorrect"));
    }

    #[test]
    fn test_sheet_values() {
        let json = r#"{
            "range": "Sheet1!A1:E3",
            "majorDimension": "ROWS",
            "values": [
                ["title", "options", "correctOption", "videoId", "revealTimestamp"],
                ["Q1", "A, B", "A", "abc", "3"]
            ]
        }"#;
        let values: SheetValues = serde_json::from_str(json).unwrap();
        let (headers, rows) = values.split_header();
        assert_eq!(headers.len(), 5);
        assert_eq!(rows.len(), 1);

        let empty: SheetValues = serde_json::from_str(r#"{"range": "Sheet1"}"#).unwrap();
        let (headers, rows) = empty.split_header();
        assert!(headers.is_empty());
        assert!(transform(headers, rows).unwrap().is_empty());
    }
}
