use std::fs;
use std::io;
use std::path::Path;

use log::{debug, warn};

use crate::models::{QuizItem, ValidationError};

use super::sheet::{record_from_row, RecordError, SheetValues};

/// What to do with a record that fails to parse or validate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RowPolicy {
    /// Reject the whole batch on the first bad record.
    #[default]
    Abort,
    /// Drop bad records and keep going.
    Skip,
}

/// Items that made it through ingestion.
#[derive(Debug, Clone, Default)]
pub struct Ingested {
    pub items: Vec<QuizItem>,
    /// Number of records dropped under [`RowPolicy::Skip`].
    pub rejected: usize,
}

/// Error type for loading quiz data.
#[derive(Debug)]
pub enum LoadError {
    Io(io::Error),
    Json(serde_json::Error),
    Record(RecordError),
    /// Item at `index` (0-based) breaks a quiz invariant.
    Validation {
        index: usize,
        title: String,
        source: ValidationError,
    },
    /// The source held no questions.
    Empty,
    Fetch(String),
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::Io(e) => write!(f, "{}", e),
            LoadError::Json(e) => write!(f, "invalid JSON: {}", e),
            LoadError::Record(e) => write!(f, "malformed record: {}", e),
            LoadError::Validation { index, title, source } => {
                write!(f, "question {} ({:?}): {}", index + 1, title, source)
            }
            LoadError::Empty => write!(f, "quiz must contain at least one question"),
            LoadError::Fetch(msg) => write!(f, "fetch failed: {}", msg),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Io(e) => Some(e),
            LoadError::Json(e) => Some(e),
            LoadError::Record(e) => Some(e),
            LoadError::Validation { source, .. } => Some(source),
            LoadError::Empty | LoadError::Fetch(_) => None,
        }
    }
}

impl From<io::Error> for LoadError {
    fn from(err: io::Error) -> Self {
        LoadError::Io(err)
    }
}

impl From<serde_json::Error> for LoadError {
    fn from(err: serde_json::Error) -> Self {
        LoadError::Json(err)
    }
}

impl From<RecordError> for LoadError {
    fn from(err: RecordError) -> Self {
        LoadError::Record(err)
    }
}

impl From<reqwest::Error> for LoadError {
    fn from(err: reqwest::Error) -> Self {
        LoadError::Fetch(err.to_string())
    }
}

/// Transform and validate spreadsheet values.
pub fn ingest_sheet(values: &SheetValues, policy: RowPolicy) -> Result<Ingested, LoadError> {
    let (headers, rows) = values.split_header();
    let mut ingested = Ingested::default();

    for (i, row) in rows.iter().enumerate() {
        let result = record_from_row(headers, row, i + 1)
            .map_err(LoadError::from)
            .and_then(|item| validate_item(i, item));

        match (result, policy) {
            (Ok(item), _) => ingested.items.push(item),
            (Err(e), RowPolicy::Abort) => return Err(e),
            (Err(e), RowPolicy::Skip) => {
                warn!("Skipping row {}: {}", i + 1, e);
                ingested.rejected += 1;
            }
        }
    }

    debug!(
        "Ingested {} questions ({} rejected)",
        ingested.items.len(),
        ingested.rejected
    );
    Ok(ingested)
}

/// Validate a batch of items supplied directly, clearing any answer state.
pub fn validate_items(items: Vec<QuizItem>) -> Result<Vec<QuizItem>, LoadError> {
    if items.is_empty() {
        return Err(LoadError::Empty);
    }

    items
        .into_iter()
        .enumerate()
        .map(|(i, mut item)| {
            item.is_correct = None;
            validate_item(i, item)
        })
        .collect()
}

fn validate_item(index: usize, item: QuizItem) -> Result<QuizItem, LoadError> {
    match item.validate() {
        Ok(()) => Ok(item),
        Err(source) => Err(LoadError::Validation {
            index,
            title: item.title,
            source,
        }),
    }
}

/// Load questions from a JSON array of quiz items.
pub fn load_quiz_from_json<P: AsRef<Path>>(path: P) -> Result<Vec<QuizItem>, LoadError> {
    let json_content = fs::read_to_string(path.as_ref())?;
    let items: Vec<QuizItem> = serde_json::from_str(&json_content)?;
    validate_items(items)
}

/// Load questions from a saved Sheets `values.get` response.
pub fn load_quiz_from_sheet_file<P: AsRef<Path>>(
    path: P,
    policy: RowPolicy,
) -> Result<Vec<QuizItem>, LoadError> {
    let json_content = fs::read_to_string(path.as_ref())?;
    let values: SheetValues = serde_json::from_str(&json_content)?;
    let ingested = ingest_sheet(&values, policy)?;
    if ingested.items.is_empty() {
        return Err(LoadError::Empty);
    }
    Ok(ingested.items)
}

/// Fetch questions from a quiz proxy endpoint. One attempt, no retry.
pub async fn fetch_quiz(url: &str) -> Result<Vec<QuizItem>, LoadError> {
    let response = reqwest::get(url).await?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(LoadError::Fetch(format!("{}: {} {}", url, status, body.trim())));
    }

    let items: Vec<QuizItem> = response.json().await?;
    validate_items(items)
}
