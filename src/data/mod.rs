//! Loading quiz data from files, spreadsheets and the quiz proxy.

mod loader;
pub mod sheet;

pub use loader::{
    fetch_quiz, ingest_sheet, load_quiz_from_json, load_quiz_from_sheet_file, validate_items,
    Ingested, LoadError, RowPolicy,
};
pub use sheet::{record_from_row, transform, RecordError, SheetValues};
