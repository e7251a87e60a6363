//! Error types for glossary-core

use std::path::PathBuf;
use thiserror::Error;

use crate::store::Lang;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in glossary-core
///
/// Every variant is terminal for the operation that raised it. The store is
/// never written when one of these is returned from the pipeline.
#[derive(Debug, Error)]
pub enum Error {
    /// The input produced no rows at all
    #[error("input is empty: no rows found")]
    EmptyInput,

    /// Header row does not have 2 or 3 columns
    #[error("input must have 2 or 3 columns (found {0})")]
    InvalidColumnCount(usize),

    /// No "English" header and the caller declined to use column 0
    #[error("no 'English' column among headers [{}] and fallback to the first column was declined", .headers.join(", "))]
    UserCancelled { headers: Vec<String> },

    /// The source could not be decoded (corrupt spreadsheet, unreadable text)
    #[error("failed to decode '{path}': {message}")]
    MalformedSource { path: PathBuf, message: String },

    /// File extension is not one we know how to read
    #[error("unsupported input file '{0}' (expected .xlsx, .xls, .ods, .csv, .tsv or .txt)")]
    UnsupportedSource(PathBuf),

    /// Undo requested but no snapshot is stored
    #[error("no undo snapshot available")]
    NoBackup,

    /// Another ingest or undo is already running on this pipeline
    #[error("another operation is already in progress")]
    Busy,

    /// Export requested for a language with no entries
    #[error("no '{0}' translations in the store")]
    EmptyLanguage(Lang),

    /// A per-language JSON file is not a flat object of strings
    #[error("invalid language file: {0}")]
    InvalidLanguageFile(String),

    /// The store or undo file exists but is not valid JSON
    #[error("store file '{path}' is not valid JSON: {source}")]
    CorruptStore {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Configuration file could not be parsed
    #[error("invalid config '{path}': {message}")]
    Config { path: PathBuf, message: String },

    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// CSV parsing error from the csv crate
    #[error("CSV error in '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// True when the operation stopped because the user said no
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::UserCancelled { .. })
    }
}
