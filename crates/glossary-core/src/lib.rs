//! glossary-core: Core library for merging glossary sheets into a translation store
//!
//! This library provides functionality to:
//! - Parse glossary sheets from pasted text, CSV files or spreadsheets
//! - Work out which column holds English, Japanese and Malay
//! - Derive translation keys from the English text
//! - Merge rows into a three-language store and report what changed
//! - Keep a single undo snapshot of the store
//! - Export and import per-language JSON files

pub mod config;
pub mod error;
pub mod export;
pub mod grid;
pub mod history;
pub mod key;
pub mod merger;
pub mod parser;
pub mod pipeline;
pub mod report;
pub mod roles;
pub mod store;

pub use config::GlossaryConfig;
pub use error::{Error, Result};
pub use export::{export_all, export_language, import_language, key_list};
pub use grid::Grid;
pub use history::{UndoManager, UndoSnapshot};
pub use key::derive_key;
pub use merger::{merge, ChangeRecord, ChangeStatus, DuplicateKey, LangValues, MergeOutcome};
pub use parser::{parse_csv_file, parse_csv_str, parse_file, parse_paste, parse_spreadsheet};
pub use pipeline::{IngestReport, Pipeline};
pub use report::{ChangeSummary, StoreStats};
pub use roles::{resolve_roles, AutoConfirm, ColumnRoleMap, ConfirmPrimary};
pub use store::{JsonFileBackend, Lang, MemoryBackend, StoreBackend, TranslationStore};
