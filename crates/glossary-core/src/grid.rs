//! Normalized row/column text grid shared by every input mode

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A parsed grid of trimmed cell strings
///
/// Row 0 is always the header row. Rows may have different lengths; a
/// missing cell reads as an empty string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    /// Header row (row 0) followed by data rows
    pub rows: Vec<Vec<String>>,
    /// Where the grid came from (file path or a label such as "<paste>")
    pub source: PathBuf,
}

impl Grid {
    /// Create a grid from rows
    pub fn new(rows: Vec<Vec<String>>, source: impl Into<PathBuf>) -> Self {
        Self {
            rows,
            source: source.into(),
        }
    }

    /// Total number of rows, header included
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of data rows (everything after the header)
    pub fn data_row_count(&self) -> usize {
        self.rows.len().saturating_sub(1)
    }

    /// True when there is not even a header row
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The header row, if any
    pub fn header_row(&self) -> Option<&[String]> {
        self.rows.first().map(|r| r.as_slice())
    }

    /// Trimmed header names, with trailing blank cells dropped
    ///
    /// Interior blanks are kept so header positions line up with data columns.
    pub fn headers(&self) -> Vec<String> {
        let mut headers: Vec<String> = self
            .header_row()
            .map(|row| row.iter().map(|h| h.trim().to_string()).collect())
            .unwrap_or_default();
        while headers.last().is_some_and(|h| h.is_empty()) {
            headers.pop();
        }
        headers
    }

    /// Data rows with their grid index (starting at 1)
    pub fn data_rows(&self) -> impl Iterator<Item = (usize, &[String])> {
        self.rows
            .iter()
            .enumerate()
            .skip(1)
            .map(|(i, r)| (i, r.as_slice()))
    }

    /// Get a cell, empty when out of bounds
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(|s| s.as_str())
            .unwrap_or("")
    }
}
