//! Input parsers: pasted text, CSV and spreadsheet files
//!
//! Every entry point returns a [`Grid`] whose first row is the header row.
//! An input that yields no rows at all is reported as [`Error::EmptyInput`].

use crate::error::{Error, Result};
use crate::grid::Grid;
use calamine::{open_workbook_auto, Data, Range, Reader};
use std::fs;
use std::path::Path;

/// Source label used for grids built from pasted text
pub const PASTE_SOURCE: &str = "<paste>";

/// Parse text pasted from a spreadsheet or typed by hand
///
/// Lines are split on `\n` (a trailing `\r` is dropped). A line containing a
/// tab is split on tabs, keeping empty cells so column positions survive.
/// Otherwise the line is split on runs of two or more whitespace characters,
/// and a line with no such gap becomes a single-column row.
pub fn parse_paste(text: &str) -> Result<Grid> {
    parse_paste_named(text, PASTE_SOURCE)
}

/// Like [`parse_paste`] with an explicit source label (used for .txt/.tsv files)
pub fn parse_paste_named(text: &str, source_name: &str) -> Result<Grid> {
    let rows: Vec<Vec<String>> = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(split_pasted_line)
        .collect();

    finish(rows, source_name)
}

// Leading tabs mark blank cells, so the line is only trimmed once we know
// it is not tab-separated.
fn split_pasted_line(line: &str) -> Vec<String> {
    if line.contains('\t') {
        return line
            .trim_end_matches('\r')
            .split('\t')
            .map(|c| c.trim().to_string())
            .collect();
    }

    let line = line.trim();

    let parts = split_on_wide_gaps(line);
    if parts.len() > 1 {
        parts
    } else {
        vec![line.to_string()]
    }
}

/// Split on runs of 2+ whitespace characters; single spaces stay inside cells
fn split_on_wide_gaps(line: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut gap = String::new();

    for ch in line.chars() {
        if ch.is_whitespace() {
            gap.push(ch);
            continue;
        }
        match gap.chars().count() {
            0 => {}
            1 => current.push_str(&gap),
            _ => parts.push(std::mem::take(&mut current)),
        }
        gap.clear();
        current.push(ch);
    }
    parts.push(current);

    parts.into_iter().map(|p| p.trim().to_string()).collect()
}

/// Parse comma-separated content
///
/// Records may have different lengths. The header row is not interpreted
/// here; it is simply row 0 of the grid.
pub fn parse_csv_str(content: &str, source_name: &str) -> Result<Grid> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for result in csv_reader.records() {
        let record = result.map_err(|e| Error::Csv {
            path: source_name.into(),
            source: e,
        })?;
        rows.push(record.iter().map(|c| c.trim().to_string()).collect());
    }

    finish(rows, source_name)
}

/// Parse a CSV file from disk
pub fn parse_csv_file<P: AsRef<Path>>(path: P) -> Result<Grid> {
    let path = path.as_ref();
    let content = read_text(path)?;
    parse_csv_str(&content, &path.to_string_lossy())
}

/// Decode the first sheet of a workbook (xlsx, xlsm, xls, ods)
///
/// Any other sheets are ignored.
pub fn parse_spreadsheet<P: AsRef<Path>>(path: P) -> Result<Grid> {
    let path = path.as_ref();
    let malformed = |message: String| Error::MalformedSource {
        path: path.to_path_buf(),
        message,
    };

    let mut workbook = open_workbook_auto(path).map_err(|e| malformed(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| malformed("workbook has no sheets".to_string()))?
        .map_err(|e| malformed(e.to_string()))?;

    grid_from_range(&range, &path.to_string_lossy())
}

/// Convert a decoded sheet range into a grid
pub fn grid_from_range(range: &Range<Data>, source_name: &str) -> Result<Grid> {
    let rows = range
        .rows()
        .map(|r| r.iter().map(|c| cell_to_string(c).trim().to_string()).collect())
        .collect();
    finish(rows, source_name)
}

/// Build a grid from an already-decoded matrix of cells, trimming each one
pub fn grid_from_matrix<R, C>(matrix: R, source_name: &str) -> Result<Grid>
where
    R: IntoIterator,
    R::Item: IntoIterator<Item = C>,
    C: AsRef<str>,
{
    let rows = matrix
        .into_iter()
        .map(|r| r.into_iter().map(|c| c.as_ref().trim().to_string()).collect())
        .collect();
    finish(rows, source_name)
}

/// Render a spreadsheet cell as text
pub fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::String(v) => v.to_string(),
        Data::Float(v) => v.to_string(),
        Data::Int(v) => v.to_string(),
        Data::Bool(v) => v.to_string(),
        Data::DateTime(v) => v.to_string(),
        Data::DateTimeIso(v) => v.to_string(),
        Data::DurationIso(v) => v.to_string(),
        Data::Error(v) => format!("{v:?}"),
        Data::Empty => String::new(),
    }
}

/// Parse a file, picking the decoder from its extension
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Grid> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match ext.as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => parse_spreadsheet(path),
        "csv" => parse_csv_file(path),
        "txt" | "tsv" => {
            let content = read_text(path)?;
            parse_paste_named(&content, &path.to_string_lossy())
        }
        _ => Err(Error::UnsupportedSource(path.to_path_buf())),
    }
}

fn read_text(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    String::from_utf8(bytes).map_err(|e| Error::MalformedSource {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn finish(rows: Vec<Vec<String>>, source_name: &str) -> Result<Grid> {
    if rows.is_empty() {
        return Err(Error::EmptyInput);
    }
    Ok(Grid::new(rows, source_name))
}
