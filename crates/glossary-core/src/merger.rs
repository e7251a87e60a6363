//! Merge engine: reconcile a parsed grid with the translation store
//!
//! Each data row is keyed by the derived primary-language key and classified
//! as added, updated or unchanged against the store. The store passed in is
//! never modified; the merged result is returned as a new store so callers
//! can decide whether to persist it.

use crate::grid::Grid;
use crate::key::derive_key;
use crate::roles::ColumnRoleMap;
use crate::store::{Lang, TranslationStore};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How a row relates to what was already stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeStatus {
    /// The key was not present in any language
    Added,
    /// At least one language value differs from the stored one
    Updated,
    /// Nothing to write
    Unchanged,
}

/// One text value per language slot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LangValues {
    #[serde(rename = "en")]
    pub primary: String,
    #[serde(rename = "jp")]
    pub secondary: String,
    #[serde(rename = "malay")]
    pub tertiary: String,
}

impl LangValues {
    pub fn get(&self, lang: Lang) -> &str {
        match lang {
            Lang::Primary => &self.primary,
            Lang::Secondary => &self.secondary,
            Lang::Tertiary => &self.tertiary,
        }
    }

    fn from_fn(mut f: impl FnMut(Lang) -> String) -> Self {
        Self {
            primary: f(Lang::Primary),
            secondary: f(Lang::Secondary),
            tertiary: f(Lang::Tertiary),
        }
    }
}

/// What happened to a single row during a merge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    /// Derived translation key
    pub key: String,
    /// Grid row the record came from (the header is row 0)
    pub row: usize,
    /// Values after the merge: the incoming primary text, and for the other
    /// languages the incoming text or the stored one when the cell was blank
    pub values: LangValues,
    pub status: ChangeStatus,
    /// Stored values before the merge, only for updated rows
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<LangValues>,
}

/// A key produced by more than one row of the same grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateKey {
    pub key: String,
    /// Grid rows that produced the key; the last one wins
    pub rows: Vec<usize>,
}

/// Result of merging a grid into a store
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    /// The merged store
    pub store: TranslationStore,
    /// One record per keyed row, in row order
    pub changes: Vec<ChangeRecord>,
    /// Keys that appeared on several rows
    pub duplicates: Vec<DuplicateKey>,
    /// Rows skipped for a blank primary cell or an empty derived key
    pub skipped_rows: usize,
}

impl MergeOutcome {
    /// Number of records with the given status
    pub fn count(&self, status: ChangeStatus) -> usize {
        self.changes.iter().filter(|c| c.status == status).count()
    }

    pub fn added(&self) -> usize {
        self.count(ChangeStatus::Added)
    }

    pub fn updated(&self) -> usize {
        self.count(ChangeStatus::Updated)
    }

    pub fn unchanged(&self) -> usize {
        self.count(ChangeStatus::Unchanged)
    }

    /// True if any row added or updated something
    pub fn has_changes(&self) -> bool {
        self.changes
            .iter()
            .any(|c| c.status != ChangeStatus::Unchanged)
    }
}

/// Merge the data rows of `grid` into a copy of `current`
///
/// Rows are processed in order against an accumulating draft, so when a key
/// repeats, the later row is compared with the earlier row's write and its
/// values win. Secondary and tertiary values are only written when the
/// incoming cell is non-empty: a blank cell never erases a stored
/// translation.
pub fn merge(grid: &Grid, roles: &ColumnRoleMap, current: &TranslationStore) -> MergeOutcome {
    let mut draft = current.clone();
    let mut changes = Vec::new();
    let mut skipped_rows = 0;

    for (row_idx, _) in grid.data_rows() {
        let primary_text = grid.cell(row_idx, roles.primary).trim();
        if primary_text.is_empty() {
            skipped_rows += 1;
            continue;
        }

        let key = derive_key(primary_text);
        if key.is_empty() {
            debug!("row {}: no key can be derived from '{}'", row_idx, primary_text);
            skipped_rows += 1;
            continue;
        }

        let incoming = LangValues::from_fn(|lang| match lang {
            Lang::Primary => primary_text.to_string(),
            _ => roles
                .column(lang)
                .map(|col| grid.cell(row_idx, col).trim().to_string())
                .unwrap_or_default(),
        });
        let stored =
            LangValues::from_fn(|lang| draft.get(lang, &key).unwrap_or_default().to_string());

        let status = classify(&draft, &key, &incoming, &stored, roles);

        let values = LangValues::from_fn(|lang| {
            let value = incoming.get(lang);
            if lang == Lang::Primary || !value.is_empty() {
                value.to_string()
            } else {
                stored.get(lang).to_string()
            }
        });

        if status != ChangeStatus::Unchanged {
            draft.set(Lang::Primary, key.as_str(), incoming.primary.as_str());
            for lang in [Lang::Secondary, Lang::Tertiary] {
                let value = incoming.get(lang);
                if roles.column(lang).is_some() && !value.is_empty() {
                    draft.set(lang, key.as_str(), value);
                }
            }
        }

        changes.push(ChangeRecord {
            key,
            row: row_idx,
            values,
            status,
            previous: (status == ChangeStatus::Updated).then_some(stored),
        });
    }

    let duplicates = find_duplicates(&changes);
    for dup in &duplicates {
        warn!(
            "key '{}' derived from rows {:?}; row {} wins",
            dup.key,
            dup.rows,
            dup.rows.last().copied().unwrap_or_default()
        );
    }

    let outcome = MergeOutcome {
        store: draft,
        changes,
        duplicates,
        skipped_rows,
    };
    info!(
        "merged {} rows from {}: {} added, {} updated, {} unchanged, {} skipped",
        grid.data_row_count(),
        grid.source.display(),
        outcome.added(),
        outcome.updated(),
        outcome.unchanged(),
        outcome.skipped_rows
    );
    outcome
}

/// Added if no language has the key yet. Otherwise updated when the primary
/// text differs, or when an assigned target slot differs from what is stored
/// (new value, changed value, or a stored value now blank in the sheet).
fn classify(
    draft: &TranslationStore,
    key: &str,
    incoming: &LangValues,
    stored: &LangValues,
    roles: &ColumnRoleMap,
) -> ChangeStatus {
    if !draft.contains_key(key) {
        return ChangeStatus::Added;
    }

    // Stored text is compared trimmed; incoming cells are already trimmed
    let primary_changed = incoming.primary != stored.primary.trim();
    let target_changed = [Lang::Secondary, Lang::Tertiary]
        .into_iter()
        .filter(|&lang| roles.column(lang).is_some())
        .any(|lang| incoming.get(lang) != stored.get(lang).trim());

    if primary_changed || target_changed {
        ChangeStatus::Updated
    } else {
        ChangeStatus::Unchanged
    }
}

fn find_duplicates(changes: &[ChangeRecord]) -> Vec<DuplicateKey> {
    let mut rows_by_key: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for change in changes {
        rows_by_key
            .entry(change.key.as_str())
            .or_default()
            .push(change.row);
    }

    rows_by_key
        .into_iter()
        .filter(|(_, rows)| rows.len() > 1)
        .map(|(key, rows)| DuplicateKey {
            key: key.to_string(),
            rows,
        })
        .collect()
}
