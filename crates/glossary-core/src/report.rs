//! Reporting helpers over merge results and the store

use crate::merger::{ChangeRecord, ChangeStatus, MergeOutcome};
use crate::store::{Lang, TranslationStore};
use serde::{Deserialize, Serialize};

/// Counts from one merge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSummary {
    pub added: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub skipped: usize,
    pub duplicate_keys: usize,
}

impl ChangeSummary {
    pub fn from_outcome(outcome: &MergeOutcome) -> Self {
        Self {
            added: outcome.added(),
            updated: outcome.updated(),
            unchanged: outcome.unchanged(),
            skipped: outcome.skipped_rows,
            duplicate_keys: outcome.duplicates.len(),
        }
    }

    /// Added plus updated
    pub fn changed(&self) -> usize {
        self.added + self.updated
    }
}

/// Records worth showing: unchanged rows dropped, updates listed before
/// additions, row order kept within each group
pub fn visible_changes(changes: &[ChangeRecord]) -> Vec<&ChangeRecord> {
    let mut visible: Vec<&ChangeRecord> = changes
        .iter()
        .filter(|c| c.status != ChangeStatus::Unchanged)
        .collect();
    visible.sort_by_key(|c| match c.status {
        ChangeStatus::Updated => 0,
        ChangeStatus::Added => 1,
        ChangeStatus::Unchanged => 2,
    });
    visible
}

/// Store coverage, counted over the primary-language keys
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    /// Keys present in the primary language
    pub total_keys: usize,
    /// Primary keys with non-empty text in both other languages
    pub complete_keys: usize,
    pub incomplete_keys: usize,
    /// Entries per language, in slot order
    pub per_language: Vec<(Lang, usize)>,
}

impl StoreStats {
    pub fn compute(store: &TranslationStore) -> Self {
        let total_keys = store.primary.len();
        let complete_keys = store
            .keys()
            .filter(|key| {
                [Lang::Secondary, Lang::Tertiary]
                    .into_iter()
                    .all(|lang| store.get(lang, key).is_some_and(|v| !v.is_empty()))
            })
            .count();

        Self {
            total_keys,
            complete_keys,
            incomplete_keys: total_keys - complete_keys,
            per_language: Lang::ALL
                .into_iter()
                .map(|lang| (lang, store.lang(lang).len()))
                .collect(),
        }
    }

    /// Completion rate in whole percent (0 for an empty store)
    pub fn completion_percent(&self) -> u32 {
        if self.total_keys == 0 {
            return 0;
        }
        ((self.complete_keys as f64 / self.total_keys as f64) * 100.0).round() as u32
    }
}

/// Primary keys that have no text in `lang`
pub fn missing_translations(store: &TranslationStore, lang: Lang) -> Vec<&str> {
    store
        .keys()
        .filter(|key| store.get(lang, key).map_or(true, str::is_empty))
        .collect()
}

/// Keys stored for some language but missing from the primary mapping
pub fn orphan_keys(store: &TranslationStore) -> Vec<&str> {
    let mut orphans: Vec<&str> = [Lang::Secondary, Lang::Tertiary]
        .into_iter()
        .flat_map(|lang| store.lang(lang).keys())
        .filter(|key| !store.primary.contains_key(*key))
        .map(String::as_str)
        .collect();
    orphans.sort_unstable();
    orphans.dedup();
    orphans
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merger::LangValues;

    fn record(key: &str, status: ChangeStatus) -> ChangeRecord {
        ChangeRecord {
            key: key.to_string(),
            row: 1,
            values: LangValues::default(),
            status,
            previous: None,
        }
    }

    fn sample_store() -> TranslationStore {
        let mut store = TranslationStore::new();
        store.set(Lang::Primary, "home", "Home");
        store.set(Lang::Secondary, "home", "ホーム");
        store.set(Lang::Tertiary, "home", "Laman Utama");
        store.set(Lang::Primary, "settings", "Settings");
        store.set(Lang::Secondary, "settings", "設定");
        store.set(Lang::Primary, "logout", "Logout");
        store.set(Lang::Tertiary, "logout", "");
        store.set(Lang::Secondary, "stray", "迷子");
        store
    }

    #[test]
    fn test_visible_changes_order() {
        let changes = vec![
            record("a", ChangeStatus::Added),
            record("b", ChangeStatus::Unchanged),
            record("c", ChangeStatus::Updated),
            record("d", ChangeStatus::Added),
            record("e", ChangeStatus::Updated),
        ];
        let keys: Vec<&str> = visible_changes(&changes)
            .into_iter()
            .map(|c| c.key.as_str())
            .collect();
        assert_eq!(keys, vec!["c", "e", "a", "d"]);
    }

    #[test]
    fn test_store_stats() {
        let stats = StoreStats::compute(&sample_store());
        assert_eq!(stats.total_keys, 3);
        assert_eq!(stats.complete_keys, 1);
        assert_eq!(stats.incomplete_keys, 2);
        assert_eq!(stats.completion_percent(), 33);
        assert_eq!(
            stats.per_language,
            vec![(Lang::Primary, 3), (Lang::Secondary, 3), (Lang::Tertiary, 2)]
        );
    }

    #[test]
    fn test_empty_store_stats() {
        let stats = StoreStats::compute(&TranslationStore::new());
        assert_eq!(stats.total_keys, 0);
        assert_eq!(stats.completion_percent(), 0);
    }

    #[test]
    fn test_missing_translations() {
        let store = sample_store();
        assert_eq!(missing_translations(&store, Lang::Secondary), vec!["logout"]);
        assert_eq!(
            missing_translations(&store, Lang::Tertiary),
            vec!["logout", "settings"]
        );
    }

    #[test]
    fn test_orphan_keys() {
        assert_eq!(orphan_keys(&sample_store()), vec!["stray"]);
    }
}
