//! The three-language translation store and its persistence backends

use crate::error::{Error, Result};
use crate::history::UndoSnapshot;
use log::debug;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// One of the three fixed language slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Lang {
    /// Source language (English); keys are derived from it
    Primary,
    /// First translation target (Japanese)
    Secondary,
    /// Second translation target (Malay)
    Tertiary,
}

impl Lang {
    /// All slots in storage order
    pub const ALL: [Lang; 3] = [Lang::Primary, Lang::Secondary, Lang::Tertiary];

    /// Storage code used in JSON files
    pub fn code(self) -> &'static str {
        match self {
            Lang::Primary => "en",
            Lang::Secondary => "jp",
            Lang::Tertiary => "malay",
        }
    }

    /// Human readable language name
    pub fn display_name(self) -> &'static str {
        match self {
            Lang::Primary => "English",
            Lang::Secondary => "Japanese",
            Lang::Tertiary => "Malay",
        }
    }
}

impl fmt::Display for Lang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Lang {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "english" | "primary" => Ok(Lang::Primary),
            "jp" | "ja" | "japanese" | "secondary" => Ok(Lang::Secondary),
            "malay" | "ms" | "tertiary" => Ok(Lang::Tertiary),
            other => Err(format!("unknown language '{}' (expected en, jp or malay)", other)),
        }
    }
}

/// Key → text mapping for a single language
pub type LangMap = BTreeMap<String, String>;

/// Translations for all three language slots
///
/// A key missing from a mapping means "not translated yet" for that language.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationStore {
    #[serde(rename = "en", default)]
    pub primary: LangMap,
    #[serde(rename = "jp", default)]
    pub secondary: LangMap,
    #[serde(rename = "malay", default)]
    pub tertiary: LangMap,
}

impl TranslationStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Mapping for one language
    pub fn lang(&self, lang: Lang) -> &LangMap {
        match lang {
            Lang::Primary => &self.primary,
            Lang::Secondary => &self.secondary,
            Lang::Tertiary => &self.tertiary,
        }
    }

    /// Mutable mapping for one language
    pub fn lang_mut(&mut self, lang: Lang) -> &mut LangMap {
        match lang {
            Lang::Primary => &mut self.primary,
            Lang::Secondary => &mut self.secondary,
            Lang::Tertiary => &mut self.tertiary,
        }
    }

    /// Stored text for a key, if any
    pub fn get(&self, lang: Lang, key: &str) -> Option<&str> {
        self.lang(lang).get(key).map(String::as_str)
    }

    /// Insert or overwrite a value
    pub fn set(&mut self, lang: Lang, key: impl Into<String>, value: impl Into<String>) {
        self.lang_mut(lang).insert(key.into(), value.into());
    }

    /// True if any language mapping holds the key
    pub fn contains_key(&self, key: &str) -> bool {
        Lang::ALL.iter().any(|&l| self.lang(l).contains_key(key))
    }

    /// True when every mapping is empty
    pub fn is_empty(&self) -> bool {
        Lang::ALL.iter().all(|&l| self.lang(l).is_empty())
    }

    /// Primary-language keys in sorted order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.primary.keys().map(String::as_str)
    }
}

/// Persistence for the store and its single undo snapshot
///
/// Implementations are treated as synchronous. The pipeline only calls
/// `set` once per successful ingest.
pub trait StoreBackend {
    /// Current store, or `None` if nothing has been saved yet
    fn get(&self) -> Result<Option<TranslationStore>>;

    /// Replace the current store
    fn set(&mut self, store: &TranslationStore) -> Result<()>;

    /// Retained undo snapshot, if any
    fn get_backup(&self) -> Result<Option<UndoSnapshot>>;

    /// Replace the undo snapshot
    fn set_backup(&mut self, snapshot: &UndoSnapshot) -> Result<()>;

    /// Drop the undo snapshot
    fn clear_backup(&mut self) -> Result<()>;
}

/// In-memory backend, mostly for tests and embedding
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    store: Option<TranslationStore>,
    backup: Option<UndoSnapshot>,
}

impl MemoryBackend {
    /// Create an empty backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend that already holds a store
    pub fn with_store(store: TranslationStore) -> Self {
        Self {
            store: Some(store),
            backup: None,
        }
    }
}

impl StoreBackend for MemoryBackend {
    fn get(&self) -> Result<Option<TranslationStore>> {
        Ok(self.store.clone())
    }

    fn set(&mut self, store: &TranslationStore) -> Result<()> {
        self.store = Some(store.clone());
        Ok(())
    }

    fn get_backup(&self) -> Result<Option<UndoSnapshot>> {
        Ok(self.backup.clone())
    }

    fn set_backup(&mut self, snapshot: &UndoSnapshot) -> Result<()> {
        self.backup = Some(snapshot.clone());
        Ok(())
    }

    fn clear_backup(&mut self) -> Result<()> {
        self.backup = None;
        Ok(())
    }
}

/// Store file name inside the data directory
pub const STORE_FILE: &str = "translations.json";
/// Undo snapshot file name inside the data directory
pub const BACKUP_FILE: &str = "translations.undo.json";

/// Backend keeping the store and snapshot as pretty JSON files in a directory
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    dir: PathBuf,
}

impl JsonFileBackend {
    /// Use `dir` as the data directory (created on first write)
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Data directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the store file
    pub fn store_path(&self) -> PathBuf {
        self.dir.join(STORE_FILE)
    }

    /// Path of the undo snapshot file
    pub fn backup_path(&self) -> PathBuf {
        self.dir.join(BACKUP_FILE)
    }
}

impl StoreBackend for JsonFileBackend {
    fn get(&self) -> Result<Option<TranslationStore>> {
        read_json(&self.store_path())
    }

    fn set(&mut self, store: &TranslationStore) -> Result<()> {
        write_json(&self.store_path(), store)
    }

    fn get_backup(&self) -> Result<Option<UndoSnapshot>> {
        read_json(&self.backup_path())
    }

    fn set_backup(&mut self, snapshot: &UndoSnapshot) -> Result<()> {
        write_json(&self.backup_path(), snapshot)
    }

    fn clear_backup(&mut self) -> Result<()> {
        let path = self.backup_path();
        if path.exists() {
            fs::remove_file(&path)?;
            debug!("removed {}", path.display());
        }
        Ok(())
    }
}

/// Read a JSON file; a missing file reads as `None`
///
/// An unparsable file is an error rather than an empty store, so a later
/// write cannot silently replace it.
fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path).map_err(|e| Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    serde_json::from_str(&content)
        .map(Some)
        .map_err(|e| Error::CorruptStore {
            path: path.to_path_buf(),
            source: e,
        })
}

/// Write JSON to a temp file beside `path`, then rename over it
fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let content = serde_json::to_string_pretty(value)?;
    let temp_path = temp_path_for(path);
    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&temp_path)?;
    file.write_all(content.as_bytes())?;
    file.sync_all()?;
    drop(file);

    #[cfg(target_os = "windows")]
    {
        if path.exists() {
            fs::remove_file(path)?;
        }
    }
    fs::rename(&temp_path, path)?;

    debug!("wrote {}", path.display());
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "store".into());
    name.push(format!(".tmp{}", std::process::id()));
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lang_codes_round_trip() {
        for lang in Lang::ALL {
            assert_eq!(lang.code().parse::<Lang>().unwrap(), lang);
        }
        assert_eq!("Japanese".parse::<Lang>().unwrap(), Lang::Secondary);
        assert!("fr".parse::<Lang>().is_err());
    }

    #[test]
    fn test_store_json_shape() {
        let mut store = TranslationStore::new();
        store.set(Lang::Primary, "home", "Home");
        store.set(Lang::Tertiary, "home", "Laman Utama");

        let json = serde_json::to_value(&store).unwrap();
        assert_eq!(json["en"]["home"], "Home");
        assert_eq!(json["malay"]["home"], "Laman Utama");
        assert!(json["jp"].as_object().unwrap().is_empty());
    }

    #[test]
    fn test_store_missing_languages_default() {
        let store: TranslationStore = serde_json::from_str(r#"{"en":{"a":"A"}}"#).unwrap();
        assert_eq!(store.get(Lang::Primary, "a"), Some("A"));
        assert!(store.secondary.is_empty());
        assert!(store.tertiary.is_empty());
    }

    #[test]
    fn test_contains_key_any_language() {
        let mut store = TranslationStore::new();
        assert!(store.is_empty());
        store.set(Lang::Secondary, "orphan", "孤児");
        assert!(store.contains_key("orphan"));
        assert!(!store.contains_key("other"));
        assert!(!store.is_empty());
    }

    #[test]
    fn test_memory_backend() {
        let mut backend = MemoryBackend::new();
        assert!(backend.get().unwrap().is_none());

        let mut store = TranslationStore::new();
        store.set(Lang::Primary, "k", "v");
        backend.set(&store).unwrap();
        assert_eq!(backend.get().unwrap(), Some(store.clone()));

        backend.set_backup(&UndoSnapshot::capture(&store)).unwrap();
        assert!(backend.get_backup().unwrap().is_some());
        backend.clear_backup().unwrap();
        assert!(backend.get_backup().unwrap().is_none());
    }
}
