//! Per-language JSON files: export, import and key listing
//!
//! A language file is a flat JSON object `{ "key": "text", ... }`. The
//! combined file nests the three of them under their storage codes.

use crate::error::{Error, Result};
use crate::store::{Lang, LangMap, TranslationStore};
use log::info;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// Name of the combined export file
pub const ALL_FILE_NAME: &str = "all_translations.json";

/// Conventional file name for one language
pub fn language_file_name(lang: Lang) -> &'static str {
    match lang {
        Lang::Primary => "EN.json",
        Lang::Secondary => "JP.json",
        Lang::Tertiary => "Malay.json",
    }
}

/// One language as a flat JSON object, keys sorted
///
/// Fails with [`Error::EmptyLanguage`] when the language has no entries.
pub fn export_language(store: &TranslationStore, lang: Lang) -> Result<Value> {
    let map = store.lang(lang);
    if map.is_empty() {
        return Err(Error::EmptyLanguage(lang));
    }
    Ok(lang_map_to_json(map))
}

/// All three languages under their storage codes
pub fn export_all(store: &TranslationStore) -> Value {
    let mut root = Map::new();
    for lang in Lang::ALL {
        root.insert(lang.code().to_string(), lang_map_to_json(store.lang(lang)));
    }
    Value::Object(root)
}

fn lang_map_to_json(map: &LangMap) -> Value {
    Value::Object(
        map.iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect(),
    )
}

/// Write one language to a pretty-printed JSON file
pub fn write_language_file<P: AsRef<Path>>(store: &TranslationStore, lang: Lang, path: P) -> Result<()> {
    let json = export_language(store, lang)?;
    write_pretty(path.as_ref(), &json)?;
    info!("exported {} '{}' entries to {}", store.lang(lang).len(), lang, path.as_ref().display());
    Ok(())
}

/// Write the combined file
pub fn write_all_file<P: AsRef<Path>>(store: &TranslationStore, path: P) -> Result<()> {
    if store.is_empty() {
        return Err(Error::EmptyLanguage(Lang::Primary));
    }
    write_pretty(path.as_ref(), &export_all(store))?;
    info!("exported all languages to {}", path.as_ref().display());
    Ok(())
}

fn write_pretty(path: &Path, json: &Value) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(json)?)?;
    Ok(())
}

/// Parse a flat language object into a mapping
pub fn parse_language_json(json: &Value) -> Result<LangMap> {
    let object = json
        .as_object()
        .ok_or_else(|| Error::InvalidLanguageFile("expected a JSON object of key/text pairs".to_string()))?;

    object
        .iter()
        .map(|(key, value)| match value {
            Value::String(text) => Ok((key.clone(), text.clone())),
            other => Err(Error::InvalidLanguageFile(format!(
                "value for '{}' must be a string, found {}",
                key, other
            ))),
        })
        .collect()
}

/// Replace one language of the store with the contents of `json`
///
/// Returns the number of entries loaded. Other languages are left alone.
pub fn import_language(store: &mut TranslationStore, lang: Lang, json: &Value) -> Result<usize> {
    let map = parse_language_json(json)?;
    let count = map.len();
    *store.lang_mut(lang) = map;
    Ok(count)
}

/// Read and parse a language file from disk
pub fn read_language_file<P: AsRef<Path>>(path: P) -> Result<LangMap> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    let json: Value = serde_json::from_str(&content)?;
    parse_language_json(&json)
}

/// Sorted primary-language keys
pub fn key_list(store: &TranslationStore) -> Vec<String> {
    store.keys().map(str::to_string).collect()
}
