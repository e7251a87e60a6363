//! Tool configuration loaded from a JSON file

use crate::error::{Error, Result};
use crate::store::JsonFileBackend;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default config file name, looked up in the working directory
pub const CONFIG_FILE: &str = "glossary.json";

/// Settings for the CLI and the file-backed store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GlossaryConfig {
    /// Directory holding the store and its undo snapshot
    pub data_dir: PathBuf,
    /// Log level: off, error, warn, info, debug or trace
    pub log_level: String,
    /// Use column 0 as English without asking when no header matches
    pub auto_confirm_primary: bool,
}

impl Default for GlossaryConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".glossary"),
            log_level: "warn".to_string(),
            auto_confirm_primary: false,
        }
    }
}

impl GlossaryConfig {
    /// Load a config file, or defaults if it does not exist
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Save the config as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// File backend rooted at `data_dir`
    pub fn backend(&self) -> JsonFileBackend {
        JsonFileBackend::new(&self.data_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_default() {
        let config: GlossaryConfig = serde_json::from_str(r#"{"dataDir": "store"}"#).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("store"));
        assert_eq!(config.log_level, "warn");
        assert!(!config.auto_confirm_primary);
    }

    #[test]
    fn test_missing_file_is_default() {
        let config = GlossaryConfig::load("no/such/glossary.json").unwrap();
        assert_eq!(config, GlossaryConfig::default());
    }

    #[test]
    fn test_serialized_field_names() {
        let json = serde_json::to_value(GlossaryConfig::default()).unwrap();
        assert_eq!(json["dataDir"], ".glossary");
        assert_eq!(json["autoConfirmPrimary"], false);
    }
}
