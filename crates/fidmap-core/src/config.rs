use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Map session configuration, owned by the [`Map`](crate::Map) it configures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Directory holding the map file.
    pub directory: PathBuf,
    /// Map file name without the `.xml` extension.
    pub base_name: String,
    pub tag_heights_file: Option<PathBuf>,
    /// Log every announcement and update summary at `info` instead of `debug`.
    pub log_updates: bool,
    /// Diagonal given to the root tag when it is initialised before its size was observed.
    pub default_diagonal: f64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            base_name: "Map".to_string(),
            tag_heights_file: None,
            log_updates: false,
            default_diagonal: 1.0,
        }
    }
}

impl MapConfig {
    pub fn new(directory: impl Into<PathBuf>, base_name: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            base_name: base_name.into(),
            ..Self::default()
        }
    }

    /// `<directory>/<base_name>.xml`
    pub fn map_path(&self) -> PathBuf {
        self.directory.join(format!("{}.xml", self.base_name))
    }

    pub fn from_json_str(text: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|err| Error::io(path, err))?;
        Self::from_json_str(&text).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })
    }
}
