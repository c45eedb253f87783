//! On-disk copy of schedule data, valid for as long as the server's cache flush date
//! stays the same.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::path_date;
use crate::api::schedule::TerminalCombo;
use crate::api::terminals::Terminal;

#[derive(thiserror::Error, Debug)]
pub enum CacheError {
    #[error("cache file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cache encoding: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cache {
    pub terminals: Vec<Terminal>,
    pub sailings: HashMap<String, TerminalCombo>,
    pub cache_flush_date: String,
}

impl Cache {
    pub fn load(path: &Path) -> Result<Self, CacheError> {
        let raw = fs::read_to_string(path).map_err(|source| CacheError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), CacheError> {
        let encoded = serde_json::to_string(self)?;
        fs::write(path, encoded).map_err(|source| CacheError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "Saved cache");
        Ok(())
    }

    /// Drop everything cached under an older flush date.
    pub fn invalidate(&mut self, flush_date: &str) {
        self.terminals.clear();
        self.sailings.clear();
        self.cache_flush_date = flush_date.to_string();
    }

    pub fn sailing(&self, date: NaiveDate, from: i32, to: i32) -> Option<&TerminalCombo> {
        self.sailings.get(&sailing_key(date, from, to))
    }

    pub fn insert_sailing(&mut self, date: NaiveDate, from: i32, to: i32, combo: TerminalCombo) {
        self.sailings.insert(sailing_key(date, from, to), combo);
    }
}

fn sailing_key(date: NaiveDate, from: i32, to: i32) -> String {
    format!("{} {} {}", path_date(date), from, to)
}

/// `~/.wsf.cache`
pub fn default_cache_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".wsf.cache"))
}
