//! Flat-file persistence.
//!
//! Two JSON documents live in the data directory:
//! - `players.json`: the tracked roster
//! - `stats_cache.json`: cached composition aggregates
//!
//! Both are read whole and rewritten whole. Writes go to a sibling temporary
//! file that is renamed over the target, so readers see either the old or the
//! new document.

mod cache;
mod roster;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::debug;

pub use cache::{AggregateCache, CachedAggregate};
pub use roster::{RosterError, RosterStore};

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

/// Configuration for storage paths.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl StorageConfig {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn roster_path(&self) -> PathBuf {
        self.data_dir.join("players.json")
    }

    pub fn cache_path(&self) -> PathBuf {
        self.data_dir.join("stats_cache.json")
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(PathBuf::from("./data"))
    }
}

/// Read a JSON document. A missing or blank file yields `T::default()`.
pub fn read_document<T>(path: &Path) -> Result<T, StorageError>
where
    T: DeserializeOwned + Default,
{
    if !path.exists() {
        return Ok(T::default());
    }

    let contents = fs::read_to_string(path)?;
    if contents.trim().is_empty() {
        return Ok(T::default());
    }

    Ok(serde_json::from_str(&contents)?)
}

/// Replace a JSON document atomically (write temp file, then rename).
pub fn write_document<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent)?;

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| StorageError::InvalidPath(path.display().to_string()))?;
    let tmp_path = parent.join(format!(".{}.tmp", file_name));

    let json = serde_json::to_string_pretty(value)?;
    {
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.write_all(b"\n")?;
        file.sync_all()?;
    }
    fs::rename(&tmp_path, path)?;

    debug!("Wrote {:?}", path);
    Ok(())
}
