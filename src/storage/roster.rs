//! Roster persistence.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use super::{read_document, write_document, StorageConfig, StorageError};
use crate::models::{PlayerId, RosterEntry};

/// Roster invariant violations and storage failures.
#[derive(Debug, Error)]
pub enum RosterError {
    #[error("{0} is already on the roster")]
    DuplicateName(String),

    #[error("{0} is not on the roster")]
    NotFound(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// On-disk layout: `{"players": [...]}`.
#[derive(Debug, Default, Serialize, Deserialize)]
struct RosterDocument {
    #[serde(default)]
    players: Vec<RosterEntry>,
}

/// Tracked players, backed by one JSON file.
///
/// Every mutation is a read-modify-write of the whole file.
#[derive(Debug, Clone)]
pub struct RosterStore {
    path: PathBuf,
}

impl RosterStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn for_config(config: &StorageConfig) -> Self {
        Self::new(config.roster_path())
    }

    /// All entries in insertion order.
    pub fn list(&self) -> Result<Vec<RosterEntry>, RosterError> {
        Ok(read_document::<RosterDocument>(&self.path)?.players)
    }

    /// Case-insensitive lookup.
    pub fn find(&self, display_name: &str) -> Result<Option<RosterEntry>, RosterError> {
        Ok(self.list()?.into_iter().find(|p| p.is_named(display_name)))
    }

    pub fn contains(&self, display_name: &str) -> Result<bool, RosterError> {
        Ok(self.find(display_name)?.is_some())
    }

    pub fn add(&self, display_name: &str, player_id: PlayerId) -> Result<RosterEntry, RosterError> {
        let display_name = display_name.trim();
        let mut doc: RosterDocument = read_document(&self.path)?;
        if doc.players.iter().any(|p| p.is_named(display_name)) {
            return Err(RosterError::DuplicateName(display_name.to_string()));
        }

        let entry = RosterEntry::new(display_name, player_id);
        doc.players.push(entry.clone());
        write_document(&self.path, &doc)?;

        info!("Added {} to roster ({} players)", display_name, doc.players.len());
        Ok(entry)
    }

    /// Remove by case-insensitive name, returning the removed entry.
    pub fn remove(&self, display_name: &str) -> Result<RosterEntry, RosterError> {
        let mut doc: RosterDocument = read_document(&self.path)?;
        let index = doc
            .players
            .iter()
            .position(|p| p.is_named(display_name))
            .ok_or_else(|| RosterError::NotFound(display_name.trim().to_string()))?;

        let removed = doc.players.remove(index);
        write_document(&self.path, &doc)?;

        info!("Removed {} from roster", removed.display_name);
        Ok(removed)
    }

    /// Drop every entry.
    pub fn clear(&self) -> Result<(), RosterError> {
        write_document(&self.path, &RosterDocument::default())?;
        info!("Cleared roster");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(temp_dir: &TempDir) -> RosterStore {
        RosterStore::for_config(&StorageConfig::new(temp_dir.path().to_path_buf()))
    }

    #[test]
    fn test_empty_roster() {
        let temp_dir = TempDir::new().unwrap();
        assert!(store(&temp_dir).list().unwrap().is_empty());
    }

    #[test]
    fn test_add_and_list() {
        let temp_dir = TempDir::new().unwrap();
        let roster = store(&temp_dir);

        roster.add("Toto", PlayerId::from("pid1")).unwrap();
        roster.add("Titi", PlayerId::from("pid2")).unwrap();

        let names: Vec<_> = roster
            .list()
            .unwrap()
            .into_iter()
            .map(|p| p.display_name)
            .collect();
        assert_eq!(names, vec!["Toto", "Titi"]);
    }

    #[test]
    fn test_add_duplicate_differing_in_case() {
        let temp_dir = TempDir::new().unwrap();
        let roster = store(&temp_dir);

        roster.add("Toto", PlayerId::from("pid1")).unwrap();
        let err = roster.add("tOTO", PlayerId::from("pid9")).unwrap_err();

        assert!(matches!(err, RosterError::DuplicateName(ref n) if n == "tOTO"));
        assert_eq!(roster.list().unwrap().len(), 1);
    }

    #[test]
    fn test_remove_unknown_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let roster = store(&temp_dir);

        let err = roster.remove("Ghost").unwrap_err();
        assert!(matches!(err, RosterError::NotFound(_)));
    }

    #[test]
    fn test_remove_case_insensitive() {
        let temp_dir = TempDir::new().unwrap();
        let roster = store(&temp_dir);
        roster.add("Toto", PlayerId::from("pid1")).unwrap();

        let removed = roster.remove("TOTO").unwrap();
        assert_eq!(removed.player_id, PlayerId::from("pid1"));
        assert!(roster.list().unwrap().is_empty());
    }

    #[test]
    fn test_find_and_clear() {
        let temp_dir = TempDir::new().unwrap();
        let roster = store(&temp_dir);
        roster.add("Jean Claude", PlayerId::from("pid1")).unwrap();

        assert!(roster.contains("jean claude").unwrap());
        assert_eq!(
            roster.find("JEAN CLAUDE").unwrap().unwrap().player_id,
            PlayerId::from("pid1")
        );

        roster.clear().unwrap();
        assert!(roster.list().unwrap().is_empty());
        assert!(roster.find("Jean Claude").unwrap().is_none());
    }

    #[test]
    fn test_reads_legacy_document() {
        let temp_dir = TempDir::new().unwrap();
        let roster = store(&temp_dir);
        std::fs::write(
            temp_dir.path().join("players.json"),
            r#"{"players": [{"name": "Toto", "uuid": "pid1"}]}"#,
        )
        .unwrap();

        let players = roster.list().unwrap();
        assert_eq!(players, vec![RosterEntry::new("Toto", PlayerId::from("pid1"))]);
    }
}
