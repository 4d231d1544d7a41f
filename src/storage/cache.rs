//! Cached composition aggregates.
//!
//! Keyed by player id. With no `max_age` an entry is reused until the player
//! is removed or the cache is cleared, however many games have been played
//! since it was computed.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{read_document, write_document, StorageConfig, StorageError};
use crate::models::{AggregateSnapshot, CompositionBucket, PlayerId};

/// One cached aggregate as stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedAggregate {
    pub display_name: String,
    pub region: String,
    pub computed_at: DateTime<Utc>,
    pub lookback_count: u32,
    pub buckets: Vec<CompositionBucket>,
}

impl CachedAggregate {
    pub fn into_snapshot(self, player_id: PlayerId) -> AggregateSnapshot {
        AggregateSnapshot {
            player_id,
            region: self.region,
            buckets: self.buckets,
        }
    }

    /// Whether this entry is still usable at `now` under `max_age`.
    pub fn is_fresh(&self, max_age: Option<Duration>, now: DateTime<Utc>) -> bool {
        match max_age {
            None => true,
            Some(max_age) => match TimeDelta::from_std(max_age) {
                Ok(max_age) => now.signed_duration_since(self.computed_at) <= max_age,
                Err(_) => true,
            },
        }
    }
}

type CacheDocument = BTreeMap<PlayerId, CachedAggregate>;

/// File-backed aggregate cache.
#[derive(Debug, Clone)]
pub struct AggregateCache {
    path: PathBuf,
    max_age: Option<Duration>,
}

impl AggregateCache {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            max_age: None,
        }
    }

    pub fn for_config(config: &StorageConfig) -> Self {
        Self::new(config.cache_path())
    }

    /// Expire entries older than `max_age`. `None` keeps them forever.
    pub fn with_max_age(mut self, max_age: Option<Duration>) -> Self {
        self.max_age = max_age;
        self
    }

    /// Cached snapshot for a player, if present and fresh.
    pub fn get(&self, player_id: &PlayerId) -> Result<Option<AggregateSnapshot>, StorageError> {
        Ok(self
            .get_entry(player_id)?
            .map(|entry| entry.into_snapshot(player_id.clone())))
    }

    /// Raw cache entry, if present and fresh.
    pub fn get_entry(&self, player_id: &PlayerId) -> Result<Option<CachedAggregate>, StorageError> {
        let mut doc: CacheDocument = read_document(&self.path)?;
        let entry = match doc.remove(player_id) {
            Some(entry) => entry,
            None => return Ok(None),
        };

        if entry.is_fresh(self.max_age, Utc::now()) {
            debug!("Cache hit for {}", player_id);
            Ok(Some(entry))
        } else {
            debug!("Cache entry for {} is stale", player_id);
            Ok(None)
        }
    }

    /// Store a freshly computed snapshot, replacing any previous entry.
    pub fn put(
        &self,
        display_name: &str,
        snapshot: &AggregateSnapshot,
        lookback_count: u32,
    ) -> Result<(), StorageError> {
        self.put_entry(
            &snapshot.player_id,
            CachedAggregate {
                display_name: display_name.to_string(),
                region: snapshot.region.clone(),
                computed_at: Utc::now(),
                lookback_count,
                buckets: snapshot.buckets.clone(),
            },
        )
    }

    pub fn put_entry(
        &self,
        player_id: &PlayerId,
        entry: CachedAggregate,
    ) -> Result<(), StorageError> {
        let mut doc: CacheDocument = read_document(&self.path)?;
        doc.insert(player_id.clone(), entry);
        write_document(&self.path, &doc)?;
        debug!("Cached aggregate for {}", player_id);
        Ok(())
    }

    /// Drop one player's entry. Returns whether anything was removed.
    pub fn remove(&self, player_id: &PlayerId) -> Result<bool, StorageError> {
        let mut doc: CacheDocument = read_document(&self.path)?;
        if doc.remove(player_id).is_none() {
            return Ok(false);
        }
        write_document(&self.path, &doc)?;
        debug!("Evicted cached aggregate for {}", player_id);
        Ok(true)
    }

    /// Drop every entry.
    pub fn clear(&self) -> Result<usize, StorageError> {
        let doc: CacheDocument = read_document(&self.path)?;
        write_document(&self.path, &CacheDocument::new())?;
        info!("Cleared {} cached aggregates", doc.len());
        Ok(doc.len())
    }
}
