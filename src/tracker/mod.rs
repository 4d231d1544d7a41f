//! Tracker operations.
//!
//! Each method is one user-visible command: it reads the roster, talks to
//! the ladder, consults the cache, and returns plain values for the report
//! renderer. Nothing here formats output.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{info, warn};

use crate::aggregate::{AggregationReport, CompositionAggregator};
use crate::calculate::{head_to_head, score_record, sort_by_score, Side};
use crate::config::{AggregationConfig, AppConfig};
use crate::fetch::{FetchOutcome, LadderClient};
use crate::models::{
    AggregateSnapshot, CompositionBucket, MatchParticipation, RankRecord, RiotId, RosterEntry,
};
use crate::storage::{AggregateCache, RosterError, RosterStore, StorageConfig, StorageError};

/// Rows shown on the leaderboard.
pub const LEADERBOARD_SIZE: usize = 10;

/// Errors surfaced to the user.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("Invalid Riot ID {0:?}, expected Name#TAG")]
    InvalidRiotId(String),

    #[error("{0} is not on the roster")]
    UnknownPlayer(String),

    #[error("{0} was not found on the ladder")]
    PlayerNotFound(String),

    #[error("{0} has no ranked standing")]
    NotRanked(String),

    #[error(transparent)]
    Roster(#[from] RosterError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// One ranked row of the leaderboard.
#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardRow {
    pub display_name: String,
    pub rank: RankRecord,
    pub score: u32,
}

/// Roster sorted by ladder score.
#[derive(Debug, Clone, PartialEq)]
pub struct Leaderboard {
    pub region: String,
    /// Highest score first; equal scores keep roster order
    pub ranked: Vec<LeaderboardRow>,
    /// Players without a ranked standing, in roster order
    pub unranked: Vec<String>,
}

/// A single player's standing.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerStats {
    pub display_name: String,
    pub region: String,
    pub rank: Option<RankRecord>,
}

/// Two ranked players side by side.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub first: LeaderboardRow,
    pub second: LeaderboardRow,
    pub leader: Side,
}

impl Comparison {
    pub fn leader_name(&self) -> &str {
        match self.leader {
            Side::First => &self.first.display_name,
            Side::Second => &self.second.display_name,
        }
    }
}

/// Recent matches of one player, most recent first.
#[derive(Debug, Clone, PartialEq)]
pub struct History {
    pub display_name: String,
    pub matches: Vec<MatchParticipation>,
}

/// Composition breakdown for one player.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositionReport {
    pub display_name: String,
    pub snapshot: AggregateSnapshot,
    pub from_cache: bool,
    pub computed_at: Option<DateTime<Utc>>,
    /// Present when the snapshot was just computed
    pub aggregation: Option<AggregationReport>,
    pub min_sample: u32,
}

impl CompositionReport {
    pub fn most_played(&self) -> Option<&CompositionBucket> {
        self.snapshot.most_played()
    }

    pub fn best(&self) -> Option<&CompositionBucket> {
        self.snapshot.best(self.min_sample)
    }

    pub fn worst(&self) -> Option<&CompositionBucket> {
        self.snapshot.worst(self.min_sample)
    }
}

/// Split `"first vs second"`.
pub fn parse_versus(s: &str) -> Option<(String, String)> {
    let (first, second) = s.split_once(" vs ")?;
    let (first, second) = (first.trim(), second.trim());
    if first.is_empty() || second.is_empty() {
        return None;
    }
    Some((first.to_string(), second.to_string()))
}

/// Roster, ladder and cache behind the user commands.
pub struct Tracker {
    client: Arc<dyn LadderClient>,
    roster: RosterStore,
    cache: AggregateCache,
    aggregator: CompositionAggregator,
    settings: AggregationConfig,
}

impl Tracker {
    pub fn new(
        client: Arc<dyn LadderClient>,
        roster: RosterStore,
        cache: AggregateCache,
        aggregator: CompositionAggregator,
        settings: AggregationConfig,
    ) -> Self {
        Self {
            client,
            roster,
            cache,
            aggregator,
            settings,
        }
    }

    /// Wire a tracker from application configuration.
    pub fn from_config(client: Arc<dyn LadderClient>, config: &AppConfig) -> Self {
        let storage = StorageConfig::new(config.data_dir.clone());
        let aggregator = CompositionAggregator::new(client.clone(), config.aggregator_config());
        Self::new(
            client,
            RosterStore::for_config(&storage),
            AggregateCache::for_config(&storage).with_max_age(config.cache.max_age()),
            aggregator,
            config.aggregation.clone(),
        )
    }

    pub fn region(&self) -> &str {
        self.client.region()
    }

    fn lookup(&self, display_name: &str) -> Result<RosterEntry, TrackerError> {
        self.roster
            .find(display_name)?
            .ok_or_else(|| TrackerError::UnknownPlayer(display_name.trim().to_string()))
    }

    async fn rank_of(&self, entry: &RosterEntry) -> Option<RankRecord> {
        match self.client.get_rank(&entry.player_id).await {
            FetchOutcome::Found(rank) => Some(rank),
            FetchOutcome::Absent => None,
            FetchOutcome::Failed(e) => {
                warn!("Rank lookup for {} failed: {}", entry.display_name, e);
                None
            }
        }
    }

    /// Track a player given as `Name#TAG`.
    pub async fn add_player(&self, riot_id: &str) -> Result<RosterEntry, TrackerError> {
        let id = RiotId::parse(riot_id)
            .ok_or_else(|| TrackerError::InvalidRiotId(riot_id.to_string()))?;

        if self.roster.contains(&id.game_name)? {
            return Err(RosterError::DuplicateName(id.game_name).into());
        }

        let player_id = match self
            .client
            .resolve_identity(&id.game_name, &id.tag_line)
            .await
        {
            FetchOutcome::Found(player_id) => player_id,
            FetchOutcome::Absent => return Err(TrackerError::PlayerNotFound(id.to_string())),
            FetchOutcome::Failed(e) => {
                warn!("Could not resolve {}: {}", id, e);
                return Err(TrackerError::PlayerNotFound(id.to_string()));
            }
        };

        Ok(self.roster.add(&id.game_name, player_id)?)
    }

    /// Stop tracking a player and drop their cached aggregate.
    pub fn remove_player(&self, display_name: &str) -> Result<RosterEntry, TrackerError> {
        let removed = self.roster.remove(display_name)?;
        self.cache.remove(&removed.player_id)?;
        Ok(removed)
    }

    /// Drop the whole roster and every cached aggregate.
    pub fn clear_roster(&self) -> Result<(), TrackerError> {
        self.roster.clear()?;
        self.cache.clear()?;
        Ok(())
    }

    pub fn clear_cache(&self) -> Result<usize, TrackerError> {
        Ok(self.cache.clear()?)
    }

    pub fn players(&self) -> Result<Vec<RosterEntry>, TrackerError> {
        Ok(self.roster.list()?)
    }

    /// Every tracked player's standing, best first.
    pub async fn leaderboard(&self) -> Result<Leaderboard, TrackerError> {
        let mut ranked = Vec::new();
        let mut unranked = Vec::new();

        for entry in self.roster.list()? {
            match self.rank_of(&entry).await {
                Some(rank) => ranked.push(LeaderboardRow {
                    score: score_record(&rank),
                    display_name: entry.display_name,
                    rank,
                }),
                None => unranked.push(entry.display_name),
            }
        }

        sort_by_score(&mut ranked, |row| &row.rank);

        Ok(Leaderboard {
            region: self.region().to_string(),
            ranked,
            unranked,
        })
    }

    pub async fn player_stats(&self, display_name: &str) -> Result<PlayerStats, TrackerError> {
        let entry = self.lookup(display_name)?;
        let rank = self.rank_of(&entry).await;
        Ok(PlayerStats {
            display_name: entry.display_name,
            region: self.region().to_string(),
            rank,
        })
    }

    /// Head-to-head of two ranked players. A tie goes to `first`.
    pub async fn compare(&self, first: &str, second: &str) -> Result<Comparison, TrackerError> {
        let a = self.lookup(first)?;
        let b = self.lookup(second)?;

        let rank_a = self
            .rank_of(&a)
            .await
            .ok_or_else(|| TrackerError::NotRanked(a.display_name.clone()))?;
        let rank_b = self
            .rank_of(&b)
            .await
            .ok_or_else(|| TrackerError::NotRanked(b.display_name.clone()))?;

        let leader = head_to_head(&rank_a, &rank_b);
        Ok(Comparison {
            first: LeaderboardRow {
                display_name: a.display_name,
                score: score_record(&rank_a),
                rank: rank_a,
            },
            second: LeaderboardRow {
                display_name: b.display_name,
                score: score_record(&rank_b),
                rank: rank_b,
            },
            leader,
        })
    }

    /// Recent matches of any queue. Unavailable matches are left out.
    pub async fn history(
        &self,
        display_name: &str,
        count: Option<u32>,
    ) -> Result<History, TrackerError> {
        let entry = self.lookup(display_name)?;
        let count = count.unwrap_or(self.settings.history_count);

        let ids = self
            .client
            .list_recent_match_ids(&entry.player_id, count)
            .await
            .found()
            .unwrap_or_default();

        let matches = self
            .aggregator
            .fetch_matches(ids)
            .await
            .into_iter()
            .filter_map(|(_, outcome)| outcome.found())
            .filter_map(|data| data.participation(&entry.player_id))
            .collect();

        Ok(History {
            display_name: entry.display_name,
            matches,
        })
    }

    /// Composition breakdown, served from cache unless `refresh` is set.
    pub async fn compositions(
        &self,
        display_name: &str,
        refresh: bool,
    ) -> Result<CompositionReport, TrackerError> {
        let entry = self.lookup(display_name)?;

        let cached = if refresh {
            None
        } else {
            self.cache.get_entry(&entry.player_id).unwrap_or_else(|e| {
                warn!("Could not read cached compositions for {}: {}", entry.display_name, e);
                None
            })
        };

        if let Some(cached) = cached {
            info!("Using cached compositions for {}", entry.display_name);
            return Ok(CompositionReport {
                display_name: entry.display_name,
                computed_at: Some(cached.computed_at),
                snapshot: cached.into_snapshot(entry.player_id),
                from_cache: true,
                aggregation: None,
                min_sample: self.settings.min_sample,
            });
        }

        let lookback = self.settings.lookback_count;
        let (snapshot, report) = self
            .aggregator
            .aggregate_with_report(&entry.player_id, lookback)
            .await;
        if let Err(e) = self.cache.put(&entry.display_name, &snapshot, lookback) {
            warn!("Could not cache compositions for {}: {}", entry.display_name, e);
        }

        Ok(CompositionReport {
            display_name: entry.display_name,
            snapshot,
            from_cache: false,
            computed_at: Some(Utc::now()),
            aggregation: Some(report),
            min_sample: self.settings.min_sample,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::InMemoryLadder;
    use crate::models::{
        Division, MatchData, MatchId, Participant, PlayerId, Tier, Trait,
    };
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn config(temp_dir: &TempDir) -> AppConfig {
        AppConfig {
            data_dir: temp_dir.path().to_path_buf(),
            ..AppConfig::default()
        }
    }

    fn tracker(temp_dir: &TempDir, ladder: InMemoryLadder) -> Tracker {
        Tracker::from_config(Arc::new(ladder), &config(temp_dir))
    }

    fn ranked_game(id: &str, player: &str, placement: u32, trait_name: &str) -> MatchData {
        MatchData {
            match_id: MatchId::from(id),
            queue_id: 1100,
            game_mode_tag: "standard".to_string(),
            participants: vec![Participant {
                player_id: PlayerId::from(player),
                placement,
                eliminated_at_seconds: 1500.0 + placement as f64 * 60.0,
                traits: vec![Trait::new(trait_name, 2, 6)],
                units: vec![],
            }],
        }
    }

    fn base_ladder() -> InMemoryLadder {
        InMemoryLadder::new("euw1")
            .with_account("Toto", "EUW", PlayerId::from("pid1"))
            .with_account("Titi", "EUW", PlayerId::from("pid2"))
            .with_account("Tutu", "EUW", PlayerId::from("pid3"))
            .with_rank(
                PlayerId::from("pid1"),
                RankRecord::new(Tier::Gold, Some(Division::Two), 40).with_record(10, 10),
            )
            .with_rank(
                PlayerId::from("pid2"),
                RankRecord::new(Tier::Platinum, Some(Division::Four), 12).with_record(30, 22),
            )
    }

    #[tokio::test]
    async fn test_add_resolves_and_persists() {
        let temp_dir = TempDir::new().unwrap();
        let tracker = tracker(&temp_dir, base_ladder());

        let entry = tracker.add_player("Toto#EUW").await.unwrap();
        assert_eq!(entry.display_name, "Toto");
        assert_eq!(entry.player_id, PlayerId::from("pid1"));
        assert_eq!(tracker.players().unwrap(), vec![entry]);
    }

    #[tokio::test]
    async fn test_add_rejects_bad_input() {
        let temp_dir = TempDir::new().unwrap();
        let tracker = tracker(&temp_dir, base_ladder());

        assert!(matches!(
            tracker.add_player("Toto").await,
            Err(TrackerError::InvalidRiotId(_))
        ));
        assert!(matches!(
            tracker.add_player("Nobody#EUW").await,
            Err(TrackerError::PlayerNotFound(_))
        ));

        tracker.add_player("Toto#EUW").await.unwrap();
        assert!(matches!(
            tracker.add_player("toto#EUW").await,
            Err(TrackerError::Roster(RosterError::DuplicateName(_)))
        ));
    }

    #[tokio::test]
    async fn test_end_to_end_score() {
        let temp_dir = TempDir::new().unwrap();
        let tracker = tracker(&temp_dir, base_ladder());
        tracker.add_player("Toto#EUW").await.unwrap();

        let board = tracker.leaderboard().await.unwrap();
        assert_eq!(board.ranked.len(), 1);
        assert_eq!(board.ranked[0].display_name, "Toto");
        assert_eq!(board.ranked[0].score, 420_040);
    }

    #[tokio::test]
    async fn test_leaderboard_sorted_with_unranked() {
        let temp_dir = TempDir::new().unwrap();
        let tracker = tracker(&temp_dir, base_ladder());
        for id in ["Toto#EUW", "Tutu#EUW", "Titi#EUW"] {
            tracker.add_player(id).await.unwrap();
        }

        let board = tracker.leaderboard().await.unwrap();
        let names: Vec<_> = board.ranked.iter().map(|r| r.display_name.as_str()).collect();

        assert_eq!(names, vec!["Titi", "Toto"]);
        assert_eq!(board.unranked, vec!["Tutu".to_string()]);
        assert_eq!(board.region, "euw1");
    }

    #[tokio::test]
    async fn test_compare() {
        let temp_dir = TempDir::new().unwrap();
        let tracker = tracker(&temp_dir, base_ladder());
        for id in ["Toto#EUW", "Tutu#EUW", "Titi#EUW"] {
            tracker.add_player(id).await.unwrap();
        }

        let cmp = tracker.compare("toto", "TITI").await.unwrap();
        assert_eq!(cmp.leader, Side::Second);
        assert_eq!(cmp.leader_name(), "Titi");

        assert!(matches!(
            tracker.compare("Toto", "Tutu").await,
            Err(TrackerError::NotRanked(ref n)) if n == "Tutu"
        ));
        assert!(matches!(
            tracker.compare("Toto", "Ghost").await,
            Err(TrackerError::UnknownPlayer(_))
        ));
    }

    #[tokio::test]
    async fn test_stats_for_unranked_player() {
        let temp_dir = TempDir::new().unwrap();
        let tracker = tracker(&temp_dir, base_ladder());
        tracker.add_player("Tutu#EUW").await.unwrap();

        let stats = tracker.player_stats("tutu").await.unwrap();
        assert_eq!(stats.display_name, "Tutu");
        assert!(stats.rank.is_none());
    }

    #[tokio::test]
    async fn test_history_includes_all_queues() {
        let temp_dir = TempDir::new().unwrap();
        let mut normal = ranked_game("EUW1_2", "pid1", 6, "TFT16_Zaun");
        normal.queue_id = 1090;
        let ladder = base_ladder()
            .with_history(
                PlayerId::from("pid1"),
                vec![MatchId::from("EUW1_3"), MatchId::from("EUW1_2"), MatchId::from("EUW1_1")],
            )
            .with_match(ranked_game("EUW1_3", "pid1", 1, "TFT16_Zaun"))
            .with_match(normal)
            .with_match(ranked_game("EUW1_1", "pid1", 4, "TFT16_Ionia"));
        let tracker = tracker(&temp_dir, ladder);
        tracker.add_player("Toto#EUW").await.unwrap();

        let history = tracker.history("Toto", Some(2)).await.unwrap();
        let placements: Vec<_> = history.matches.iter().map(|m| m.placement).collect();
        assert_eq!(placements, vec![1, 6]);
    }

    #[tokio::test]
    async fn test_compositions_cached_until_refresh() {
        let temp_dir = TempDir::new().unwrap();
        let ladder = Arc::new(
            base_ladder()
                .with_history(
                    PlayerId::from("pid1"),
                    vec![MatchId::from("EUW1_2"), MatchId::from("EUW1_1")],
                )
                .with_match(ranked_game("EUW1_2", "pid1", 2, "TFT16_Zaun"))
                .with_match(ranked_game("EUW1_1", "pid1", 7, "TFT16_Ionia")),
        );
        let tracker = Tracker::from_config(ladder.clone(), &config(&temp_dir));
        tracker.add_player("Toto#EUW").await.unwrap();

        let first = tracker.compositions("Toto", false).await.unwrap();
        assert!(!first.from_cache);
        assert_eq!(first.snapshot.buckets.len(), 2);
        assert_eq!(first.aggregation.as_ref().unwrap().folded, 2);
        assert_eq!(ladder.match_requests(), 2);

        let second = tracker.compositions("Toto", false).await.unwrap();
        assert!(second.from_cache);
        assert_eq!(second.snapshot, first.snapshot);
        assert_eq!(ladder.match_requests(), 2);

        let refreshed = tracker.compositions("Toto", true).await.unwrap();
        assert!(!refreshed.from_cache);
        assert_eq!(ladder.match_requests(), 4);

        assert_eq!(first.best().unwrap().signature, "Zaun");
        assert_eq!(first.worst().unwrap().signature, "Ionia");
    }

    #[tokio::test]
    async fn test_compositions_survive_unusable_cache() {
        let temp_dir = TempDir::new().unwrap();
        let ladder = base_ladder()
            .with_history(PlayerId::from("pid1"), vec![MatchId::from("EUW1_1")])
            .with_match(ranked_game("EUW1_1", "pid1", 3, "TFT16_Zaun"));
        let tracker = tracker(&temp_dir, ladder);
        tracker.add_player("Toto#EUW").await.unwrap();

        // A directory where the cache document should be makes every cache read and write fail
        std::fs::create_dir(temp_dir.path().join("stats_cache.json")).unwrap();

        for _ in 0..2 {
            let report = tracker.compositions("Toto", false).await.unwrap();
            assert!(!report.from_cache);
            assert_eq!(report.snapshot.total_games(), 1);
            assert_eq!(report.most_played().unwrap().signature, "Zaun");
        }
    }

    #[tokio::test]
    async fn test_remove_evicts_cache() {
        let temp_dir = TempDir::new().unwrap();
        let tracker = tracker(&temp_dir, base_ladder());
        tracker.add_player("Toto#EUW").await.unwrap();
        tracker.compositions("Toto", false).await.unwrap();

        let cache = AggregateCache::for_config(&StorageConfig::new(temp_dir.path().to_path_buf()));
        assert!(cache.get(&PlayerId::from("pid1")).unwrap().is_some());

        tracker.remove_player("TOTO").unwrap();
        assert!(cache.get(&PlayerId::from("pid1")).unwrap().is_none());
        assert!(matches!(
            tracker.remove_player("Toto"),
            Err(TrackerError::Roster(RosterError::NotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_clear_roster() {
        let temp_dir = TempDir::new().unwrap();
        let tracker = tracker(&temp_dir, base_ladder());
        tracker.add_player("Toto#EUW").await.unwrap();
        tracker.add_player("Titi#EUW").await.unwrap();

        tracker.clear_roster().unwrap();
        assert!(tracker.players().unwrap().is_empty());
    }

    #[test]
    fn test_parse_versus() {
        assert_eq!(
            parse_versus("Jean Claude vs Claude Jean"),
            Some(("Jean Claude".to_string(), "Claude Jean".to_string()))
        );
        assert_eq!(parse_versus("Toto"), None);
        assert_eq!(parse_versus(" vs Toto"), None);
    }
}
