//! In-memory ladder for tests and offline runs.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use super::{FetchError, FetchOutcome, LadderClient};
use crate::models::{MatchData, MatchId, PlayerId, RankRecord};

/// A fixed ladder. Unknown lookups are absent; ids marked failing error out.
#[derive(Default)]
pub struct InMemoryLadder {
    region: String,
    accounts: HashMap<(String, String), PlayerId>,
    ranks: HashMap<PlayerId, RankRecord>,
    match_ids: HashMap<PlayerId, Vec<MatchId>>,
    matches: HashMap<MatchId, MatchData>,
    failing_matches: HashSet<MatchId>,
    match_delay: Option<Duration>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    match_requests: AtomicUsize,
}

impl InMemoryLadder {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            ..Default::default()
        }
    }

    pub fn with_account(mut self, game_name: &str, tag_line: &str, player_id: PlayerId) -> Self {
        self.accounts.insert(
            (game_name.to_lowercase(), tag_line.to_lowercase()),
            player_id,
        );
        self
    }

    pub fn with_rank(mut self, player_id: PlayerId, rank: RankRecord) -> Self {
        self.ranks.insert(player_id, rank);
        self
    }

    /// Register match history for a player, most recent first.
    pub fn with_history(mut self, player_id: PlayerId, ids: Vec<MatchId>) -> Self {
        self.match_ids.insert(player_id, ids);
        self
    }

    pub fn with_match(mut self, data: MatchData) -> Self {
        self.matches.insert(data.match_id.clone(), data);
        self
    }

    /// Make `get_match` fail for this id.
    pub fn with_failing_match(mut self, match_id: MatchId) -> Self {
        self.failing_matches.insert(match_id);
        self
    }

    /// Hold each `get_match` call open for `delay`.
    pub fn with_match_delay(mut self, delay: Duration) -> Self {
        self.match_delay = Some(delay);
        self
    }

    /// Highest number of `get_match` calls observed in flight at once.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    /// Total `get_match` calls served.
    pub fn match_requests(&self) -> usize {
        self.match_requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LadderClient for InMemoryLadder {
    fn region(&self) -> &str {
        &self.region
    }

    async fn resolve_identity(&self, game_name: &str, tag_line: &str) -> FetchOutcome<PlayerId> {
        let key = (game_name.to_lowercase(), tag_line.to_lowercase());
        match self.accounts.get(&key) {
            Some(id) => FetchOutcome::Found(id.clone()),
            None => FetchOutcome::Absent,
        }
    }

    async fn get_rank(&self, player_id: &PlayerId) -> FetchOutcome<RankRecord> {
        match self.ranks.get(player_id) {
            Some(rank) => FetchOutcome::Found(rank.clone()),
            None => FetchOutcome::Absent,
        }
    }

    async fn list_recent_match_ids(
        &self,
        player_id: &PlayerId,
        count: u32,
    ) -> FetchOutcome<Vec<MatchId>> {
        let ids = self
            .match_ids
            .get(player_id)
            .map(|ids| ids.iter().take(count as usize).cloned().collect())
            .unwrap_or_default();
        FetchOutcome::Found(ids)
    }

    async fn get_match(&self, match_id: &MatchId) -> FetchOutcome<MatchData> {
        self.match_requests.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.match_delay {
            tokio::time::sleep(delay).await;
        }

        let outcome = if self.failing_matches.contains(match_id) {
            FetchOutcome::Failed(FetchError::HttpStatus {
                status: 503,
                message: "Service Unavailable".to_string(),
            })
        } else {
            match self.matches.get(match_id) {
                Some(data) => FetchOutcome::Found(data.clone()),
                None => FetchOutcome::Absent,
            }
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        outcome
    }
}
