//! Composition aggregation.
//!
//! Pulls a player's recent match history, keeps ranked games from the
//! tracked content generation, and folds each one into a bucket keyed by
//! its dominant trait:
//! 1. List recent match ids
//! 2. Fetch matches concurrently behind a semaphore
//! 3. Filter by queue, participation and generation
//! 4. Derive the signature and record the placement
//!
//! Any match that cannot be fetched or classified is skipped; the batch
//! always completes.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::calculate::{derive_signature, in_generation};
use crate::fetch::{FetchError, FetchOutcome, LadderClient};
use crate::models::{AggregateSnapshot, MatchData, MatchId, PlayerId};

/// Queue id of ranked Teamfight Tactics.
pub const RANKED_QUEUE_ID: u32 = 1100;

/// Trait prefix of the tracked content generation.
pub const DEFAULT_SET_PREFIX: &str = "TFT16_";

/// Outbound match fetches allowed in flight at once.
pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 5;

/// Configuration for the aggregator.
#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    /// Only matches from this queue are counted
    pub ranked_queue_id: u32,

    /// Trait name prefix of the tracked generation; empty disables the filter
    pub set_prefix: String,

    /// Semaphore size for match fetches
    pub max_concurrent_fetches: usize,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            ranked_queue_id: RANKED_QUEUE_ID,
            set_prefix: DEFAULT_SET_PREFIX.to_string(),
            max_concurrent_fetches: DEFAULT_MAX_CONCURRENT_FETCHES,
        }
    }
}

/// Why a match did not make it into the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    FetchFailed,
    Absent,
    WrongQueue,
    MissingParticipant,
    OtherGeneration,
    NoSignature,
}

/// Counters for one aggregation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregationReport {
    pub requested: u32,
    pub folded: u32,
    pub fetch_failed: u32,
    pub absent: u32,
    pub wrong_queue: u32,
    pub missing_participant: u32,
    pub other_generation: u32,
    pub no_signature: u32,
}

impl AggregationReport {
    fn skip(&mut self, reason: SkipReason) {
        match reason {
            SkipReason::FetchFailed => self.fetch_failed += 1,
            SkipReason::Absent => self.absent += 1,
            SkipReason::WrongQueue => self.wrong_queue += 1,
            SkipReason::MissingParticipant => self.missing_participant += 1,
            SkipReason::OtherGeneration => self.other_generation += 1,
            SkipReason::NoSignature => self.no_signature += 1,
        }
    }

    pub fn skipped(&self) -> u32 {
        self.requested - self.folded
    }
}

/// Builds [`AggregateSnapshot`]s from the remote match history.
pub struct CompositionAggregator {
    client: Arc<dyn LadderClient>,
    config: AggregatorConfig,
}

impl CompositionAggregator {
    pub fn new(client: Arc<dyn LadderClient>, config: AggregatorConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// Aggregate up to `lookback_count` recent matches.
    pub async fn aggregate(&self, player_id: &PlayerId, lookback_count: u32) -> AggregateSnapshot {
        self.aggregate_with_report(player_id, lookback_count).await.0
    }

    /// Aggregate and report what was skipped and why.
    pub async fn aggregate_with_report(
        &self,
        player_id: &PlayerId,
        lookback_count: u32,
    ) -> (AggregateSnapshot, AggregationReport) {
        let mut snapshot = AggregateSnapshot::new(player_id.clone(), self.client.region());
        let mut report = AggregationReport::default();

        let match_ids = match self
            .client
            .list_recent_match_ids(player_id, lookback_count)
            .await
        {
            FetchOutcome::Found(ids) => ids,
            FetchOutcome::Absent => Vec::new(),
            FetchOutcome::Failed(e) => {
                warn!("Could not list matches for {}: {}", player_id, e);
                Vec::new()
            }
        };

        if match_ids.is_empty() {
            debug!("No recent matches for {}", player_id);
            return (snapshot, report);
        }

        report.requested = match_ids.len() as u32;

        for (match_id, outcome) in self.fetch_matches(match_ids).await {
            let data = match outcome {
                FetchOutcome::Found(data) => data,
                FetchOutcome::Absent => {
                    report.skip(SkipReason::Absent);
                    continue;
                }
                FetchOutcome::Failed(_) => {
                    report.skip(SkipReason::FetchFailed);
                    continue;
                }
            };

            match self.classify(player_id, &data) {
                Ok((signature, placement)) => {
                    snapshot.record(&signature, placement);
                    report.folded += 1;
                }
                Err(reason) => {
                    debug!("Skipping {}: {:?}", match_id, reason);
                    report.skip(reason);
                }
            }
        }

        info!(
            "Aggregated {} of {} matches for {} into {} compositions",
            report.folded,
            report.requested,
            player_id,
            snapshot.buckets.len()
        );

        (snapshot, report)
    }

    /// Decide whether a match counts, and under which signature.
    pub fn classify(
        &self,
        player_id: &PlayerId,
        data: &MatchData,
    ) -> Result<(String, u32), SkipReason> {
        if data.queue_id != self.config.ranked_queue_id {
            return Err(SkipReason::WrongQueue);
        }

        let participation = data
            .participation(player_id)
            .ok_or(SkipReason::MissingParticipant)?;

        if !in_generation(&participation.traits, &self.config.set_prefix) {
            return Err(SkipReason::OtherGeneration);
        }

        let signature = derive_signature(&participation.traits).ok_or(SkipReason::NoSignature)?;
        Ok((signature, participation.placement))
    }

    /// Fetch matches with bounded concurrency.
    ///
    /// Results come back in the order of `match_ids`, whatever order the
    /// requests complete in.
    pub async fn fetch_matches(
        &self,
        match_ids: Vec<MatchId>,
    ) -> Vec<(MatchId, FetchOutcome<MatchData>)> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_fetches.max(1)));
        let mut tasks = JoinSet::new();

        for (index, match_id) in match_ids.iter().cloned().enumerate() {
            let client = Arc::clone(&self.client);
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                let outcome = match semaphore.acquire_owned().await {
                    Ok(_permit) => client.get_match(&match_id).await,
                    Err(_) => FetchOutcome::Failed(FetchError::Aborted),
                };
                (index, outcome)
            });
        }

        let mut slots: Vec<Option<FetchOutcome<MatchData>>> =
            match_ids.iter().map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, outcome)) => slots[index] = Some(outcome),
                Err(e) => warn!("Match fetch task failed: {}", e),
            }
        }

        match_ids
            .into_iter()
            .zip(slots)
            .map(|(id, slot)| (id, slot.unwrap_or(FetchOutcome::Failed(FetchError::Aborted))))
            .collect()
    }
}
