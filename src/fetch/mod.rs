//! Remote ladder access.
//!
//! Every call returns a [`FetchOutcome`]: the record, an explicit "absent",
//! or the error that prevented an answer. Callers decide how to degrade;
//! nothing here panics or retries.

mod memory;
mod riot;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{MatchData, MatchId, PlayerId, RankRecord};

pub use memory::InMemoryLadder;
pub use riot::{RiotClient, RiotClientConfig};

/// Errors that can occur while talking to the ladder API.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed payload: {0}")]
    Malformed(String),

    #[error("Missing API key: set {0}")]
    MissingApiKey(String),

    #[error("Fetch task aborted")]
    Aborted,
}

/// Result of a single remote read.
#[derive(Debug)]
pub enum FetchOutcome<T> {
    /// The record exists and decoded cleanly
    Found(T),

    /// The API answered that there is no such record
    Absent,

    /// Transport, status or decode failure
    Failed(FetchError),
}

impl<T> FetchOutcome<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, FetchOutcome::Found(_))
    }

    /// Collapse to an `Option`, treating failures as absence.
    pub fn found(self) -> Option<T> {
        match self {
            FetchOutcome::Found(value) => Some(value),
            FetchOutcome::Absent | FetchOutcome::Failed(_) => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> FetchOutcome<U> {
        match self {
            FetchOutcome::Found(value) => FetchOutcome::Found(f(value)),
            FetchOutcome::Absent => FetchOutcome::Absent,
            FetchOutcome::Failed(err) => FetchOutcome::Failed(err),
        }
    }
}

/// Read access to the ranked ladder and match history.
#[async_trait]
pub trait LadderClient: Send + Sync {
    /// Platform region served by this client (e.g. "euw1").
    fn region(&self) -> &str;

    /// Look up the player identifier for a `name#tag` pair.
    async fn resolve_identity(&self, game_name: &str, tag_line: &str) -> FetchOutcome<PlayerId>;

    /// Current ranked standing.
    async fn get_rank(&self, player_id: &PlayerId) -> FetchOutcome<RankRecord>;

    /// Most recent match ids first. May be empty.
    async fn list_recent_match_ids(
        &self,
        player_id: &PlayerId,
        count: u32,
    ) -> FetchOutcome<Vec<MatchId>>;

    /// Full match data.
    async fn get_match(&self, match_id: &MatchId) -> FetchOutcome<MatchData>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_found() {
        let outcome = FetchOutcome::Found(3);
        assert!(outcome.is_found());
        assert_eq!(outcome.map(|v| v * 2).found(), Some(6));
    }

    #[test]
    fn test_outcome_failed_collapses_to_none() {
        let outcome: FetchOutcome<u32> = FetchOutcome::Failed(FetchError::HttpStatus {
            status: 503,
            message: "Service Unavailable".to_string(),
        });
        assert!(!outcome.is_found());
        assert_eq!(outcome.found(), None);

        let absent: FetchOutcome<u32> = FetchOutcome::Absent;
        assert_eq!(absent.map(|v| v + 1).found(), None);
    }

    #[test]
    fn test_fetch_error_display() {
        let err = FetchError::RateLimited {
            retry_after_secs: 12,
        };
        assert_eq!(err.to_string(), "Rate limited, retry after 12s");
    }
}
