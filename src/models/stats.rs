//! Composition statistics models.

use serde::{Deserialize, Serialize};

use super::{PlayerId, WIN_PLACEMENT};

/// Games grouped under one composition signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositionBucket {
    /// Dominant trait display name, e.g. "Bilgewater"
    pub signature: String,

    /// Games played
    pub games: u32,

    /// Top-four finishes
    pub wins: u32,

    /// Placements in the order the games were folded in
    pub placements: Vec<u32>,
}

impl CompositionBucket {
    pub fn new(signature: impl Into<String>) -> Self {
        Self {
            signature: signature.into(),
            games: 0,
            wins: 0,
            placements: Vec::new(),
        }
    }

    /// Fold one game into the bucket.
    pub fn record(&mut self, placement: u32) {
        self.games += 1;
        self.placements.push(placement);
        if placement <= WIN_PLACEMENT {
            self.wins += 1;
        }
    }

    /// Win rate as a percentage (0.0 to 100.0).
    pub fn win_rate(&self) -> f64 {
        if self.games == 0 {
            0.0
        } else {
            100.0 * self.wins as f64 / self.games as f64
        }
    }

    /// Mean placement, 0.0 when empty.
    pub fn average_placement(&self) -> f64 {
        if self.placements.is_empty() {
            0.0
        } else {
            self.placements.iter().sum::<u32>() as f64 / self.placements.len() as f64
        }
    }
}

/// Per-composition results for one player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateSnapshot {
    pub player_id: PlayerId,

    /// Platform region the matches came from (e.g. "euw1")
    pub region: String,

    /// Buckets in first-seen order
    pub buckets: Vec<CompositionBucket>,
}

impl AggregateSnapshot {
    pub fn new(player_id: PlayerId, region: impl Into<String>) -> Self {
        Self {
            player_id,
            region: region.into(),
            buckets: Vec::new(),
        }
    }

    /// Record one game under `signature`, creating the bucket on first sight.
    pub fn record(&mut self, signature: &str, placement: u32) {
        match self.buckets.iter_mut().find(|b| b.signature == signature) {
            Some(bucket) => bucket.record(placement),
            None => {
                let mut bucket = CompositionBucket::new(signature);
                bucket.record(placement);
                self.buckets.push(bucket);
            }
        }
    }

    pub fn bucket(&self, signature: &str) -> Option<&CompositionBucket> {
        self.buckets.iter().find(|b| b.signature == signature)
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Total games across all buckets.
    pub fn total_games(&self) -> u32 {
        self.buckets.iter().map(|b| b.games).sum()
    }

    /// Most-played composition. Ties go to the first-seen bucket.
    pub fn most_played(&self) -> Option<&CompositionBucket> {
        self.buckets
            .iter()
            .fold(None, |best: Option<&CompositionBucket>, b| match best {
                Some(current) if current.games >= b.games => Some(current),
                _ => Some(b),
            })
    }

    /// Highest win rate among buckets with at least `min_sample` games.
    ///
    /// Falls back to every bucket when none reaches the sample size.
    /// Ties go to the first-seen bucket.
    pub fn best(&self, min_sample: u32) -> Option<&CompositionBucket> {
        self.eligible(min_sample)
            .into_iter()
            .fold(None, |best: Option<&CompositionBucket>, b| match best {
                Some(current) if current.win_rate() >= b.win_rate() => Some(current),
                _ => Some(b),
            })
    }

    /// Lowest win rate, same eligibility and tie rules as [`best`](Self::best).
    pub fn worst(&self, min_sample: u32) -> Option<&CompositionBucket> {
        self.eligible(min_sample)
            .into_iter()
            .fold(None, |worst: Option<&CompositionBucket>, b| match worst {
                Some(current) if current.win_rate() <= b.win_rate() => Some(current),
                _ => Some(b),
            })
    }

    fn eligible(&self, min_sample: u32) -> Vec<&CompositionBucket> {
        let qualified: Vec<_> = self
            .buckets
            .iter()
            .filter(|b| b.games >= min_sample)
            .collect();
        if qualified.is_empty() {
            self.buckets.iter().collect()
        } else {
            qualified
        }
    }
}
