//! Scoring and derived metrics.
//!
//! - Ladder score used for leaderboard sorting and head-to-head comparison
//! - Composition signatures used to bucket matches

pub mod signature;

use crate::models::{Division, RankRecord, Tier};

pub use signature::{derive_signature, display_trait_name, in_generation};

/// Points per tier step. Larger than any division + LP combination.
const TIER_WEIGHT: u32 = 100_000;

/// Points per division step. Larger than any capped LP value.
const DIVISION_WEIGHT: u32 = 10_000;

/// LP above this are clamped so they never spill into the next division.
pub const MAX_SCORED_LP: u32 = 9_999;

/// Collapse a ladder standing into one comparable integer.
///
/// Ordering is lexicographic on (tier, division, league points).
pub fn score(tier: Tier, division: Option<Division>, league_points: u32) -> u32 {
    tier.rank() * TIER_WEIGHT
        + division.map(|d| d.value()).unwrap_or(0) * DIVISION_WEIGHT
        + league_points.min(MAX_SCORED_LP)
}

/// Score a rank record.
pub fn score_record(rank: &RankRecord) -> u32 {
    score(rank.tier, rank.division, rank.league_points)
}

/// Score a raw tier string, as returned by the ladder API.
pub fn score_raw(tier: &str, division: Option<&str>, league_points: u32) -> u32 {
    score(
        Tier::parse(tier),
        division.and_then(Division::parse),
        league_points,
    )
}

/// Which side of a head-to-head comes out ahead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    First,
    Second,
}

/// Strictly greater score wins; an exact tie goes to the first-named player.
pub fn head_to_head(first: &RankRecord, second: &RankRecord) -> Side {
    if score_record(second) > score_record(first) {
        Side::Second
    } else {
        Side::First
    }
}

/// Stable descending sort by score. Equal scores keep their input order.
pub fn sort_by_score<T, F>(items: &mut [T], rank_of: F)
where
    F: Fn(&T) -> &RankRecord,
{
    items.sort_by_key(|item| std::cmp::Reverse(score_record(rank_of(item))));
}
