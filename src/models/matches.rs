//! Match history records.

use serde::{Deserialize, Serialize};

use super::{MatchId, PlayerId};

/// Placement at or above which a game counts as a win (top half of the lobby).
pub const WIN_PLACEMENT: u32 = 4;

/// An active or inactive synergy on a player's board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trait {
    /// Machine name, e.g. `TFT16_Bilgewater`
    pub name: String,
    pub current_tier: u32,
    pub unit_count: u32,
}

impl Trait {
    pub fn new(name: impl Into<String>, current_tier: u32, unit_count: u32) -> Self {
        Self {
            name: name.into(),
            current_tier,
            unit_count,
        }
    }
}

/// A champion on a player's final board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub character_id: String,
    /// 1 to 3
    pub star_level: u32,
}

/// One player's line in a finished match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub player_id: PlayerId,
    /// 1 (winner) to 8
    pub placement: u32,
    pub eliminated_at_seconds: f64,
    pub traits: Vec<Trait>,
    pub units: Vec<Unit>,
}

/// A fully fetched match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchData {
    pub match_id: MatchId,
    pub queue_id: u32,
    /// Game type tag reported by the API (e.g. "standard", "pairs")
    pub game_mode_tag: String,
    pub participants: Vec<Participant>,
}

impl MatchData {
    /// Extract the participation record for one player, if they played in this match.
    pub fn participation(&self, player_id: &PlayerId) -> Option<MatchParticipation> {
        self.participants
            .iter()
            .find(|p| &p.player_id == player_id)
            .map(|p| MatchParticipation {
                match_id: self.match_id.clone(),
                placement: p.placement,
                eliminated_at_seconds: p.eliminated_at_seconds,
                game_mode_tag: self.game_mode_tag.clone(),
                queue_id: self.queue_id,
                traits: p.traits.clone(),
                units: p.units.clone(),
            })
    }
}

/// One (match, player) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchParticipation {
    pub match_id: MatchId,
    pub placement: u32,
    pub eliminated_at_seconds: f64,
    pub game_mode_tag: String,
    pub queue_id: u32,
    pub traits: Vec<Trait>,
    pub units: Vec<Unit>,
}

impl MatchParticipation {
    pub fn is_win(&self) -> bool {
        self.placement <= WIN_PLACEMENT
    }

    /// Elimination time rounded to whole minutes.
    pub fn eliminated_at_minutes(&self) -> u64 {
        (self.eliminated_at_seconds / 60.0).round().max(0.0) as u64
    }
}
