//! Ranked ladder standing.

use serde::{Deserialize, Serialize};

/// Ladder tier, ordered from lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", from = "String")]
pub enum Tier {
    Unranked,
    Iron,
    Bronze,
    Silver,
    Gold,
    Platinum,
    Emerald,
    Diamond,
    Master,
    Grandmaster,
    Challenger,
}

impl Tier {
    pub const ALL: [Tier; 11] = [
        Tier::Unranked,
        Tier::Iron,
        Tier::Bronze,
        Tier::Silver,
        Tier::Gold,
        Tier::Platinum,
        Tier::Emerald,
        Tier::Diamond,
        Tier::Master,
        Tier::Grandmaster,
        Tier::Challenger,
    ];

    /// Parse a tier name. Unknown names map to `Unranked`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_uppercase().as_str() {
            "IRON" => Tier::Iron,
            "BRONZE" => Tier::Bronze,
            "SILVER" => Tier::Silver,
            "GOLD" => Tier::Gold,
            "PLATINUM" => Tier::Platinum,
            "EMERALD" => Tier::Emerald,
            "DIAMOND" => Tier::Diamond,
            "MASTER" => Tier::Master,
            "GRANDMASTER" => Tier::Grandmaster,
            "CHALLENGER" => Tier::Challenger,
            _ => Tier::Unranked,
        }
    }

    /// Position on the ladder, 0 (unranked) to 10 (challenger).
    pub fn rank(&self) -> u32 {
        *self as u32
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Unranked => "UNRANKED",
            Tier::Iron => "IRON",
            Tier::Bronze => "BRONZE",
            Tier::Silver => "SILVER",
            Tier::Gold => "GOLD",
            Tier::Platinum => "PLATINUM",
            Tier::Emerald => "EMERALD",
            Tier::Diamond => "DIAMOND",
            Tier::Master => "MASTER",
            Tier::Grandmaster => "GRANDMASTER",
            Tier::Challenger => "CHALLENGER",
        }
    }
}

impl From<String> for Tier {
    fn from(s: String) -> Self {
        Tier::parse(&s)
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Division inside a tier. `I` is the highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Division {
    #[serde(rename = "IV")]
    Four,
    #[serde(rename = "III")]
    Three,
    #[serde(rename = "II")]
    Two,
    #[serde(rename = "I")]
    One,
}

impl Division {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "IV" => Some(Division::Four),
            "III" => Some(Division::Three),
            "II" => Some(Division::Two),
            "I" => Some(Division::One),
            _ => None,
        }
    }

    /// IV = 0 up to I = 3.
    pub fn value(&self) -> u32 {
        *self as u32
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Division::Four => "IV",
            Division::Three => "III",
            Division::Two => "II",
            Division::One => "I",
        }
    }
}

impl std::fmt::Display for Division {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A player's current ranked standing. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankRecord {
    pub tier: Tier,
    pub division: Option<Division>,
    pub league_points: u32,
    pub wins: u32,
    pub losses: u32,
}

impl RankRecord {
    pub fn new(tier: Tier, division: Option<Division>, league_points: u32) -> Self {
        Self {
            tier,
            division,
            league_points,
            wins: 0,
            losses: 0,
        }
    }

    pub fn with_record(mut self, wins: u32, losses: u32) -> Self {
        self.wins = wins;
        self.losses = losses;
        self
    }

    /// Total games played this ladder reset.
    pub fn games(&self) -> u32 {
        self.wins + self.losses
    }

    /// Win rate as a percentage (0.0 to 100.0).
    pub fn win_rate(&self) -> f64 {
        let games = self.games();
        if games == 0 {
            0.0
        } else {
            self.wins as f64 / games as f64 * 100.0
        }
    }

    /// "GOLD II" or just "MASTER" for apex tiers without a division.
    pub fn label(&self) -> String {
        match self.division {
            Some(division) => format!("{} {}", self.tier, division),
            None => self.tier.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_ordering() {
        for pair in Tier::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
            assert_eq!(pair[0].rank() + 1, pair[1].rank());
        }
        assert_eq!(Tier::Unranked.rank(), 0);
        assert_eq!(Tier::Challenger.rank(), 10);
    }

    #[test]
    fn test_tier_parse_unknown_is_unranked() {
        assert_eq!(Tier::parse("gold"), Tier::Gold);
        assert_eq!(Tier::parse("GRANDMASTER"), Tier::Grandmaster);
        assert_eq!(Tier::parse("WOOD"), Tier::Unranked);
        assert_eq!(Tier::parse(""), Tier::Unranked);
    }

    #[test]
    fn test_tier_deserialize_unknown_is_unranked() {
        let tier: Tier = serde_json::from_str("\"PLATINUM\"").unwrap();
        assert_eq!(tier, Tier::Platinum);

        let tier: Tier = serde_json::from_str("\"MYTHIC\"").unwrap();
        assert_eq!(tier, Tier::Unranked);

        let tier: Tier = serde_json::from_str("\"diamond\"").unwrap();
        assert_eq!(tier, Tier::Diamond);
    }

    #[test]
    fn test_rank_record_serde_round_trip() {
        let rank = RankRecord::new(Tier::Unranked, None, 0);
        let json = serde_json::to_string(&rank).unwrap();
        assert!(json.contains("\"UNRANKED\""));

        let parsed: RankRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, rank);

        let gold: RankRecord = serde_json::from_str(
            r#"{"tier": "GOLD", "division": "II", "league_points": 40, "wins": 1, "losses": 2}"#,
        )
        .unwrap();
        assert_eq!(gold.tier, Tier::Gold);
        assert_eq!(gold.division, Some(Division::Two));
    }

    #[test]
    fn test_division_values() {
        assert_eq!(Division::parse("IV"), Some(Division::Four));
        assert_eq!(Division::parse("i"), Some(Division::One));
        assert_eq!(Division::parse("V"), None);
        assert_eq!(Division::Four.value(), 0);
        assert_eq!(Division::One.value(), 3);
    }

    #[test]
    fn test_rank_record_win_rate() {
        let rank = RankRecord::new(Tier::Gold, Some(Division::Two), 40).with_record(30, 20);
        assert_eq!(rank.games(), 50);
        assert!((rank.win_rate() - 60.0).abs() < f64::EPSILON);

        let empty = RankRecord::new(Tier::Iron, Some(Division::Four), 0);
        assert_eq!(empty.win_rate(), 0.0);
    }

    #[test]
    fn test_rank_record_label() {
        let gold = RankRecord::new(Tier::Gold, Some(Division::Two), 40);
        assert_eq!(gold.label(), "GOLD II");

        let master = RankRecord::new(Tier::Master, None, 120);
        assert_eq!(master.label(), "MASTER");
    }
}
