//! Tracked players.

use serde::{Deserialize, Serialize};

use super::PlayerId;

/// A tracked player: the name shown in reports and the ladder identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    #[serde(alias = "name")]
    pub display_name: String,

    #[serde(alias = "uuid")]
    pub player_id: PlayerId,
}

impl RosterEntry {
    pub fn new(display_name: impl Into<String>, player_id: PlayerId) -> Self {
        Self {
            display_name: display_name.into(),
            player_id,
        }
    }

    /// Case-insensitive display name match.
    pub fn is_named(&self, name: &str) -> bool {
        self.display_name.to_lowercase() == name.trim().to_lowercase()
    }
}

/// A Riot ID split into game name and tag line, e.g. `Toto#EUW`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiotId {
    pub game_name: String,
    pub tag_line: String,
}

impl RiotId {
    /// Parse `Name#TAG`. Both halves must be non-empty.
    pub fn parse(s: &str) -> Option<Self> {
        let (name, tag) = s.split_once('#')?;
        let (name, tag) = (name.trim(), tag.trim());
        if name.is_empty() || tag.is_empty() {
            return None;
        }
        Some(Self {
            game_name: name.to_string(),
            tag_line: tag.to_string(),
        })
    }
}

impl std::fmt::Display for RiotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.game_name, self.tag_line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_named_case_insensitive() {
        let entry = RosterEntry::new("Toto", PlayerId::from("pid1"));
        assert!(entry.is_named("toto"));
        assert!(entry.is_named(" TOTO "));
        assert!(!entry.is_named("Titi"));
    }

    #[test]
    fn test_legacy_field_names() {
        let json = r#"{"name": "Toto", "uuid": "pid1"}"#;
        let entry: RosterEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.display_name, "Toto");
        assert_eq!(entry.player_id, PlayerId::from("pid1"));
    }

    #[test]
    fn test_riot_id_parse() {
        let id = RiotId::parse("Jean Claude # EUW").unwrap();
        assert_eq!(id.game_name, "Jean Claude");
        assert_eq!(id.tag_line, "EUW");
        assert_eq!(id.to_string(), "Jean Claude#EUW");
    }

    #[test]
    fn test_riot_id_parse_invalid() {
        assert!(RiotId::parse("Toto").is_none());
        assert!(RiotId::parse("#EUW").is_none());
        assert!(RiotId::parse("Toto#").is_none());
    }
}
