//! Composition signatures.
//!
//! A match is bucketed under its dominant trait: the trait with the highest
//! active tier, then the most units. The machine name is cleaned up for
//! display (`TFT16_ShadowIsles` becomes `Shadow Isles`).

use std::sync::LazyLock;

use regex::Regex;

use crate::models::Trait;

/// Content-generation tag at the start of machine names, e.g. `TFT16_`.
static GENERATION_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?i:tft)\d*_").expect("generation prefix pattern"));

/// Lower-to-upper case boundaries inside a camel-cased name.
static CAMEL_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z0-9])([A-Z])").expect("camel boundary pattern"));

/// Whether every trait belongs to the tracked content generation.
///
/// A board with no traits at all is never in the generation. An empty
/// `prefix` accepts everything.
pub fn in_generation(traits: &[Trait], prefix: &str) -> bool {
    if prefix.is_empty() {
        return true;
    }
    !traits.is_empty() && traits.iter().all(|t| t.name.starts_with(prefix))
}

/// Pick the dominant trait and return its display name.
///
/// Greatest `(current_tier, unit_count)` wins; ties keep the earliest trait.
pub fn derive_signature(traits: &[Trait]) -> Option<String> {
    let dominant = traits.iter().fold(None, |best: Option<&Trait>, t| match best {
        Some(current) if strength(current) >= strength(t) => Some(current),
        _ => Some(t),
    })?;

    let name = display_trait_name(&dominant.name);
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// Strip the generation prefix, split words and title-case them.
pub fn display_trait_name(raw: &str) -> String {
    let stripped = GENERATION_PREFIX.replace(raw.trim(), "");
    let spaced = CAMEL_BOUNDARY.replace_all(&stripped, "$1 $2");

    spaced
        .split(|c: char| c == '_' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(title_case)
        .collect::<Vec<_>>()
        .join(" ")
}

fn strength(t: &Trait) -> (u32, u32) {
    (t.current_tier, t.unit_count)
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_trait_name() {
        assert_eq!(display_trait_name("TFT16_Bilgewater"), "Bilgewater");
        assert_eq!(display_trait_name("TFT16_ShadowIsles"), "Shadow Isles");
        assert_eq!(display_trait_name("Set16_Void"), "Set16 Void");
        assert_eq!(display_trait_name("tft16_darkin_blade"), "Darkin Blade");
        assert_eq!(display_trait_name("Sorcerer"), "Sorcerer");
    }

    #[test]
    fn test_dominant_trait_by_tier_then_units() {
        let traits = vec![
            Trait::new("TFT16_Zaun", 1, 3),
            Trait::new("TFT16_Ionia", 2, 4),
            Trait::new("TFT16_Noxus", 2, 6),
        ];
        assert_eq!(derive_signature(&traits).as_deref(), Some("Noxus"));
    }

    #[test]
    fn test_dominant_trait_tie_keeps_first() {
        let traits = vec![
            Trait::new("TFT16_Zaun", 2, 4),
            Trait::new("TFT16_Ionia", 2, 4),
        ];
        assert_eq!(derive_signature(&traits).as_deref(), Some("Zaun"));
    }

    #[test]
    fn test_signature_is_deterministic() {
        let traits = vec![
            Trait::new("TFT16_Bilgewater", 3, 7),
            Trait::new("TFT16_Slayer", 3, 7),
            Trait::new("TFT16_Gunner", 1, 2),
        ];
        let first = derive_signature(&traits);
        for _ in 0..10 {
            assert_eq!(derive_signature(&traits), first);
        }
    }

    #[test]
    fn test_signature_of_empty_board() {
        assert_eq!(derive_signature(&[]), None);
    }

    #[test]
    fn test_in_generation() {
        let current = vec![Trait::new("TFT16_Zaun", 1, 3), Trait::new("TFT16_Ionia", 0, 1)];
        let mixed = vec![Trait::new("TFT16_Zaun", 1, 3), Trait::new("TFT15_Mentor", 1, 4)];

        assert!(in_generation(&current, "TFT16_"));
        assert!(!in_generation(&mixed, "TFT16_"));
        assert!(!in_generation(&[], "TFT16_"));
        assert!(in_generation(&mixed, ""));
    }
}
