use std::fmt;
use std::hash::{Hash, Hasher};
use std::num::NonZeroU32;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Store-assigned surrogate key for a persisted character.
pub type CharacterId = u64;

/// A character record from the Ice and Fire catalog.
///
/// Equality and hashing cover the domain fields only. `id` is assigned by
/// the store on insert and is ignored when comparing two records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<CharacterId>,
    pub name: String,
    pub culture: String,
    pub born: String,
    pub titles: Vec<String>,
    pub aliases: Vec<String>,
    #[serde(rename = "playedBy")]
    pub played_by: Vec<String>,
}

impl Character {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            culture: String::new(),
            born: String::new(),
            titles: Vec::new(),
            aliases: Vec::new(),
            played_by: Vec::new(),
        }
    }

    /// Whether this record has been persisted.
    pub fn is_stored(&self) -> bool {
        self.id.is_some()
    }

    /// The same record with the given store id attached.
    pub fn with_id(mut self, id: CharacterId) -> Self {
        self.id = Some(id);
        self
    }

    /// Best label for list display. Many catalog entries only carry aliases.
    pub fn display_name(&self) -> &str {
        if !self.name.is_empty() {
            &self.name
        } else {
            self.aliases
                .iter()
                .find(|a| !a.is_empty())
                .map(String::as_str)
                .unwrap_or("(unnamed)")
        }
    }
}

impl PartialEq for Character {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.culture == other.culture
            && self.born == other.born
            && self.titles == other.titles
            && self.aliases == other.aliases
            && self.played_by == other.played_by
    }
}

impl Eq for Character {}

impl Hash for Character {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.culture.hash(state);
        self.born.hash(state);
        self.titles.hash(state);
        self.aliases.hash(state);
        self.played_by.hash(state);
    }
}

fn join_or_dash(values: &[String]) -> String {
    let present: Vec<&str> = values
        .iter()
        .map(String::as_str)
        .filter(|v| !v.is_empty())
        .collect();
    if present.is_empty() {
        "-".to_string()
    } else {
        present.join(", ")
    }
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}

impl fmt::Display for Character {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | culture: {} | born: {} | titles: {} | aliases: {} | played by: {}",
            self.display_name(),
            or_dash(&self.culture),
            or_dash(&self.born),
            join_or_dash(&self.titles),
            join_or_dash(&self.aliases),
            join_or_dash(&self.played_by),
        )
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid page number '{0}': pages start at 1")]
pub struct InvalidPage(pub String);

/// A 1-based page index into the remote catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PageNumber(NonZeroU32);

impl PageNumber {
    pub const FIRST: PageNumber = PageNumber(NonZeroU32::MIN);

    pub fn new(page: u32) -> Result<Self, InvalidPage> {
        NonZeroU32::new(page)
            .map(Self)
            .ok_or_else(|| InvalidPage(page.to_string()))
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }
}

impl TryFrom<u32> for PageNumber {
    type Error = InvalidPage;

    fn try_from(page: u32) -> Result<Self, Self::Error> {
        Self::new(page)
    }
}

impl FromStr for PageNumber {
    type Err = InvalidPage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u32>()
            .map_err(|_| InvalidPage(s.to_string()))
            .and_then(Self::new)
    }
}

impl fmt::Display for PageNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn jon() -> Character {
        Character {
            id: None,
            name: "Jon Snow".to_string(),
            culture: "Northmen".to_string(),
            born: "In 283 AC".to_string(),
            titles: vec!["Lord Commander of the Night's Watch".to_string()],
            aliases: vec!["Lord Snow".to_string(), "The Bastard of Winterfell".to_string()],
            played_by: vec!["Kit Harington".to_string()],
        }
    }

    #[test]
    fn test_equality_ignores_id() {
        let a = jon();
        let b = jon().with_id(42);
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(!set.insert(b));
    }

    #[test]
    fn test_equality_compares_list_order() {
        let a = jon();
        let mut b = jon();
        b.aliases.reverse();
        assert_ne!(a, b);
    }

    #[test]
    fn test_decode_api_payload_ignores_unknown_fields() {
        let json = r#"{
            "url": "https://anapioficeandfire.com/api/characters/583",
            "name": "Jon Snow",
            "gender": "Male",
            "culture": "Northmen",
            "born": "In 283 AC",
            "died": "",
            "titles": ["Lord Commander of the Night's Watch"],
            "aliases": ["Lord Snow", "The Bastard of Winterfell"],
            "father": "",
            "mother": "",
            "spouse": "",
            "allegiances": [],
            "books": [],
            "povBooks": [],
            "tvSeries": ["Season 1"],
            "playedBy": ["Kit Harington"]
        }"#;
        let parsed: Character = serde_json::from_str(json).unwrap();
        assert_eq!(parsed, jon());
        assert!(parsed.id.is_none());
    }

    #[test]
    fn test_decode_rejects_missing_field() {
        let json = r#"{"name": "Jon Snow", "culture": "Northmen", "born": "", "titles": [], "aliases": []}"#;
        assert!(serde_json::from_str::<Character>(json).is_err());
    }

    #[test]
    fn test_stored_round_trip_keeps_id() {
        let stored = jon().with_id(7);
        let json = serde_json::to_string(&stored).unwrap();
        assert!(json.contains("\"playedBy\""));
        let back: Character = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, Some(7));
        assert_eq!(back, stored);
    }

    #[test]
    fn test_display_name_falls_back_to_alias() {
        let mut c = Character::new("");
        c.aliases = vec!["".to_string(), "The Daughter of the Dusk".to_string()];
        assert_eq!(c.display_name(), "The Daughter of the Dusk");
        assert_eq!(Character::new("").display_name(), "(unnamed)");
    }

    #[test]
    fn test_display_line() {
        let line = Character::new("Walder").to_string();
        assert_eq!(
            line,
            "Walder | culture: - | born: - | titles: - | aliases: - | played by: -"
        );
    }

    #[test]
    fn test_page_number_parsing() {
        assert_eq!("5".parse::<PageNumber>().unwrap().get(), 5);
        assert_eq!(" 12 ".parse::<PageNumber>().unwrap().get(), 12);
        assert!("0".parse::<PageNumber>().is_err());
        assert!("-3".parse::<PageNumber>().is_err());
        assert!("abc".parse::<PageNumber>().is_err());
        assert!(PageNumber::new(0).is_err());
        assert_eq!(PageNumber::FIRST.get(), 1);
    }
}
