//! Nested character sheet types as exchanged with the client.
//!
//! Wire field names are lower camel case (`basicSpeed`, `moneyOnHand`) to
//! match the sheet editor's JSON. Ids are `Option<DbId>` throughout: `None`
//! marks an item the client created locally that has not been persisted yet.

use serde::{Deserialize, Serialize};

use crate::types::DbId;

/// A full character sheet: scalar attributes, exactly one appearance, and
/// three owned collections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterSheet {
    #[serde(default)]
    pub id: Option<DbId>,
    pub name: String,
    pub player: String,
    pub height: String,
    pub weight: String,
    pub age: i32,
    pub strength: i32,
    pub dexterity: i32,
    pub intelligence: i32,
    pub health: i32,
    pub hit_points: i32,
    pub will: i32,
    pub perception: i32,
    pub fatigue_points: i32,
    pub basic_speed: f64,
    pub basic_move: i32,
    pub points_spent: i32,
    pub available_points: i32,
    pub wealth_level: String,
    pub money_on_hand: f64,
    pub appearance: Appearance,
    #[serde(default)]
    pub languages: Vec<Language>,
    #[serde(default)]
    pub reputations: Vec<Reputation>,
    #[serde(default)]
    pub ranks: Vec<Rank>,
}

impl CharacterSheet {
    /// True if the sheet itself or any nested item carries a persisted id.
    ///
    /// Used to reject creates that would silently discard client-supplied
    /// ids: every row of a new sheet gets a freshly generated id.
    pub fn has_persisted_ids(&self) -> bool {
        self.id.is_some()
            || self.appearance.id.is_some()
            || self.languages.iter().any(|l| l.id.is_some())
            || self.reputations.iter().any(|r| r.id.is_some())
            || self.ranks.iter().any(|r| r.id.is_some())
    }
}

/// Physical description, 1:1 with its character. Created together with the
/// character and only ever updated in place afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appearance {
    #[serde(default)]
    pub id: Option<DbId>,
    pub hair: String,
    pub eyes: String,
    pub skin: String,
    pub build: String,
    pub description: String,
}

/// A known language with spoken and written comprehension levels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Language {
    #[serde(default)]
    pub id: Option<DbId>,
    pub name: String,
    pub spoken: String,
    pub written: String,
}

/// A reputation: how a group of people reacts to the character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reputation {
    #[serde(default)]
    pub id: Option<DbId>,
    pub description: String,
    pub reaction: i32,
    pub scope: String,
    pub frequency: i32,
}

/// Standing within an organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rank {
    #[serde(default)]
    pub id: Option<DbId>,
    pub organization: String,
    pub title: String,
    pub description: String,
}
