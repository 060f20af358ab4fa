//! Row reassembler: folds flat join rows back into nested sheets.
//!
//! The read query joins `character`, `appearance`, `language`,
//! `reputation`, and `rank` in a single statement, so a character with L
//! languages, R reputations, and K ranks comes back as L*R*K rows (at
//! least one) with the character and appearance columns duplicated on
//! every row. [`reassemble`] groups those rows by character id and
//! rebuilds one [`CharacterSheet`] per group, deduplicating each
//! sub-entity collection by id.

use crate::sheet::{Appearance, CharacterSheet, Language, Rank, Reputation};
use crate::types::DbId;

/// One record of the character join query.
///
/// The sub-entity columns come from LEFT OUTER joins and are therefore
/// all optional: a character with no languages still yields rows, with
/// every `language_*` column null. A null sub-entity id means "no
/// sub-record in this row", never an empty placeholder.
#[derive(Debug, Clone)]
pub struct JoinedSheetRow {
    pub character_id: DbId,
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
    pub appearance_id: DbId,
    pub hair: String,
    pub eyes: String,
    pub skin: String,
    pub build: String,
    pub appearance_description: String,
    pub language_id: Option<DbId>,
    pub language_name: Option<String>,
    pub spoken: Option<String>,
    pub written: Option<String>,
    pub reputation_id: Option<DbId>,
    pub reputation_description: Option<String>,
    pub reaction: Option<i32>,
    pub scope: Option<String>,
    pub frequency: Option<i32>,
    pub rank_id: Option<DbId>,
    pub organization: Option<String>,
    pub title: Option<String>,
    pub rank_description: Option<String>,
}

/// Regroup flat join rows into nested character sheets.
///
/// Characters appear in first-seen row order, sub-records in first-seen
/// order within their character. A sub-record is appended only if no
/// accumulated item already carries its id; the membership check scans
/// the whole accumulated collection, which is fine at the tens-of-items
/// scale these sheets have.
pub fn reassemble(rows: Vec<JoinedSheetRow>) -> Vec<CharacterSheet> {
    let mut sheets: Vec<CharacterSheet> = Vec::new();

    for row in rows {
        let idx = match sheets.iter().position(|s| s.id == Some(row.character_id)) {
            Some(idx) => idx,
            None => {
                sheets.push(sheet_from_row(&row));
                sheets.len() - 1
            }
        };
        collect_sub_records(&mut sheets[idx], row);
    }

    sheets
}

/// Build the character/appearance portion of a sheet from the first row
/// of its group. Collections start empty and are filled by
/// [`collect_sub_records`].
fn sheet_from_row(row: &JoinedSheetRow) -> CharacterSheet {
    CharacterSheet {
        id: Some(row.character_id),
        name: row.name.clone(),
        player: row.player.clone(),
        height: row.height.clone(),
        weight: row.weight.clone(),
        age: row.age,
        strength: row.strength,
        dexterity: row.dexterity,
        intelligence: row.intelligence,
        health: row.health,
        hit_points: row.hit_points,
        will: row.will,
        perception: row.perception,
        fatigue_points: row.fatigue_points,
        basic_speed: row.basic_speed,
        basic_move: row.basic_move,
        points_spent: row.points_spent,
        available_points: row.available_points,
        wealth_level: row.wealth_level.clone(),
        money_on_hand: row.money_on_hand,
        appearance: Appearance {
            id: Some(row.appearance_id),
            hair: row.hair.clone(),
            eyes: row.eyes.clone(),
            skin: row.skin.clone(),
            build: row.build.clone(),
            description: row.appearance_description.clone(),
        },
        languages: Vec::new(),
        reputations: Vec::new(),
        ranks: Vec::new(),
    }
}

/// Append the row's embedded sub-records to the sheet's collections,
/// skipping null ids and ids already collected.
fn collect_sub_records(sheet: &mut CharacterSheet, row: JoinedSheetRow) {
    if let Some(id) = row.language_id {
        if !sheet.languages.iter().any(|l| l.id == Some(id)) {
            sheet.languages.push(Language {
                id: Some(id),
                name: row.language_name.unwrap_or_default(),
                spoken: row.spoken.unwrap_or_default(),
                written: row.written.unwrap_or_default(),
            });
        }
    }

    if let Some(id) = row.reputation_id {
        if !sheet.reputations.iter().any(|r| r.id == Some(id)) {
            sheet.reputations.push(Reputation {
                id: Some(id),
                description: row.reputation_description.unwrap_or_default(),
                reaction: row.reaction.unwrap_or_default(),
                scope: row.scope.unwrap_or_default(),
                frequency: row.frequency.unwrap_or_default(),
            });
        }
    }

    if let Some(id) = row.rank_id {
        if !sheet.ranks.iter().any(|r| r.id == Some(id)) {
            sheet.ranks.push(Rank {
                id: Some(id),
                organization: row.organization.unwrap_or_default(),
                title: row.title.unwrap_or_default(),
                description: row.rank_description.unwrap_or_default(),
            });
        }
    }
}
