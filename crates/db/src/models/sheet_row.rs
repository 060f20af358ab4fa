//! Flat record for the five-table character join.

use charbook_core::reassembly::JoinedSheetRow;
use charbook_core::types::DbId;
use sqlx::FromRow;

/// One row of the character join query: character and appearance columns
/// duplicated per row, plus at most one language, reputation, and rank.
///
/// Field names match the column aliases in
/// [`crate::repositories::CharacterSheetRepo`]. The sub-entity columns
/// come from LEFT OUTER joins and are nullable as a group: either every
/// column of a sub-entity is present or its id is null.
#[derive(Debug, Clone, FromRow)]
pub struct SheetRowRecord {
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
    pub will: i32,
    pub perception: i32,
    pub hit_points: i32,
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

impl From<SheetRowRecord> for JoinedSheetRow {
    fn from(record: SheetRowRecord) -> Self {
        JoinedSheetRow {
            character_id: record.character_id,
            name: record.name,
            player: record.player,
            height: record.height,
            weight: record.weight,
            age: record.age,
            strength: record.strength,
            dexterity: record.dexterity,
            intelligence: record.intelligence,
            health: record.health,
            hit_points: record.hit_points,
            will: record.will,
            perception: record.perception,
            fatigue_points: record.fatigue_points,
            basic_speed: record.basic_speed,
            basic_move: record.basic_move,
            points_spent: record.points_spent,
            available_points: record.available_points,
            wealth_level: record.wealth_level,
            money_on_hand: record.money_on_hand,
            appearance_id: record.appearance_id,
            hair: record.hair,
            eyes: record.eyes,
            skin: record.skin,
            build: record.build,
            appearance_description: record.appearance_description,
            language_id: record.language_id,
            language_name: record.language_name,
            spoken: record.spoken,
            written: record.written,
            reputation_id: record.reputation_id,
            reputation_description: record.reputation_description,
            reaction: record.reaction,
            scope: record.scope,
            frequency: record.frequency,
            rank_id: record.rank_id,
            organization: record.organization,
            title: record.title,
            rank_description: record.rank_description,
        }
    }
}
