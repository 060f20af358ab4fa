//! Repository for character sheets and their owned collections.
//!
//! Reads go through a single five-table join whose output is folded back
//! into nested sheets by `charbook_core::reassembly`. Writes reconcile
//! the submitted sheet against the persisted rows inside one transaction,
//! so a failed statement rolls the whole reconciliation back and two
//! concurrent updates of the same character cannot interleave.

use std::collections::HashSet;

use sqlx::{PgPool, Postgres, Transaction};

use charbook_core::reassembly::{reassemble, JoinedSheetRow};
use charbook_core::reconcile::{CollectionDiff, PersistedIds, SheetDiff};
use charbook_core::sheet::{CharacterSheet, Language, Rank, Reputation};
use charbook_core::types::DbId;

use crate::error::StoreError;
use crate::models::sheet_row::SheetRowRecord;

/// Column list for the join query, aliased to match
/// [`SheetRowRecord`]'s field names.
const JOIN_COLUMNS: &str = "c.id AS character_id, c.name, c.player, c.height, c.weight, c.age, \
     c.strength, c.dexterity, c.intelligence, c.health, c.hit_points, c.will, \
     c.perception, c.fatigue_points, c.basic_speed, c.basic_move, c.points_spent, \
     c.available_points, c.wealth_level, c.money_on_hand, \
     a.id AS appearance_id, a.hair, a.eyes, a.skin, a.build, \
     a.description AS appearance_description, \
     l.id AS language_id, l.name AS language_name, l.spoken, l.written, \
     r.id AS reputation_id, r.description AS reputation_description, \
     r.reaction, r.scope, r.frequency, \
     k.id AS rank_id, k.organization, k.title, k.description AS rank_description";

/// Join clause shared by the read queries. The appearance join is inner
/// (a character always has exactly one); the collections are LEFT OUTER
/// so characters with empty collections still come back.
const JOIN_TABLES: &str = "FROM character c \
     JOIN appearance a ON a.character_id = c.id \
     LEFT JOIN language l ON l.character_id = c.id \
     LEFT JOIN reputation r ON r.character_id = c.id \
     LEFT JOIN rank k ON k.character_id = c.id";

/// The three owned collections, used to parameterize id-set reads and
/// deletes over the table name.
#[derive(Debug, Clone, Copy)]
enum SubEntityTable {
    Language,
    Reputation,
    Rank,
}

impl SubEntityTable {
    fn table_name(self) -> &'static str {
        match self {
            SubEntityTable::Language => "language",
            SubEntityTable::Reputation => "reputation",
            SubEntityTable::Rank => "rank",
        }
    }
}

/// Provides read and reconciling-write operations for character sheets.
pub struct CharacterSheetRepo;

impl CharacterSheetRepo {
    /// Fetch all characters as nested sheets, ordered by character id.
    pub async fn fetch_all(pool: &PgPool) -> Result<Vec<CharacterSheet>, sqlx::Error> {
        // Sub-entity ordering pins first-seen order to insertion order.
        let query = format!("SELECT {JOIN_COLUMNS} {JOIN_TABLES} ORDER BY c.id, l.id, r.id, k.id");
        let records = sqlx::query_as::<_, SheetRowRecord>(&query)
            .fetch_all(pool)
            .await?;

        let rows: Vec<JoinedSheetRow> = records.into_iter().map(Into::into).collect();
        Ok(reassemble(rows))
    }

    /// Fetch one character as a nested sheet. Returns `None` when the id
    /// has no rows.
    pub async fn fetch_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<CharacterSheet>, sqlx::Error> {
        let query =
            format!("SELECT {JOIN_COLUMNS} {JOIN_TABLES} WHERE c.id = $1 ORDER BY l.id, r.id, k.id");
        let records = sqlx::query_as::<_, SheetRowRecord>(&query)
            .bind(id)
            .fetch_all(pool)
            .await?;

        let rows: Vec<JoinedSheetRow> = records.into_iter().map(Into::into).collect();
        Ok(reassemble(rows).into_iter().next())
    }

    /// Insert a full sheet: character and appearance rows, then every
    /// sub-entity with the generated character id as its foreign key.
    /// All inserts run in one transaction. Returns the new character id.
    pub async fn create_sheet(pool: &PgPool, sheet: &CharacterSheet) -> Result<DbId, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let character_id: DbId = sqlx::query_scalar(
            "INSERT INTO character (name, player, height, weight, age, strength, dexterity, \
             intelligence, health, hit_points, will, perception, fatigue_points, basic_speed, \
             basic_move, points_spent, available_points, wealth_level, money_on_hand) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, \
             $17, $18, $19) \
             RETURNING id",
        )
        .bind(&sheet.name)
        .bind(&sheet.player)
        .bind(&sheet.height)
        .bind(&sheet.weight)
        .bind(sheet.age)
        .bind(sheet.strength)
        .bind(sheet.dexterity)
        .bind(sheet.intelligence)
        .bind(sheet.health)
        .bind(sheet.hit_points)
        .bind(sheet.will)
        .bind(sheet.perception)
        .bind(sheet.fatigue_points)
        .bind(sheet.basic_speed)
        .bind(sheet.basic_move)
        .bind(sheet.points_spent)
        .bind(sheet.available_points)
        .bind(&sheet.wealth_level)
        .bind(sheet.money_on_hand)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO appearance (character_id, hair, eyes, skin, build, description) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(character_id)
        .bind(&sheet.appearance.hair)
        .bind(&sheet.appearance.eyes)
        .bind(&sheet.appearance.skin)
        .bind(&sheet.appearance.build)
        .bind(&sheet.appearance.description)
        .execute(&mut *tx)
        .await?;

        for language in &sheet.languages {
            Self::insert_language(&mut tx, character_id, language).await?;
        }
        for rank in &sheet.ranks {
            Self::insert_rank(&mut tx, character_id, rank).await?;
        }
        for reputation in &sheet.reputations {
            Self::insert_reputation(&mut tx, character_id, reputation).await?;
        }

        tx.commit().await?;
        Ok(character_id)
    }

    /// Reconcile a submitted sheet against the persisted rows for `id`.
    ///
    /// Runs entirely in one transaction: the character row is locked
    /// first, the persisted id sets are read, the diff is computed (a
    /// stale or duplicated submitted id aborts before any write), then
    /// the character and appearance rows are updated in place and each
    /// collection's inserts, updates, and deletes are applied
    /// collection-by-collection.
    ///
    /// Returns `Ok(false)` when no character with `id` exists.
    pub async fn update_sheet(
        pool: &PgPool,
        id: DbId,
        sheet: &CharacterSheet,
    ) -> Result<bool, StoreError> {
        let mut tx = pool.begin().await?;

        // Lock the character row so two concurrent reconciliations of the
        // same sheet serialize instead of interleaving statements.
        let locked: Option<DbId> =
            sqlx::query_scalar("SELECT id FROM character WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            return Ok(false);
        }

        let persisted = PersistedIds {
            languages: Self::sub_entity_ids(&mut tx, SubEntityTable::Language, id).await?,
            reputations: Self::sub_entity_ids(&mut tx, SubEntityTable::Reputation, id).await?,
            ranks: Self::sub_entity_ids(&mut tx, SubEntityTable::Rank, id).await?,
        };
        let diff = SheetDiff::compute(sheet, &persisted)?;

        tracing::debug!(
            character_id = id,
            language_inserts = diff.languages.inserts.len(),
            language_updates = diff.languages.updates.len(),
            language_deletes = diff.languages.deletes.len(),
            reputation_inserts = diff.reputations.inserts.len(),
            reputation_updates = diff.reputations.updates.len(),
            reputation_deletes = diff.reputations.deletes.len(),
            rank_inserts = diff.ranks.inserts.len(),
            rank_updates = diff.ranks.updates.len(),
            rank_deletes = diff.ranks.deletes.len(),
            "Computed sheet reconciliation"
        );

        sqlx::query(
            "UPDATE character SET name = $2, player = $3, height = $4, weight = $5, age = $6, \
             strength = $7, dexterity = $8, intelligence = $9, health = $10, hit_points = $11, \
             will = $12, perception = $13, fatigue_points = $14, basic_speed = $15, \
             basic_move = $16, points_spent = $17, available_points = $18, wealth_level = $19, \
             money_on_hand = $20 \
             WHERE id = $1",
        )
        .bind(id)
        .bind(&sheet.name)
        .bind(&sheet.player)
        .bind(&sheet.height)
        .bind(&sheet.weight)
        .bind(sheet.age)
        .bind(sheet.strength)
        .bind(sheet.dexterity)
        .bind(sheet.intelligence)
        .bind(sheet.health)
        .bind(sheet.hit_points)
        .bind(sheet.will)
        .bind(sheet.perception)
        .bind(sheet.fatigue_points)
        .bind(sheet.basic_speed)
        .bind(sheet.basic_move)
        .bind(sheet.points_spent)
        .bind(sheet.available_points)
        .bind(&sheet.wealth_level)
        .bind(sheet.money_on_hand)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE appearance SET hair = $2, eyes = $3, skin = $4, build = $5, \
             description = $6 \
             WHERE character_id = $1",
        )
        .bind(id)
        .bind(&sheet.appearance.hair)
        .bind(&sheet.appearance.eyes)
        .bind(&sheet.appearance.skin)
        .bind(&sheet.appearance.build)
        .bind(&sheet.appearance.description)
        .execute(&mut *tx)
        .await?;

        Self::apply_languages(&mut tx, id, &diff.languages).await?;
        Self::apply_ranks(&mut tx, id, &diff.ranks).await?;
        Self::apply_reputations(&mut tx, id, &diff.reputations).await?;

        tx.commit().await?;
        Ok(true)
    }

    /// Read the set of persisted ids for one collection of a character.
    async fn sub_entity_ids(
        tx: &mut Transaction<'_, Postgres>,
        table: SubEntityTable,
        character_id: DbId,
    ) -> Result<HashSet<DbId>, sqlx::Error> {
        let query = format!(
            "SELECT id FROM {} WHERE character_id = $1",
            table.table_name()
        );
        let ids: Vec<DbId> = sqlx::query_scalar(&query)
            .bind(character_id)
            .fetch_all(&mut **tx)
            .await?;
        Ok(ids.into_iter().collect())
    }

    // -- Languages --

    async fn apply_languages(
        tx: &mut Transaction<'_, Postgres>,
        character_id: DbId,
        diff: &CollectionDiff<Language>,
    ) -> Result<(), sqlx::Error> {
        for language in &diff.inserts {
            Self::insert_language(tx, character_id, language).await?;
        }
        for (item_id, language) in &diff.updates {
            sqlx::query("UPDATE language SET name = $2, spoken = $3, written = $4 WHERE id = $1")
                .bind(item_id)
                .bind(&language.name)
                .bind(&language.spoken)
                .bind(&language.written)
                .execute(&mut **tx)
                .await?;
        }
        Self::delete_sub_entities(tx, SubEntityTable::Language, &diff.deletes).await
    }

    async fn insert_language(
        tx: &mut Transaction<'_, Postgres>,
        character_id: DbId,
        language: &Language,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO language (character_id, name, spoken, written) VALUES ($1, $2, $3, $4)",
        )
        .bind(character_id)
        .bind(&language.name)
        .bind(&language.spoken)
        .bind(&language.written)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    // -- Ranks --

    async fn apply_ranks(
        tx: &mut Transaction<'_, Postgres>,
        character_id: DbId,
        diff: &CollectionDiff<Rank>,
    ) -> Result<(), sqlx::Error> {
        for rank in &diff.inserts {
            Self::insert_rank(tx, character_id, rank).await?;
        }
        for (item_id, rank) in &diff.updates {
            sqlx::query(
                "UPDATE rank SET organization = $2, title = $3, description = $4 WHERE id = $1",
            )
            .bind(item_id)
            .bind(&rank.organization)
            .bind(&rank.title)
            .bind(&rank.description)
            .execute(&mut **tx)
            .await?;
        }
        Self::delete_sub_entities(tx, SubEntityTable::Rank, &diff.deletes).await
    }

    async fn insert_rank(
        tx: &mut Transaction<'_, Postgres>,
        character_id: DbId,
        rank: &Rank,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO rank (character_id, organization, title, description) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(character_id)
        .bind(&rank.organization)
        .bind(&rank.title)
        .bind(&rank.description)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    // -- Reputations --

    async fn apply_reputations(
        tx: &mut Transaction<'_, Postgres>,
        character_id: DbId,
        diff: &CollectionDiff<Reputation>,
    ) -> Result<(), sqlx::Error> {
        for reputation in &diff.inserts {
            Self::insert_reputation(tx, character_id, reputation).await?;
        }
        for (item_id, reputation) in &diff.updates {
            sqlx::query(
                "UPDATE reputation SET description = $2, reaction = $3, scope = $4, \
                 frequency = $5 \
                 WHERE id = $1",
            )
            .bind(item_id)
            .bind(&reputation.description)
            .bind(reputation.reaction)
            .bind(&reputation.scope)
            .bind(reputation.frequency)
            .execute(&mut **tx)
            .await?;
        }
        Self::delete_sub_entities(tx, SubEntityTable::Reputation, &diff.deletes).await
    }

    async fn insert_reputation(
        tx: &mut Transaction<'_, Postgres>,
        character_id: DbId,
        reputation: &Reputation,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO reputation (character_id, description, reaction, scope, frequency) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(character_id)
        .bind(&reputation.description)
        .bind(reputation.reaction)
        .bind(&reputation.scope)
        .bind(reputation.frequency)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    // -- Deletes --

    async fn delete_sub_entities(
        tx: &mut Transaction<'_, Postgres>,
        table: SubEntityTable,
        ids: &[DbId],
    ) -> Result<(), sqlx::Error> {
        for item_id in ids {
            let query = format!("DELETE FROM {} WHERE id = $1", table.table_name());
            sqlx::query(&query)
                .bind(item_id)
                .execute(&mut **tx)
                .await?;
        }
        Ok(())
    }
}
