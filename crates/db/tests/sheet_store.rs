//! Integration tests for `CharacterSheetRepo` against a real database.
//!
//! Exercises the full read/write cycle: create a nested sheet, fold the
//! join output back into sheets, and reconcile submitted collections
//! against persisted rows (insert/update/delete per collection).

use assert_matches::assert_matches;
use sqlx::PgPool;

use charbook_core::error::CoreError;
use charbook_core::sheet::{Appearance, CharacterSheet, Language, Rank, Reputation};
use charbook_db::error::StoreError;
use charbook_db::repositories::CharacterSheetRepo;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn sample_sheet(name: &str) -> CharacterSheet {
    CharacterSheet {
        id: None,
        name: name.to_string(),
        player: "Alex".to_string(),
        height: "5'7\"".to_string(),
        weight: "135 lb".to_string(),
        age: 28,
        strength: 10,
        dexterity: 15,
        intelligence: 12,
        health: 12,
        hit_points: 10,
        will: 12,
        perception: 13,
        fatigue_points: 12,
        basic_speed: 6.75,
        basic_move: 6,
        points_spent: 150,
        available_points: 8,
        wealth_level: "Struggling".to_string(),
        money_on_hand: 200.0,
        appearance: Appearance {
            id: None,
            hair: "Brown".to_string(),
            eyes: "Grey".to_string(),
            skin: "Pale".to_string(),
            build: "Skinny".to_string(),
            description: "Slight and unassuming".to_string(),
        },
        languages: vec![
            Language {
                id: None,
                name: "Anglish".to_string(),
                spoken: "Native".to_string(),
                written: "Native".to_string(),
            },
            Language {
                id: None,
                name: "Tradetalk".to_string(),
                spoken: "Accented".to_string(),
                written: "None".to_string(),
            },
        ],
        reputations: vec![Reputation {
            id: None,
            description: "Master thief".to_string(),
            reaction: -2,
            scope: "City watch".to_string(),
            frequency: 10,
        }],
        ranks: vec![Rank {
            id: None,
            organization: "Thieves' Guild".to_string(),
            title: "Journeyman".to_string(),
            description: "Member in good standing".to_string(),
        }],
    }
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn fetch_by_id_returns_none_for_unknown_character(pool: PgPool) {
    let found = CharacterSheetRepo::fetch_by_id(&pool, 999_999).await.unwrap();
    assert!(found.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn fetch_all_on_empty_database_is_empty(pool: PgPool) {
    let sheets = CharacterSheetRepo::fetch_all(&pool).await.unwrap();
    assert!(sheets.is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn create_then_fetch_round_trips(pool: PgPool) {
    let submitted = sample_sheet("Dai Blackthorn");
    let id = CharacterSheetRepo::create_sheet(&pool, &submitted)
        .await
        .unwrap();

    let fetched = CharacterSheetRepo::fetch_by_id(&pool, id)
        .await
        .unwrap()
        .expect("created character should be fetchable");

    assert_eq!(fetched.id, Some(id));
    assert_eq!(fetched.name, submitted.name);
    assert_eq!(fetched.basic_speed, submitted.basic_speed);
    assert_eq!(fetched.money_on_hand, submitted.money_on_hand);
    assert_eq!(fetched.appearance.hair, submitted.appearance.hair);
    assert!(fetched.appearance.id.is_some());

    // The join cross-multiplies 2 languages x 1 reputation x 1 rank into
    // 2 rows; reassembly must collapse them back to the submitted counts.
    assert_eq!(fetched.languages.len(), 2);
    assert_eq!(fetched.reputations.len(), 1);
    assert_eq!(fetched.ranks.len(), 1);

    // Every sub-entity has a generated id.
    assert!(fetched.languages.iter().all(|l| l.id.is_some()));
    assert!(fetched.reputations.iter().all(|r| r.id.is_some()));
    assert!(fetched.ranks.iter().all(|r| r.id.is_some()));

    let names: Vec<&str> = fetched.languages.iter().map(|l| l.name.as_str()).collect();
    assert_eq!(names, vec!["Anglish", "Tradetalk"]);
}

#[sqlx::test(migrations = "./migrations")]
async fn fetch_all_separates_characters(pool: PgPool) {
    let first = CharacterSheetRepo::create_sheet(&pool, &sample_sheet("First"))
        .await
        .unwrap();
    let second = CharacterSheetRepo::create_sheet(&pool, &sample_sheet("Second"))
        .await
        .unwrap();

    let sheets = CharacterSheetRepo::fetch_all(&pool).await.unwrap();

    assert_eq!(sheets.len(), 2);
    assert_eq!(sheets[0].id, Some(first));
    assert_eq!(sheets[1].id, Some(second));
    // Each sheet only carries its own sub-entities.
    assert_eq!(sheets[0].languages.len(), 2);
    assert_eq!(sheets[1].languages.len(), 2);
}

// ---------------------------------------------------------------------------
// Reconciliation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn update_scalar_and_appearance_fields(pool: PgPool) {
    let id = CharacterSheetRepo::create_sheet(&pool, &sample_sheet("Dai"))
        .await
        .unwrap();

    let mut sheet = CharacterSheetRepo::fetch_by_id(&pool, id)
        .await
        .unwrap()
        .unwrap();
    sheet.money_on_hand = 950.0;
    sheet.appearance.hair = "Dyed red".to_string();

    let updated = CharacterSheetRepo::update_sheet(&pool, id, &sheet)
        .await
        .unwrap();
    assert!(updated);

    let fetched = CharacterSheetRepo::fetch_by_id(&pool, id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(fetched.money_on_hand, 950.0);
    assert_eq!(fetched.appearance.hair, "Dyed red");
}

#[sqlx::test(migrations = "./migrations")]
async fn omitted_sub_entity_is_deleted(pool: PgPool) {
    let id = CharacterSheetRepo::create_sheet(&pool, &sample_sheet("Dai"))
        .await
        .unwrap();

    let mut sheet = CharacterSheetRepo::fetch_by_id(&pool, id)
        .await
        .unwrap()
        .unwrap();
    let removed = sheet.languages.remove(0);

    CharacterSheetRepo::update_sheet(&pool, id, &sheet)
        .await
        .unwrap();

    let fetched = CharacterSheetRepo::fetch_by_id(&pool, id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(fetched.languages.len(), 1);
    assert!(fetched.languages.iter().all(|l| l.id != removed.id));
}

#[sqlx::test(migrations = "./migrations")]
async fn submitted_item_without_id_is_inserted(pool: PgPool) {
    let id = CharacterSheetRepo::create_sheet(&pool, &sample_sheet("Dai"))
        .await
        .unwrap();

    let mut sheet = CharacterSheetRepo::fetch_by_id(&pool, id)
        .await
        .unwrap()
        .unwrap();
    sheet.ranks.push(Rank {
        id: None,
        organization: "City Militia".to_string(),
        title: "Recruit".to_string(),
        description: String::new(),
    });

    CharacterSheetRepo::update_sheet(&pool, id, &sheet)
        .await
        .unwrap();

    let fetched = CharacterSheetRepo::fetch_by_id(&pool, id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(fetched.ranks.len(), 2);
    assert!(fetched.ranks.iter().all(|r| r.id.is_some()));
}

#[sqlx::test(migrations = "./migrations")]
async fn submitted_item_with_matching_id_is_updated_in_place(pool: PgPool) {
    let id = CharacterSheetRepo::create_sheet(&pool, &sample_sheet("Dai"))
        .await
        .unwrap();

    let mut sheet = CharacterSheetRepo::fetch_by_id(&pool, id)
        .await
        .unwrap()
        .unwrap();
    let language_id = sheet.languages[0].id;
    sheet.languages[0].written = "Broken".to_string();

    CharacterSheetRepo::update_sheet(&pool, id, &sheet)
        .await
        .unwrap();

    let fetched = CharacterSheetRepo::fetch_by_id(&pool, id)
        .await
        .unwrap()
        .unwrap();
    let updated = fetched
        .languages
        .iter()
        .find(|l| l.id == language_id)
        .expect("updated language keeps its id");
    assert_eq!(updated.written, "Broken");
    assert_eq!(fetched.languages.len(), 2);
}

#[sqlx::test(migrations = "./migrations")]
async fn stale_submitted_id_rejects_the_whole_update(pool: PgPool) {
    let id = CharacterSheetRepo::create_sheet(&pool, &sample_sheet("Dai"))
        .await
        .unwrap();

    let mut sheet = CharacterSheetRepo::fetch_by_id(&pool, id)
        .await
        .unwrap()
        .unwrap();
    let original_name = sheet.languages[1].name.clone();
    sheet.languages[1].id = Some(999_999);
    sheet.name = "Should not stick".to_string();

    let err = CharacterSheetRepo::update_sheet(&pool, id, &sheet)
        .await
        .unwrap_err();
    assert_matches!(err, StoreError::Core(CoreError::Validation(_)));

    // Nothing was written: the character scalar update rolled back too.
    let fetched = CharacterSheetRepo::fetch_by_id(&pool, id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(fetched.name, "Dai");
    assert!(fetched.languages.iter().any(|l| l.name == original_name));
}

#[sqlx::test(migrations = "./migrations")]
async fn update_of_unknown_character_reports_missing(pool: PgPool) {
    let sheet = sample_sheet("Ghost");
    let updated = CharacterSheetRepo::update_sheet(&pool, 424_242, &sheet)
        .await
        .unwrap();
    assert!(!updated);
}

#[sqlx::test(migrations = "./migrations")]
async fn emptying_every_collection_succeeds(pool: PgPool) {
    let id = CharacterSheetRepo::create_sheet(&pool, &sample_sheet("Dai"))
        .await
        .unwrap();

    let mut sheet = CharacterSheetRepo::fetch_by_id(&pool, id)
        .await
        .unwrap()
        .unwrap();
    sheet.languages.clear();
    sheet.reputations.clear();
    sheet.ranks.clear();

    CharacterSheetRepo::update_sheet(&pool, id, &sheet)
        .await
        .unwrap();

    let fetched = CharacterSheetRepo::fetch_by_id(&pool, id)
        .await
        .unwrap()
        .unwrap();
    assert!(fetched.languages.is_empty());
    assert!(fetched.reputations.is_empty());
    assert!(fetched.ranks.is_empty());
    // The character itself survives with its appearance intact.
    assert_eq!(fetched.appearance.eyes, "Grey");
}
