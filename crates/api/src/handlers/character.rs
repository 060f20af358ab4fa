//! Handlers for the `/character` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use charbook_core::error::CoreError;
use charbook_core::sheet::CharacterSheet;
use charbook_core::types::DbId;
use charbook_db::repositories::CharacterSheetRepo;

use crate::error::{AppError, AppResult};
use crate::response::{CharactersResponse, MessageResponse};
use crate::state::AppState;

/// GET /character
pub async fn list(State(state): State<AppState>) -> AppResult<Json<CharactersResponse>> {
    let characters = CharacterSheetRepo::fetch_all(&state.pool).await?;
    Ok(Json(CharactersResponse { characters }))
}

/// GET /character/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<CharacterSheet>> {
    let sheet = CharacterSheetRepo::fetch_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Character",
            id,
        }))?;
    Ok(Json(sheet))
}

/// POST /character
///
/// The submitted sheet must carry no ids anywhere: every row is inserted
/// fresh and gets a generated id. A sheet that arrives with ids would
/// have them silently discarded, so it is rejected instead.
pub async fn create(
    State(state): State<AppState>,
    Json(sheet): Json<CharacterSheet>,
) -> AppResult<(StatusCode, Json<MessageResponse>)> {
    if sheet.has_persisted_ids() {
        return Err(AppError::BadRequest(
            "a new character must not carry ids".to_string(),
        ));
    }

    let id = CharacterSheetRepo::create_sheet(&state.pool, &sheet).await?;
    tracing::info!(character_id = id, name = %sheet.name, "Created character");

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: format!("Created character {id}"),
        }),
    ))
}

/// PUT /character
///
/// Reconciles the submitted sheet against the persisted one: scalar and
/// appearance fields are updated in place, and each sub-entity collection
/// is diffed by id (missing id inserts, matching id updates, omitted
/// persisted id deletes). The whole reconciliation is one transaction.
pub async fn update(
    State(state): State<AppState>,
    Json(sheet): Json<CharacterSheet>,
) -> AppResult<Json<MessageResponse>> {
    let id = sheet.id.ok_or_else(|| {
        AppError::BadRequest("an update must carry the character id".to_string())
    })?;

    let updated = CharacterSheetRepo::update_sheet(&state.pool, id, &sheet).await?;
    if !updated {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Character",
            id,
        }));
    }

    tracing::info!(character_id = id, "Updated character");
    Ok(Json(MessageResponse {
        message: format!("Updated character {id}"),
    }))
}
