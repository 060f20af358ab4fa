//! Route definitions for the `/character` resource.
//!
//! The sheet editor client submits whole sheets, so create and update
//! both target the collection path with the id (if any) in the body:
//!
//! ```text
//! GET  /character       -> list
//! POST /character       -> create (body must carry no ids)
//! PUT  /character       -> update (body carries the character id)
//! GET  /character/{id}  -> get_by_id
//! ```

use axum::routing::get;
use axum::Router;

use crate::handlers::character;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/character",
            get(character::list)
                .post(character::create)
                .put(character::update),
        )
        .route("/character/{id}", get(character::get_by_id))
}
