//! Response envelope types for the sheet endpoints.
//!
//! Use these instead of ad-hoc `serde_json::json!` so the wire shapes the
//! sheet editor client depends on are checked at compile time.

use serde::Serialize;

use charbook_core::sheet::CharacterSheet;

/// `{"characters": [...]}` envelope returned by `GET /character`.
#[derive(Debug, Serialize)]
pub struct CharactersResponse {
    pub characters: Vec<CharacterSheet>,
}

/// `{"Message": "..."}` envelope returned by the write endpoints.
///
/// The capitalized key is what the existing client parses; keep it until
/// the client changes.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    #[serde(rename = "Message")]
    pub message: String,
}
