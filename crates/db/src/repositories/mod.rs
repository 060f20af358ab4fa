//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod character_sheet_repo;

pub use character_sheet_repo::CharacterSheetRepo;
