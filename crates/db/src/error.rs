use charbook_core::error::CoreError;

/// Error type for repository operations that mix domain checks with SQL.
///
/// `update_sheet` validates the submitted sheet against persisted id sets
/// before writing, so it can fail either way; plain CRUD methods keep
/// returning `sqlx::Error` directly.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}
