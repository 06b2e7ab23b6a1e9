//! Storage-specific error type wrapping sqlx errors.

use stratum_domain::error::StratumError;

/// Errors originating from the `SQLite` storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A query, connection, or transaction command failed.
    #[error("database error")]
    Database(#[from] sqlx::Error),

    /// Failed to run migrations.
    #[error("migration error")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl From<StorageError> for StratumError {
    fn from(err: StorageError) -> Self {
        Self::storage(err)
    }
}
