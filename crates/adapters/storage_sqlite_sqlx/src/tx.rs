//! `SQLite` implementation of the transaction port.

use std::future::Future;

use sqlx::{Sqlite, SqliteConnection};

use stratum_app::ports::{Transaction, TxMode};
use stratum_domain::error::StratumError;

use crate::error::StorageError;

/// An open `SQLite` transaction.
///
/// Read-only transactions are never committed: releasing one always rolls
/// back. Dropping an unfinished transaction rolls it back.
pub struct SqliteTransaction {
    inner: sqlx::Transaction<'static, Sqlite>,
    mode: TxMode,
}

impl SqliteTransaction {
    pub(crate) fn new(inner: sqlx::Transaction<'static, Sqlite>, mode: TxMode) -> Self {
        Self { inner, mode }
    }

    /// Mode the transaction was opened in.
    #[must_use]
    pub fn mode(&self) -> TxMode {
        self.mode
    }

    pub(crate) fn conn(&mut self) -> &mut SqliteConnection {
        &mut self.inner
    }
}

impl Transaction for SqliteTransaction {
    fn commit(self) -> impl Future<Output = Result<(), StratumError>> + Send {
        async move {
            let released = match self.mode {
                TxMode::ReadWrite => self.inner.commit().await,
                TxMode::ReadOnly => self.inner.rollback().await,
            };
            released.map_err(StorageError::from)?;
            Ok(())
        }
    }

    fn rollback(self) -> impl Future<Output = Result<(), StratumError>> + Send {
        async move {
            self.inner.rollback().await.map_err(StorageError::from)?;
            Ok(())
        }
    }
}
