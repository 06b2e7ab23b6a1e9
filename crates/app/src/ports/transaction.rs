//! Transaction port — scoped units of work around mapper calls.

use std::future::Future;

use stratum_domain::error::{ErrorChain, StratumError};

/// Whether a unit of work may write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxMode {
    /// Reads only. The transaction is always rolled back when released.
    ReadOnly,
    /// Reads and writes. Committed on success, rolled back on failure.
    ReadWrite,
}

/// An open unit of work. Consumed by exactly one of `commit` or `rollback`.
///
/// Implementations must discard uncommitted work if the value is dropped
/// without being finished.
pub trait Transaction: Send {
    /// Make the work durable. Read-only transactions release without writing.
    fn commit(self) -> impl Future<Output = Result<(), StratumError>> + Send;

    /// Discard the work.
    fn rollback(self) -> impl Future<Output = Result<(), StratumError>> + Send;
}

/// Source of transactions for a backing store.
pub trait TransactionBoundary {
    /// Transaction handle passed to every mapper call.
    type Tx: Transaction;

    /// Open a transaction in the given mode.
    fn begin(&self, mode: TxMode) -> impl Future<Output = Result<Self::Tx, StratumError>> + Send;
}

/// Release `tx` according to `mode` and the outcome of the work done in it.
///
/// Successful read-write work is committed; everything else is rolled back.
/// When the work itself failed, a rollback failure is logged and the original
/// error is returned.
///
/// # Errors
///
/// Returns the work's error, or the commit/rollback error when the work
/// succeeded but the transaction could not be released.
pub async fn finish<X, R>(
    tx: X,
    mode: TxMode,
    outcome: Result<R, StratumError>,
) -> Result<R, StratumError>
where
    X: Transaction,
{
    match outcome {
        Ok(value) => {
            match mode {
                TxMode::ReadWrite => tx.commit().await?,
                TxMode::ReadOnly => tx.rollback().await?,
            }
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::warn!(error = %ErrorChain(&rollback_err), "failed to roll back transaction");
            }
            Err(err)
        }
    }
}
