//! Mapper port — generic data access for a single entity type.
//!
//! Every call runs inside a transaction obtained from the mapper's own
//! [`TransactionBoundary`]. Records are probes/selective writes as described in
//! [`stratum_domain::entity`]: `None` fields are ignored by `select`,
//! `select_one`, `insert_selective`, and `update_by_primary_key_selective`.

use std::future::Future;

use stratum_domain::app::App;
use stratum_domain::entity::Entity;
use stratum_domain::error::StratumError;

use super::transaction::TransactionBoundary;

/// Keyed lookup, example-based queries, and CRUD primitives for `T`.
pub trait Mapper<T: Entity>: TransactionBoundary {
    /// Fetch the record with the given primary key.
    fn select_by_primary_key(
        &self,
        tx: &mut Self::Tx,
        id: &T::Id,
    ) -> impl Future<Output = Result<Option<T>, StratumError>> + Send;

    /// Fetch the single record matching every `Some` field of `probe`.
    ///
    /// Fails with [`MapperError::TooManyResults`](stratum_domain::error::MapperError::TooManyResults)
    /// when more than one record matches.
    fn select_one(
        &self,
        tx: &mut Self::Tx,
        probe: &T,
    ) -> impl Future<Output = Result<Option<T>, StratumError>> + Send;

    /// Fetch every record matching every `Some` field of `probe`, in store order.
    fn select(
        &self,
        tx: &mut Self::Tx,
        probe: &T,
    ) -> impl Future<Output = Result<Vec<T>, StratumError>> + Send;

    /// Fetch every record.
    fn select_all(
        &self,
        tx: &mut Self::Tx,
    ) -> impl Future<Output = Result<Vec<T>, StratumError>> + Send;

    /// Insert the `Some` fields of `entity`, generating a primary key when the
    /// record has none. Returns the record with its key set.
    fn insert_selective(
        &self,
        tx: &mut Self::Tx,
        entity: T,
    ) -> impl Future<Output = Result<T, StratumError>> + Send;

    /// Overwrite the `Some` fields of the record sharing `entity`'s key.
    /// Returns the number of rows affected.
    fn update_by_primary_key_selective(
        &self,
        tx: &mut Self::Tx,
        entity: &T,
    ) -> impl Future<Output = Result<u64, StratumError>> + Send;

    /// Overwrite every field, `None` included, of the record sharing
    /// `entity`'s key. Returns the number of rows affected.
    fn update_by_primary_key(
        &self,
        tx: &mut Self::Tx,
        entity: &T,
    ) -> impl Future<Output = Result<u64, StratumError>> + Send;

    /// Delete the record with the given key. Returns the number of rows affected.
    fn delete_by_primary_key(
        &self,
        tx: &mut Self::Tx,
        id: &T::Id,
    ) -> impl Future<Output = Result<u64, StratumError>> + Send;

    /// Delete every record whose key is in `ids`. Returns the number of rows affected.
    fn delete_by_ids(
        &self,
        tx: &mut Self::Tx,
        ids: &[T::Id],
    ) -> impl Future<Output = Result<u64, StratumError>> + Send;
}

/// Mapper bound to [`App`] records.
pub trait AppMapper: Mapper<App> {}

impl<M: Mapper<App>> AppMapper for M {}
