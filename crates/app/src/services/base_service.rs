//! Base service — uniform CRUD over any [`Mapper`].
//!
//! Each operation opens one transaction, performs one mapper call, and
//! releases the transaction through [`finish`]. Failures are logged once with
//! the entity's fully-qualified type name (and key, where there is one) and
//! returned unchanged.

use std::any::type_name;
use std::marker::PhantomData;

use stratum_domain::app::App;
use stratum_domain::entity::{DisplayIds, Entity};
use stratum_domain::error::{ErrorChain, StratumError};

use crate::ports::transaction::finish;
use crate::ports::{Mapper, TxMode};

/// Generic CRUD service for entity type `T` backed by mapper `M`.
pub struct BaseService<T, M> {
    mapper: M,
    domain_name: &'static str,
    _entity: PhantomData<fn() -> T>,
}

/// CRUD service for [`App`] records.
pub type AppService<M> = BaseService<App, M>;

impl<T, M> BaseService<T, M>
where
    T: Entity,
    M: Mapper<T> + Sync,
{
    /// Create a new service backed by the given mapper.
    pub fn new(mapper: M) -> Self {
        Self {
            mapper,
            domain_name: type_name::<T>(),
            _entity: PhantomData,
        }
    }

    /// Fully-qualified name of `T`, as it appears in log events.
    #[must_use]
    pub fn entity_name(&self) -> &'static str {
        self.domain_name
    }

    /// Borrow the underlying mapper.
    #[must_use]
    pub fn mapper(&self) -> &M {
        &self.mapper
    }

    /// Fetch a record by primary key.
    ///
    /// # Errors
    ///
    /// Propagates any transaction or mapper failure.
    pub async fn get_by_id(&self, id: &T::Id) -> Result<Option<T>, StratumError> {
        let result = async {
            let mut tx = self.mapper.begin(TxMode::ReadOnly).await?;
            let found = self.mapper.select_by_primary_key(&mut tx, id).await;
            finish(tx, TxMode::ReadOnly, found).await
        }
        .await;
        result.inspect_err(|err| {
            tracing::error!(entity = self.domain_name, %id, error = %ErrorChain(err), "failed to get record by id");
        })
    }

    /// Fetch the single record matching the `Some` fields of `probe`.
    ///
    /// # Errors
    ///
    /// Propagates any transaction or mapper failure, including the mapper's
    /// error when more than one record matches.
    pub async fn get_by_entity(&self, probe: &T) -> Result<Option<T>, StratumError> {
        let result = async {
            let mut tx = self.mapper.begin(TxMode::ReadOnly).await?;
            let found = self.mapper.select_one(&mut tx, probe).await;
            finish(tx, TxMode::ReadOnly, found).await
        }
        .await;
        result.inspect_err(|err| {
            tracing::error!(entity = self.domain_name, error = %ErrorChain(err), "failed to get record by example");
        })
    }

    /// Fetch every record matching the `Some` fields of `probe`.
    ///
    /// # Errors
    ///
    /// Propagates any transaction or mapper failure.
    pub async fn list(&self, probe: &T) -> Result<Vec<T>, StratumError> {
        let result = async {
            let mut tx = self.mapper.begin(TxMode::ReadOnly).await?;
            let found = self.mapper.select(&mut tx, probe).await;
            finish(tx, TxMode::ReadOnly, found).await
        }
        .await;
        result.inspect_err(|err| {
            tracing::error!(entity = self.domain_name, error = %ErrorChain(err), "failed to list records");
        })
    }

    /// Fetch every record.
    ///
    /// # Errors
    ///
    /// Propagates any transaction or mapper failure.
    pub async fn list_all(&self) -> Result<Vec<T>, StratumError> {
        let result = async {
            let mut tx = self.mapper.begin(TxMode::ReadOnly).await?;
            let found = self.mapper.select_all(&mut tx).await;
            finish(tx, TxMode::ReadOnly, found).await
        }
        .await;
        result.inspect_err(|err| {
            tracing::error!(entity = self.domain_name, error = %ErrorChain(err), "failed to list all records");
        })
    }

    /// Insert the `Some` fields of `entity`. Returns the stored record with
    /// its primary key.
    ///
    /// # Errors
    ///
    /// Propagates any transaction or mapper failure; nothing is written.
    pub async fn save(&self, entity: T) -> Result<T, StratumError> {
        let result = async {
            let mut tx = self.mapper.begin(TxMode::ReadWrite).await?;
            let saved = self.mapper.insert_selective(&mut tx, entity).await;
            finish(tx, TxMode::ReadWrite, saved).await
        }
        .await;
        result.inspect_err(|err| {
            tracing::error!(entity = self.domain_name, error = %ErrorChain(err), "failed to save record");
        })
    }

    /// Overwrite the `Some` fields of the record with `entity`'s key.
    /// Returns the number of rows affected.
    ///
    /// # Errors
    ///
    /// Propagates any transaction or mapper failure; nothing is written.
    pub async fn update(&self, entity: &T) -> Result<u64, StratumError> {
        let result = async {
            let mut tx = self.mapper.begin(TxMode::ReadWrite).await?;
            let affected = self
                .mapper
                .update_by_primary_key_selective(&mut tx, entity)
                .await;
            finish(tx, TxMode::ReadWrite, affected).await
        }
        .await;
        result.inspect_err(|err| {
            tracing::error!(
                entity = self.domain_name,
                id = ?entity.id(),
                error = %ErrorChain(err),
                "failed to update record"
            );
        })
    }

    /// Overwrite every field of the record with `entity`'s key, storing
    /// `None` fields as absent. Returns the number of rows affected.
    ///
    /// # Errors
    ///
    /// Propagates any transaction or mapper failure; nothing is written.
    pub async fn update_entity(&self, entity: &T) -> Result<u64, StratumError> {
        let result = async {
            let mut tx = self.mapper.begin(TxMode::ReadWrite).await?;
            let affected = self.mapper.update_by_primary_key(&mut tx, entity).await;
            finish(tx, TxMode::ReadWrite, affected).await
        }
        .await;
        result.inspect_err(|err| {
            tracing::error!(
                entity = self.domain_name,
                id = ?entity.id(),
                error = %ErrorChain(err),
                "failed to replace record"
            );
        })
    }

    /// Delete the record with the given key. Returns the number of rows affected.
    ///
    /// # Errors
    ///
    /// Propagates any transaction or mapper failure; nothing is deleted.
    pub async fn delete(&self, id: &T::Id) -> Result<u64, StratumError> {
        let result = async {
            let mut tx = self.mapper.begin(TxMode::ReadWrite).await?;
            let affected = self.mapper.delete_by_primary_key(&mut tx, id).await;
            finish(tx, TxMode::ReadWrite, affected).await
        }
        .await;
        result.inspect_err(|err| {
            tracing::error!(entity = self.domain_name, %id, error = %ErrorChain(err), "failed to delete record");
        })
    }

    /// Delete every record whose key is in `ids`. Returns the number of rows
    /// affected; an empty slice deletes nothing.
    ///
    /// # Errors
    ///
    /// Propagates any transaction or mapper failure; nothing is deleted.
    pub async fn delete_ids(&self, ids: &[T::Id]) -> Result<u64, StratumError> {
        let result = async {
            let mut tx = self.mapper.begin(TxMode::ReadWrite).await?;
            let affected = self.mapper.delete_by_ids(&mut tx, ids).await;
            finish(tx, TxMode::ReadWrite, affected).await
        }
        .await;
        result.inspect_err(|err| {
            tracing::error!(
                entity = self.domain_name,
                ids = %DisplayIds(ids),
                error = %ErrorChain(err),
                "failed to delete records"
            );
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{CapturedEvents, FailingMapper, InMemoryAppMapper, capture_events};
    use stratum_domain::error::MapperError;
    use stratum_domain::id::AppId;

    fn make_service() -> AppService<InMemoryAppMapper> {
        AppService::new(InMemoryAppMapper::default())
    }

    fn mobile_app() -> App {
        App::builder()
            .app_key("mobile")
            .name("Mobile client")
            .description("iOS and Android")
            .partial()
    }

    fn assert_single_error(events: &CapturedEvents, needles: &[&str]) {
        let errors = events.errors();
        assert_eq!(errors.len(), 1, "expected one error event, got {errors:?}");
        for needle in needles {
            assert!(
                errors[0].contains(needle),
                "error event {:?} does not mention {needle}",
                errors[0]
            );
        }
    }

    #[test]
    fn should_cache_fully_qualified_entity_name() {
        let svc = make_service();
        assert_eq!(svc.entity_name(), type_name::<App>());
        assert_eq!(svc.entity_name(), "stratum_domain::app::App");
    }

    #[tokio::test]
    async fn should_return_saved_fields_when_fetched_by_generated_id() {
        let svc = make_service();

        let saved = svc.save(mobile_app()).await.unwrap();
        let id = saved.id.expect("insert should assign a primary key");

        let fetched = svc.get_by_id(&id).await.unwrap().unwrap();
        assert_eq!(fetched, App { id: Some(id), ..mobile_app() });
    }

    #[tokio::test]
    async fn should_return_none_when_id_unknown() {
        let svc = make_service();
        let result = svc.get_by_id(&AppId::new()).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn should_keep_absent_fields_on_selective_update() {
        let svc = make_service();
        let id = svc.save(mobile_app()).await.unwrap().id.unwrap();

        let patch = App::builder().id(id).name("Renamed").partial();
        let affected = svc.update(&patch).await.unwrap();
        assert_eq!(affected, 1);

        let fetched = svc.get_by_id(&id).await.unwrap().unwrap();
        assert_eq!(fetched.name.as_deref(), Some("Renamed"));
        assert_eq!(fetched.app_key.as_deref(), Some("mobile"));
        assert_eq!(fetched.description.as_deref(), Some("iOS and Android"));
    }

    #[tokio::test]
    async fn should_clear_absent_fields_on_full_update() {
        let svc = make_service();
        let id = svc.save(mobile_app()).await.unwrap().id.unwrap();

        let replacement = App::builder().id(id).name("Renamed").partial();
        let affected = svc.update_entity(&replacement).await.unwrap();
        assert_eq!(affected, 1);

        let fetched = svc.get_by_id(&id).await.unwrap().unwrap();
        assert_eq!(fetched, replacement);
        assert!(fetched.app_key.is_none());
        assert!(fetched.description.is_none());
    }

    #[tokio::test]
    async fn should_report_zero_rows_when_updating_missing_record() {
        let svc = make_service();
        let patch = App::builder().id(AppId::new()).name("Ghost").partial();
        assert_eq!(svc.update(&patch).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn should_not_find_record_after_delete() {
        let svc = make_service();
        let id = svc.save(mobile_app()).await.unwrap().id.unwrap();

        assert_eq!(svc.delete(&id).await.unwrap(), 1);

        assert!(svc.get_by_id(&id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn should_delete_only_listed_ids() {
        let svc = make_service();
        let a = svc.save(mobile_app()).await.unwrap().id.unwrap();
        let b = svc
            .save(App::builder().app_key("web").name("Web").partial())
            .await
            .unwrap()
            .id
            .unwrap();
        let c = svc
            .save(App::builder().app_key("cli").name("CLI").partial())
            .await
            .unwrap()
            .id
            .unwrap();

        let affected = svc.delete_ids(&[a, c, AppId::new()]).await.unwrap();
        assert_eq!(affected, 2);

        let remaining = svc.list_all().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, Some(b));
    }

    #[tokio::test]
    async fn should_delete_nothing_when_id_list_empty() {
        let svc = make_service();
        svc.save(mobile_app()).await.unwrap();

        assert_eq!(svc.delete_ids(&[]).await.unwrap(), 0);
        assert_eq!(svc.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn should_list_records_matching_probe() {
        let svc = make_service();
        svc.save(mobile_app()).await.unwrap();
        svc.save(App::builder().app_key("web").name("Web").available(false).partial())
            .await
            .unwrap();
        svc.save(App::builder().app_key("cli").name("CLI").available(false).partial())
            .await
            .unwrap();

        let disabled = svc
            .list(&App::builder().available(false).partial())
            .await
            .unwrap();
        let keys: Vec<_> = disabled.iter().filter_map(|a| a.app_key.as_deref()).collect();
        assert_eq!(keys, vec!["web", "cli"]);

        let everything = svc.list(&App::default()).await.unwrap();
        assert_eq!(everything.len(), 3);
    }

    #[tokio::test]
    async fn should_get_single_record_matching_probe() {
        let svc = make_service();
        svc.save(mobile_app()).await.unwrap();

        let found = svc
            .get_by_entity(&App::with_app_key("mobile"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.name.as_deref(), Some("Mobile client"));

        let missing = svc.get_by_entity(&App::with_app_key("nope")).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn should_propagate_ambiguous_match_from_mapper() {
        let svc = make_service();
        svc.save(mobile_app()).await.unwrap();
        svc.save(App::builder().app_key("web").name("Web").partial())
            .await
            .unwrap();

        let result = svc.get_by_entity(&App::default()).await;
        assert!(matches!(
            result,
            Err(StratumError::Mapper(MapperError::TooManyResults))
        ));
    }

    #[tokio::test]
    async fn should_leave_store_unchanged_when_write_fails() {
        let mapper = InMemoryAppMapper::default();
        mapper.fail_next_write();
        let svc = AppService::new(mapper);

        let result = svc.save(mobile_app()).await;
        assert!(result.is_err());
        assert!(svc.list_all().await.unwrap().is_empty());
    }

    async fn service_with_saved_app() -> (InMemoryAppMapper, AppService<InMemoryAppMapper>, App) {
        let mapper = InMemoryAppMapper::default();
        let svc = AppService::new(mapper.clone());
        let saved = svc.save(mobile_app()).await.unwrap();
        (mapper, svc, saved)
    }

    #[tokio::test]
    async fn should_keep_record_when_selective_update_fails() {
        let (mapper, svc, saved) = service_with_saved_app().await;
        mapper.fail_next_write();

        let patch = App {
            id: saved.id,
            name: Some("Renamed".to_string()),
            ..App::default()
        };
        assert!(svc.update(&patch).await.is_err());

        let stored = svc.get_by_id(&saved.id.unwrap()).await.unwrap();
        assert_eq!(stored, Some(saved));
    }

    #[tokio::test]
    async fn should_keep_record_when_full_update_fails() {
        let (mapper, svc, saved) = service_with_saved_app().await;
        mapper.fail_next_write();

        let replacement = App {
            id: saved.id,
            app_key: Some("desktop".to_string()),
            name: Some("Desktop".to_string()),
            ..App::default()
        };
        assert!(svc.update_entity(&replacement).await.is_err());

        let stored = svc.get_by_id(&saved.id.unwrap()).await.unwrap();
        assert_eq!(stored, Some(saved));
    }

    #[tokio::test]
    async fn should_keep_record_when_delete_fails() {
        let (mapper, svc, saved) = service_with_saved_app().await;
        mapper.fail_next_write();

        assert!(svc.delete(&saved.id.unwrap()).await.is_err());

        assert_eq!(svc.list_all().await.unwrap(), vec![saved]);
    }

    #[tokio::test]
    async fn should_keep_records_when_bulk_delete_fails() {
        let (mapper, svc, saved) = service_with_saved_app().await;
        let other = svc
            .save(App::builder().app_key("desktop").name("Desktop").partial())
            .await
            .unwrap();
        mapper.fail_next_write();

        let ids = [saved.id.unwrap(), other.id.unwrap()];
        assert!(svc.delete_ids(&ids).await.is_err());

        assert_eq!(svc.list_all().await.unwrap(), vec![saved, other]);
    }

    #[tokio::test]
    async fn should_log_once_with_entity_and_id_when_get_by_id_fails() {
        let events = capture_events();
        let svc = AppService::new(FailingMapper);
        let id = AppId::new();

        let err = svc.get_by_id(&id).await.unwrap_err();

        assert_eq!(err.to_string(), FailingMapper::error().to_string());
        assert_single_error(&events, &["stratum_domain::app::App", id.to_string().as_str()]);
    }

    #[tokio::test]
    async fn should_log_root_cause_of_wrapped_failure() {
        let events = capture_events();
        let svc = AppService::new(FailingMapper);

        svc.list_all().await.unwrap_err();

        assert_single_error(&events, &["storage error: mapper unavailable"]);
    }

    #[tokio::test]
    async fn should_log_once_with_entity_and_id_when_update_fails() {
        let events = capture_events();
        let svc = AppService::new(FailingMapper);
        let id = AppId::new();

        let err = svc
            .update(&App::builder().id(id).name("x").partial())
            .await
            .unwrap_err();

        assert!(matches!(err, StratumError::Storage(_)));
        assert_single_error(&events, &["stratum_domain::app::App", id.to_string().as_str()]);
    }

    #[tokio::test]
    async fn should_log_once_with_entity_and_id_when_update_entity_fails() {
        let events = capture_events();
        let svc = AppService::new(FailingMapper);
        let id = AppId::new();

        let err = svc
            .update_entity(&App::builder().id(id).partial())
            .await
            .unwrap_err();

        assert!(matches!(err, StratumError::Storage(_)));
        assert_single_error(&events, &["stratum_domain::app::App", id.to_string().as_str()]);
    }

    #[tokio::test]
    async fn should_log_once_with_entity_and_id_when_delete_fails() {
        let events = capture_events();
        let svc = AppService::new(FailingMapper);
        let id = AppId::new();

        let err = svc.delete(&id).await.unwrap_err();

        assert!(matches!(err, StratumError::Storage(_)));
        assert_single_error(&events, &["stratum_domain::app::App", id.to_string().as_str()]);
    }

    #[tokio::test]
    async fn should_log_once_with_entity_and_ids_when_delete_ids_fails() {
        let events = capture_events();
        let svc = AppService::new(FailingMapper);
        let a = AppId::new();
        let b = AppId::new();

        let err = svc.delete_ids(&[a, b]).await.unwrap_err();

        assert!(matches!(err, StratumError::Storage(_)));
        let (a, b) = (a.to_string(), b.to_string());
        assert_single_error(&events, &["stratum_domain::app::App", a.as_str(), b.as_str()]);
    }

    #[tokio::test]
    async fn should_log_once_when_save_fails() {
        let events = capture_events();
        let svc = AppService::new(FailingMapper);

        let err = svc.save(mobile_app()).await.unwrap_err();

        assert!(matches!(err, StratumError::Storage(_)));
        assert_single_error(&events, &["stratum_domain::app::App"]);
    }

    #[tokio::test]
    async fn should_not_log_errors_when_operations_succeed() {
        let events = capture_events();
        let svc = make_service();

        let id = svc.save(mobile_app()).await.unwrap().id.unwrap();
        svc.get_by_id(&id).await.unwrap();
        svc.delete(&id).await.unwrap();

        assert!(events.errors().is_empty());
    }
}
