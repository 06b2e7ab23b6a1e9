//! Test doubles shared by the service and realm tests.

use std::fmt::{self, Write as _};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use stratum_domain::app::App;
use stratum_domain::error::{MapperError, StratumError};
use stratum_domain::id::AppId;
use tracing::field::{Field, Visit};
use tracing::subscriber::DefaultGuard;
use tracing::{Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

use crate::ports::{Mapper, Transaction, TransactionBoundary, TxMode};

/// In-memory `Mapper<App>` with snapshot transactions.
///
/// `begin` copies the committed rows; `commit` swaps the copy back in.
/// Clones share the same store.
#[derive(Clone, Default)]
pub struct InMemoryAppMapper {
    committed: Arc<Mutex<Vec<App>>>,
    fail_next_write: Arc<AtomicBool>,
}

impl InMemoryAppMapper {
    /// Make the next write stage its change and then fail.
    pub fn fail_next_write(&self) {
        self.fail_next_write.store(true, Ordering::SeqCst);
    }
}

pub struct InMemoryTx {
    committed: Arc<Mutex<Vec<App>>>,
    staged: Vec<App>,
    fail_next_write: Arc<AtomicBool>,
}

impl InMemoryTx {
    fn check_injected_failure(&self) -> Result<(), StratumError> {
        if self.fail_next_write.swap(false, Ordering::SeqCst) {
            return Err(StratumError::storage(std::io::Error::other(
                "injected write failure",
            )));
        }
        Ok(())
    }

    fn position(&self, id: &AppId) -> Option<usize> {
        self.staged.iter().position(|app| app.id.as_ref() == Some(id))
    }
}

impl Transaction for InMemoryTx {
    async fn commit(self) -> Result<(), StratumError> {
        *self.committed.lock().unwrap() = self.staged;
        Ok(())
    }

    async fn rollback(self) -> Result<(), StratumError> {
        Ok(())
    }
}

impl TransactionBoundary for InMemoryAppMapper {
    type Tx = InMemoryTx;

    async fn begin(&self, _mode: TxMode) -> Result<InMemoryTx, StratumError> {
        let staged = self.committed.lock().unwrap().clone();
        Ok(InMemoryTx {
            committed: Arc::clone(&self.committed),
            staged,
            fail_next_write: Arc::clone(&self.fail_next_write),
        })
    }
}

fn matches(app: &App, probe: &App) -> bool {
    fn field<V: PartialEq>(value: &Option<V>, wanted: &Option<V>) -> bool {
        wanted.is_none() || value == wanted
    }
    field(&app.id, &probe.id)
        && field(&app.app_key, &probe.app_key)
        && field(&app.app_secret, &probe.app_secret)
        && field(&app.name, &probe.name)
        && field(&app.description, &probe.description)
        && field(&app.available, &probe.available)
        && field(&app.created_at, &probe.created_at)
}

fn merge_selective(target: &mut App, patch: &App) {
    fn field<V: Clone>(target: &mut Option<V>, patch: &Option<V>) {
        if patch.is_some() {
            target.clone_from(patch);
        }
    }
    field(&mut target.app_key, &patch.app_key);
    field(&mut target.app_secret, &patch.app_secret);
    field(&mut target.name, &patch.name);
    field(&mut target.description, &patch.description);
    field(&mut target.available, &patch.available);
    field(&mut target.created_at, &patch.created_at);
}

impl Mapper<App> for InMemoryAppMapper {
    async fn select_by_primary_key(
        &self,
        tx: &mut InMemoryTx,
        id: &AppId,
    ) -> Result<Option<App>, StratumError> {
        Ok(tx.position(id).map(|idx| tx.staged[idx].clone()))
    }

    async fn select_one(
        &self,
        tx: &mut InMemoryTx,
        probe: &App,
    ) -> Result<Option<App>, StratumError> {
        let mut found: Vec<App> = tx
            .staged
            .iter()
            .filter(|app| matches(app, probe))
            .cloned()
            .collect();
        match found.len() {
            0 | 1 => Ok(found.pop()),
            _ => Err(MapperError::TooManyResults.into()),
        }
    }

    async fn select(&self, tx: &mut InMemoryTx, probe: &App) -> Result<Vec<App>, StratumError> {
        Ok(tx
            .staged
            .iter()
            .filter(|app| matches(app, probe))
            .cloned()
            .collect())
    }

    async fn select_all(&self, tx: &mut InMemoryTx) -> Result<Vec<App>, StratumError> {
        Ok(tx.staged.clone())
    }

    async fn insert_selective(&self, tx: &mut InMemoryTx, mut app: App) -> Result<App, StratumError> {
        app.id.get_or_insert_with(AppId::new);
        tx.staged.push(app.clone());
        tx.check_injected_failure()?;
        Ok(app)
    }

    async fn update_by_primary_key_selective(
        &self,
        tx: &mut InMemoryTx,
        app: &App,
    ) -> Result<u64, StratumError> {
        let id = app.id.ok_or(MapperError::MissingPrimaryKey)?;
        let Some(idx) = tx.position(&id) else {
            return Ok(0);
        };
        merge_selective(&mut tx.staged[idx], app);
        tx.check_injected_failure()?;
        Ok(1)
    }

    async fn update_by_primary_key(
        &self,
        tx: &mut InMemoryTx,
        app: &App,
    ) -> Result<u64, StratumError> {
        let id = app.id.ok_or(MapperError::MissingPrimaryKey)?;
        let Some(idx) = tx.position(&id) else {
            return Ok(0);
        };
        tx.staged[idx] = app.clone();
        tx.check_injected_failure()?;
        Ok(1)
    }

    async fn delete_by_primary_key(
        &self,
        tx: &mut InMemoryTx,
        id: &AppId,
    ) -> Result<u64, StratumError> {
        let before = tx.staged.len();
        tx.staged.retain(|app| app.id.as_ref() != Some(id));
        tx.check_injected_failure()?;
        Ok((before - tx.staged.len()) as u64)
    }

    async fn delete_by_ids(&self, tx: &mut InMemoryTx, ids: &[AppId]) -> Result<u64, StratumError> {
        let before = tx.staged.len();
        tx.staged
            .retain(|app| app.id.as_ref().is_none_or(|id| !ids.contains(id)));
        tx.check_injected_failure()?;
        Ok((before - tx.staged.len()) as u64)
    }
}

/// Mapper whose every call fails with [`FailingMapper::error`].
pub struct FailingMapper;

pub struct NoopTx;

impl FailingMapper {
    pub fn error() -> StratumError {
        StratumError::storage(std::io::Error::other("mapper unavailable"))
    }
}

impl Transaction for NoopTx {
    async fn commit(self) -> Result<(), StratumError> {
        Ok(())
    }

    async fn rollback(self) -> Result<(), StratumError> {
        Ok(())
    }
}

impl TransactionBoundary for FailingMapper {
    type Tx = NoopTx;

    async fn begin(&self, _mode: TxMode) -> Result<NoopTx, StratumError> {
        Ok(NoopTx)
    }
}

impl Mapper<App> for FailingMapper {
    async fn select_by_primary_key(
        &self,
        _tx: &mut NoopTx,
        _id: &AppId,
    ) -> Result<Option<App>, StratumError> {
        Err(Self::error())
    }

    async fn select_one(&self, _tx: &mut NoopTx, _probe: &App) -> Result<Option<App>, StratumError> {
        Err(Self::error())
    }

    async fn select(&self, _tx: &mut NoopTx, _probe: &App) -> Result<Vec<App>, StratumError> {
        Err(Self::error())
    }

    async fn select_all(&self, _tx: &mut NoopTx) -> Result<Vec<App>, StratumError> {
        Err(Self::error())
    }

    async fn insert_selective(&self, _tx: &mut NoopTx, _app: App) -> Result<App, StratumError> {
        Err(Self::error())
    }

    async fn update_by_primary_key_selective(
        &self,
        _tx: &mut NoopTx,
        _app: &App,
    ) -> Result<u64, StratumError> {
        Err(Self::error())
    }

    async fn update_by_primary_key(&self, _tx: &mut NoopTx, _app: &App) -> Result<u64, StratumError> {
        Err(Self::error())
    }

    async fn delete_by_primary_key(&self, _tx: &mut NoopTx, _id: &AppId) -> Result<u64, StratumError> {
        Err(Self::error())
    }

    async fn delete_by_ids(&self, _tx: &mut NoopTx, _ids: &[AppId]) -> Result<u64, StratumError> {
        Err(Self::error())
    }
}

/// Events recorded on the current thread while this value is alive.
pub struct CapturedEvents {
    events: Arc<Mutex<Vec<(Level, String)>>>,
    _guard: DefaultGuard,
}

impl CapturedEvents {
    /// Rendered fields of every `ERROR` event seen so far.
    pub fn errors(&self) -> Vec<String> {
        self.at_level(Level::ERROR)
    }

    pub fn at_level(&self, level: Level) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, fields)| fields.clone())
            .collect()
    }
}

/// Install a thread-local subscriber that records every event.
///
/// Works with `#[tokio::test]`, whose default runtime polls on the test thread.
pub fn capture_events() -> CapturedEvents {
    let events = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::registry().with(CaptureLayer {
        events: Arc::clone(&events),
    });
    CapturedEvents {
        events,
        _guard: tracing::subscriber::set_default(subscriber),
    }
}

struct CaptureLayer {
    events: Arc<Mutex<Vec<(Level, String)>>>,
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = FieldWriter(String::new());
        event.record(&mut visitor);
        self.events
            .lock()
            .unwrap()
            .push((*event.metadata().level(), visitor.0));
    }
}

struct FieldWriter(String);

impl Visit for FieldWriter {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        let _ = write!(self.0, "{}={value:?} ", field.name());
    }
}
