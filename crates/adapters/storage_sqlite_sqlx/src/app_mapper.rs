//! `SQLite` implementation of [`Mapper<App>`].
//!
//! Selective statements are assembled with [`QueryBuilder`] from the columns
//! whose value is `Some`; full updates bind every column, `NULL` included.

use std::future::Future;
use std::str::FromStr;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, QueryBuilder, Row, Sqlite, SqlitePool};

use stratum_app::ports::{Mapper, TransactionBoundary, TxMode};
use stratum_domain::app::App;
use stratum_domain::error::{MapperError, StratumError, ValidationError};
use stratum_domain::id::AppId;

use crate::error::StorageError;
use crate::tx::SqliteTransaction;

/// Wrapper for converting database rows into domain [`App`].
struct Wrapper(App);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<App> {
        value.map(|w| w.0)
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let created_at: Option<String> = row.try_get("created_at")?;

        let id = AppId::from_str(&id).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let created_at = created_at
            .map(|s| chrono::DateTime::parse_from_rfc3339(&s))
            .transpose()
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?
            .map(|ts| ts.to_utc());

        Ok(Self(App {
            id: Some(id),
            app_key: row.try_get("app_key")?,
            app_secret: row.try_get("app_secret")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            available: row.try_get("available")?,
            created_at,
        }))
    }
}

const SELECT_BY_ID: &str = "SELECT * FROM apps WHERE id = ?";
const SELECT_ALL: &str = "SELECT * FROM apps ORDER BY rowid";
const DELETE_BY_ID: &str = "DELETE FROM apps WHERE id = ?";

/// A bindable column value.
enum Value {
    Text(String),
    Bool(bool),
}

/// Non-key columns of `app`, in table order.
fn columns(app: &App) -> [(&'static str, Option<Value>); 6] {
    [
        ("app_key", app.app_key.clone().map(Value::Text)),
        ("app_secret", app.app_secret.clone().map(Value::Text)),
        ("name", app.name.clone().map(Value::Text)),
        ("description", app.description.clone().map(Value::Text)),
        ("available", app.available.map(Value::Bool)),
        (
            "created_at",
            app.created_at.map(|ts| Value::Text(ts.to_rfc3339())),
        ),
    ]
}

fn push_value(qb: &mut QueryBuilder<'static, Sqlite>, value: Option<Value>) {
    match value {
        Some(Value::Text(text)) => qb.push_bind(text),
        Some(Value::Bool(flag)) => qb.push_bind(flag),
        None => qb.push_bind(None::<String>),
    };
}

/// `SELECT` matching every populated field of `probe`, key included.
fn probe_statement(probe: &App) -> QueryBuilder<'static, Sqlite> {
    let mut qb = QueryBuilder::new("SELECT * FROM apps");
    let key = probe
        .id
        .map(|id| ("id", Some(Value::Text(id.to_string()))));
    let mut first = true;
    for (column, value) in key.into_iter().chain(columns(probe)) {
        if value.is_none() {
            continue;
        }
        qb.push(if first { " WHERE " } else { " AND " });
        first = false;
        qb.push(column).push(" = ");
        push_value(&mut qb, value);
    }
    qb.push(" ORDER BY rowid");
    qb
}

/// Probe `SELECT` reading at most two rows, enough to detect ambiguity.
fn select_one_statement(probe: &App) -> QueryBuilder<'static, Sqlite> {
    let mut qb = probe_statement(probe);
    qb.push(" LIMIT 2");
    qb
}

/// `INSERT` of the key plus every populated field of `app`.
fn insert_statement(app: &App, id: AppId) -> QueryBuilder<'static, Sqlite> {
    let present: Vec<(&'static str, Value)> = columns(app)
        .into_iter()
        .filter_map(|(column, value)| value.map(|v| (column, v)))
        .collect();

    let mut qb = QueryBuilder::new("INSERT INTO apps (id");
    for (column, _) in &present {
        qb.push(", ").push(*column);
    }
    qb.push(") VALUES (").push_bind(id.to_string());
    for (_, value) in present {
        qb.push(", ");
        push_value(&mut qb, Some(value));
    }
    qb.push(")");
    qb
}

/// `UPDATE ... WHERE id = ?`, or `None` when a selective update has nothing
/// to write.
fn update_statement(
    app: &App,
    selective: bool,
) -> Result<Option<QueryBuilder<'static, Sqlite>>, MapperError> {
    let id = app.id.ok_or(MapperError::MissingPrimaryKey)?;

    let mut qb = QueryBuilder::new("UPDATE apps SET ");
    let mut assigned = 0_usize;
    for (column, value) in columns(app) {
        if selective && value.is_none() {
            continue;
        }
        if assigned > 0 {
            qb.push(", ");
        }
        qb.push(column).push(" = ");
        push_value(&mut qb, value);
        assigned += 1;
    }
    if assigned == 0 {
        return Ok(None);
    }
    qb.push(" WHERE id = ").push_bind(id.to_string());
    Ok(Some(qb))
}

/// Convert a failed write, reporting an `app_key` collision as a duplicate.
fn write_error(err: sqlx::Error) -> StratumError {
    if let sqlx::Error::Database(db) = &err
        && db.is_unique_violation()
        && db.message().contains("apps.app_key")
    {
        return ValidationError::Duplicate("app_key").into();
    }
    StorageError::from(err).into()
}

/// `SQLite`-backed app mapper.
pub struct SqliteAppMapper {
    pool: SqlitePool,
}

impl SqliteAppMapper {
    /// Create a new mapper using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn update(
        tx: &mut SqliteTransaction,
        app: &App,
        selective: bool,
    ) -> impl Future<Output = Result<u64, StratumError>> + Send {
        let statement = update_statement(app, selective);
        async move {
            let Some(mut qb) = statement? else {
                return Ok(0);
            };
            let result = qb
                .build()
                .execute(tx.conn())
                .await
                .map_err(write_error)?;
            Ok(result.rows_affected())
        }
    }
}

impl TransactionBoundary for SqliteAppMapper {
    type Tx = SqliteTransaction;

    fn begin(
        &self,
        mode: TxMode,
    ) -> impl Future<Output = Result<SqliteTransaction, StratumError>> + Send {
        let pool = self.pool.clone();
        async move {
            let inner = pool.begin().await.map_err(StorageError::from)?;
            Ok(SqliteTransaction::new(inner, mode))
        }
    }
}

impl Mapper<App> for SqliteAppMapper {
    fn select_by_primary_key(
        &self,
        tx: &mut SqliteTransaction,
        id: &AppId,
    ) -> impl Future<Output = Result<Option<App>, StratumError>> + Send {
        let id = id.to_string();
        async move {
            let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
                .bind(id)
                .fetch_optional(tx.conn())
                .await
                .map_err(StorageError::from)?;

            Ok(Wrapper::maybe(row))
        }
    }

    fn select_one(
        &self,
        tx: &mut SqliteTransaction,
        probe: &App,
    ) -> impl Future<Output = Result<Option<App>, StratumError>> + Send {
        let mut qb = select_one_statement(probe);
        async move {
            let mut rows: Vec<Wrapper> = qb
                .build_query_as()
                .fetch_all(tx.conn())
                .await
                .map_err(StorageError::from)?;

            if rows.len() > 1 {
                return Err(MapperError::TooManyResults.into());
            }
            Ok(Wrapper::maybe(rows.pop()))
        }
    }

    fn select(
        &self,
        tx: &mut SqliteTransaction,
        probe: &App,
    ) -> impl Future<Output = Result<Vec<App>, StratumError>> + Send {
        let mut qb = probe_statement(probe);
        async move {
            let rows: Vec<Wrapper> = qb
                .build_query_as()
                .fetch_all(tx.conn())
                .await
                .map_err(StorageError::from)?;

            Ok(rows.into_iter().map(|w| w.0).collect())
        }
    }

    fn select_all(
        &self,
        tx: &mut SqliteTransaction,
    ) -> impl Future<Output = Result<Vec<App>, StratumError>> + Send {
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_ALL)
                .fetch_all(tx.conn())
                .await
                .map_err(StorageError::from)?;

            Ok(rows.into_iter().map(|w| w.0).collect())
        }
    }

    fn insert_selective(
        &self,
        tx: &mut SqliteTransaction,
        mut app: App,
    ) -> impl Future<Output = Result<App, StratumError>> + Send {
        let id = *app.id.get_or_insert_with(AppId::new);
        let mut qb = insert_statement(&app, id);
        async move {
            qb.build()
                .execute(tx.conn())
                .await
                .map_err(write_error)?;

            Ok(app)
        }
    }

    fn update_by_primary_key_selective(
        &self,
        tx: &mut SqliteTransaction,
        app: &App,
    ) -> impl Future<Output = Result<u64, StratumError>> + Send {
        Self::update(tx, app, true)
    }

    fn update_by_primary_key(
        &self,
        tx: &mut SqliteTransaction,
        app: &App,
    ) -> impl Future<Output = Result<u64, StratumError>> + Send {
        Self::update(tx, app, false)
    }

    fn delete_by_primary_key(
        &self,
        tx: &mut SqliteTransaction,
        id: &AppId,
    ) -> impl Future<Output = Result<u64, StratumError>> + Send {
        let id = id.to_string();
        async move {
            let result = sqlx::query(DELETE_BY_ID)
                .bind(id)
                .execute(tx.conn())
                .await
                .map_err(StorageError::from)?;

            Ok(result.rows_affected())
        }
    }

    fn delete_by_ids(
        &self,
        tx: &mut SqliteTransaction,
        ids: &[AppId],
    ) -> impl Future<Output = Result<u64, StratumError>> + Send {
        let ids: Vec<String> = ids.iter().map(ToString::to_string).collect();
        async move {
            if ids.is_empty() {
                return Ok(0);
            }

            let mut qb = QueryBuilder::<Sqlite>::new("DELETE FROM apps WHERE id IN (");
            let mut separated = qb.separated(", ");
            for id in ids {
                separated.push_bind(id);
            }
            separated.push_unseparated(")");

            let result = qb
                .build()
                .execute(tx.conn())
                .await
                .map_err(StorageError::from)?;

            Ok(result.rows_affected())
        }
    }
}
