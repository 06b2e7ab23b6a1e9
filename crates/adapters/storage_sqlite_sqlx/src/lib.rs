//! # stratum-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the mapper and transaction ports defined in `stratum-app::ports`
//! - Manage `SQLite` connection pool lifecycle
//! - Run database migrations (using sqlx embedded migrations)
//! - Map between domain types and database rows, building selective
//!   statements from the populated fields of a record
//!
//! ## Dependency rule
//! Depends on `stratum-app` (for port traits) and `stratum-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

mod app_mapper;
mod error;
mod pool;
mod tx;

pub use app_mapper::SqliteAppMapper;
pub use error::StorageError;
pub use pool::{Config, Database};
pub use tx::SqliteTransaction;
