//! # stratum-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `Mapper<T>` — keyed lookup, example queries, and selective/full writes
//!     for one entity type
//!   - `TransactionBoundary` / `Transaction` — scoped read-only or read-write
//!     units of work
//!   - `Realm` — a named source of authentication decisions
//! - Define **driving/inbound** use-cases:
//!   - `BaseService<T, M>` — uniform CRUD over any `Mapper<T>`
//!   - `AppRealm` — client-credential authentication for apps
//!   - `ClientRealm` — a registered realm that refuses every token
//!
//! ## Dependency rule
//! Depends on `stratum-domain` only (plus `argon2` for secret hashing).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod ports;
pub mod realm;
pub mod services;

#[cfg(test)]
mod testing;
