//! # stratum-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve a **JSON admin API** over the app store (`/api/apps`, …)
//! - Expose **client-credential authentication** through the app realm
//!   (`/api/auth/app`)
//! - Hash submitted secrets before they reach the service layer
//! - Map application errors into HTTP status codes
//!
//! ## Dependency rule
//! Depends on `stratum-app` (for port traits, services, and realms) and
//! `stratum-domain` (for domain types used in request/response mapping).
//! Never leaks axum types into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;
