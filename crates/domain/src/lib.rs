//! # stratum-domain
//!
//! Pure domain model for the stratum CRUD and authentication layer.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define the **Entity** contract every persisted record type satisfies
//! - Define **Apps** (client applications identified by an app key and secret)
//! - Define the **authentication** value objects consumed and produced by realms
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod app;
pub mod auth;
pub mod entity;
