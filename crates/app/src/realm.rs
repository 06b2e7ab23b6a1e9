//! Realms — authentication sources built on the [`Realm`](crate::ports::Realm) port.

pub mod app_realm;
pub mod client_realm;
pub mod password;

pub use app_realm::AppRealm;
pub use client_realm::ClientRealm;
pub use password::{PasswordHelper, PasswordPolicy};

/// Settings shared by every realm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RealmSettings {
    /// Name reported in authentication info and log events.
    pub name: String,
}

impl RealmSettings {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}
