//! Client realm — registered as an authentication source but never consulted.
//!
//! Client applications authenticate through [`AppRealm`](super::AppRealm).

use stratum_domain::auth::{AuthenticationInfo, AuthenticationToken};
use stratum_domain::error::{StratumError, UnsupportedOperation};

use super::RealmSettings;
use crate::ports::Realm;

/// A realm that refuses every token.
pub struct ClientRealm {
    settings: RealmSettings,
}

impl ClientRealm {
    #[must_use]
    pub fn new(settings: RealmSettings) -> Self {
        Self { settings }
    }
}

impl Realm for ClientRealm {
    fn name(&self) -> &str {
        &self.settings.name
    }

    async fn authenticate(
        &self,
        token: &AuthenticationToken,
    ) -> Result<AuthenticationInfo, StratumError> {
        tracing::debug!(realm = %self.settings.name, kind = token.kind(), "client realm invoked");
        Err(UnsupportedOperation {
            operation: "ClientRealm::authenticate",
        }
        .into())
    }
}
