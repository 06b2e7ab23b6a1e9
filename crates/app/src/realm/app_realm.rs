//! App realm — authenticates client applications by app key and secret.

use std::sync::Arc;

use stratum_domain::app::App;
use stratum_domain::auth::{AuthenticationInfo, AuthenticationToken};
use stratum_domain::error::{AuthenticationError, StratumError};

use super::{PasswordHelper, RealmSettings};
use crate::ports::{AppMapper, Realm};
use crate::services::AppService;

/// Realm backed by the app store.
///
/// Accepts only [`AuthenticationToken::ClientCredentials`]. The app is looked
/// up by key; it must be available and its stored hash must verify against
/// the submitted secret.
pub struct AppRealm<M> {
    settings: RealmSettings,
    apps: Arc<AppService<M>>,
    passwords: PasswordHelper,
}

impl<M> AppRealm<M>
where
    M: AppMapper + Send + Sync,
{
    pub fn new(settings: RealmSettings, apps: Arc<AppService<M>>, passwords: PasswordHelper) -> Self {
        Self {
            settings,
            apps,
            passwords,
        }
    }

    fn reject(&self, reason: AuthenticationError) -> StratumError {
        tracing::warn!(realm = %self.settings.name, %reason, "authentication rejected");
        reason.into()
    }
}

impl<M> Realm for AppRealm<M>
where
    M: AppMapper + Send + Sync,
{
    fn name(&self) -> &str {
        &self.settings.name
    }

    #[tracing::instrument(skip_all, fields(principal = token.principal()))]
    async fn authenticate(
        &self,
        token: &AuthenticationToken,
    ) -> Result<AuthenticationInfo, StratumError> {
        let AuthenticationToken::ClientCredentials {
            app_key,
            app_secret,
        } = token
        else {
            return Err(self.reject(AuthenticationError::UnsupportedToken {
                realm: self.settings.name.clone(),
                kind: token.kind(),
            }));
        };

        let found = self
            .apps
            .get_by_entity(&App::with_app_key(app_key.as_str()))
            .await?;
        // Exactly one argon2 run on every path.
        let verified = match found.as_ref().and_then(|app| app.app_secret.as_deref()) {
            Some(hash) => self.passwords.verify(app_secret, hash),
            None => {
                self.passwords.spend_verify_cost(app_secret);
                false
            }
        };
        let Some(app) = found else {
            return Err(self.reject(AuthenticationError::UnknownAccount));
        };
        if !app.is_available() {
            return Err(self.reject(AuthenticationError::Disabled));
        }
        if !verified {
            return Err(self.reject(AuthenticationError::IncorrectCredentials));
        }

        tracing::info!(realm = %self.settings.name, "app authenticated");
        Ok(AuthenticationInfo {
            principal: app_key.clone(),
            realm: self.settings.name.clone(),
        })
    }
}
