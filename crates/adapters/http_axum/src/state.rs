//! Shared application state for axum handlers.

use std::sync::Arc;

use stratum_app::ports::AppMapper;
use stratum_app::realm::{AppRealm, ClientRealm, PasswordHelper, RealmSettings};
use stratum_app::services::AppService;

/// Application state shared across all axum handlers.
///
/// Generic over the app mapper to avoid dynamic dispatch. `Clone` is
/// implemented manually so the mapper itself does not need to be `Clone`.
pub struct AppState<M> {
    /// App CRUD service.
    pub apps: Arc<AppService<M>>,
    /// Realm answering client-credential logins.
    pub app_realm: Arc<AppRealm<M>>,
    /// Realm for client tokens; rejects every call.
    pub client_realm: Arc<ClientRealm>,
    /// Hashes secrets submitted on create and update.
    pub passwords: PasswordHelper,
}

impl<M> Clone for AppState<M> {
    fn clone(&self) -> Self {
        Self {
            apps: Arc::clone(&self.apps),
            app_realm: Arc::clone(&self.app_realm),
            client_realm: Arc::clone(&self.client_realm),
            passwords: self.passwords.clone(),
        }
    }
}

impl<M> AppState<M>
where
    M: AppMapper + Send + Sync + 'static,
{
    /// Build the state around an app service, creating the app realm on top
    /// of the same service.
    pub fn new(
        apps: AppService<M>,
        app_realm: RealmSettings,
        client_realm: RealmSettings,
        passwords: PasswordHelper,
    ) -> Self {
        let apps = Arc::new(apps);
        let app_realm = Arc::new(AppRealm::new(
            app_realm,
            Arc::clone(&apps),
            passwords.clone(),
        ));
        Self {
            apps,
            app_realm,
            client_realm: Arc::new(ClientRealm::new(client_realm)),
            passwords,
        }
    }
}
