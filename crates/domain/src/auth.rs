//! Authentication value objects exchanged with realms.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Credentials submitted for authentication.
///
/// `Debug` never prints secrets.
#[derive(Clone, PartialEq, Eq)]
pub enum AuthenticationToken {
    /// A client application identified by its app key and secret.
    ClientCredentials { app_key: String, app_secret: String },
    /// An interactive user login.
    UsernamePassword { username: String, password: String },
}

impl AuthenticationToken {
    /// Build a client-credentials token.
    #[must_use]
    pub fn client(app_key: impl Into<String>, app_secret: impl Into<String>) -> Self {
        Self::ClientCredentials {
            app_key: app_key.into(),
            app_secret: app_secret.into(),
        }
    }

    /// The identity claimed by this token.
    #[must_use]
    pub fn principal(&self) -> &str {
        match self {
            Self::ClientCredentials { app_key, .. } => app_key,
            Self::UsernamePassword { username, .. } => username,
        }
    }

    /// Short name of the token kind, for logs and error messages.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ClientCredentials { .. } => "client-credentials",
            Self::UsernamePassword { .. } => "username-password",
        }
    }
}

impl fmt::Debug for AuthenticationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClientCredentials { app_key, .. } => f
                .debug_struct("ClientCredentials")
                .field("app_key", app_key)
                .field("app_secret", &"<redacted>")
                .finish(),
            Self::UsernamePassword { username, .. } => f
                .debug_struct("UsernamePassword")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
        }
    }
}

/// Identity asserted by a realm after a successful authentication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticationInfo {
    /// Authenticated principal (app key or username).
    pub principal: String,
    /// Name of the realm that vouched for the principal.
    pub realm: String,
}
