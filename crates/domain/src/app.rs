//! App — a client application allowed to authenticate with an app key and secret.

use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::error::{StratumError, ValidationError};
use crate::id::AppId;
use crate::time::Timestamp;

/// A registered client application.
///
/// Every field is optional so an `App` doubles as a query probe and as a
/// selective update. `app_secret` holds a password hash, never the plain
/// secret, and is not serialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct App {
    pub id: Option<AppId>,
    pub app_key: Option<String>,
    #[serde(skip_serializing, default)]
    pub app_secret: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub available: Option<bool>,
    pub created_at: Option<Timestamp>,
}

impl Entity for App {
    type Id = AppId;

    fn id(&self) -> Option<&AppId> {
        self.id.as_ref()
    }
}

impl App {
    /// Create a builder for constructing an [`App`].
    #[must_use]
    pub fn builder() -> AppBuilder {
        AppBuilder::default()
    }

    /// Probe matching the app with the given key.
    #[must_use]
    pub fn with_app_key(app_key: impl Into<String>) -> Self {
        Self {
            app_key: Some(app_key.into()),
            ..Self::default()
        }
    }

    /// Check the invariants required to register an app.
    ///
    /// # Errors
    ///
    /// Returns [`StratumError::Validation`] when `app_key` or `name` is
    /// missing or empty.
    pub fn validate(&self) -> Result<(), StratumError> {
        require("app_key", self.app_key.as_deref())?;
        require("name", self.name.as_deref())?;
        Ok(())
    }

    /// Whether the app may authenticate. Apps default to available.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.available.unwrap_or(true)
    }
}

fn require(field: &'static str, value: Option<&str>) -> Result<(), ValidationError> {
    match value {
        None => Err(ValidationError::Missing(field)),
        Some(v) if v.trim().is_empty() => Err(ValidationError::Empty(field)),
        Some(_) => Ok(()),
    }
}

/// Step-by-step builder for [`App`].
#[derive(Debug, Default)]
pub struct AppBuilder {
    app: App,
}

impl AppBuilder {
    #[must_use]
    pub fn id(mut self, id: AppId) -> Self {
        self.app.id = Some(id);
        self
    }

    #[must_use]
    pub fn app_key(mut self, app_key: impl Into<String>) -> Self {
        self.app.app_key = Some(app_key.into());
        self
    }

    /// Set the stored secret hash.
    #[must_use]
    pub fn app_secret(mut self, hash: impl Into<String>) -> Self {
        self.app.app_secret = Some(hash.into());
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.app.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.app.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn available(mut self, available: bool) -> Self {
        self.app.available = Some(available);
        self
    }

    #[must_use]
    pub fn created_at(mut self, created_at: Timestamp) -> Self {
        self.app.created_at = Some(created_at);
        self
    }

    /// Consume the builder and return the app without validating it.
    ///
    /// Use this for probes and selective updates.
    #[must_use]
    pub fn partial(self) -> App {
        self.app
    }

    /// Consume the builder, validate, and return an [`App`].
    ///
    /// # Errors
    ///
    /// Returns [`StratumError::Validation`] if `app_key` or `name` is missing
    /// or empty.
    pub fn build(self) -> Result<App, StratumError> {
        self.app.validate()?;
        Ok(self.app)
    }
}
