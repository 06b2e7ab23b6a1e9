//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `stratum.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use serde::Deserialize;

use stratum_app::realm::{PasswordHelper, PasswordPolicy, RealmSettings};

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Database settings.
    pub database: DatabaseConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Secret hashing and realm settings.
    pub security: SecurityConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// `SQLite` database configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL or file path.
    pub url: String,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Argon2 cost applied to new secrets, and the names realms report.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
    /// Name of the realm authenticating apps.
    pub app_realm: String,
    /// Name of the client realm.
    pub client_realm: String,
}

impl Config {
    /// Load configuration from `stratum.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("stratum.toml")?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("STRATUM_HOST") {
            self.server.host = val;
        }
        if let Some(port) = lookup("STRATUM_PORT").and_then(|val| val.parse().ok()) {
            self.server.port = port;
        }
        if let Some(val) = lookup("STRATUM_BIND")
            && let Some((host, port)) = val.rsplit_once(':')
        {
            self.server.host = host.to_string();
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
        if let Some(val) = lookup("STRATUM_DATABASE_URL") {
            self.database.url = val;
        }
        if let Some(val) = lookup("STRATUM_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = lookup("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::Validation(
                "database url must not be empty".to_string(),
            ));
        }
        if self.security.app_realm.trim().is_empty() || self.security.client_realm.trim().is_empty()
        {
            return Err(ConfigError::Validation(
                "realm names must not be empty".to_string(),
            ));
        }
        PasswordHelper::new(self.password_policy())
            .map_err(|err| ConfigError::Validation(format!("invalid password policy: {err}")))?;
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Return the database URL in `sqlx`-compatible format.
    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database.url
    }

    #[must_use]
    pub fn password_policy(&self) -> PasswordPolicy {
        PasswordPolicy {
            memory_kib: self.security.memory_kib,
            iterations: self.security.iterations,
            parallelism: self.security.parallelism,
        }
    }

    #[must_use]
    pub fn app_realm(&self) -> RealmSettings {
        RealmSettings::named(self.security.app_realm.as_str())
    }

    #[must_use]
    pub fn client_realm(&self) -> RealmSettings {
        RealmSettings::named(self.security.client_realm.as_str())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:stratum.db?mode=rwc".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "stratumd=info,stratum_app=info,stratum_adapter_http_axum=info,tower_http=debug"
                .to_string(),
        }
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        let policy = PasswordPolicy::default();
        Self {
            memory_kib: policy.memory_kib,
            iterations: policy.iterations,
            parallelism: policy.parallelism,
            app_realm: "apps".to_string(),
            client_realm: "clients".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
