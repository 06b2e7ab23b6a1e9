//! Common error types used across the workspace.
//!
//! [`StratumError`] is the single error type crossing port boundaries. Each
//! layer defines its own typed errors and converts via `#[from]`; adapter
//! failures are carried boxed in [`StratumError::Storage`].

use std::error::Error as StdError;
use std::fmt;

/// Root error type for every service, port, and realm operation.
#[derive(Debug, thiserror::Error)]
pub enum StratumError {
    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("record not found")]
    NotFound(#[from] NotFoundError),

    #[error("mapper error")]
    Mapper(#[from] MapperError),

    #[error("authentication failed")]
    Authentication(#[from] AuthenticationError),

    #[error("unsupported operation")]
    Unsupported(#[from] UnsupportedOperation),

    #[error("storage error")]
    Storage(#[source] Box<dyn StdError + Send + Sync>),

    #[error("credential hashing failed")]
    Credential(#[source] Box<dyn StdError + Send + Sync>),
}

/// Domain invariant violations detected before anything is persisted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("field `{0}` is required")]
    Missing(&'static str),

    #[error("field `{0}` must not be empty")]
    Empty(&'static str),

    #[error("invalid identifier: {0}")]
    InvalidId(String),

    #[error("field `{0}` is already taken")]
    Duplicate(&'static str),
}

/// A lookup by key found nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// Failures raised by a mapper implementation independent of its backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MapperError {
    /// A single-row query matched more than one row.
    #[error("expected at most one row, found more")]
    TooManyResults,

    /// A keyed write was attempted on a record without a primary key.
    #[error("record has no primary key")]
    MissingPrimaryKey,
}

/// Reasons a realm refuses to produce authentication info.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthenticationError {
    #[error("realm `{realm}` does not accept {kind} tokens")]
    UnsupportedToken { realm: String, kind: &'static str },

    #[error("unknown account")]
    UnknownAccount,

    #[error("incorrect credentials")]
    IncorrectCredentials,

    #[error("account disabled")]
    Disabled,
}

/// An extension point that exists but must never be called.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{operation} is never invoked")]
pub struct UnsupportedOperation {
    pub operation: &'static str,
}

impl StratumError {
    /// Wrap an adapter-specific error as a storage failure.
    pub fn storage<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Storage(Box::new(err))
    }
}

/// Renders an error followed by every `source()` below it, joined by `: `.
///
/// Used as a log field so the root cause of a wrapped failure is visible.
pub struct ErrorChain<'a>(pub &'a (dyn StdError + 'static));

impl fmt::Display for ErrorChain<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)?;
        let mut source = self.0.source();
        while let Some(err) = source {
            write!(f, ": {err}")?;
            source = err.source();
        }
        Ok(())
    }
}
