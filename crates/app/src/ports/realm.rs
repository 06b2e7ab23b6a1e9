//! Realm port — a named source of authentication decisions.

use std::future::Future;

use stratum_domain::auth::{AuthenticationInfo, AuthenticationToken};
use stratum_domain::error::StratumError;

/// One authentication source. Callers choose which realm to ask; realms do
/// not chain.
pub trait Realm {
    /// Name reported in [`AuthenticationInfo::realm`].
    fn name(&self) -> &str;

    /// Verify `token` and describe the authenticated identity.
    fn authenticate(
        &self,
        token: &AuthenticationToken,
    ) -> impl Future<Output = Result<AuthenticationInfo, StratumError>> + Send;
}
