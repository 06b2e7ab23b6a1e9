//! Secret hashing for stored app credentials (Argon2id, PHC string format).

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};

use stratum_domain::error::StratumError;

const PLACEHOLDER_SALT: &[u8] = b"stratum-no-stored-secret";

/// Argon2 cost parameters applied to newly hashed secrets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordPolicy {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Number of passes.
    pub iterations: u32,
    /// Degree of parallelism.
    pub parallelism: u32,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

/// Hashes and verifies app secrets.
///
/// Verification reads the cost parameters embedded in the stored hash, so
/// tightening the policy does not invalidate existing secrets.
#[derive(Clone)]
pub struct PasswordHelper {
    argon2: Argon2<'static>,
}

impl PasswordHelper {
    /// Build a helper for the given policy.
    ///
    /// # Errors
    ///
    /// Returns [`argon2::Error`] when the parameters are out of range.
    pub fn new(policy: PasswordPolicy) -> Result<Self, argon2::Error> {
        let params = Params::new(
            policy.memory_kib,
            policy.iterations,
            policy.parallelism,
            None,
        )?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hash `secret` with a fresh random salt.
    ///
    /// # Errors
    ///
    /// Returns [`StratumError::Credential`] if hashing fails.
    pub fn hash(&self, secret: &str) -> Result<String, StratumError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(secret.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| StratumError::Credential(Box::new(err)))
    }

    /// Run one hash of `secret` under the current policy and discard it.
    ///
    /// Lets a rejection without a stored hash cost as much as a failed
    /// [`verify`](Self::verify).
    pub fn spend_verify_cost(&self, secret: &str) {
        tracing::trace!("argon2 run without stored hash");
        let mut output = [0_u8; 32];
        let _ = self
            .argon2
            .hash_password_into(secret.as_bytes(), PLACEHOLDER_SALT, &mut output);
    }

    /// Check `secret` against a stored hash. Malformed hashes never verify.
    #[must_use]
    pub fn verify(&self, secret: &str, hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hash) else {
            return false;
        };
        self.argon2
            .verify_password(secret.as_bytes(), &parsed)
            .is_ok()
    }
}
