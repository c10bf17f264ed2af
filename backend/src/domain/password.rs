//! Salted password hashing with Argon2id.
//!
//! Hashes are stored as PHC strings, so the salt and cost parameters travel
//! with the hash and older records keep verifying after the policy changes.

use std::fmt;

use argon2::password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::rngs::OsRng;

/// Failures raised while hashing or verifying passwords.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PasswordError {
    /// The configured cost parameters are rejected by Argon2.
    #[error("invalid password hashing parameters: {message}")]
    InvalidParams { message: String },
    /// Hashing failed.
    #[error("password hashing failed: {message}")]
    Hash { message: String },
    /// A stored hash could not be parsed as a PHC string.
    #[error("stored password hash is malformed: {message}")]
    MalformedHash { message: String },
}

/// PHC-formatted password hash.
///
/// `Debug` never prints the hash itself.
#[derive(Clone, PartialEq, Eq)]
pub struct HashedPassword(String);

impl HashedPassword {
    /// Wrap a PHC string loaded from storage.
    pub fn from_phc(phc: impl Into<String>) -> Self {
        Self(phc.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HashedPassword(<redacted>)")
    }
}

/// Argon2id cost parameters used for new hashes.
///
/// # Examples
/// ```
/// use idea_board::domain::PasswordPolicy;
///
/// let policy = PasswordPolicy::new(8, 1, 1).unwrap();
/// let hash = policy.hash("hunter22").unwrap();
/// assert!(policy.verify("hunter22", &hash).unwrap());
/// assert!(!policy.verify("hunter23", &hash).unwrap());
/// ```
#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    params: Params,
}

impl PasswordPolicy {
    /// Default memory cost in KiB.
    pub const DEFAULT_MEMORY_KIB: u32 = 19_456;
    /// Default iteration count.
    pub const DEFAULT_ITERATIONS: u32 = 3;
    /// Default degree of parallelism.
    pub const DEFAULT_PARALLELISM: u32 = 1;

    /// Build a policy from explicit costs.
    pub fn new(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self, PasswordError> {
        let params = Params::new(memory_kib, iterations, parallelism, None).map_err(|err| {
            PasswordError::InvalidParams {
                message: err.to_string(),
            }
        })?;
        Ok(Self { params })
    }

    pub fn memory_kib(&self) -> u32 {
        self.params.m_cost()
    }

    pub fn iterations(&self) -> u32 {
        self.params.t_cost()
    }

    pub fn parallelism(&self) -> u32 {
        self.params.p_cost()
    }

    fn hasher(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash `password` with a fresh random salt.
    pub fn hash(&self, password: &str) -> Result<HashedPassword, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .hasher()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|err| PasswordError::Hash {
                message: err.to_string(),
            })?;
        Ok(HashedPassword(hash.to_string()))
    }

    /// Check `password` against a stored hash.
    ///
    /// Returns `Ok(false)` on mismatch; errors are reserved for unreadable
    /// hashes. Verification uses the parameters embedded in the hash.
    pub fn verify(&self, password: &str, hashed: &HashedPassword) -> Result<bool, PasswordError> {
        let parsed =
            PasswordHash::new(hashed.as_str()).map_err(|err| PasswordError::MalformedHash {
                message: err.to_string(),
            })?;
        match self.hasher().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(err) => Err(PasswordError::MalformedHash {
                message: err.to_string(),
            }),
        }
    }
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            params: Params::new(
                Self::DEFAULT_MEMORY_KIB,
                Self::DEFAULT_ITERATIONS,
                Self::DEFAULT_PARALLELISM,
                None,
            )
            .unwrap_or_default(),
        }
    }
}
