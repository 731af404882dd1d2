//! # Credential Service
//!
//! One-way, salted password hashing with Argon2id. Hashes are PHC strings
//! (`$argon2id$v=19$m=...,t=...,p=...$salt$hash`), so the cost parameters
//! used at hash time travel with the hash and verification keeps working
//! after the configured cost changes.
//!
//! The service is stateless and never stores anything.

use crate::RecordError;
use crate::primitives::MAX_PASSWORD_LENGTH;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

/// Password hashing and verification.
pub trait CredentialService {
    /// Hash a plaintext password into a self-describing string.
    fn hash(&self, plaintext: &str) -> Result<String, RecordError>;

    /// Check a plaintext against a stored hash.
    ///
    /// A malformed stored hash verifies as `false`.
    fn verify(&self, plaintext: &str, hash: &str) -> bool;
}

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HashCost {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Number of passes.
    pub iterations: u32,
    /// Degree of parallelism.
    pub parallelism: u32,
}

impl Default for HashCost {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

/// Argon2id-backed [`CredentialService`].
#[derive(Debug, Clone)]
pub struct Argon2Credentials {
    params: Params,
}

impl Argon2Credentials {
    /// Build a service, rejecting cost parameters Argon2 does not accept.
    pub fn new(cost: HashCost) -> Result<Self, RecordError> {
        let params = Params::new(cost.memory_kib, cost.iterations, cost.parallelism, None)
            .map_err(|e| RecordError::invalid(format!("Invalid Argon2 parameters: {e}")))?;
        Ok(Self { params })
    }

    fn hasher(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl Default for Argon2Credentials {
    fn default() -> Self {
        Self {
            params: Params::default(),
        }
    }
}

impl CredentialService for Argon2Credentials {
    fn hash(&self, plaintext: &str) -> Result<String, RecordError> {
        if plaintext.len() > MAX_PASSWORD_LENGTH {
            return Err(RecordError::invalid(format!(
                "password exceeds {MAX_PASSWORD_LENGTH} bytes"
            )));
        }
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .hasher()
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| RecordError::Credential(format!("Failed to hash password: {e}")))?;
        Ok(hash.to_string())
    }

    fn verify(&self, plaintext: &str, hash: &str) -> bool {
        let parsed = match PasswordHash::new(hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!(
                    event = "malformed_password_hash",
                    error = %e,
                    "Stored password hash could not be parsed"
                );
                return false;
            }
        };
        self.hasher()
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok()
    }
}

/// Check that a password and its confirmation match.
///
/// Runs in constant time over the longer of the two inputs. Empty or
/// over-long passwords are `InvalidInput`; a mismatch is `PasswordMismatch`.
pub fn confirm_password(password: &str, confirmation: &str) -> Result<(), RecordError> {
    if password.is_empty() {
        return Err(RecordError::invalid("password must not be empty"));
    }
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(RecordError::invalid(format!(
            "password exceeds {MAX_PASSWORD_LENGTH} bytes"
        )));
    }

    let a = password.as_bytes();
    let b = confirmation.as_bytes();
    let max_len = a.len().max(b.len());

    let bytes_match: bool = padded(a, max_len).ct_eq(&padded(b, max_len)).into();
    if bytes_match && a.len() == b.len() {
        Ok(())
    } else {
        Err(RecordError::PasswordMismatch)
    }
}

/// Zero-extend `bytes` to `len`.
fn padded(bytes: &[u8], len: usize) -> Vec<u8> {
    let mut out = bytes.to_vec();
    out.resize(len, 0);
    out
}

// =============================================================================
// TESTS
// =============================================================================
