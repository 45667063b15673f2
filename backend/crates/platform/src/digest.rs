//! Secret Digesting and Blind Verification
//!
//! Argon2id digesting for opaque sensitive strings:
//! - Fixed, documented cost parameters (memory-hard, OWASP-aligned)
//! - Zeroization of plaintext
//! - PHC string format for storage
//!
//! ## Security Model
//! Plaintext secrets exist only inside [`ClearTextSecret`], which is
//! zeroized on drop and redacted in debug output. Only the salted
//! [`SecretDigest`] is ever persisted; matching a candidate against a
//! stored digest is a full Argon2 verification, never a string compare.

use std::fmt;

use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
    password_hash::SaltString,
};
use rand::rngs::OsRng;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

// ============================================================================
// Constants (fixed cost parameters, tunable per deployment)
// ============================================================================

/// Argon2id memory cost in KiB (64 MiB)
pub const DIGEST_MEMORY_KIB: u32 = 65536;

/// Argon2id time cost (iterations)
pub const DIGEST_TIME_COST: u32 = 4;

/// Argon2id parallelism (lanes)
pub const DIGEST_PARALLELISM: u32 = 2;

// ============================================================================
// Error Types
// ============================================================================

/// Secret policy violation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SecretPolicyError {
    /// Secret is empty
    #[error("Sensitive data must be at least 1 character long")]
    Empty,
}

/// Secret digesting errors
#[derive(Debug, Error)]
pub enum DigestError {
    /// Digesting operation failed
    #[error("Secret digesting failed: {0}")]
    HashingFailed(String),

    /// Invalid digest format
    #[error("Invalid secret digest format")]
    InvalidFormat,
}

// ============================================================================
// Clear Text Secret (Zeroized on drop)
// ============================================================================

/// Clear text secret with automatic memory zeroization
///
/// Exists only between request deserialization and digesting/verification.
/// Does not implement `Clone`; debug output is redacted.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ClearTextSecret(String);

impl ClearTextSecret {
    /// Create a new clear text secret, rejecting empty input
    pub fn new(raw: String) -> Result<Self, SecretPolicyError> {
        if raw.is_empty() {
            return Err(SecretPolicyError::Empty);
        }
        Ok(Self(raw))
    }

    /// Get the secret as bytes for digesting
    pub(crate) fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Digest the secret using Argon2id with the fixed cost parameters
    ///
    /// A fresh random salt is generated per call, so two digests of the
    /// same plaintext are not comparable.
    pub fn digest(&self) -> Result<SecretDigest, DigestError> {
        let salt = SaltString::generate(OsRng);

        let hash = argon2()
            .hash_password(self.as_bytes(), &salt)
            .map_err(|e| DigestError::HashingFailed(e.to_string()))?;

        Ok(SecretDigest {
            hash: hash.to_string(),
        })
    }
}

impl fmt::Debug for ClearTextSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClearTextSecret")
            .field(&"[REDACTED]")
            .finish()
    }
}

// ============================================================================
// Secret Digest (Safe to store)
// ============================================================================

/// Salted Argon2id digest in PHC string format
///
/// The PHC string carries algorithm, version, parameters, salt, and the
/// digest itself, so verification works even if the deployment parameters
/// change later.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretDigest {
    hash: String,
}

impl SecretDigest {
    /// Create from PHC string (e.g., loaded from the database)
    pub fn from_phc_string(s: impl Into<String>) -> Result<Self, DigestError> {
        let hash = s.into();

        PasswordHash::new(&hash).map_err(|_| DigestError::InvalidFormat)?;

        Ok(Self { hash })
    }

    /// Get the PHC string for storage
    pub fn as_phc_string(&self) -> &str {
        &self.hash
    }

    /// Verify a candidate secret against this digest
    ///
    /// Argon2 compares in constant time internally. A malformed stored
    /// digest verifies as false rather than erroring, so one corrupt row
    /// cannot break a whole matching pass.
    pub fn verify(&self, candidate: &ClearTextSecret) -> bool {
        let parsed_hash = match PasswordHash::new(&self.hash) {
            Ok(h) => h,
            Err(_) => return false,
        };

        argon2()
            .verify_password(candidate.as_bytes(), &parsed_hash)
            .is_ok()
    }
}

impl fmt::Debug for SecretDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretDigest")
            .field("hash", &"[DIGEST]")
            .finish()
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Argon2id instance with the fixed cost parameters
fn argon2() -> Argon2<'static> {
    let params = Params::new(DIGEST_MEMORY_KIB, DIGEST_TIME_COST, DIGEST_PARALLELISM, None)
        .expect("fixed Argon2 parameters are valid");
    Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
}

// ============================================================================
// Tests
// ============================================================================
