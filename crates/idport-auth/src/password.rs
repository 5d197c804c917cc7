//! Password hashing and verification.
//!
//! Credentials are derived with PBKDF2-HMAC using a fixed iteration count
//! and a fixed output length; only the digest algorithm is selectable
//! (SHA-256 or SHA-512). Digests are stored base64-encoded.
//!
//! # Security
//!
//! - Salts are generated with the OS CSPRNG (16 alphanumeric symbols by
//!   default).
//! - Verification recomputes the digest and compares it in constant time.
//!   The comparison is exact; stored hashes produced by this module are
//!   canonical base64 and never compared case-insensitively.
//!
//! # Example
//!
//! ```
//! use idport_auth::password::{HashAlgorithm, generate_salt, hash_password, verify_password};
//!
//! let salt = generate_salt(16);
//! let hash = hash_password("hunter2", &salt, HashAlgorithm::Pbkdf2Sha256);
//!
//! assert!(verify_password(&hash, "hunter2", &salt, HashAlgorithm::Pbkdf2Sha256));
//! assert!(!verify_password(&hash, "hunter3", &salt, HashAlgorithm::Pbkdf2Sha256));
//! ```

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use pbkdf2::pbkdf2_hmac;
use serde::{Deserialize, Serialize};
use sha2::{Sha256, Sha512};

use crate::random;

/// PBKDF2 iteration count. Fixed: changing it invalidates stored hashes.
const ITERATIONS: u32 = 10_000;

/// Derived key length in bytes. Fixed for both digest variants.
const OUTPUT_LEN: usize = 32;

/// Selectable digest algorithm for the password KDF.
///
/// Stored per user so that the algorithm can differ across accounts (e.g.
/// during a migration between variants).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HashAlgorithm {
    /// PBKDF2 with HMAC-SHA256 (256-bit digest).
    Pbkdf2Sha256,
    /// PBKDF2 with HMAC-SHA512 (512-bit digest).
    Pbkdf2Sha512,
}

impl HashAlgorithm {
    /// Returns the stable string code stored alongside user records.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pbkdf2Sha256 => "pbkdf2-sha256",
            Self::Pbkdf2Sha512 => "pbkdf2-sha512",
        }
    }

    /// Looks up an algorithm by its stored code.
    ///
    /// Returns `None` for unknown codes; callers must treat that as a
    /// data error, not fall back to a default.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "pbkdf2-sha256" => Some(Self::Pbkdf2Sha256),
            "pbkdf2-sha512" => Some(Self::Pbkdf2Sha512),
            _ => None,
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Generates a random password salt of the given length.
#[must_use]
pub fn generate_salt(length: usize) -> String {
    random::alphanumeric(length)
}

/// Derives the base64-encoded digest for a password and salt.
#[must_use]
pub fn hash_password(password: &str, salt: &str, algorithm: HashAlgorithm) -> String {
    let mut output = [0u8; OUTPUT_LEN];
    match algorithm {
        HashAlgorithm::Pbkdf2Sha256 => {
            pbkdf2_hmac::<Sha256>(password.as_bytes(), salt.as_bytes(), ITERATIONS, &mut output);
        }
        HashAlgorithm::Pbkdf2Sha512 => {
            pbkdf2_hmac::<Sha512>(password.as_bytes(), salt.as_bytes(), ITERATIONS, &mut output);
        }
    }
    STANDARD.encode(output)
}

/// Verifies a password against a stored digest.
///
/// Recomputes the digest with the stored salt and algorithm and compares
/// in constant time.
#[must_use]
pub fn verify_password(
    stored_hash: &str,
    password: &str,
    salt: &str,
    algorithm: HashAlgorithm,
) -> bool {
    let computed = hash_password(password, salt, algorithm);
    random::constant_time_eq_str(&computed, stored_hash)
}
