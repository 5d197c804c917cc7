//! Signing key management and JWKS export.
//!
//! The engine signs tokens with a single RSA key loaded from a PEM file at
//! startup. A missing or unparsable key file is fatal: the service must not
//! come up without a signing key. The key is immutable for the process
//! lifetime; multi-key rotation is an extension point, not implemented.
//!
//! The key id is derived from the load date (`yyyy-MM-dd`), which is stable
//! across restarts on the same day and observable in the JWKS document.

use std::fmt;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey};
use rand::rngs::OsRng;
use rsa::RsaPrivateKey;
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::{DecodePrivateKey, EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::traits::PublicKeyParts;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::macros::format_description;

use crate::error::AuthError;

/// Errors that can occur while loading or using the signing key.
#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    /// The key file could not be read.
    #[error("Failed to read key file {path}: {message}")]
    Io {
        /// Path that was attempted.
        path: String,
        /// Description of the I/O error.
        message: String,
    },

    /// The key data is not a valid PEM-encoded RSA private key.
    #[error("Invalid signing key: {message}")]
    InvalidKey {
        /// Description of why the key is invalid.
        message: String,
    },

    /// Key generation failed.
    #[error("Key generation error: {message}")]
    Generation {
        /// Description of the generation error.
        message: String,
    },
}

impl KeyError {
    /// Creates a new `InvalidKey` error.
    #[must_use]
    pub fn invalid_key(message: impl Into<String>) -> Self {
        Self::InvalidKey {
            message: message.into(),
        }
    }
}

impl From<KeyError> for AuthError {
    fn from(err: KeyError) -> Self {
        AuthError::configuration(err.to_string())
    }
}

/// The signing algorithm used by the engine.
///
/// Only RS256 is supported; the variant exists so the algorithm travels
/// with its JWK/JWT name instead of a bare string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SigningAlgorithm {
    /// RSA with SHA-256.
    RS256,
}

impl SigningAlgorithm {
    /// Converts to the `jsonwebtoken` Algorithm type.
    #[must_use]
    pub fn to_jwt_algorithm(self) -> Algorithm {
        match self {
            Self::RS256 => Algorithm::RS256,
        }
    }

    /// Returns the algorithm name as used in JWK/JWT headers.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RS256 => "RS256",
        }
    }
}

impl fmt::Display for SigningAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// JSON Web Key Set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Jwks {
    /// The keys in this set.
    pub keys: Vec<Jwk>,
}

/// JSON Web Key (public half of the signing key).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Jwk {
    /// Key type; always "RSA".
    pub kty: String,

    /// Key ID (the load date, `yyyy-MM-dd`).
    pub kid: String,

    /// Key use; always "sig".
    #[serde(rename = "use")]
    pub use_: String,

    /// Algorithm name.
    pub alg: String,

    /// RSA modulus (base64url encoded).
    pub n: String,

    /// RSA exponent (base64url encoded).
    pub e: String,
}

/// Holds the process-wide signing key.
///
/// Thread-safe (`Send + Sync`); share via `Arc`.
pub struct KeyManager {
    kid: String,
    algorithm: SigningAlgorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    /// RSA modulus bytes for JWKS export.
    n: Vec<u8>,
    /// RSA public exponent bytes for JWKS export.
    e: Vec<u8>,
    loaded_at: OffsetDateTime,
}

impl KeyManager {
    /// Loads the signing key from a PEM file.
    ///
    /// This is the startup path: any failure here must abort service
    /// startup.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not contain a
    /// valid PEM-encoded RSA private key (PKCS#8 or PKCS#1).
    pub fn from_pem_file(path: impl AsRef<Path>) -> Result<Self, KeyError> {
        let path = path.as_ref();
        let pem = std::fs::read_to_string(path).map_err(|e| KeyError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_pem(&pem)
    }

    /// Builds a key manager from PEM-encoded private key data.
    ///
    /// # Errors
    ///
    /// Returns an error if the PEM data is invalid.
    pub fn from_pem(pem: &str) -> Result<Self, KeyError> {
        let private_key = RsaPrivateKey::from_pkcs8_pem(pem)
            .or_else(|_| RsaPrivateKey::from_pkcs1_pem(pem))
            .map_err(|e| KeyError::invalid_key(e.to_string()))?;

        Self::from_private_key(private_key, pem)
    }

    /// Generates a fresh 2048-bit RSA key.
    ///
    /// Intended for tests and first-boot bootstrapping; production
    /// deployments load a persistent key via [`KeyManager::from_pem_file`].
    ///
    /// # Errors
    ///
    /// Returns an error if key generation fails.
    pub fn generate() -> Result<Self, KeyError> {
        let private_key = RsaPrivateKey::new(&mut OsRng, 2048).map_err(|e| KeyError::Generation {
            message: e.to_string(),
        })?;

        let pem = private_key
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| KeyError::Generation {
                message: e.to_string(),
            })?;

        Self::from_private_key(private_key, &pem)
    }

    fn from_private_key(private_key: RsaPrivateKey, pem: &str) -> Result<Self, KeyError> {
        let public_key = private_key.to_public_key();
        let n = public_key.n().to_bytes_be();
        let e = public_key.e().to_bytes_be();

        let encoding_key = EncodingKey::from_rsa_pem(pem.as_bytes())
            .map_err(|e| KeyError::invalid_key(e.to_string()))?;

        let public_pem = public_key
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| KeyError::invalid_key(e.to_string()))?;
        let decoding_key = DecodingKey::from_rsa_pem(public_pem.as_bytes())
            .map_err(|e| KeyError::invalid_key(e.to_string()))?;

        let loaded_at = OffsetDateTime::now_utc();
        let kid = loaded_at
            .format(format_description!("[year]-[month]-[day]"))
            .map_err(|e| KeyError::invalid_key(e.to_string()))?;

        Ok(Self {
            kid,
            algorithm: SigningAlgorithm::RS256,
            encoding_key,
            decoding_key,
            n,
            e,
            loaded_at,
        })
    }

    /// Returns the key id.
    #[must_use]
    pub fn kid(&self) -> &str {
        &self.kid
    }

    /// Returns the signing algorithm.
    #[must_use]
    pub fn algorithm(&self) -> SigningAlgorithm {
        self.algorithm
    }

    /// Returns the private key in the form `jsonwebtoken` signs with.
    #[must_use]
    pub fn encoding_key(&self) -> &EncodingKey {
        &self.encoding_key
    }

    /// Returns the public key in the form `jsonwebtoken` verifies with.
    #[must_use]
    pub fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }

    /// Returns when the key was loaded.
    #[must_use]
    pub fn loaded_at(&self) -> OffsetDateTime {
        self.loaded_at
    }

    /// Exports the public key as a JWK.
    #[must_use]
    pub fn to_jwk(&self) -> Jwk {
        Jwk {
            kty: "RSA".to_string(),
            kid: self.kid.clone(),
            use_: "sig".to_string(),
            alg: self.algorithm.as_str().to_string(),
            n: URL_SAFE_NO_PAD.encode(&self.n),
            e: URL_SAFE_NO_PAD.encode(&self.e),
        }
    }

    /// Returns the JWKS document containing the public key.
    #[must_use]
    pub fn jwks(&self) -> Jwks {
        Jwks {
            keys: vec![self.to_jwk()],
        }
    }
}
