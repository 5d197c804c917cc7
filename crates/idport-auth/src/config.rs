//! Engine configuration.
//!
//! All options are gathered into an immutable [`AuthConfig`] that is handed
//! to each component at construction time. There is no ambient or mutable
//! global configuration.
//!
//! # Example (TOML)
//!
//! ```toml
//! [auth]
//! issuer = "https://id.example.com"
//!
//! [auth.signing]
//! key_path = "/etc/idport/signing_key.pem"
//!
//! [auth.tokens]
//! code_length = 32
//! refresh_token_length = 48
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration for the authorization and token engine.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Server identity, used as the `iss` claim in every signed token.
    pub issuer: String,

    /// Token signing configuration.
    pub signing: SigningConfig,

    /// Token, code, and salt generation options.
    pub tokens: TokenOptions,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            issuer: "http://localhost:8080".to_string(),
            signing: SigningConfig::default(),
            tokens: TokenOptions::default(),
        }
    }
}

/// Token signing configuration.
///
/// The signing key is loaded once at startup and is immutable for the
/// process lifetime. A missing or unparsable key file is fatal.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SigningConfig {
    /// Path to the PEM-encoded RSA private key.
    pub key_path: PathBuf,
}

impl Default for SigningConfig {
    fn default() -> Self {
        Self {
            key_path: PathBuf::from("signing_key.pem"),
        }
    }
}

/// Lengths and windows for generated credentials.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TokenOptions {
    /// Length of generated authorization codes (alphanumeric symbols).
    pub code_length: usize,

    /// Length of generated refresh tokens (alphanumeric symbols).
    pub refresh_token_length: usize,

    /// Length of generated password salts.
    pub salt_length: usize,

    /// Authorization-code expiration window, in minutes, applied to
    /// applications that do not configure their own.
    pub default_code_expiration_minutes: i64,
}

impl Default for TokenOptions {
    fn default() -> Self {
        Self {
            code_length: 32,
            refresh_token_length: 48,
            salt_length: 16,
            default_code_expiration_minutes: 5,
        }
    }
}
