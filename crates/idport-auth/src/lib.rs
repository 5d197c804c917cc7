//! OAuth2 / OpenID Connect authorization and token engine.
//!
//! Implements the credential, key, and token machinery behind an identity
//! provider: password verification, RS256 signing with JWKS export, the
//! authorize and token endpoint state machines, and the post-issuance
//! token lifecycle (introspection, userinfo, revocation, expiry sweeps).
//!
//! The engine is stateless between requests. All durable state lives
//! behind the repository traits in [`storage`]; backends plug in through
//! `Arc<dyn Trait>` collaborators.
//!
//! # Architecture
//!
//! - [`password`] / [`random`] — credential hashing and CSPRNG material
//! - [`keys`] — signing key loading and JWKS export
//! - [`claims`] — deterministic claim assembly
//! - [`token`] — token factory, JWT codec, lifecycle manager
//! - [`oauth`] — the authorize and token endpoint state machines
//! - [`storage`] — persistence trait abstractions

pub mod claims;
pub mod config;
pub mod error;
pub mod keys;
pub mod oauth;
pub mod password;
pub mod random;
pub mod storage;
pub mod token;
pub mod types;

pub use config::AuthConfig;
pub use error::{AuthError, ErrorCategory};
pub use keys::{Jwk, Jwks, KeyManager};

/// Convenience alias for engine results.
pub type AuthResult<T> = Result<T, AuthError>;
