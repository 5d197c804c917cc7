//! JWT encoding and decoding.
//!
//! Access and id tokens are RS256-signed JWTs. Claim structs here mirror
//! the wire shape exactly; assembly of their contents lives in the token
//! factory.

use std::sync::Arc;

use jsonwebtoken::{Header, TokenData, Validation, decode, encode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::AuthError;
use crate::keys::{Jwks, KeyManager};

/// Claims carried by a signed access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Issuer (the server identity).
    pub iss: String,
    /// Subject (user id).
    pub sub: String,
    /// Audience (application code).
    pub aud: String,
    /// Expiration, seconds since epoch.
    pub exp: i64,
    /// Not valid before, seconds since epoch.
    pub nbf: i64,
    /// Issued at, seconds since epoch.
    pub iat: i64,
    /// Token id; matches the stored token record.
    pub jti: String,
    /// Login name.
    pub login: String,
    /// Login name, repeated under its claim-set name.
    pub name: String,
    /// Display name, if the user has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Full name; display name with a login fallback, always present.
    pub full_name: String,
    /// Last profile modification timestamp, fixed pattern.
    pub updated_at: String,
    /// Authentication method reference.
    pub amr: String,
    /// Granted role names.
    pub roles: Vec<String>,
    /// Requested scope.
    pub scope: String,
}

/// Claims carried by a signed id token. Identity only; no roles or scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdTokenClaims {
    /// Issuer (the server identity).
    pub iss: String,
    /// Subject (user id).
    pub sub: String,
    /// Audience (application code).
    pub aud: String,
    /// Expiration, seconds since epoch.
    pub exp: i64,
    /// Issued at, seconds since epoch.
    pub iat: i64,
    /// Login name.
    pub name: String,
    /// Display name, if the user has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Full name; display name with a login fallback, always present.
    pub full_name: String,
    /// Authentication method reference.
    pub amr: String,
}

/// Signs and verifies the engine's JWTs with the process signing key.
#[derive(Clone)]
pub struct JwtService {
    key_manager: Arc<KeyManager>,
    issuer: String,
}

impl JwtService {
    /// Creates a JWT service bound to a key manager and issuer identity.
    #[must_use]
    pub fn new(key_manager: Arc<KeyManager>, issuer: impl Into<String>) -> Self {
        Self {
            key_manager,
            issuer: issuer.into(),
        }
    }

    /// Returns the issuer written into every token.
    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Signs a claim struct into a compact JWT.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or signing fails.
    pub fn encode<T: Serialize>(&self, claims: &T) -> Result<String, AuthError> {
        let mut header = Header::new(self.key_manager.algorithm().to_jwt_algorithm());
        header.kid = Some(self.key_manager.kid().to_string());

        encode(&header, claims, self.key_manager.encoding_key())
            .map_err(|e| AuthError::internal(format!("Failed to sign token: {e}")))
    }

    /// Verifies a JWT's signature, expiry, and issuer, and returns its
    /// claims.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` for any verification failure.
    pub fn decode<T: DeserializeOwned>(&self, token: &str) -> Result<TokenData<T>, AuthError> {
        let validation = self.validation();
        decode::<T>(token, self.key_manager.decoding_key(), &validation)
            .map_err(|e| AuthError::unauthorized(format!("Invalid token: {e}")))
    }

    /// Verifies a JWT but accepts expired tokens.
    ///
    /// Introspection uses this: an expired token still decodes so its
    /// stored record can be matched, while the active flag comes from the
    /// record, not the signature check.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` if the signature or issuer is invalid.
    pub fn decode_allow_expired<T: DeserializeOwned>(
        &self,
        token: &str,
    ) -> Result<TokenData<T>, AuthError> {
        let mut validation = self.validation();
        validation.validate_exp = false;
        decode::<T>(token, self.key_manager.decoding_key(), &validation)
            .map_err(|e| AuthError::unauthorized(format!("Invalid token: {e}")))
    }

    /// Returns the JWKS document for the signing key.
    #[must_use]
    pub fn jwks(&self) -> Jwks {
        self.key_manager.jwks()
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(self.key_manager.algorithm().to_jwt_algorithm());
        validation.set_issuer(&[&self.issuer]);
        // Audience varies per application; callers check it against the
        // stored token record instead.
        validation.validate_aud = false;
        validation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn test_service() -> JwtService {
        let key_manager = Arc::new(KeyManager::generate().unwrap());
        JwtService::new(key_manager, "https://id.example.com")
    }

    fn test_claims(exp_offset: i64) -> AccessTokenClaims {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        AccessTokenClaims {
            iss: "https://id.example.com".to_string(),
            sub: "user-1".to_string(),
            aud: "app1".to_string(),
            exp: now + exp_offset,
            nbf: now,
            iat: now,
            jti: "token-1".to_string(),
            login: "alice".to_string(),
            name: "alice".to_string(),
            display_name: Some("Alice Liddell".to_string()),
            full_name: "Alice Liddell".to_string(),
            updated_at: "2024-03-01 12:30:45".to_string(),
            amr: "password".to_string(),
            roles: vec!["app_reader".to_string()],
            scope: "openid".to_string(),
        }
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let service = test_service();
        let claims = test_claims(1800);

        let token = service.encode(&claims).unwrap();
        assert_eq!(token.matches('.').count(), 2);

        let decoded = service.decode::<AccessTokenClaims>(&token).unwrap();
        assert_eq!(decoded.claims.sub, "user-1");
        assert_eq!(decoded.claims.aud, "app1");
        assert_eq!(decoded.claims.roles, vec!["app_reader"]);
        assert_eq!(decoded.header.kid.as_deref(), Some(service.key_manager.kid()));
    }

    #[test]
    fn test_expired_token_rejected_then_allowed() {
        let service = test_service();
        let claims = test_claims(-3600);
        let token = service.encode(&claims).unwrap();

        assert!(service.decode::<AccessTokenClaims>(&token).is_err());

        let decoded = service
            .decode_allow_expired::<AccessTokenClaims>(&token)
            .unwrap();
        assert_eq!(decoded.claims.login, "alice");
    }

    #[test]
    fn test_wrong_issuer_rejected() {
        let service = test_service();
        let mut claims = test_claims(1800);
        claims.iss = "https://rogue.example.com".to_string();
        let token = service.encode(&claims).unwrap();

        assert!(service.decode::<AccessTokenClaims>(&token).is_err());
    }

    #[test]
    fn test_foreign_key_rejected() {
        let service = test_service();
        let other = test_service();
        let token = other.encode(&test_claims(1800)).unwrap();

        assert!(service.decode::<AccessTokenClaims>(&token).is_err());
    }
}
