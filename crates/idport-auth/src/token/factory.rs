//! Token factory.
//!
//! Produces the three credential kinds: opaque random strings for
//! authorization codes and refresh tokens, signed JWTs for access and id
//! tokens. Persistence is the caller's job; the factory only builds
//! values.

use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::claims;
use crate::config::TokenOptions;
use crate::error::AuthError;
use crate::token::jwt::{AccessTokenClaims, IdTokenClaims, JwtService};
use crate::types::{Application, ApplicationRole, User};

/// A freshly signed token together with its record metadata.
#[derive(Debug, Clone)]
pub struct SignedToken {
    /// Token id; embedded as `jti` in access tokens.
    pub id: Uuid,
    /// The compact JWT.
    pub value: String,
    /// When the token was issued.
    pub issued_at: OffsetDateTime,
    /// When the token expires.
    pub expires_at: OffsetDateTime,
}

/// Builds authorization codes, refresh tokens, and signed tokens.
#[derive(Clone)]
pub struct TokenFactory {
    jwt: JwtService,
    options: TokenOptions,
}

impl TokenFactory {
    /// Creates a factory.
    #[must_use]
    pub fn new(jwt: JwtService, options: TokenOptions) -> Self {
        Self { jwt, options }
    }

    /// Returns the JWT service backing this factory.
    #[must_use]
    pub fn jwt(&self) -> &JwtService {
        &self.jwt
    }

    /// Generates a random authorization code.
    #[must_use]
    pub fn generate_code(&self) -> String {
        crate::random::alphanumeric(self.options.code_length)
    }

    /// Generates a random refresh token value.
    #[must_use]
    pub fn generate_refresh_token(&self) -> String {
        crate::random::alphanumeric(self.options.refresh_token_length)
    }

    /// Builds and signs an access token for a user on an application.
    ///
    /// Expiration is `now + application.access_token_minutes`. The claim
    /// body is the assembled claim set plus the standard JWT fields.
    ///
    /// # Errors
    ///
    /// Returns an error if signing fails.
    pub fn generate_access_token(
        &self,
        user: &User,
        application: &Application,
        roles: &[ApplicationRole],
        scope: &str,
    ) -> Result<SignedToken, AuthError> {
        let id = Uuid::new_v4();
        let issued_at = OffsetDateTime::now_utc();
        let expires_at = issued_at + Duration::minutes(application.access_token_minutes);

        let claims = AccessTokenClaims {
            iss: self.jwt.issuer().to_string(),
            sub: user.id.to_string(),
            aud: application.code.clone(),
            exp: expires_at.unix_timestamp(),
            nbf: issued_at.unix_timestamp(),
            iat: issued_at.unix_timestamp(),
            jti: id.to_string(),
            login: user.login.clone(),
            name: user.login.clone(),
            display_name: user.display_name.clone(),
            full_name: claims::full_name(user),
            updated_at: claims::format_updated_at(user.updated_at),
            amr: user.authorization_method.as_str().to_string(),
            roles: roles.iter().map(|r| r.name.clone()).collect(),
            scope: scope.to_string(),
        };

        let value = self.jwt.encode(&claims)?;
        Ok(SignedToken {
            id,
            value,
            issued_at,
            expires_at,
        })
    }

    /// Builds and signs an id token for a user on an application.
    ///
    /// Id tokens share the access token lifetime and carry identity
    /// claims only.
    ///
    /// # Errors
    ///
    /// Returns an error if signing fails.
    pub fn generate_id_token(
        &self,
        user: &User,
        application: &Application,
    ) -> Result<SignedToken, AuthError> {
        let id = Uuid::new_v4();
        let issued_at = OffsetDateTime::now_utc();
        let expires_at = issued_at + Duration::minutes(application.access_token_minutes);

        let claims = IdTokenClaims {
            iss: self.jwt.issuer().to_string(),
            sub: user.id.to_string(),
            aud: application.code.clone(),
            exp: expires_at.unix_timestamp(),
            iat: issued_at.unix_timestamp(),
            name: user.login.clone(),
            display_name: user.display_name.clone(),
            full_name: claims::full_name(user),
            amr: user.authorization_method.as_str().to_string(),
        };

        let value = self.jwt.encode(&claims)?;
        Ok(SignedToken {
            id,
            value,
            issued_at,
            expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::KeyManager;
    use crate::password::HashAlgorithm;
    use std::sync::Arc;

    fn test_factory() -> TokenFactory {
        let key_manager = Arc::new(KeyManager::generate().unwrap());
        let jwt = JwtService::new(key_manager, "https://id.example.com");
        TokenFactory::new(jwt, TokenOptions::default())
    }

    fn test_user() -> User {
        User::builder("alice")
            .display_name("Alice Liddell")
            .password_digest("hash", "salt", HashAlgorithm::Pbkdf2Sha256)
            .build()
    }

    fn test_application() -> Application {
        Application {
            id: Uuid::new_v4(),
            code: "app1".to_string(),
            secrets: vec!["secret".to_string()],
            redirect_uris: vec!["https://app1.example/".to_string()],
            access_token_minutes: 30,
            refresh_token_minutes: 720,
            code_expiration_minutes: None,
            two_factor: false,
        }
    }

    fn test_role(application_id: Uuid, name: &str) -> ApplicationRole {
        ApplicationRole {
            id: Uuid::new_v4(),
            application_id,
            name: name.to_string(),
        }
    }

    #[test]
    fn test_generated_strings_use_configured_lengths() {
        let factory = test_factory();
        assert_eq!(factory.generate_code().len(), 32);
        assert_eq!(factory.generate_refresh_token().len(), 48);
        assert_ne!(factory.generate_code(), factory.generate_code());
    }

    #[test]
    fn test_access_token_claims() {
        let factory = test_factory();
        let user = test_user();
        let app = test_application();
        let roles = [test_role(app.id, "app_reader")];

        let signed = factory
            .generate_access_token(&user, &app, &roles, "openid")
            .unwrap();

        let decoded = factory
            .jwt()
            .decode::<AccessTokenClaims>(&signed.value)
            .unwrap();
        assert_eq!(decoded.claims.iss, "https://id.example.com");
        assert_eq!(decoded.claims.sub, user.id.to_string());
        assert_eq!(decoded.claims.aud, "app1");
        assert_eq!(decoded.claims.jti, signed.id.to_string());
        assert_eq!(decoded.claims.login, "alice");
        assert_eq!(decoded.claims.full_name, "Alice Liddell");
        assert_eq!(decoded.claims.roles, vec!["app_reader"]);
        assert_eq!(decoded.claims.scope, "openid");
        assert_eq!(
            decoded.claims.exp - decoded.claims.iat,
            app.access_token_minutes * 60
        );
        assert_eq!(decoded.claims.nbf, decoded.claims.iat);
    }

    #[test]
    fn test_id_token_carries_identity_only() {
        let factory = test_factory();
        let user = test_user();
        let app = test_application();

        let signed = factory.generate_id_token(&user, &app).unwrap();
        let decoded = factory
            .jwt()
            .decode::<IdTokenClaims>(&signed.value)
            .unwrap();

        assert_eq!(decoded.claims.sub, user.id.to_string());
        assert_eq!(decoded.claims.name, "alice");
        assert_eq!(decoded.claims.amr, "password");

        // No role claims anywhere in the payload.
        let payload: serde_json::Value = {
            use base64::Engine;
            use base64::engine::general_purpose::URL_SAFE_NO_PAD;
            let body = signed.value.split('.').nth(1).unwrap();
            serde_json::from_slice(&URL_SAFE_NO_PAD.decode(body).unwrap()).unwrap()
        };
        assert!(payload.get("roles").is_none());
        assert!(payload.get("scope").is_none());
    }

    #[test]
    fn test_expiry_tracks_application_minutes() {
        let factory = test_factory();
        let user = test_user();
        let mut app = test_application();
        app.access_token_minutes = 5;

        let signed = factory
            .generate_access_token(&user, &app, &[], "")
            .unwrap();
        assert_eq!(signed.expires_at - signed.issued_at, Duration::minutes(5));
    }
}
