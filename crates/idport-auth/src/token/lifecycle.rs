//! Token lifecycle operations: introspection, userinfo, revocation, and
//! expiry sweeps.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;

use crate::claims;
use crate::error::AuthError;
use crate::storage::{
    ApplicationRepository, AuthorizationCodeRepository, TokenRepository, UserRepository,
};
use crate::token::introspection::{IntrospectionRequest, IntrospectionResponse};
use crate::token::jwt::{AccessTokenClaims, JwtService};
use crate::token::revocation::RevocationRequest;
use crate::types::{Token, TokenKind};

/// The userinfo response: subject plus a deduplicated claim map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfoResponse {
    /// Subject (user id).
    pub sub: String,

    /// Claim name/value pairs. Repeated assembly names collapse to their
    /// first occurrence.
    #[serde(flatten)]
    pub claims: BTreeMap<String, String>,
}

/// Manages issued tokens after issuance.
pub struct TokenLifecycle {
    tokens: Arc<dyn TokenRepository>,
    users: Arc<dyn UserRepository>,
    applications: Arc<dyn ApplicationRepository>,
    codes: Arc<dyn AuthorizationCodeRepository>,
    jwt: JwtService,
}

impl TokenLifecycle {
    /// Creates a lifecycle manager over the given repositories.
    #[must_use]
    pub fn new(
        tokens: Arc<dyn TokenRepository>,
        users: Arc<dyn UserRepository>,
        applications: Arc<dyn ApplicationRepository>,
        codes: Arc<dyn AuthorizationCodeRepository>,
        jwt: JwtService,
    ) -> Self {
        Self {
            tokens,
            users,
            applications,
            codes,
            jwt,
        }
    }

    /// Introspects a token value.
    ///
    /// Inactive tokens (unknown, revoked, or expired) yield the bare
    /// `{"active": false}` response with no other fields, regardless of
    /// why they are inactive.
    ///
    /// # Errors
    ///
    /// Returns an error only on storage failure; an invalid token is not
    /// an error.
    pub async fn introspect(
        &self,
        request: &IntrospectionRequest,
    ) -> Result<IntrospectionResponse, AuthError> {
        let Some(token) = self.tokens.find_by_value(&request.token).await? else {
            return Ok(IntrospectionResponse::inactive());
        };

        let now = OffsetDateTime::now_utc();
        if !token.is_active(now) {
            debug!(token_id = %token.id, "introspected inactive token");
            return Ok(IntrospectionResponse::inactive());
        }

        match token.kind {
            TokenKind::Access => self.introspect_access(&token),
            TokenKind::Refresh => self.introspect_refresh(&token).await,
            TokenKind::Id => Ok(IntrospectionResponse::active()),
        }
    }

    /// Access tokens carry their own claims; decode and surface them. The
    /// active flag came from the stored record, so expired-signature
    /// validation is skipped.
    fn introspect_access(&self, token: &Token) -> Result<IntrospectionResponse, AuthError> {
        let decoded = match self.jwt.decode_allow_expired::<AccessTokenClaims>(&token.value) {
            Ok(decoded) => decoded,
            Err(_) => return Ok(IntrospectionResponse::inactive()),
        };
        let body = decoded.claims;

        Ok(IntrospectionResponse::active()
            .with_scope(body.scope)
            .with_client_id(body.aud.clone())
            .with_username(body.login)
            .with_token_type("Bearer")
            .with_timestamps(body.iat, body.exp)
            .with_nbf(body.nbf)
            .with_sub(body.sub)
            .with_aud(body.aud)
            .with_iss(body.iss)
            .with_jti(body.jti))
    }

    /// Refresh tokens are opaque; synthesize the fields from the owning
    /// user and application records.
    async fn introspect_refresh(&self, token: &Token) -> Result<IntrospectionResponse, AuthError> {
        let user = self.users.find_by_id(token.user_id).await?;
        let application = self.applications.find_by_id(token.application_id).await?;
        let (Some(user), Some(application)) = (user, application) else {
            // Owner records are gone; treat the token as inactive.
            return Ok(IntrospectionResponse::inactive());
        };

        let mut response = IntrospectionResponse::active()
            .with_client_id(application.code.clone())
            .with_username(user.login)
            .with_timestamps(
                token.created_at.unix_timestamp(),
                token.expires_at.unix_timestamp(),
            )
            .with_sub(token.user_id.to_string())
            .with_aud(application.code)
            .with_iss(self.jwt.issuer())
            .with_jti(token.id.to_string());
        if !token.scope.is_empty() {
            response = response.with_scope(token.scope.clone());
        }
        Ok(response)
    }

    /// Resolves the user behind an active access token.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` for anything other than an active access
    /// token, and `NotFound` if the owner no longer exists.
    pub async fn userinfo(&self, token_value: &str) -> Result<UserInfoResponse, AuthError> {
        let Some(token) = self.tokens.find_by_value(token_value).await? else {
            return Err(AuthError::unauthorized("Invalid access token"));
        };

        let now = OffsetDateTime::now_utc();
        if token.kind != TokenKind::Access || !token.is_active(now) {
            return Err(AuthError::unauthorized("Invalid access token"));
        }

        let user = self
            .users
            .find_by_id(token.user_id)
            .await?
            .ok_or_else(|| AuthError::not_found("User not found"))?;

        let roles = self
            .applications
            .user_roles(token.user_id, token.application_id)
            .await?;

        let set = claims::assemble(&user, user.authorization_method, &roles);
        Ok(UserInfoResponse {
            sub: user.id.to_string(),
            claims: set.to_unique_map(),
        })
    }

    /// Revokes a single token by value.
    ///
    /// Idempotent: an unknown or already-revoked token is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error only on storage failure.
    pub async fn revoke(&self, request: &RevocationRequest) -> Result<(), AuthError> {
        let revoked_at = OffsetDateTime::now_utc();
        self.tokens.revoke(&request.token, revoked_at).await?;
        debug!("token revocation applied");
        Ok(())
    }

    /// Revokes every active token belonging to a user ("log out
    /// everywhere"). Returns the number of tokens revoked.
    ///
    /// # Errors
    ///
    /// Returns an error only on storage failure.
    pub async fn revoke_all_for_user(&self, user_id: Uuid) -> Result<u64, AuthError> {
        let revoked_at = OffsetDateTime::now_utc();
        let revoked = self.tokens.revoke_all_for_user(user_id, revoked_at).await?;
        debug!(%user_id, revoked, "revoked all tokens for user");
        Ok(revoked)
    }

    /// Deletes tokens that expired at or before `cutoff`. Returns the
    /// number deleted. Scheduling is the caller's concern.
    ///
    /// # Errors
    ///
    /// Returns an error only on storage failure.
    pub async fn remove_expired_tokens(&self, cutoff: OffsetDateTime) -> Result<u64, AuthError> {
        let deleted = self.tokens.delete_expired(cutoff).await?;
        debug!(deleted, "expired token sweep");
        Ok(deleted)
    }

    /// Deletes authorization codes created at or before `cutoff`. Returns
    /// the number deleted.
    ///
    /// # Errors
    ///
    /// Returns an error only on storage failure.
    pub async fn delete_expired_codes(&self, cutoff: OffsetDateTime) -> Result<u64, AuthError> {
        let deleted = self.codes.delete_expired(cutoff).await?;
        debug!(deleted, "expired code sweep");
        Ok(deleted)
    }
}
