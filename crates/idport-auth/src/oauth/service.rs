//! The token endpoint state machine.
//!
//! Redeems authorization codes and refresh tokens for signed tokens. The
//! flow is grant validation, subject resolution, client authentication,
//! user authorization, then issuance; any failed check aborts before any
//! token is persisted.
//!
//! Authorization codes are consumed atomically the moment the grant
//! resolves, before the client secret or any residual check runs: when
//! two redemptions race, exactly one obtains the code record and all
//! others fail. A code presented with a bad secret, outside its window,
//! or with the wrong redirect stays consumed; it was single-use either
//! way.

use std::sync::Arc;

use time::{Duration, OffsetDateTime};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::TokenOptions;
use crate::error::AuthError;
use crate::oauth::token::{TokenRequest, TokenResponse};
use crate::storage::{
    ApplicationRepository, AuthorizationCodeRepository, TokenRepository, UserRepository,
};
use crate::token::TokenFactory;
use crate::types::{
    Application, ApplicationRole, AuthorizationCode, GrantType, Token, TokenKind, User,
};

/// What the grant resolved to, before the client is authenticated.
enum Redemption {
    /// A consumed (already burned) authorization code.
    Code(AuthorizationCode),
    /// A live refresh token record.
    Refresh(Token),
}

/// The subject a grant resolved to, after all residual checks.
struct Subject {
    user_id: Uuid,
    application_id: Uuid,
    scope: String,
    /// Set when the grant was a refresh token; new access tokens link
    /// back to it.
    refresh_token_id: Option<Uuid>,
}

/// Drives the token endpoint.
pub struct TokenIssuanceService {
    users: Arc<dyn UserRepository>,
    applications: Arc<dyn ApplicationRepository>,
    tokens: Arc<dyn TokenRepository>,
    codes: Arc<dyn AuthorizationCodeRepository>,
    factory: TokenFactory,
    options: TokenOptions,
}

impl TokenIssuanceService {
    /// Creates a token issuance service over the given collaborators.
    #[must_use]
    pub fn new(
        users: Arc<dyn UserRepository>,
        applications: Arc<dyn ApplicationRepository>,
        tokens: Arc<dyn TokenRepository>,
        codes: Arc<dyn AuthorizationCodeRepository>,
        factory: TokenFactory,
        options: TokenOptions,
    ) -> Self {
        Self {
            users,
            applications,
            tokens,
            codes,
            factory,
            options,
        }
    }

    /// Handles a token call.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` for an unknown grant type or missing
    /// grant fields, and a generic `Forbidden` for every failed
    /// credential, code, token, or role check.
    pub async fn issue(&self, request: &TokenRequest) -> Result<TokenResponse, AuthError> {
        let grant = GrantType::from_code(&request.grant_type).ok_or_else(|| {
            AuthError::invalid_request(format!(
                "Unsupported grant_type '{}'; supported: {}",
                request.grant_type,
                GrantType::supported()
            ))
        })?;

        // Subject resolution precedes client authentication; a code is
        // single-use from this point even if the secret check fails.
        let redemption = match grant {
            GrantType::AuthorizationCode => Redemption::Code(self.consume_code(request).await?),
            GrantType::RefreshToken => Redemption::Refresh(self.lookup_refresh(request).await?),
        };

        let application = self.authenticate_client(request).await?;

        let subject = match redemption {
            Redemption::Code(code) => self.validate_code(code, &application, request)?,
            Redemption::Refresh(token) => self.validate_refresh(token, &application)?,
        };

        let (user, roles) = self.authorize_user(&subject, &application).await?;

        match grant {
            GrantType::AuthorizationCode => {
                self.issue_full(&user, &application, &roles, &subject.scope)
                    .await
            }
            GrantType::RefreshToken => {
                self.issue_access_only(&user, &application, &roles, &subject)
                    .await
            }
        }
    }

    /// Checks the code grant's required fields, then atomically consumes
    /// the code.
    async fn consume_code(&self, request: &TokenRequest) -> Result<AuthorizationCode, AuthError> {
        let code_value = request
            .code
            .as_deref()
            .ok_or_else(|| AuthError::invalid_request("Missing required field 'code'"))?;
        if request.redirect_uri.is_none() {
            return Err(AuthError::invalid_request(
                "Missing required field 'redirect_uri'",
            ));
        }

        // Atomic removal; a raced or replayed code is gone by now.
        let Some(code) = self.codes.consume(code_value).await? else {
            warn!(client_id = %request.client_id, "token rejected: code unknown or already used");
            return Err(AuthError::access_denied());
        };
        Ok(code)
    }

    /// Residual checks on an already-consumed code: application binding,
    /// expiry window, and the exact redirect match.
    fn validate_code(
        &self,
        code: AuthorizationCode,
        application: &Application,
        request: &TokenRequest,
    ) -> Result<Subject, AuthError> {
        if code.application_id != application.id {
            warn!(client_id = %request.client_id, "token rejected: code issued to another client");
            return Err(AuthError::access_denied());
        }

        let window = application
            .code_expiration_minutes
            .unwrap_or(self.options.default_code_expiration_minutes);
        if code.is_expired(window, OffsetDateTime::now_utc()) {
            warn!(client_id = %request.client_id, "token rejected: code expired");
            return Err(AuthError::access_denied());
        }

        // Exact, case-sensitive match against the URI stored at issuance.
        if request.redirect_uri.as_deref() != Some(code.redirect_uri.as_str()) {
            warn!(client_id = %request.client_id, "token rejected: redirect uri mismatch");
            return Err(AuthError::access_denied());
        }

        Ok(Subject {
            user_id: code.user_id,
            application_id: code.application_id,
            scope: code.scope,
            refresh_token_id: None,
        })
    }

    /// Looks up a refresh token and checks its own state. Nothing is
    /// consumed; refresh tokens stay valid until revoked or expired.
    async fn lookup_refresh(&self, request: &TokenRequest) -> Result<Token, AuthError> {
        let value = request
            .refresh_token
            .as_deref()
            .ok_or_else(|| AuthError::invalid_request("Missing required field 'refresh_token'"))?;

        let Some(token) = self.tokens.find_by_value(value).await? else {
            warn!(client_id = %request.client_id, "token rejected: refresh token unknown");
            return Err(AuthError::access_denied());
        };

        if token.kind != TokenKind::Refresh || !token.is_active(OffsetDateTime::now_utc()) {
            warn!(client_id = %request.client_id, "token rejected: refresh token not usable");
            return Err(AuthError::access_denied());
        }

        Ok(token)
    }

    /// Binds a refresh token to the authenticated client.
    fn validate_refresh(
        &self,
        token: Token,
        application: &Application,
    ) -> Result<Subject, AuthError> {
        if token.application_id != application.id {
            warn!(
                client_id = %application.code,
                "token rejected: refresh token issued to another client"
            );
            return Err(AuthError::access_denied());
        }

        Ok(Subject {
            user_id: token.user_id,
            application_id: token.application_id,
            scope: token.scope,
            refresh_token_id: Some(token.id),
        })
    }

    /// Resolves the application and checks the presented secret.
    async fn authenticate_client(&self, request: &TokenRequest) -> Result<Application, AuthError> {
        let Some(application) = self.applications.find_by_code(&request.client_id).await? else {
            warn!(client_id = %request.client_id, "token rejected: unknown client");
            return Err(AuthError::access_denied());
        };
        if !application.verify_secret(&request.client_secret) {
            warn!(client_id = %request.client_id, "token rejected: bad client secret");
            return Err(AuthError::access_denied());
        }
        Ok(application)
    }

    /// Resolves and authorizes the subject's user for the application.
    async fn authorize_user(
        &self,
        subject: &Subject,
        application: &Application,
    ) -> Result<(User, Vec<ApplicationRole>), AuthError> {
        let Some(user) = self.users.find_by_id(subject.user_id).await? else {
            warn!(user_id = %subject.user_id, "token rejected: user not found");
            return Err(AuthError::access_denied());
        };
        if !user.can_sign_in() {
            warn!(user_id = %user.id, "token rejected: user blocked or deleted");
            return Err(AuthError::access_denied());
        }

        let roles = self
            .applications
            .user_roles(user.id, subject.application_id)
            .await?;
        if roles.is_empty() {
            warn!(
                user_id = %user.id,
                client_id = %application.code,
                "token rejected: user has no roles for application"
            );
            return Err(AuthError::access_denied());
        }

        Ok((user, roles))
    }

    /// Code redemption: issue access, refresh, and id tokens together.
    async fn issue_full(
        &self,
        user: &User,
        application: &Application,
        roles: &[ApplicationRole],
        scope: &str,
    ) -> Result<TokenResponse, AuthError> {
        let now = OffsetDateTime::now_utc();
        let refresh_id = Uuid::new_v4();
        let refresh_value = self.factory.generate_refresh_token();
        let refresh_expires_at = now + Duration::minutes(application.refresh_token_minutes);

        self.tokens
            .create(Token {
                id: refresh_id,
                kind: TokenKind::Refresh,
                user_id: user.id,
                application_id: application.id,
                value: refresh_value.clone(),
                scope: scope.to_string(),
                created_at: now,
                expires_at: refresh_expires_at,
                revoked_at: None,
                refresh_token_id: None,
            })
            .await?;

        let access = self
            .factory
            .generate_access_token(user, application, roles, scope)?;
        self.tokens
            .create(Token {
                id: access.id,
                kind: TokenKind::Access,
                user_id: user.id,
                application_id: application.id,
                value: access.value.clone(),
                scope: scope.to_string(),
                created_at: access.issued_at,
                expires_at: access.expires_at,
                revoked_at: None,
                refresh_token_id: Some(refresh_id),
            })
            .await?;

        let id_token = self.factory.generate_id_token(user, application)?;
        self.tokens
            .create(Token {
                id: id_token.id,
                kind: TokenKind::Id,
                user_id: user.id,
                application_id: application.id,
                value: id_token.value.clone(),
                scope: scope.to_string(),
                created_at: id_token.issued_at,
                expires_at: id_token.expires_at,
                revoked_at: None,
                refresh_token_id: Some(refresh_id),
            })
            .await?;

        debug!(user_id = %user.id, client_id = %application.code, "code redeemed, tokens issued");
        Ok(TokenResponse {
            access_token: access.value,
            token_type: "Bearer".to_string(),
            expires_in: application.access_token_minutes * 60,
            refresh_token: Some(refresh_value),
            refresh_expires_in: Some(application.refresh_token_minutes * 60),
            id_token: Some(id_token.value),
        })
    }

    /// Refresh exchange: issue a new access token only, carrying the
    /// refresh token's stored scope. The refresh token is never rotated
    /// or replaced.
    async fn issue_access_only(
        &self,
        user: &User,
        application: &Application,
        roles: &[ApplicationRole],
        subject: &Subject,
    ) -> Result<TokenResponse, AuthError> {
        let access = self
            .factory
            .generate_access_token(user, application, roles, &subject.scope)?;
        self.tokens
            .create(Token {
                id: access.id,
                kind: TokenKind::Access,
                user_id: user.id,
                application_id: application.id,
                value: access.value.clone(),
                scope: subject.scope.clone(),
                created_at: access.issued_at,
                expires_at: access.expires_at,
                revoked_at: None,
                refresh_token_id: subject.refresh_token_id,
            })
            .await?;

        debug!(user_id = %user.id, client_id = %application.code, "access token refreshed");
        Ok(TokenResponse {
            access_token: access.value,
            token_type: "Bearer".to_string(),
            expires_in: application.access_token_minutes * 60,
            refresh_token: None,
            refresh_expires_in: None,
            id_token: None,
        })
    }
}
