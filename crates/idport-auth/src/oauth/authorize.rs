//! The authorize endpoint state machine.
//!
//! Validates the authenticated user, the client, and the redirect URI,
//! then branches on `response_type`: the code flow persists an
//! authorization code, the implicit flow issues a signed access token
//! immediately. Authorization failures surface as a generic access-denied
//! error so callers cannot probe which check failed.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::AuthError;
use crate::storage::{
    ApplicationRepository, AuthorizationCodeRepository, TokenRepository, UserRepository,
};
use crate::token::TokenFactory;
use crate::types::{
    Application, ApplicationRole, AuthorizationCode, ResponseType, Token, TokenKind, User,
};

/// Query parameters of an authorize call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizeRequest {
    /// Requested flow; `code` or `token`.
    pub response_type: String,

    /// Application code of the requesting client.
    pub client_id: String,

    /// Where the client wants the result delivered.
    pub redirect_uri: String,

    /// Opaque client state, echoed back unmodified.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    /// Requested scope.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

/// Result of a successful authorize call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AuthorizeOutcome {
    /// Code flow: an authorization code to redeem at the token endpoint.
    Code {
        /// The single-use code.
        code: String,
        /// Echoed client state.
        #[serde(skip_serializing_if = "Option::is_none")]
        state: Option<String>,
    },
    /// Implicit flow: an access token issued directly.
    Token {
        /// The signed access token.
        access_token: String,
        /// Always `Bearer`.
        token_type: String,
        /// Lifetime in seconds.
        expires_in: i64,
        /// Echoed client state.
        #[serde(skip_serializing_if = "Option::is_none")]
        state: Option<String>,
    },
}

/// Drives the authorize endpoint.
pub struct AuthorizationService {
    users: Arc<dyn UserRepository>,
    applications: Arc<dyn ApplicationRepository>,
    codes: Arc<dyn AuthorizationCodeRepository>,
    tokens: Arc<dyn TokenRepository>,
    factory: TokenFactory,
}

impl AuthorizationService {
    /// Creates an authorization service over the given collaborators.
    #[must_use]
    pub fn new(
        users: Arc<dyn UserRepository>,
        applications: Arc<dyn ApplicationRepository>,
        codes: Arc<dyn AuthorizationCodeRepository>,
        tokens: Arc<dyn TokenRepository>,
        factory: TokenFactory,
    ) -> Self {
        Self {
            users,
            applications,
            codes,
            tokens,
            factory,
        }
    }

    /// Handles an authorize call for an already-authenticated user.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` for any failed user, client, redirect, or role
    /// check, and `InvalidRequest` for an unsupported `response_type`.
    /// The forbidden message is deliberately generic.
    pub async fn authorize(
        &self,
        user_id: Uuid,
        request: &AuthorizeRequest,
    ) -> Result<AuthorizeOutcome, AuthError> {
        let user = self.validate_user(user_id).await?;
        let application = self.validate_client(&request.client_id).await?;

        if !application.matches_redirect_uri(&request.redirect_uri) {
            warn!(
                client_id = %request.client_id,
                "authorize rejected: redirect uri not registered"
            );
            return Err(AuthError::access_denied());
        }

        let roles = self
            .applications
            .user_roles(user.id, application.id)
            .await?;
        if roles.is_empty() {
            warn!(
                user_id = %user.id,
                client_id = %request.client_id,
                "authorize rejected: user has no roles for application"
            );
            return Err(AuthError::access_denied());
        }

        match ResponseType::from_code(&request.response_type) {
            Some(ResponseType::Code) => self.issue_code(&user, &application, request).await,
            Some(ResponseType::Token) => {
                self.issue_implicit(&user, &application, &roles, request)
                    .await
            }
            // id_token-only flow is declared but not served
            Some(ResponseType::IdToken) | None => Err(AuthError::invalid_request(format!(
                "Unsupported response_type '{}'; supported: {}",
                request.response_type,
                ResponseType::supported()
            ))),
        }
    }

    async fn validate_user(&self, user_id: Uuid) -> Result<User, AuthError> {
        let Some(user) = self.users.find_by_id(user_id).await? else {
            warn!(%user_id, "authorize rejected: unknown user");
            return Err(AuthError::access_denied());
        };
        if !user.can_sign_in() {
            warn!(%user_id, "authorize rejected: user blocked or deleted");
            return Err(AuthError::access_denied());
        }
        Ok(user)
    }

    async fn validate_client(&self, client_id: &str) -> Result<Application, AuthError> {
        match self.applications.find_by_code(client_id).await? {
            Some(application) => Ok(application),
            None => {
                warn!(client_id, "authorize rejected: unknown client");
                Err(AuthError::access_denied())
            }
        }
    }

    async fn issue_code(
        &self,
        user: &User,
        application: &Application,
        request: &AuthorizeRequest,
    ) -> Result<AuthorizeOutcome, AuthError> {
        let code = AuthorizationCode {
            code: self.factory.generate_code(),
            client_id: request.client_id.clone(),
            redirect_uri: request.redirect_uri.clone(),
            scope: request.scope.clone().unwrap_or_default(),
            user_id: user.id,
            application_id: application.id,
            created_at: OffsetDateTime::now_utc(),
        };
        let value = code.code.clone();
        self.codes.create(code).await?;

        debug!(user_id = %user.id, client_id = %request.client_id, "authorization code issued");
        Ok(AuthorizeOutcome::Code {
            code: value,
            state: request.state.clone(),
        })
    }

    async fn issue_implicit(
        &self,
        user: &User,
        application: &Application,
        roles: &[ApplicationRole],
        request: &AuthorizeRequest,
    ) -> Result<AuthorizeOutcome, AuthError> {
        let scope = request.scope.clone().unwrap_or_default();
        let signed = self
            .factory
            .generate_access_token(user, application, roles, &scope)?;

        self.tokens
            .create(Token {
                id: signed.id,
                kind: TokenKind::Access,
                user_id: user.id,
                application_id: application.id,
                value: signed.value.clone(),
                scope,
                created_at: signed.issued_at,
                expires_at: signed.expires_at,
                revoked_at: None,
                refresh_token_id: None,
            })
            .await?;

        debug!(user_id = %user.id, client_id = %request.client_id, "implicit access token issued");
        Ok(AuthorizeOutcome::Token {
            access_token: signed.value,
            token_type: "Bearer".to_string(),
            expires_in: application.access_token_minutes * 60,
            state: request.state.clone(),
        })
    }
}
