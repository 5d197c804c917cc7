//! Token endpoint wire types.

use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// Form parameters of a token call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenRequest {
    /// Requested grant; `authorization_code` or `refresh_token`.
    pub grant_type: String,

    /// Application code of the requesting client.
    pub client_id: String,

    /// Client secret for this application.
    pub client_secret: String,

    /// Authorization code being redeemed (code grant only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// Redirect URI the code was issued for (code grant only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_uri: Option<String>,

    /// Refresh token being exchanged (refresh grant only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl TokenRequest {
    /// Builds an authorization-code redemption request.
    #[must_use]
    pub fn authorization_code(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        code: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            grant_type: "authorization_code".to_string(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            code: Some(code.into()),
            redirect_uri: Some(redirect_uri.into()),
            refresh_token: None,
        }
    }

    /// Builds a refresh-token exchange request.
    #[must_use]
    pub fn refresh_token(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Self {
        Self {
            grant_type: "refresh_token".to_string(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            code: None,
            redirect_uri: None,
            refresh_token: Some(refresh_token.into()),
        }
    }
}

/// Successful token endpoint response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Signed access token.
    pub access_token: String,

    /// Always `Bearer`.
    pub token_type: String,

    /// Access token lifetime in seconds.
    pub expires_in: i64,

    /// Refresh token; present only when a code was redeemed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Refresh token lifetime in seconds; present with `refresh_token`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_expires_in: Option<i64>,

    /// Signed id token; present only when a code was redeemed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
}

/// OAuth error body for failed token endpoint calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthErrorResponse {
    /// Machine-readable error code, e.g. `access_denied`.
    pub error: String,

    /// Human-readable description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,
}

impl From<&AuthError> for OAuthErrorResponse {
    fn from(err: &AuthError) -> Self {
        Self {
            error: err.oauth_error_code().to_string(),
            error_description: Some(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builders() {
        let request = TokenRequest::authorization_code("app1", "secret", "abc", "https://a/cb");
        assert_eq!(request.grant_type, "authorization_code");
        assert_eq!(request.code.as_deref(), Some("abc"));
        assert!(request.refresh_token.is_none());

        let request = TokenRequest::refresh_token("app1", "secret", "opaque");
        assert_eq!(request.grant_type, "refresh_token");
        assert_eq!(request.refresh_token.as_deref(), Some("opaque"));
        assert!(request.code.is_none());
    }

    #[test]
    fn test_response_omits_absent_fields() {
        let response = TokenResponse {
            access_token: "jwt".to_string(),
            token_type: "Bearer".to_string(),
            expires_in: 1800,
            refresh_token: None,
            refresh_expires_in: None,
            id_token: None,
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(!json.contains("refresh_token"));
        assert!(!json.contains("id_token"));
    }

    #[test]
    fn test_error_response_from_auth_error() {
        let err = AuthError::access_denied();
        let body = OAuthErrorResponse::from(&err);
        assert_eq!(body.error, "access_denied");
    }
}
