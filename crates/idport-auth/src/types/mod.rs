//! Domain types for the authorization and token engine.
//!
//! Wire-level selectors (`GrantType`, `ResponseType`) and per-record
//! discriminators (`TokenKind`, `AuthorizationMethod`) are closed enums
//! with a stable string code and an exhaustive `from_code` lookup that
//! returns `None` for anything unknown. Callers turn `None` into a
//! validation error naming the supported values.

pub mod application;
pub mod code;
pub mod token;
pub mod user;

pub use application::{Application, ApplicationRole};
pub use code::AuthorizationCode;
pub use token::{Token, TokenKind};
pub use user::{User, UserBuilder};

use std::fmt;

use serde::{Deserialize, Serialize};

// =============================================================================
// Grant Type
// =============================================================================

/// OAuth 2.0 grant types supported by the token endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
    /// Exchange an authorization code for tokens.
    AuthorizationCode,
    /// Exchange a refresh token for a new access token.
    RefreshToken,
}

impl GrantType {
    /// All supported grant types, in the order they are advertised.
    pub const ALL: [GrantType; 2] = [Self::AuthorizationCode, Self::RefreshToken];

    /// Returns the wire code for this grant type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthorizationCode => "authorization_code",
            Self::RefreshToken => "refresh_token",
        }
    }

    /// Looks up a grant type by wire code. Unknown codes return `None`.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "authorization_code" => Some(Self::AuthorizationCode),
            "refresh_token" => Some(Self::RefreshToken),
            _ => None,
        }
    }

    /// Returns the supported wire codes, comma-separated, for error messages.
    #[must_use]
    pub fn supported() -> String {
        Self::ALL
            .iter()
            .map(|g| g.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for GrantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Response Type
// =============================================================================

/// Authorize-endpoint flow selectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    /// Authorization code flow.
    Code,
    /// Implicit flow (access token issued directly).
    Token,
    /// Id-token-only flow. Declared for completeness; the authorize
    /// endpoint rejects it as unsupported.
    IdToken,
}

impl ResponseType {
    /// Response types the authorize endpoint actually serves.
    pub const SUPPORTED: [ResponseType; 2] = [Self::Code, Self::Token];

    /// Returns the wire code for this response type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Code => "code",
            Self::Token => "token",
            Self::IdToken => "id_token",
        }
    }

    /// Looks up a response type by wire code. Unknown codes return `None`.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "code" => Some(Self::Code),
            "token" => Some(Self::Token),
            "id_token" => Some(Self::IdToken),
            _ => None,
        }
    }

    /// Returns the supported wire codes, comma-separated, for error messages.
    #[must_use]
    pub fn supported() -> String {
        Self::SUPPORTED
            .iter()
            .map(|r| r.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for ResponseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Authorization Method
// =============================================================================

/// How a user authenticates to the identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorizationMethod {
    /// Password only.
    Password,
    /// Password plus TOTP provisioned via QR code.
    TotpQr,
    /// Password plus TOTP delivered via SMS.
    TotpSms,
}

impl AuthorizationMethod {
    /// Returns the stable code stored on user records and emitted as the
    /// `amr` claim.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Password => "password",
            Self::TotpQr => "totp_qr",
            Self::TotpSms => "totp_sms",
        }
    }

    /// Looks up a method by stored code. Unknown codes return `None`.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "password" => Some(Self::Password),
            "totp_qr" => Some(Self::TotpQr),
            "totp_sms" => Some(Self::TotpSms),
            _ => None,
        }
    }
}

impl fmt::Display for AuthorizationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grant_type_codes() {
        assert_eq!(GrantType::AuthorizationCode.as_str(), "authorization_code");
        assert_eq!(GrantType::RefreshToken.as_str(), "refresh_token");
        assert_eq!(
            GrantType::from_code("authorization_code"),
            Some(GrantType::AuthorizationCode)
        );
        assert_eq!(
            GrantType::from_code("refresh_token"),
            Some(GrantType::RefreshToken)
        );
        assert_eq!(GrantType::from_code("password"), None);
        assert_eq!(GrantType::supported(), "authorization_code, refresh_token");
    }

    #[test]
    fn test_response_type_codes() {
        assert_eq!(ResponseType::from_code("code"), Some(ResponseType::Code));
        assert_eq!(ResponseType::from_code("token"), Some(ResponseType::Token));
        assert_eq!(
            ResponseType::from_code("id_token"),
            Some(ResponseType::IdToken)
        );
        assert_eq!(ResponseType::from_code("hybrid"), None);
        // id_token is declared but not supported
        assert_eq!(ResponseType::supported(), "code, token");
    }

    #[test]
    fn test_authorization_method_codes() {
        assert_eq!(
            AuthorizationMethod::from_code("password"),
            Some(AuthorizationMethod::Password)
        );
        assert_eq!(
            AuthorizationMethod::from_code("totp_qr"),
            Some(AuthorizationMethod::TotpQr)
        );
        assert_eq!(
            AuthorizationMethod::from_code("totp_sms"),
            Some(AuthorizationMethod::TotpSms)
        );
        assert_eq!(AuthorizationMethod::from_code("webauthn"), None);
    }

    #[test]
    fn test_serde_codes_match_as_str() {
        let json = serde_json::to_string(&GrantType::AuthorizationCode).unwrap();
        assert_eq!(json, "\"authorization_code\"");
        let json = serde_json::to_string(&ResponseType::IdToken).unwrap();
        assert_eq!(json, "\"id_token\"");
        let json = serde_json::to_string(&AuthorizationMethod::TotpSms).unwrap();
        assert_eq!(json, "\"totp_sms\"");
    }
}
