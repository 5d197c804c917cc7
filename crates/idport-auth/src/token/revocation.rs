//! Revocation request types (RFC 7009 shape).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Advisory hint about what kind of token a revocation names.
///
/// Lookup is by value across all kinds, so the hint never changes the
/// outcome; it is accepted for wire compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenTypeHint {
    /// The value is an access token.
    AccessToken,
    /// The value is a refresh token.
    RefreshToken,
}

impl TokenTypeHint {
    /// Returns the wire code for this hint.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AccessToken => "access_token",
            Self::RefreshToken => "refresh_token",
        }
    }

    /// Looks up a hint by wire code. Unknown codes return `None`; per the
    /// wire contract unknown hints are ignored rather than rejected.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "access_token" => Some(Self::AccessToken),
            "refresh_token" => Some(Self::RefreshToken),
            _ => None,
        }
    }
}

impl fmt::Display for TokenTypeHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A revocation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevocationRequest {
    /// The token value to revoke.
    pub token: String,

    /// Optional kind hint; advisory only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_type_hint: Option<TokenTypeHint>,
}

impl RevocationRequest {
    /// Creates a request for a token value.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            token_type_hint: None,
        }
    }

    /// Attaches a kind hint.
    #[must_use]
    pub fn with_hint(mut self, hint: TokenTypeHint) -> Self {
        self.token_type_hint = Some(hint);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hint_codes() {
        assert_eq!(
            TokenTypeHint::from_code("access_token"),
            Some(TokenTypeHint::AccessToken)
        );
        assert_eq!(
            TokenTypeHint::from_code("refresh_token"),
            Some(TokenTypeHint::RefreshToken)
        );
        assert_eq!(TokenTypeHint::from_code("id_token"), None);
    }

    #[test]
    fn test_request_serde() {
        let request = RevocationRequest::new("opaque").with_hint(TokenTypeHint::RefreshToken);
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"token_type_hint\":\"refresh_token\""));

        let bare: RevocationRequest = serde_json::from_str("{\"token\":\"x\"}").unwrap();
        assert_eq!(bare.token, "x");
        assert!(bare.token_type_hint.is_none());
    }
}
