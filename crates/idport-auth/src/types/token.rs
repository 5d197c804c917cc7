//! Token records and the active/expired/revoked state predicates.

use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Kind discriminator for stored tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// Signed JWT presented as a bearer credential.
    Access,
    /// Opaque long-lived token exchanged for new access tokens.
    Refresh,
    /// Signed OpenID Connect identity token.
    Id,
}

impl TokenKind {
    /// Returns the stable code stored on token records.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
            Self::Id => "id",
        }
    }

    /// Looks up a kind by stored code. Unknown codes return `None`.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "access" => Some(Self::Access),
            "refresh" => Some(Self::Refresh),
            "id" => Some(Self::Id),
            _ => None,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A stored token of any kind.
///
/// A token is *active* iff it exists, carries no revocation timestamp, and
/// has not passed its expiration. Every issuance and introspection decision
/// reduces to that predicate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    /// Unique token id.
    pub id: Uuid,

    /// What kind of token this record is.
    pub kind: TokenKind,

    /// Owning user.
    pub user_id: Uuid,

    /// Owning application.
    pub application_id: Uuid,

    /// The token value as presented by clients. Signed JWT for access and
    /// id tokens, opaque random string for refresh tokens.
    pub value: String,

    /// Scope granted when the token was issued. Refresh exchanges carry
    /// it forward onto the access tokens they produce.
    #[serde(default)]
    pub scope: String,

    /// When the token was issued (UTC).
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    /// When the token expires (UTC).
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,

    /// When the token was revoked, if it has been. Revocation is one-way.
    #[serde(with = "time::serde::rfc3339::option")]
    pub revoked_at: Option<OffsetDateTime>,

    /// For access and id tokens issued via a refresh token, the id of that
    /// refresh token. Bookkeeping only; revocation does not cascade.
    pub refresh_token_id: Option<Uuid>,
}

impl Token {
    /// Whether the token has been revoked.
    #[must_use]
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    /// Whether the token is past its expiration at `now`.
    #[must_use]
    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        now >= self.expires_at
    }

    /// Whether the token is active at `now`: not revoked and not expired.
    #[must_use]
    pub fn is_active(&self, now: OffsetDateTime) -> bool {
        !self.is_revoked() && !self.is_expired(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    fn test_token(expires_in: Duration) -> Token {
        let now = OffsetDateTime::now_utc();
        Token {
            id: Uuid::new_v4(),
            kind: TokenKind::Refresh,
            user_id: Uuid::new_v4(),
            application_id: Uuid::new_v4(),
            value: "opaque-value".to_string(),
            scope: "openid".to_string(),
            created_at: now,
            expires_at: now + expires_in,
            revoked_at: None,
            refresh_token_id: None,
        }
    }

    #[test]
    fn test_active_predicate() {
        let now = OffsetDateTime::now_utc();

        let live = test_token(Duration::minutes(30));
        assert!(live.is_active(now));
        assert!(!live.is_expired(now));
        assert!(!live.is_revoked());

        let expired = test_token(Duration::minutes(-1));
        assert!(expired.is_expired(now));
        assert!(!expired.is_active(now));

        let mut revoked = test_token(Duration::minutes(30));
        revoked.revoked_at = Some(now);
        assert!(revoked.is_revoked());
        assert!(!revoked.is_active(now));
    }

    #[test]
    fn test_expiry_boundary_is_inclusive() {
        let token = test_token(Duration::minutes(30));
        // At exactly expires_at the token is no longer active.
        assert!(token.is_expired(token.expires_at));
        assert!(!token.is_active(token.expires_at));
    }

    #[test]
    fn test_kind_codes() {
        assert_eq!(TokenKind::from_code("access"), Some(TokenKind::Access));
        assert_eq!(TokenKind::from_code("refresh"), Some(TokenKind::Refresh));
        assert_eq!(TokenKind::from_code("id"), Some(TokenKind::Id));
        assert_eq!(TokenKind::from_code("session"), None);
    }
}
