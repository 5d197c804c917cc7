//! Authorization code records.

use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

/// A pending authorization code.
///
/// Codes are single-use: the storage layer removes the record atomically
/// when it is redeemed, so two concurrent redemptions of the same code
/// yield exactly one success. Codes also expire after the owning
/// application's configured window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizationCode {
    /// The opaque code string; primary key.
    pub code: String,

    /// The `client_id` presented at the authorize endpoint.
    pub client_id: String,

    /// The redirect URI the code was issued for. Redemption must present
    /// this exact value.
    pub redirect_uri: String,

    /// The scope requested at authorization time.
    pub scope: String,

    /// The user who authorized.
    pub user_id: Uuid,

    /// The application the code was issued for.
    pub application_id: Uuid,

    /// When the code was issued (UTC).
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl AuthorizationCode {
    /// Whether this code is older than the given expiration window at `now`.
    #[must_use]
    pub fn is_expired(&self, window_minutes: i64, now: OffsetDateTime) -> bool {
        self.created_at < now - Duration::minutes(window_minutes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_code(created_at: OffsetDateTime) -> AuthorizationCode {
        AuthorizationCode {
            code: "abc123".to_string(),
            client_id: "app1".to_string(),
            redirect_uri: "https://app1.example/cb".to_string(),
            scope: "openid".to_string(),
            user_id: Uuid::new_v4(),
            application_id: Uuid::new_v4(),
            created_at,
        }
    }

    #[test]
    fn test_fresh_code_is_not_expired() {
        let now = OffsetDateTime::now_utc();
        let code = test_code(now);
        assert!(!code.is_expired(5, now));
    }

    #[test]
    fn test_old_code_is_expired() {
        let now = OffsetDateTime::now_utc();
        let code = test_code(now - Duration::minutes(6));
        assert!(code.is_expired(5, now));
        assert!(!code.is_expired(10, now));
    }
}
