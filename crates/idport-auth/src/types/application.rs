//! OAuth client application records and per-application roles.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::random;

/// A registered OAuth client application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Application {
    /// Unique application id.
    pub id: Uuid,

    /// Unique application code; the OAuth `client_id`.
    pub code: String,

    /// Client secrets accepted at the token endpoint. Multiple secrets
    /// allow overlap during rotation.
    pub secrets: Vec<String>,

    /// Allowed redirect-URI prefixes.
    pub redirect_uris: Vec<String>,

    /// Access token lifetime, in minutes.
    pub access_token_minutes: i64,

    /// Refresh token lifetime, in minutes.
    pub refresh_token_minutes: i64,

    /// Authorization-code expiration window, in minutes. `None` falls back
    /// to the engine-wide default.
    pub code_expiration_minutes: Option<i64>,

    /// Whether this application requires two-factor authentication.
    pub two_factor: bool,
}

impl Application {
    /// Checks a redirect URI against the registered prefixes.
    ///
    /// Matching is case-insensitive and prefix-based: the presented URI
    /// must start with one of the registered prefixes. The token endpoint
    /// separately requires the redeemed URI to equal the one stored with
    /// the code, exactly.
    #[must_use]
    pub fn matches_redirect_uri(&self, redirect_uri: &str) -> bool {
        let candidate = redirect_uri.to_lowercase();
        self.redirect_uris
            .iter()
            .any(|prefix| candidate.starts_with(&prefix.to_lowercase()))
    }

    /// Checks a presented client secret against the stored secrets.
    ///
    /// Every stored secret is compared in constant time; the scan does not
    /// stop at the first match.
    #[must_use]
    pub fn verify_secret(&self, presented: &str) -> bool {
        let mut matched = false;
        for secret in &self.secrets {
            matched |= random::constant_time_eq_str(secret, presented);
        }
        matched
    }
}

/// A role granted to users within one application.
///
/// Role names are scoped to their application; the same name under two
/// applications is two distinct roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationRole {
    /// Unique role id.
    pub id: Uuid,

    /// The application this role belongs to.
    pub application_id: Uuid,

    /// Role name, emitted as a `role` claim value.
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_application() -> Application {
        Application {
            id: Uuid::new_v4(),
            code: "app1".to_string(),
            secrets: vec!["old-secret".to_string(), "new-secret".to_string()],
            redirect_uris: vec!["https://app1.example/".to_string()],
            access_token_minutes: 30,
            refresh_token_minutes: 720,
            code_expiration_minutes: Some(5),
            two_factor: false,
        }
    }

    #[test]
    fn test_redirect_prefix_matching() {
        let app = test_application();
        assert!(app.matches_redirect_uri("https://app1.example/"));
        assert!(app.matches_redirect_uri("https://app1.example/cb"));
        assert!(app.matches_redirect_uri("HTTPS://APP1.EXAMPLE/cb"));
        assert!(!app.matches_redirect_uri("https://evil.example/cb"));
        assert!(!app.matches_redirect_uri("https://app1.example.evil/cb"));
    }

    #[test]
    fn test_no_registered_redirects_matches_nothing() {
        let mut app = test_application();
        app.redirect_uris.clear();
        assert!(!app.matches_redirect_uri("https://app1.example/cb"));
    }

    #[test]
    fn test_verify_secret_accepts_any_stored_secret() {
        let app = test_application();
        assert!(app.verify_secret("old-secret"));
        assert!(app.verify_secret("new-secret"));
        assert!(!app.verify_secret("wrong"));
        assert!(!app.verify_secret("new-secret "));
        assert!(!app.verify_secret(""));
    }
}
