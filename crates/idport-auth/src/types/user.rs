//! User account records.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::password::HashAlgorithm;
use crate::types::AuthorizationMethod;

/// A user account as stored by the identity provider.
///
/// Passwords are never stored; only the salted digest and the parameters
/// needed to recompute it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique user id; the `sub` of every token issued for this user.
    pub id: Uuid,

    /// Login name, unique among non-deleted users.
    pub login: String,

    /// Human-readable display name, if set.
    pub display_name: Option<String>,

    /// Base64-encoded password digest.
    pub password_hash: String,

    /// Salt used to derive the digest.
    pub salt: String,

    /// KDF digest variant used for this account.
    pub hash_algorithm: HashAlgorithm,

    /// How the user authenticates (password, TOTP variants).
    pub authorization_method: AuthorizationMethod,

    /// Whether the account is administratively blocked.
    pub blocked: bool,

    /// Whether the account is soft-deleted.
    pub deleted: bool,

    /// Last profile modification time (UTC).
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl User {
    /// Starts building a user record.
    #[must_use]
    pub fn builder(login: impl Into<String>) -> UserBuilder {
        UserBuilder::new(login)
    }

    /// Whether this account is eligible to sign in at all.
    ///
    /// Blocked and deleted accounts are rejected before any credential
    /// check happens.
    #[must_use]
    pub fn can_sign_in(&self) -> bool {
        !self.blocked && !self.deleted
    }
}

/// Builder for [`User`].
#[derive(Debug)]
pub struct UserBuilder {
    id: Uuid,
    login: String,
    display_name: Option<String>,
    password_hash: String,
    salt: String,
    hash_algorithm: HashAlgorithm,
    authorization_method: AuthorizationMethod,
    blocked: bool,
    deleted: bool,
    updated_at: OffsetDateTime,
}

impl UserBuilder {
    fn new(login: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            login: login.into(),
            display_name: None,
            password_hash: String::new(),
            salt: String::new(),
            hash_algorithm: HashAlgorithm::Pbkdf2Sha256,
            authorization_method: AuthorizationMethod::Password,
            blocked: false,
            deleted: false,
            updated_at: OffsetDateTime::now_utc(),
        }
    }

    /// Sets an explicit user id instead of a generated one.
    #[must_use]
    pub fn id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    /// Sets the display name.
    #[must_use]
    pub fn display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Sets the stored password digest and its derivation parameters.
    #[must_use]
    pub fn password_digest(
        mut self,
        hash: impl Into<String>,
        salt: impl Into<String>,
        algorithm: HashAlgorithm,
    ) -> Self {
        self.password_hash = hash.into();
        self.salt = salt.into();
        self.hash_algorithm = algorithm;
        self
    }

    /// Sets the authorization method.
    #[must_use]
    pub fn authorization_method(mut self, method: AuthorizationMethod) -> Self {
        self.authorization_method = method;
        self
    }

    /// Marks the account blocked.
    #[must_use]
    pub fn blocked(mut self, blocked: bool) -> Self {
        self.blocked = blocked;
        self
    }

    /// Marks the account soft-deleted.
    #[must_use]
    pub fn deleted(mut self, deleted: bool) -> Self {
        self.deleted = deleted;
        self
    }

    /// Sets the last modification time.
    #[must_use]
    pub fn updated_at(mut self, at: OffsetDateTime) -> Self {
        self.updated_at = at;
        self
    }

    /// Finishes the build.
    #[must_use]
    pub fn build(self) -> User {
        User {
            id: self.id,
            login: self.login,
            display_name: self.display_name,
            password_hash: self.password_hash,
            salt: self.salt,
            hash_algorithm: self.hash_algorithm,
            authorization_method: self.authorization_method,
            blocked: self.blocked,
            deleted: self.deleted,
            updated_at: self.updated_at,
        }
    }
}
