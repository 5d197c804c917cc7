//! Token storage trait.

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::AuthError;
use crate::types::Token;

/// Storage for issued tokens of every kind.
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Finds a token record by its presented value.
    async fn find_by_value(&self, value: &str) -> Result<Option<Token>, AuthError>;

    /// Persists a new token record.
    async fn create(&self, token: Token) -> Result<(), AuthError>;

    /// Sets the revocation timestamp on the token with the given value.
    ///
    /// Idempotent: revoking an unknown or already-revoked token is a
    /// no-op. An existing revocation timestamp is never overwritten, the
    /// transition is one-way.
    async fn revoke(&self, value: &str, revoked_at: OffsetDateTime) -> Result<(), AuthError>;

    /// Revokes every active token owned by the user. Returns the number
    /// of tokens revoked.
    async fn revoke_all_for_user(
        &self,
        user_id: Uuid,
        revoked_at: OffsetDateTime,
    ) -> Result<u64, AuthError>;

    /// Deletes tokens whose expiration is at or before `cutoff`. Returns
    /// the number of tokens deleted.
    async fn delete_expired(&self, cutoff: OffsetDateTime) -> Result<u64, AuthError>;
}
