//! Authorization code storage trait.

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::error::AuthError;
use crate::types::AuthorizationCode;

/// Storage for pending authorization codes.
#[async_trait]
pub trait AuthorizationCodeRepository: Send + Sync {
    /// Finds a pending code without consuming it.
    async fn find_by_code(&self, code: &str) -> Result<Option<AuthorizationCode>, AuthError>;

    /// Persists a new code.
    async fn create(&self, code: AuthorizationCode) -> Result<(), AuthError>;

    /// Atomically removes and returns the code.
    ///
    /// This is the single-use guarantee: when two redemptions race on the
    /// same code, exactly one caller receives `Some` and every other
    /// caller receives `None`. Implementations must use a conditional
    /// delete or equivalent compare-and-remove primitive.
    async fn consume(&self, code: &str) -> Result<Option<AuthorizationCode>, AuthError>;

    /// Deletes codes created at or before `cutoff`. Returns the number of
    /// codes deleted.
    async fn delete_expired(&self, cutoff: OffsetDateTime) -> Result<u64, AuthError>;
}
