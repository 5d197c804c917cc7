//! User lookup trait.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AuthError;
use crate::types::User;

/// Read access to user accounts.
///
/// The engine never creates or hard-deletes users; account management is
/// a separate concern. Soft-deleted users may still be returned here, the
/// callers apply the `can_sign_in` check themselves.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Finds a user by id.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AuthError>;

    /// Finds a user by login name. Lookup is case-insensitive.
    async fn find_by_login(&self, login: &str) -> Result<Option<User>, AuthError>;
}
