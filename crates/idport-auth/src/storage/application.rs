//! Application and role lookup trait.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AuthError;
use crate::types::{Application, ApplicationRole};

/// Read access to registered client applications and their roles.
#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    /// Finds an application by id.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Application>, AuthError>;

    /// Finds an application by its unique code (the OAuth `client_id`).
    async fn find_by_code(&self, code: &str) -> Result<Option<Application>, AuthError>;

    /// Returns the roles a user holds within an application.
    ///
    /// An empty result means the user has no permission for the
    /// application; every issuance path treats that as a failure.
    async fn user_roles(
        &self,
        user_id: Uuid,
        application_id: Uuid,
    ) -> Result<Vec<ApplicationRole>, AuthError>;
}
