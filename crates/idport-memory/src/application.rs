use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use idport_auth::error::AuthError;
use idport_auth::storage::ApplicationRepository;
use idport_auth::types::{Application, ApplicationRole};
use uuid::Uuid;

/// Applications keyed by id, with user/role grants alongside.
#[derive(Default)]
pub struct InMemoryApplicationRepository {
    applications: RwLock<HashMap<Uuid, Application>>,
    /// (user id, role) grant pairs.
    grants: RwLock<Vec<(Uuid, ApplicationRole)>>,
}

impl InMemoryApplicationRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces an application.
    pub fn insert(&self, application: Application) {
        if let Ok(mut applications) = self.applications.write() {
            applications.insert(application.id, application);
        }
    }

    /// Grants a role to a user.
    pub fn grant_role(&self, user_id: Uuid, role: ApplicationRole) {
        if let Ok(mut grants) = self.grants.write() {
            grants.push((user_id, role));
        }
    }
}

#[async_trait]
impl ApplicationRepository for InMemoryApplicationRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Application>, AuthError> {
        let applications = self
            .applications
            .read()
            .map_err(|_| AuthError::storage("Application store lock poisoned"))?;
        Ok(applications.get(&id).cloned())
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Application>, AuthError> {
        let applications = self
            .applications
            .read()
            .map_err(|_| AuthError::storage("Application store lock poisoned"))?;
        Ok(applications.values().find(|a| a.code == code).cloned())
    }

    async fn user_roles(
        &self,
        user_id: Uuid,
        application_id: Uuid,
    ) -> Result<Vec<ApplicationRole>, AuthError> {
        let grants = self
            .grants
            .read()
            .map_err(|_| AuthError::storage("Application store lock poisoned"))?;
        Ok(grants
            .iter()
            .filter(|(uid, role)| *uid == user_id && role.application_id == application_id)
            .map(|(_, role)| role.clone())
            .collect())
    }
}
