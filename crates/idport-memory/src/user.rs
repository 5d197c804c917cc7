use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use idport_auth::error::AuthError;
use idport_auth::storage::UserRepository;
use idport_auth::types::User;
use uuid::Uuid;

/// Users keyed by id.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a user.
    pub fn insert(&self, user: User) {
        if let Ok(mut users) = self.users.write() {
            users.insert(user.id, user);
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AuthError> {
        let users = self
            .users
            .read()
            .map_err(|_| AuthError::storage("User store lock poisoned"))?;
        Ok(users.get(&id).cloned())
    }

    async fn find_by_login(&self, login: &str) -> Result<Option<User>, AuthError> {
        let users = self
            .users
            .read()
            .map_err(|_| AuthError::storage("User store lock poisoned"))?;
        Ok(users
            .values()
            .find(|u| u.login.eq_ignore_ascii_case(login))
            .cloned())
    }
}
