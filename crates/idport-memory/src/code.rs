use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use idport_auth::error::AuthError;
use idport_auth::storage::AuthorizationCodeRepository;
use idport_auth::types::AuthorizationCode;
use time::OffsetDateTime;

/// Pending authorization codes keyed by code string.
#[derive(Default)]
pub struct InMemoryCodeRepository {
    codes: RwLock<HashMap<String, AuthorizationCode>>,
}

impl InMemoryCodeRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuthorizationCodeRepository for InMemoryCodeRepository {
    async fn find_by_code(&self, code: &str) -> Result<Option<AuthorizationCode>, AuthError> {
        let codes = self
            .codes
            .read()
            .map_err(|_| AuthError::storage("Code store lock poisoned"))?;
        Ok(codes.get(code).cloned())
    }

    async fn create(&self, code: AuthorizationCode) -> Result<(), AuthError> {
        let mut codes = self
            .codes
            .write()
            .map_err(|_| AuthError::storage("Code store lock poisoned"))?;
        codes.insert(code.code.clone(), code);
        Ok(())
    }

    async fn consume(&self, code: &str) -> Result<Option<AuthorizationCode>, AuthError> {
        // Remove under the write lock; of N racing redemptions exactly
        // one sees the record.
        let mut codes = self
            .codes
            .write()
            .map_err(|_| AuthError::storage("Code store lock poisoned"))?;
        Ok(codes.remove(code))
    }

    async fn delete_expired(&self, cutoff: OffsetDateTime) -> Result<u64, AuthError> {
        let mut codes = self
            .codes
            .write()
            .map_err(|_| AuthError::storage("Code store lock poisoned"))?;
        let before = codes.len();
        codes.retain(|_, code| code.created_at > cutoff);
        Ok((before - codes.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use time::Duration;
    use uuid::Uuid;

    fn test_code(code: &str) -> AuthorizationCode {
        AuthorizationCode {
            code: code.to_string(),
            client_id: "app1".to_string(),
            redirect_uri: "https://app1.example/cb".to_string(),
            scope: "openid".to_string(),
            user_id: Uuid::new_v4(),
            application_id: Uuid::new_v4(),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[tokio::test]
    async fn test_consume_is_single_use() {
        let repo = InMemoryCodeRepository::new();
        repo.create(test_code("abc")).await.unwrap();

        assert!(repo.consume("abc").await.unwrap().is_some());
        assert!(repo.consume("abc").await.unwrap().is_none());
        assert!(repo.find_by_code("abc").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_concurrent_consumption_yields_one_winner() {
        let repo = Arc::new(InMemoryCodeRepository::new());
        repo.create(test_code("raced")).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..16 {
            let repo = repo.clone();
            handles.push(tokio::spawn(async move {
                repo.consume("raced").await.unwrap().is_some()
            }));
        }

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }

    #[tokio::test]
    async fn test_delete_expired_by_creation_cutoff() {
        let repo = InMemoryCodeRepository::new();
        let mut old = test_code("old");
        old.created_at = OffsetDateTime::now_utc() - Duration::minutes(10);
        repo.create(old).await.unwrap();
        repo.create(test_code("fresh")).await.unwrap();

        let cutoff = OffsetDateTime::now_utc() - Duration::minutes(5);
        let deleted = repo.delete_expired(cutoff).await.unwrap();
        assert_eq!(deleted, 1);
        assert!(repo.find_by_code("fresh").await.unwrap().is_some());
    }
}
