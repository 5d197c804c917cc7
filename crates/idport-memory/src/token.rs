use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use idport_auth::error::AuthError;
use idport_auth::storage::TokenRepository;
use idport_auth::types::Token;
use time::OffsetDateTime;
use uuid::Uuid;

/// Tokens keyed by their presented value.
#[derive(Default)]
pub struct InMemoryTokenRepository {
    tokens: RwLock<HashMap<String, Token>>,
}

impl InMemoryTokenRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored tokens, of any state.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.read().map(|t| t.len()).unwrap_or(0)
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl TokenRepository for InMemoryTokenRepository {
    async fn find_by_value(&self, value: &str) -> Result<Option<Token>, AuthError> {
        let tokens = self
            .tokens
            .read()
            .map_err(|_| AuthError::storage("Token store lock poisoned"))?;
        Ok(tokens.get(value).cloned())
    }

    async fn create(&self, token: Token) -> Result<(), AuthError> {
        let mut tokens = self
            .tokens
            .write()
            .map_err(|_| AuthError::storage("Token store lock poisoned"))?;
        tokens.insert(token.value.clone(), token);
        Ok(())
    }

    async fn revoke(&self, value: &str, revoked_at: OffsetDateTime) -> Result<(), AuthError> {
        let mut tokens = self
            .tokens
            .write()
            .map_err(|_| AuthError::storage("Token store lock poisoned"))?;
        if let Some(token) = tokens.get_mut(value) {
            // One-way transition; never overwrite an earlier revocation
            if token.revoked_at.is_none() {
                token.revoked_at = Some(revoked_at);
            }
        }
        Ok(())
    }

    async fn revoke_all_for_user(
        &self,
        user_id: Uuid,
        revoked_at: OffsetDateTime,
    ) -> Result<u64, AuthError> {
        let mut tokens = self
            .tokens
            .write()
            .map_err(|_| AuthError::storage("Token store lock poisoned"))?;
        let mut revoked = 0;
        for token in tokens.values_mut() {
            if token.user_id == user_id && token.is_active(revoked_at) {
                token.revoked_at = Some(revoked_at);
                revoked += 1;
            }
        }
        Ok(revoked)
    }

    async fn delete_expired(&self, cutoff: OffsetDateTime) -> Result<u64, AuthError> {
        let mut tokens = self
            .tokens
            .write()
            .map_err(|_| AuthError::storage("Token store lock poisoned"))?;
        let before = tokens.len();
        tokens.retain(|_, token| token.expires_at > cutoff);
        Ok((before - tokens.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use idport_auth::types::TokenKind;
    use time::Duration;

    fn test_token(user_id: Uuid, expires_in: Duration) -> Token {
        let now = OffsetDateTime::now_utc();
        Token {
            id: Uuid::new_v4(),
            kind: TokenKind::Refresh,
            user_id,
            application_id: Uuid::new_v4(),
            value: Uuid::new_v4().to_string(),
            scope: String::new(),
            created_at: now,
            expires_at: now + expires_in,
            revoked_at: None,
            refresh_token_id: None,
        }
    }

    #[tokio::test]
    async fn test_revoke_preserves_first_timestamp() {
        let repo = InMemoryTokenRepository::new();
        let token = test_token(Uuid::new_v4(), Duration::minutes(30));
        let value = token.value.clone();
        repo.create(token).await.unwrap();

        let first = OffsetDateTime::now_utc();
        repo.revoke(&value, first).await.unwrap();
        repo.revoke(&value, first + Duration::minutes(1)).await.unwrap();

        let stored = repo.find_by_value(&value).await.unwrap().unwrap();
        assert_eq!(stored.revoked_at, Some(first));
    }

    #[tokio::test]
    async fn test_revoke_all_skips_other_users_and_inactive() {
        let repo = InMemoryTokenRepository::new();
        let user = Uuid::new_v4();
        let other = Uuid::new_v4();

        repo.create(test_token(user, Duration::minutes(30))).await.unwrap();
        repo.create(test_token(user, Duration::minutes(-5))).await.unwrap();
        repo.create(test_token(other, Duration::minutes(30))).await.unwrap();

        let now = OffsetDateTime::now_utc();
        let revoked = repo.revoke_all_for_user(user, now).await.unwrap();
        assert_eq!(revoked, 1);
    }

    #[tokio::test]
    async fn test_delete_expired() {
        let repo = InMemoryTokenRepository::new();
        repo.create(test_token(Uuid::new_v4(), Duration::minutes(-1)))
            .await
            .unwrap();
        repo.create(test_token(Uuid::new_v4(), Duration::minutes(30)))
            .await
            .unwrap();

        let deleted = repo.delete_expired(OffsetDateTime::now_utc()).await.unwrap();
        assert_eq!(deleted, 1);
        assert_eq!(repo.len(), 1);
    }
}
