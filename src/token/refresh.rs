/// Persisted refresh tokens, one per account
///
/// Rotation rewrites the single row in place instead of growing history:
/// exactly one live refresh token exists per account, which bounds replay
/// from stale cookies to a single generation.
use crate::{
    db::models::{Account, RefreshToken},
    error::{ApiError, ApiResult},
};
use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{Duration, Utc};
use rand::RngCore;
use sqlx::SqlitePool;
use uuid::Uuid;

/// Refresh token persistence and validation
#[derive(Clone)]
pub struct RefreshTokenStore {
    db: SqlitePool,
    token_days: i64,
}

impl RefreshTokenStore {
    pub fn new(db: SqlitePool, token_days: i64) -> Self {
        Self { db, token_days }
    }

    /// Generate a new token value for the account: 256 bits of OS entropy,
    /// base64-encoded. Not persisted until `save_or_update`.
    pub fn create(&self, account: &Account) -> RefreshToken {
        let mut bytes = [0u8; 32];
        rand::rngs::OsRng.fill_bytes(&mut bytes);

        let now = Utc::now();
        RefreshToken {
            id: Uuid::new_v4().to_string(),
            token: STANDARD.encode(bytes),
            account_id: account.id.clone(),
            created_at: now,
            expires_at: now + Duration::days(self.token_days),
        }
    }

    /// Rotate in place: overwrite the account's existing row if present,
    /// insert otherwise. Concurrent logins race here; last write wins and
    /// the loser's cookie is silently superseded.
    pub async fn save_or_update(&self, refresh_token: &RefreshToken) -> ApiResult<()> {
        let existing: Option<String> =
            sqlx::query_scalar("SELECT id FROM refresh_token WHERE account_id = ?1")
                .bind(&refresh_token.account_id)
                .fetch_optional(&self.db)
                .await
                .map_err(ApiError::Database)?;

        if existing.is_some() {
            sqlx::query(
                "UPDATE refresh_token SET token = ?1, created_at = ?2, expires_at = ?3 \
                 WHERE account_id = ?4",
            )
            .bind(&refresh_token.token)
            .bind(refresh_token.created_at)
            .bind(refresh_token.expires_at)
            .bind(&refresh_token.account_id)
            .execute(&self.db)
            .await
            .map_err(ApiError::Database)?;
        } else {
            sqlx::query(
                "INSERT INTO refresh_token (id, token, account_id, created_at, expires_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )
            .bind(&refresh_token.id)
            .bind(&refresh_token.token)
            .bind(&refresh_token.account_id)
            .bind(refresh_token.created_at)
            .bind(refresh_token.expires_at)
            .execute(&self.db)
            .await
            .map_err(ApiError::Database)?;
        }

        Ok(())
    }

    /// Accept only an exact (account_id, token) pair match on a live row.
    /// Matching on the pair, not the account alone, blocks token
    /// substitution across accounts.
    pub async fn validate(&self, account_id: &str, token: &str) -> ApiResult<bool> {
        if account_id.is_empty() || token.is_empty() {
            return Ok(false);
        }

        let row = sqlx::query_as::<_, RefreshToken>(
            "SELECT id, token, account_id, created_at, expires_at FROM refresh_token \
             WHERE account_id = ?1 AND token = ?2",
        )
        .bind(account_id)
        .bind(token)
        .fetch_optional(&self.db)
        .await
        .map_err(ApiError::Database)?;

        match row {
            Some(stored) => Ok(!stored.is_expired()),
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::{setup_test_db, test_fixtures};

    #[tokio::test]
    async fn create_produces_distinct_high_entropy_values() {
        let db = setup_test_db().await;
        let store = RefreshTokenStore::new(db, 7);
        let account = test_fixtures::active_account("alice@example.com", 1);

        let first = store.create(&account);
        let second = store.create(&account);

        assert_ne!(first.token, second.token);
        // 32 bytes of randomness -> 44 base64 chars
        assert_eq!(first.token.len(), 44);
        assert!(!first.is_expired());
    }

    #[tokio::test]
    async fn save_or_update_keeps_a_single_row_per_account() {
        let db = setup_test_db().await;
        let store = RefreshTokenStore::new(db.clone(), 7);
        let account = test_fixtures::active_account("alice@example.com", 1);

        let first = store.create(&account);
        store.save_or_update(&first).await.unwrap();

        let second = store.create(&account);
        store.save_or_update(&second).await.unwrap();

        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM refresh_token WHERE account_id = ?1")
                .bind(&account.id)
                .fetch_one(&db)
                .await
                .unwrap();
        assert_eq!(count, 1);

        // Rotation: old value rejected, new value accepted
        assert!(!store.validate(&account.id, &first.token).await.unwrap());
        assert!(store.validate(&account.id, &second.token).await.unwrap());
    }

    #[tokio::test]
    async fn validate_rejects_empty_inputs() {
        let db = setup_test_db().await;
        let store = RefreshTokenStore::new(db, 7);

        assert!(!store.validate("", "sometoken").await.unwrap());
        assert!(!store.validate("some-account", "").await.unwrap());
    }

    #[tokio::test]
    async fn validate_rejects_cross_account_substitution() {
        let db = setup_test_db().await;
        let store = RefreshTokenStore::new(db, 7);
        let alice = test_fixtures::active_account("alice@example.com", 1);
        let bob = test_fixtures::active_account("bob@example.com", 1);

        let alice_token = store.create(&alice);
        store.save_or_update(&alice_token).await.unwrap();

        assert!(!store.validate(&bob.id, &alice_token.token).await.unwrap());
    }

    #[tokio::test]
    async fn validate_rejects_expired_row_with_matching_value() {
        let db = setup_test_db().await;
        let store = RefreshTokenStore::new(db.clone(), 7);
        let account = test_fixtures::active_account("alice@example.com", 1);

        let mut token = store.create(&account);
        token.expires_at = Utc::now() - Duration::minutes(1);
        store.save_or_update(&token).await.unwrap();

        assert!(!store.validate(&account.id, &token.token).await.unwrap());
    }
}
