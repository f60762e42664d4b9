//! SQLite API key repository.
//!
//! Keys are `mgdi_<64 hex>` strings. Only their SHA-256 digest is stored;
//! verification hashes the presented key and looks the digest up.

use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use mgdi_core::auth::PrincipalVerifier;
use mgdi_types::error::{AuthError, RepositoryError};
use mgdi_types::identity::{API_KEY_PREFIX, ApiKey, IssuedApiKey, Principal};
use sha2::{Digest, Sha256};
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;

/// `last_used_at` is rewritten at most once per key per this many seconds.
const LAST_USED_RESOLUTION_SECS: i64 = 60;

#[derive(Clone)]
pub struct SqliteApiKeyRepository {
    pool: DatabasePool,
}

impl SqliteApiKeyRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Issue a new key for `user_id`. The plaintext is only available from
    /// the returned value.
    pub async fn create(&self, user_id: &str, name: &str) -> Result<IssuedApiKey, RepositoryError> {
        if user_id.trim().is_empty() {
            return Err(RepositoryError::Query("user id cannot be empty".to_string()));
        }

        let plaintext = generate_api_key();
        let key = ApiKey {
            id: Uuid::now_v7(),
            user_id: user_id.to_string(),
            name: name.to_string(),
            created_at: Utc::now(),
            last_used_at: None,
        };

        sqlx::query(
            "INSERT INTO api_keys (id, key_hash, user_id, name, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(key.id.to_string())
        .bind(hash_api_key(&plaintext))
        .bind(&key.user_id)
        .bind(&key.name)
        .bind(format_datetime(&key.created_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                RepositoryError::Conflict("api key hash collision".to_string())
            }
            other => RepositoryError::Query(other.to_string()),
        })?;

        tracing::info!(user_id = %key.user_id, key_id = %key.id, "issued api key");
        Ok(IssuedApiKey { key, plaintext })
    }

    /// All keys, oldest first.
    pub async fn list(&self) -> Result<Vec<ApiKey>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, user_id, name, created_at, last_used_at FROM api_keys ORDER BY created_at ASC, id ASC",
        )
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        rows.iter()
            .map(|row| {
                ApiKeyRow::from_row(row)
                    .map_err(|e| RepositoryError::Query(e.to_string()))?
                    .into_key()
            })
            .collect()
    }
}

struct ApiKeyRow {
    id: String,
    user_id: String,
    name: String,
    created_at: String,
    last_used_at: Option<String>,
}

impl ApiKeyRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            name: row.try_get("name")?,
            created_at: row.try_get("created_at")?,
            last_used_at: row.try_get("last_used_at")?,
        })
    }

    fn into_key(self) -> Result<ApiKey, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid api key id: {e}")))?;
        Ok(ApiKey {
            id,
            user_id: self.user_id,
            name: self.name,
            created_at: parse_datetime(&self.created_at)?,
            last_used_at: self.last_used_at.as_deref().map(parse_datetime).transpose()?,
        })
    }
}

impl PrincipalVerifier for SqliteApiKeyRepository {
    async fn verify(&self, token: &str) -> Result<Principal, AuthError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let row = sqlx::query("SELECT id, user_id, last_used_at FROM api_keys WHERE key_hash = ?")
            .bind(hash_api_key(token))
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| AuthError::Unavailable(e.to_string()))?;

        let Some(row) = row else {
            return Err(AuthError::InvalidCredentials);
        };

        let id: String = row
            .try_get("id")
            .map_err(|e| AuthError::Unavailable(e.to_string()))?;
        let user_id: String = row
            .try_get("user_id")
            .map_err(|e| AuthError::Unavailable(e.to_string()))?;
        let last_used_at: Option<String> = row
            .try_get("last_used_at")
            .map_err(|e| AuthError::Unavailable(e.to_string()))?;

        let now = Utc::now();
        if needs_touch(last_used_at.as_deref(), now) {
            // Best effort: a failed timestamp update never fails the request.
            if let Err(e) = sqlx::query("UPDATE api_keys SET last_used_at = ? WHERE id = ?")
                .bind(format_datetime(&now))
                .bind(&id)
                .execute(&self.pool.writer)
                .await
            {
                tracing::debug!(key_id = %id, error = %e, "failed to record api key use");
            }
        }

        Ok(Principal::new(user_id))
    }
}

/// Compute SHA-256 hash of an API key (lowercase hex).
pub fn hash_api_key(key: &str) -> String {
    let digest = Sha256::digest(key.as_bytes());
    format!("{:x}", digest)
}

/// `mgdi_` followed by 64 random hex characters.
pub fn generate_api_key() -> String {
    format!(
        "{API_KEY_PREFIX}{}{}",
        Uuid::new_v4().simple(),
        Uuid::new_v4().simple()
    )
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

/// Whether `last_used_at` is missing or older than the resolution.
fn needs_touch(last_used_at: Option<&str>, now: DateTime<Utc>) -> bool {
    match last_used_at.map(parse_datetime) {
        Some(Ok(last)) => {
            now.signed_duration_since(last) >= TimeDelta::seconds(LAST_USED_RESOLUTION_SECS)
        }
        _ => true,
    }
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::pool::test_pool;

    #[test]
    fn test_generated_key_shape() {
        let key = generate_api_key();
        assert!(key.starts_with("mgdi_"));
        let hex = &key["mgdi_".len()..];
        assert_eq!(hex.len(), 64);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(key, generate_api_key());
    }

    #[test]
    fn test_hash_is_lowercase_sha256_hex() {
        assert_eq!(
            hash_api_key("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[tokio::test]
    async fn test_create_then_verify() {
        let repo = SqliteApiKeyRepository::new(test_pool().await);
        let issued = repo.create("alice", "laptop").await.unwrap();

        let principal = repo.verify(&issued.plaintext).await.unwrap();
        assert_eq!(principal, Principal::new("alice"));
    }

    #[tokio::test]
    async fn test_verify_records_last_use() {
        let repo = SqliteApiKeyRepository::new(test_pool().await);
        let issued = repo.create("alice", "laptop").await.unwrap();
        assert!(repo.list().await.unwrap()[0].last_used_at.is_none());

        repo.verify(&issued.plaintext).await.unwrap();

        assert!(repo.list().await.unwrap()[0].last_used_at.is_some());
    }

    #[tokio::test]
    async fn test_repeated_verify_skips_recent_touch() {
        let repo = SqliteApiKeyRepository::new(test_pool().await);
        let issued = repo.create("alice", "laptop").await.unwrap();

        repo.verify(&issued.plaintext).await.unwrap();
        let first = repo.list().await.unwrap()[0].last_used_at;
        repo.verify(&issued.plaintext).await.unwrap();
        assert_eq!(repo.list().await.unwrap()[0].last_used_at, first);

        let stale = format_datetime(&(Utc::now() - TimeDelta::hours(2)));
        sqlx::query("UPDATE api_keys SET last_used_at = ?")
            .bind(&stale)
            .execute(&repo.pool.writer)
            .await
            .unwrap();
        repo.verify(&issued.plaintext).await.unwrap();
        let refreshed = repo.list().await.unwrap()[0].last_used_at.unwrap();
        assert!(Utc::now() - refreshed < TimeDelta::minutes(1));
    }

    #[test]
    fn test_needs_touch() {
        let now = Utc::now();
        assert!(needs_touch(None, now));
        assert!(needs_touch(Some("garbage"), now));
        let recent = format_datetime(&(now - TimeDelta::seconds(5)));
        assert!(!needs_touch(Some(&recent), now));
        let old = format_datetime(&(now - TimeDelta::seconds(61)));
        assert!(needs_touch(Some(&old), now));
    }

    #[tokio::test]
    async fn test_verify_rejects_unknown_and_blank_keys() {
        let repo = SqliteApiKeyRepository::new(test_pool().await);
        repo.create("alice", "laptop").await.unwrap();

        assert!(matches!(
            repo.verify("mgdi_0000").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            repo.verify("   ").await,
            Err(AuthError::MissingCredentials)
        ));
    }

    #[tokio::test]
    async fn test_plaintext_is_not_stored() {
        let repo = SqliteApiKeyRepository::new(test_pool().await);
        let issued = repo.create("alice", "laptop").await.unwrap();

        let hits: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM api_keys WHERE key_hash = ?")
            .bind(&issued.plaintext)
            .fetch_one(&repo.pool.reader)
            .await
            .unwrap();
        assert_eq!(hits.0, 0);
    }

    #[tokio::test]
    async fn test_list_returns_keys_per_user() {
        let repo = SqliteApiKeyRepository::new(test_pool().await);
        repo.create("alice", "laptop").await.unwrap();
        repo.create("bob", "ci").await.unwrap();

        let keys = repo.list().await.unwrap();
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[0].user_id, "alice");
        assert_eq!(keys[1].name, "ci");
    }

    #[tokio::test]
    async fn test_create_rejects_blank_user() {
        let repo = SqliteApiKeyRepository::new(test_pool().await);
        assert!(repo.create(" ", "x").await.is_err());
    }
}
