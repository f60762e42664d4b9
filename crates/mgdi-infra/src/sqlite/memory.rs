//! SQLite memory repository implementation.
//!
//! Implements `MemoryRepository` from `mgdi-core` using sqlx with split read/write pools.
//! Embeddings are stored as little-endian `f32` BLOBs; similarity is computed
//! in Rust over the caller's rows with the shared cosine ranking.

use chrono::{DateTime, SecondsFormat, Utc};
use mgdi_core::memory::similarity::rank_candidates;
use mgdi_core::memory::store::MemoryRepository;
use mgdi_types::error::RepositoryError;
use mgdi_types::memory::{MemoryEntry, RankedMemory, decode_metadata, encode_metadata};
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `MemoryRepository`.
#[derive(Clone)]
pub struct SqliteMemoryRepository {
    pool: DatabasePool,
}

impl SqliteMemoryRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Private Row type for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

struct MemoryEntryRow {
    id: String,
    user_id: String,
    content: String,
    embedding: Vec<u8>,
    metadata: Option<String>,
    created_at: String,
}

impl MemoryEntryRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            content: row.try_get("content")?,
            embedding: row.try_get("embedding")?,
            metadata: row.try_get("metadata")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_entry(self) -> Result<MemoryEntry, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid memory id: {e}")))?;
        let metadata = decode_metadata(self.metadata.as_deref())
            .map_err(|e| RepositoryError::Query(format!("invalid metadata: {e}")))?;
        let embedding = blob_to_vec(&self.embedding)?;
        let created_at = parse_datetime(&self.created_at)?;

        Ok(MemoryEntry {
            id,
            user_id: self.user_id,
            content: self.content,
            embedding,
            metadata,
            created_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Serialize an f32 vector to little-endian bytes.
pub fn vec_to_blob(v: &[f32]) -> Vec<u8> {
    v.iter().flat_map(|f| f.to_le_bytes()).collect()
}

/// Deserialize little-endian bytes back to an f32 vector.
pub fn blob_to_vec(blob: &[u8]) -> Result<Vec<f32>, RepositoryError> {
    if blob.len() % 4 != 0 {
        return Err(RepositoryError::Query(format!(
            "embedding blob length {} is not a multiple of 4",
            blob.len()
        )));
    }
    Ok(blob
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

/// Fixed-width so that lexical order in SQL matches chronological order.
fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

// ---------------------------------------------------------------------------
// MemoryRepository implementation
// ---------------------------------------------------------------------------

impl MemoryRepository for SqliteMemoryRepository {
    async fn save(&self, entry: &MemoryEntry) -> Result<(), RepositoryError> {
        let metadata = encode_metadata(&entry.metadata)
            .map_err(|e| RepositoryError::Query(format!("metadata serialization failed: {e}")))?;

        sqlx::query(
            r#"INSERT INTO memory_entries (id, user_id, content, embedding, metadata, created_at)
               VALUES (?, ?, ?, ?, ?, ?)"#,
        )
        .bind(entry.id.to_string())
        .bind(&entry.user_id)
        .bind(&entry.content)
        .bind(vec_to_blob(&entry.embedding))
        .bind(metadata)
        .bind(format_datetime(&entry.created_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }

    async fn search(
        &self,
        user_id: &str,
        embedding: &[f32],
        limit: u32,
        threshold: f32,
    ) -> Result<Vec<RankedMemory>, RepositoryError> {
        let rows = sqlx::query(
            r#"SELECT id, user_id, content, embedding, metadata, created_at
               FROM memory_entries
               WHERE user_id = ?"#,
        )
        .bind(user_id)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let candidates = rows
            .iter()
            .map(|row| {
                MemoryEntryRow::from_row(row)
                    .map_err(|e| RepositoryError::Query(e.to_string()))?
                    .into_entry()
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rank_candidates(
            embedding,
            candidates,
            limit as usize,
            threshold,
        ))
    }

    async fn timeline(&self, user_id: &str, limit: u32) -> Result<Vec<MemoryEntry>, RepositoryError> {
        let rows = sqlx::query(
            r#"SELECT id, user_id, content, embedding, metadata, created_at
               FROM memory_entries
               WHERE user_id = ?
               ORDER BY created_at DESC, id DESC
               LIMIT ?"#,
        )
        .bind(user_id)
        .bind(i64::from(limit))
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        rows.iter()
            .map(|row| {
                MemoryEntryRow::from_row(row)
                    .map_err(|e| RepositoryError::Query(e.to_string()))?
                    .into_entry()
            })
            .collect()
    }
}
