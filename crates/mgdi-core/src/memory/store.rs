//! MemoryRepository trait definition.
//!
//! The vector store behind the memory service. Entries are append-only, so
//! there is no update or delete.

use mgdi_types::error::RepositoryError;
use mgdi_types::memory::{MemoryEntry, RankedMemory};

/// Repository trait for per-user memory persistence.
///
/// Implementations live in mgdi-infra (e.g., `SqliteMemoryRepository`).
/// Every read is scoped to exactly one `user_id`.
pub trait MemoryRepository: Send + Sync {
    /// Persist a new entry in a single write.
    fn save(
        &self,
        entry: &MemoryEntry,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// The user's entries most similar to `embedding`, strictly above
    /// `threshold`, best first, at most `limit`.
    fn search(
        &self,
        user_id: &str,
        embedding: &[f32],
        limit: u32,
        threshold: f32,
    ) -> impl std::future::Future<Output = Result<Vec<RankedMemory>, RepositoryError>> + Send;

    /// The user's most recent entries, newest first, at most `limit`.
    fn timeline(
        &self,
        user_id: &str,
        limit: u32,
    ) -> impl std::future::Future<Output = Result<Vec<MemoryEntry>, RepositoryError>> + Send;
}
