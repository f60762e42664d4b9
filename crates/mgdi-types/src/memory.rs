//! Memory types for MGDI.
//!
//! A memory is a piece of text stored alongside its embedding vector and
//! scoped to the principal that wrote it. Entries are append-only: they are
//! created once and never mutated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Dimension of `text-embedding-ada-002` vectors.
pub const DEFAULT_EMBEDDING_DIMENSION: usize = 1536;

pub const DEFAULT_SEARCH_LIMIT: u32 = 10;
pub const MAX_SEARCH_LIMIT: u32 = 100;
pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.8;

pub const DEFAULT_TIMELINE_LIMIT: u32 = 50;
pub const MAX_TIMELINE_LIMIT: u32 = 500;

/// Free-form key/value metadata attached to a memory.
///
/// An absent mapping and an empty mapping are the same thing.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// A single stored memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryEntry {
    pub id: Uuid,
    /// The verified principal that owns this entry.
    pub user_id: String,
    pub content: String,
    /// Embedding of `content`. Never sent over the wire.
    #[serde(skip)]
    pub embedding: Vec<f32>,
    #[serde(default)]
    pub metadata: Metadata,
    pub created_at: DateTime<Utc>,
}

/// A memory entry with its similarity to a search query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedMemory {
    #[serde(flatten)]
    pub entry: MemoryEntry,
    /// Cosine similarity to the query embedding (`1 - cosine_distance`).
    pub similarity: f32,
}

/// Body of a store request.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreMemoryRequest {
    pub content: String,
    #[serde(default)]
    pub metadata: Option<Metadata>,
}

/// Parameters of a similarity search.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchParams {
    pub query: String,
    #[serde(default = "default_search_limit")]
    pub limit: u32,
    #[serde(default = "default_threshold")]
    pub threshold: f32,
}

/// Parameters of a timeline fetch.
#[derive(Debug, Clone, Deserialize)]
pub struct TimelineParams {
    #[serde(default = "default_timeline_limit")]
    pub limit: u32,
}

impl Default for TimelineParams {
    fn default() -> Self {
        Self {
            limit: DEFAULT_TIMELINE_LIMIT,
        }
    }
}

fn default_search_limit() -> u32 {
    DEFAULT_SEARCH_LIMIT
}

fn default_threshold() -> f32 {
    DEFAULT_SIMILARITY_THRESHOLD
}

fn default_timeline_limit() -> u32 {
    DEFAULT_TIMELINE_LIMIT
}

/// Serialize metadata to the text form kept at rest.
pub fn encode_metadata(metadata: &Metadata) -> Result<String, serde_json::Error> {
    serde_json::to_string(metadata)
}

/// Parse metadata back from its stored text form. `None` decodes to `{}`.
pub fn decode_metadata(raw: Option<&str>) -> Result<Metadata, serde_json::Error> {
    match raw {
        Some(text) if !text.trim().is_empty() => serde_json::from_str(text),
        _ => Ok(Metadata::new()),
    }
}
