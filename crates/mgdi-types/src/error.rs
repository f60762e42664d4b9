use thiserror::Error;

/// Errors from repository operations (used by trait definitions in mgdi-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Errors from the embedding provider.
///
/// Each variant is either transient (worth retrying) or permanent; see
/// [`EmbeddingError::is_transient`].
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("embedding request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("embedding provider unreachable: {0}")]
    Network(String),

    #[error("embedding provider rate limited")]
    RateLimited,

    #[error("embedding provider unavailable: HTTP {status}: {message}")]
    Unavailable { status: u16, message: String },

    #[error("embedding provider authentication failed")]
    AuthenticationFailed,

    #[error("invalid embedding input: {0}")]
    InvalidInput(String),

    #[error("malformed embedding response: {0}")]
    MalformedResponse(String),

    #[error("embedding provider not configured: {0}")]
    NotConfigured(String),

    #[error("embedding provider still failing after {attempts} attempts: {last}")]
    RetriesExhausted {
        attempts: u32,
        last: Box<EmbeddingError>,
    },
}

impl EmbeddingError {
    /// Whether a retry could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            EmbeddingError::Timeout { .. }
                | EmbeddingError::Network(_)
                | EmbeddingError::RateLimited
                | EmbeddingError::Unavailable { .. }
        )
    }
}

/// Errors surfaced by the memory service.
#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("storage error: {0}")]
    Storage(String),
}

impl From<RepositoryError> for MemoryError {
    fn from(e: RepositoryError) -> Self {
        MemoryError::Storage(e.to_string())
    }
}

/// Errors related to system prompt operations.
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("prompt not found")]
    NotFound,

    #[error("invalid prompt: {0}")]
    Invalid(String),

    #[error("storage error: {0}")]
    StorageError(String),
}

/// Errors from principal verification.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing credentials")]
    MissingCredentials,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("verifier unavailable: {0}")]
    Unavailable(String),
}
