//! Embedder implementations.
//!
//! [`OpenAiEmbedder`] calls the OpenAI embeddings endpoint. When no key is
//! configured the server still starts with a [`DisabledEmbedder`], so
//! memory routes fail per request instead of the whole process refusing to
//! boot.

pub mod openai;

use mgdi_core::memory::embedder::Embedder;
use mgdi_types::error::EmbeddingError;

pub use openai::OpenAiEmbedder;

/// Embedder used when no embedding API key is available.
#[derive(Debug, Clone)]
pub struct DisabledEmbedder {
    model: String,
    dimension: usize,
}

impl DisabledEmbedder {
    pub fn new(model: impl Into<String>, dimension: usize) -> Self {
        Self {
            model: model.into(),
            dimension,
        }
    }
}

impl Embedder for DisabledEmbedder {
    async fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Err(EmbeddingError::NotConfigured(
            "OPENAI_API_KEY is not set".to_string(),
        ))
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
