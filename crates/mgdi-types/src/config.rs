//! Configuration types for MGDI.
//!
//! `AppConfig` represents the `config.toml` in the data directory. Every
//! field has a default, so an empty file (or no file) is a valid config.
//! Provider API keys are deliberately absent: they come from the environment.

use serde::{Deserialize, Serialize};

/// Top-level configuration for the MGDI backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub embedding: EmbeddingConfig,
    pub chat: ChatConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origins allowed by CORS.
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite URL. `None` means `{data_dir}/mgdi.db`.
    pub url: Option<String>,
}

/// Embedding provider settings and the call policy wrapped around it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub base_url: String,
    pub model: String,
    pub dimension: usize,
    pub timeout_secs: u64,
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "text-embedding-ada-002".to_string(),
            dimension: crate::memory::DEFAULT_EMBEDDING_DIMENSION,
            timeout_secs: 30,
            max_attempts: 3,
            initial_backoff_ms: 250,
            max_backoff_ms: 4_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub default_provider: String,
    pub default_model: String,
    pub max_tokens: u32,
    pub temperature: f64,
    pub openai_base_url: String,
    pub anthropic_base_url: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            default_provider: crate::chat::DEFAULT_CHAT_PROVIDER.to_string(),
            default_model: crate::chat::DEFAULT_CHAT_MODEL.to_string(),
            max_tokens: crate::chat::DEFAULT_MAX_TOKENS,
            temperature: crate::chat::DEFAULT_TEMPERATURE,
            openai_base_url: "https://api.openai.com/v1".to_string(),
            anthropic_base_url: "https://api.anthropic.com".to_string(),
        }
    }
}
