//! Chat endpoint request/response shapes.
//!
//! A chat request is a provider-agnostic conversation; the chosen provider
//! turns it into a [`CompletionRequest`].

use serde::{Deserialize, Serialize};

use crate::config::ChatConfig;
use crate::llm::{CompletionRequest, Message};

pub const DEFAULT_CHAT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_CHAT_PROVIDER: &str = "openai";
pub const DEFAULT_MAX_TOKENS: u32 = 4096;
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Body of `POST /api/chat`.
///
/// Omitted fields fall back to the `[chat]` section of the config, whose own
/// defaults are `gpt-3.5-turbo` / 4096 tokens / 0.7 / `openai`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<Message>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub stream: bool,
}

impl ChatRequest {
    /// Requested provider name, lowercased.
    pub fn provider_name(&self, defaults: &ChatConfig) -> String {
        self.provider
            .as_deref()
            .unwrap_or(&defaults.default_provider)
            .trim()
            .to_lowercase()
    }

    pub fn to_completion(&self, defaults: &ChatConfig) -> CompletionRequest {
        CompletionRequest {
            model: self
                .model
                .clone()
                .unwrap_or_else(|| defaults.default_model.clone()),
            messages: self.messages.clone(),
            max_tokens: self.max_tokens.unwrap_or(defaults.max_tokens),
            temperature: self.temperature.unwrap_or(defaults.temperature),
        }
    }
}

/// Non-streaming chat reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub content: String,
    pub model: String,
    pub provider: String,
    pub metadata: ChatMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMetadata {
    /// Whitespace-separated word count of the reply.
    pub tokens: usize,
}

impl ChatResponse {
    pub fn new(content: String, model: String, provider: String) -> Self {
        let tokens = word_count(&content);
        Self {
            content,
            model,
            provider,
            metadata: ChatMetadata { tokens },
        }
    }
}

/// Count whitespace-separated words.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Availability of one chat provider, keyed by provider name in listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderInfo {
    pub available: bool,
    pub models: Vec<String>,
}

/// One entry of the flat model list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    pub provider: String,
    pub name: String,
}
