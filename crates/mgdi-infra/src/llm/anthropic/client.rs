//! AnthropicProvider -- [`LlmProvider`] implementation for Anthropic Claude.
//!
//! Sends requests to the Messages API (`/v1/messages`). System messages are
//! lifted out of the conversation and joined into the top-level `system`
//! field, which is how the Messages API expects them.
//!
//! The API key is wrapped in [`SecretString`] and is only exposed when
//! building request headers.

use std::pin::Pin;

use futures_util::Stream;
use secrecy::{ExposeSecret, SecretString};

use mgdi_core::llm::provider::LlmProvider;
use mgdi_types::llm::{
    CompletionRequest, CompletionResponse, LlmError, MessageRole, StreamEvent, Usage,
};

use super::streaming::create_anthropic_stream;
use super::types::{AnthropicContentBlock, AnthropicMessage, AnthropicRequest, AnthropicResponse};
use crate::llm::{error_from_response, http_client, send_error};

pub const DEFAULT_MODEL: &str = "claude-3-haiku-20240307";

pub const MODELS: &[&str] = &[
    "claude-3-opus-20240229",
    "claude-3-sonnet-20240229",
    "claude-3-haiku-20240307",
];

pub struct AnthropicProvider {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
}

impl AnthropicProvider {
    const API_VERSION: &'static str = "2023-06-01";

    pub fn new(api_key: SecretString) -> Result<Self, LlmError> {
        Ok(Self {
            client: http_client()?,
            api_key,
            base_url: "https://api.anthropic.com".to_string(),
        })
    }

    /// Override the base URL (tests, proxies).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn to_anthropic_request(&self, request: &CompletionRequest, stream: bool) -> AnthropicRequest {
        let (system, rest): (Vec<_>, Vec<_>) = request
            .messages
            .iter()
            .partition(|m| m.role == MessageRole::System);

        let system = (!system.is_empty()).then(|| {
            system
                .iter()
                .map(|m| m.content.as_str())
                .collect::<Vec<_>>()
                .join("\n")
        });

        let messages = rest
            .into_iter()
            .map(|m| AnthropicMessage {
                role: m.role.to_string(),
                content: m.content.clone(),
            })
            .collect();

        // Requests default to an OpenAI model name; Claude would reject it.
        let model = if request.model.starts_with("claude") {
            request.model.clone()
        } else {
            DEFAULT_MODEL.to_string()
        };

        AnthropicRequest {
            model,
            max_tokens: request.max_tokens,
            messages,
            system,
            temperature: request.temperature,
            stream,
        }
    }

    fn post(&self, body: &AnthropicRequest) -> reqwest::RequestBuilder {
        self.client
            .post(self.url("/v1/messages"))
            .header("x-api-key", self.api_key.expose_secret())
            .header("anthropic-version", Self::API_VERSION)
            .header("content-type", "application/json")
            .json(body)
    }
}

// No Debug derive: keep the client state out of logs entirely.

impl LlmProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    fn available_models(&self) -> Vec<String> {
        MODELS.iter().map(|m| m.to_string()).collect()
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let body = self.to_anthropic_request(request, false);
        tracing::debug!(model = %body.model, messages = body.messages.len(), "anthropic completion");

        let response = self.post(&body).send().await.map_err(send_error)?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let anthropic_resp: AnthropicResponse = response.json().await.map_err(|e| {
            LlmError::Deserialization(format!("failed to parse response: {e}"))
        })?;

        let content = anthropic_resp
            .content
            .iter()
            .filter_map(|block| match block {
                AnthropicContentBlock::Text { text } => Some(text.as_str()),
                AnthropicContentBlock::Other => None,
            })
            .collect::<Vec<_>>()
            .join("");

        Ok(CompletionResponse {
            content,
            model: anthropic_resp.model,
            stop_reason: anthropic_resp
                .stop_reason
                .as_deref()
                .and_then(|s| s.parse().ok()),
            usage: Usage {
                input_tokens: anthropic_resp.usage.input_tokens,
                output_tokens: anthropic_resp.usage.output_tokens,
            },
        })
    }

    fn stream(
        &self,
        request: CompletionRequest,
    ) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send + 'static>> {
        let body = self.to_anthropic_request(&request, true);
        create_anthropic_stream(self.post(&body))
    }
}
