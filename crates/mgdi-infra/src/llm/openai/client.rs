//! OpenAiProvider -- [`LlmProvider`] implementation for OpenAI Chat
//! Completions (`/chat/completions`).
//!
//! Talks to the HTTP API directly with reqwest; system messages stay inline
//! in the message list.

use std::pin::Pin;

use futures_util::Stream;
use secrecy::{ExposeSecret, SecretString};

use mgdi_core::llm::provider::LlmProvider;
use mgdi_types::llm::{CompletionRequest, CompletionResponse, LlmError, StreamEvent, Usage};

use super::streaming::create_openai_stream;
use super::types::{ChatCompletionRequest, ChatCompletionResponse, OpenAiMessage, StreamOptions};
use crate::llm::{error_from_response, http_client, send_error};

pub const MODELS: &[&str] = &["gpt-4", "gpt-4-turbo", "gpt-3.5-turbo", "gpt-3.5-turbo-16k"];

pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
}

impl OpenAiProvider {
    pub fn new(api_key: SecretString) -> Result<Self, LlmError> {
        Ok(Self {
            client: http_client()?,
            api_key,
            base_url: "https://api.openai.com/v1".to_string(),
        })
    }

    /// Override the base URL. Any OpenAI-compatible endpoint works.
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn to_openai_request(&self, request: &CompletionRequest, stream: bool) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: request.model.clone(),
            messages: request
                .messages
                .iter()
                .map(|m| OpenAiMessage {
                    role: m.role.to_string(),
                    content: m.content.clone(),
                })
                .collect(),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            stream,
            stream_options: stream.then_some(StreamOptions {
                include_usage: true,
            }),
        }
    }

    fn post(&self, body: &ChatCompletionRequest) -> reqwest::RequestBuilder {
        self.client
            .post(self.url("/chat/completions"))
            .bearer_auth(self.api_key.expose_secret())
            .json(body)
    }
}

impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn available_models(&self) -> Vec<String> {
        MODELS.iter().map(|m| m.to_string()).collect()
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let body = self.to_openai_request(request, false);
        tracing::debug!(model = %body.model, messages = body.messages.len(), "openai completion");

        let response = self.post(&body).send().await.map_err(send_error)?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            LlmError::Deserialization(format!("failed to parse response: {e}"))
        })?;

        let choice = completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::Deserialization("response has no choices".to_string()))?;
        let usage = completion.usage.unwrap_or_default();

        Ok(CompletionResponse {
            content: choice.message.content.unwrap_or_default(),
            model: completion.model,
            stop_reason: choice.finish_reason.as_deref().and_then(|s| s.parse().ok()),
            usage: Usage {
                input_tokens: usage.prompt_tokens,
                output_tokens: usage.completion_tokens,
            },
        })
    }

    fn stream(
        &self,
        request: CompletionRequest,
    ) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send + 'static>> {
        let body = self.to_openai_request(&request, true);
        create_openai_stream(self.post(&body))
    }
}
