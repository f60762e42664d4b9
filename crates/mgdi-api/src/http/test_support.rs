//! In-process app harness for router tests: temp SQLite, a keyword
//! embedder and scripted chat providers.

use std::pin::Pin;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use futures_util::Stream;
use serde_json::Value;
use tower::ServiceExt;

use mgdi_core::llm::box_provider::BoxLlmProvider;
use mgdi_core::llm::provider::LlmProvider;
use mgdi_core::llm::registry::ProviderRegistry;
use mgdi_core::memory::box_embedder::BoxEmbedder;
use mgdi_core::memory::embedder::Embedder;
use mgdi_infra::sqlite::pool::DatabasePool;
use mgdi_types::config::AppConfig;
use mgdi_types::error::EmbeddingError;
use mgdi_types::llm::{
    CompletionRequest, CompletionResponse, LlmError, StopReason, StreamEvent, Usage,
};

use crate::http::router::build_router;
use crate::state::AppState;

const KEYWORDS: [&str; 3] = ["theme", "coffee", "rust"];

/// One axis per keyword; text without any keyword maps to the last axis.
struct KeywordEmbedder {
    fail: bool,
}

impl Embedder for KeywordEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if self.fail {
            return Err(EmbeddingError::Unavailable {
                status: 503,
                message: "down".to_string(),
            });
        }
        Ok(texts
            .iter()
            .map(|text| {
                let text = text.to_lowercase();
                let mut v: Vec<f32> = KEYWORDS
                    .iter()
                    .map(|k| if text.contains(k) { 1.0 } else { 0.0 })
                    .collect();
                let hit = v.iter().any(|x| *x > 0.0);
                v.push(if hit { 0.0 } else { 1.0 });
                v
            })
            .collect())
    }

    fn model_name(&self) -> &str {
        "keyword"
    }

    fn dimension(&self) -> usize {
        KEYWORDS.len() + 1
    }
}

/// Echoes the last message. Streams it word by word. With `fail` set every
/// call errors.
struct ScriptedProvider {
    name: &'static str,
    models: &'static [&'static str],
    fail: bool,
}

impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        self.name
    }

    fn available_models(&self) -> Vec<String> {
        self.models.iter().map(|m| m.to_string()).collect()
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        if self.fail {
            return Err(LlmError::Provider {
                message: "upstream exploded".to_string(),
            });
        }
        let content = request
            .messages
            .last()
            .map(|m| m.content.clone())
            .unwrap_or_default();
        Ok(CompletionResponse {
            content,
            model: request.model.clone(),
            stop_reason: Some(StopReason::EndTurn),
            usage: Usage {
                input_tokens: 5,
                output_tokens: 3,
            },
        })
    }

    fn stream(
        &self,
        request: CompletionRequest,
    ) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send + 'static>> {
        let fail = self.fail;
        Box::pin(async_stream::stream! {
            if fail {
                yield Err(LlmError::Stream("connection reset".to_string()));
            } else {
                let last = request.messages.last().map(|m| m.content.clone()).unwrap_or_default();
                for word in last.split_whitespace() {
                    yield Ok(StreamEvent::TextDelta { text: word.to_string() });
                }
                yield Ok(StreamEvent::Usage(Usage { input_tokens: 2, output_tokens: 2 }));
                yield Ok(StreamEvent::Done);
            }
        })
    }
}

pub struct TestApp {
    pub state: AppState,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::build(false).await
    }

    pub async fn with_failing_embedder() -> Self {
        Self::build(true).await
    }

    async fn build(failing_embedder: bool) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().to_path_buf();
        let url = format!("sqlite://{}?mode=rwc", data_dir.join("test.db").display());
        // Keep the directory alive for the whole test.
        std::mem::forget(dir);
        let pool = DatabasePool::new(&url).await.unwrap();

        let mut config = AppConfig::default();
        config.embedding.max_attempts = 2;
        config.embedding.initial_backoff_ms = 1;
        config.embedding.max_backoff_ms = 2;

        let mut providers = ProviderRegistry::new();
        providers.register(BoxLlmProvider::new(ScriptedProvider {
            name: "openai",
            models: &["gpt-4", "gpt-3.5-turbo"],
            fail: false,
        }));
        providers.register(BoxLlmProvider::new(ScriptedProvider {
            name: "anthropic",
            models: &["claude-3-haiku-20240307"],
            fail: true,
        }));

        let embedder = BoxEmbedder::new(KeywordEmbedder {
            fail: failing_embedder,
        });
        let state = AppState::from_parts(config, data_dir, pool, embedder, providers);
        Self { state }
    }

    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    /// Issue a fresh API key for `user_id` and return its plaintext.
    pub async fn key_for(&self, user_id: &str) -> String {
        self.state
            .api_keys
            .create(user_id, "test")
            .await
            .unwrap()
            .plaintext
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    /// Authenticated JSON request.
    pub async fn call(
        &self,
        key: &str,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {key}"));
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }
}
