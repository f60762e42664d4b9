//! LlmProvider trait definition.
//!
//! This is the core abstraction that all chat providers implement.
//! Uses RPITIT for `complete`, and `Pin<Box<dyn Stream>>` for `stream`
//! (streams need to be object-safe for the BoxLlmProvider wrapper).

use std::pin::Pin;

use futures_util::Stream;

use mgdi_types::llm::{CompletionRequest, CompletionResponse, LlmError, StreamEvent};

/// Trait for chat provider backends (OpenAI, Anthropic).
///
/// Implementations live in mgdi-infra.
pub trait LlmProvider: Send + Sync {
    /// Provider name as used in requests (e.g., "openai", "anthropic").
    fn name(&self) -> &str;

    /// Models this provider advertises.
    fn available_models(&self) -> Vec<String>;

    /// Send a completion request and receive the full response.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<CompletionResponse, LlmError>> + Send;

    /// Send a streaming completion request. Returns a stream of events
    /// ending with [`StreamEvent::Done`].
    fn stream(
        &self,
        request: CompletionRequest,
    ) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send + 'static>>;
}
