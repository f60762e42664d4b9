//! Chat proxy endpoints.
//!
//! POST /api/chat forwards a conversation to the requested provider. With
//! `stream: true` the reply is Server-Sent Events instead of an envelope:
//!
//! - `data: <text chunk>` for each delta
//! - `event: error` / `data: <message>` if the provider fails mid-stream
//! - `data: [DONE]` once the provider finishes

use std::collections::BTreeMap;
use std::convert::Infallible;
use std::time::Duration;

use axum::Json;
use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use futures_util::{Stream, StreamExt};
use serde::Serialize;
use tracing::Instrument;

use mgdi_observe::genai_attrs::{
    GEN_AI_OPERATION_NAME, GEN_AI_PROVIDER_NAME, GEN_AI_REQUEST_MAX_TOKENS, GEN_AI_REQUEST_MODEL,
    GEN_AI_REQUEST_TEMPERATURE, GEN_AI_USAGE_INPUT_TOKENS, GEN_AI_USAGE_OUTPUT_TOKENS, OP_CHAT,
    span_name,
};
use mgdi_types::chat::{ChatRequest, ChatResponse, ModelInfo, ProviderInfo};
use mgdi_types::llm::{LlmError, StreamEvent};

use crate::http::error::AppError;
use crate::http::extractors::auth::Authenticated;
use crate::http::extractors::body::ApiJson;
use crate::http::response::{ApiResponse, RequestTimer};
use crate::state::AppState;

const DONE_SENTINEL: &str = "[DONE]";

#[derive(Debug, Serialize)]
pub struct ProvidersResponse {
    pub providers: BTreeMap<String, ProviderInfo>,
}

#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub models: Vec<ModelInfo>,
}

/// POST /api/chat
pub async fn chat(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    ApiJson(request): ApiJson<ChatRequest>,
) -> Result<Response, AppError> {
    let timer = RequestTimer::start();

    if request.messages.is_empty() {
        return Err(AppError::Validation("messages cannot be empty".to_string()));
    }

    let provider_name = request.provider_name(&state.config.chat);
    let provider = state
        .providers
        .get(&provider_name)
        .ok_or_else(|| AppError::ProviderNotConfigured(provider_name.clone()))?;
    let completion = request.to_completion(&state.config.chat);

    let span = tracing::info_span!(
        "chat",
        otel.name = %span_name(OP_CHAT, &completion.model),
        request_id = %timer.request_id(),
        user_id = %principal.user_id,
        { GEN_AI_OPERATION_NAME } = OP_CHAT,
        { GEN_AI_PROVIDER_NAME } = %provider_name,
        { GEN_AI_REQUEST_MODEL } = %completion.model,
        { GEN_AI_REQUEST_MAX_TOKENS } = completion.max_tokens,
        { GEN_AI_REQUEST_TEMPERATURE } = completion.temperature,
        { GEN_AI_USAGE_INPUT_TOKENS } = tracing::field::Empty,
        { GEN_AI_USAGE_OUTPUT_TOKENS } = tracing::field::Empty,
    );

    if request.stream {
        span.in_scope(|| tracing::info!(messages = completion.messages.len(), "streaming chat"));
        let events = provider.stream(completion);
        return Ok(sse_response(events, provider_name, span).into_response());
    }

    let response = provider
        .complete(&completion)
        .instrument(span.clone())
        .await
        .map_err(|error| AppError::Chat {
            provider: provider_name.clone(),
            error,
        })?;

    span.record(GEN_AI_USAGE_INPUT_TOKENS, response.usage.input_tokens);
    span.record(GEN_AI_USAGE_OUTPUT_TOKENS, response.usage.output_tokens);
    span.in_scope(|| tracing::info!("chat complete"));

    let reply = ChatResponse::new(response.content, response.model, provider_name);
    Ok(Json(timer.finish(reply)).into_response())
}

/// Convert provider stream events into the wire SSE format.
fn sse_response(
    events: impl Stream<Item = Result<StreamEvent, LlmError>> + Send + 'static,
    provider_name: String,
    span: tracing::Span,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let sse_stream = async_stream::stream! {
        let mut events = std::pin::pin!(events);
        let mut failed = false;

        while let Some(event) = events.next().await {
            match event {
                Ok(StreamEvent::TextDelta { text }) => {
                    yield Ok::<_, Infallible>(Event::default().data(text));
                }
                Ok(StreamEvent::Usage(usage)) => {
                    span.record(GEN_AI_USAGE_INPUT_TOKENS, usage.input_tokens);
                    span.record(GEN_AI_USAGE_OUTPUT_TOKENS, usage.output_tokens);
                }
                Ok(StreamEvent::Done) => break,
                Err(e) => {
                    span.in_scope(|| tracing::error!(error = %e, "chat stream failed"));
                    let message = format!("{provider_name} API error: {e}");
                    yield Ok(Event::default().event("error").data(message));
                    failed = true;
                    break;
                }
            }
        }

        if !failed {
            span.in_scope(|| tracing::info!("chat stream complete"));
            yield Ok(Event::default().data(DONE_SENTINEL));
        }
    };

    Sse::new(sse_stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}

/// GET /api/chat/providers
pub async fn list_providers(
    State(state): State<AppState>,
    _auth: Authenticated,
) -> Json<ApiResponse<ProvidersResponse>> {
    let timer = RequestTimer::start();
    Json(timer.finish(ProvidersResponse {
        providers: state.providers.provider_info(),
    }))
}

/// GET /api/chat/models
pub async fn list_models(
    State(state): State<AppState>,
    _auth: Authenticated,
) -> Json<ApiResponse<ModelsResponse>> {
    let timer = RequestTimer::start();
    Json(timer.finish(ModelsResponse {
        models: state.providers.models(),
    }))
}
