//! SSE stream handling for OpenAI Chat Completions.
//!
//! Every event is an unnamed `data:` line holding a [`ChatCompletionChunk`];
//! the literal `[DONE]` ends the stream.

use std::pin::Pin;

use eventsource_stream::Eventsource;
use futures_util::{Stream, StreamExt};

use mgdi_types::llm::{LlmError, StreamEvent, Usage};

use super::types::{ChatCompletionChunk, ErrorBody};
use crate::llm::{error_from_response, send_error};

const DONE_SENTINEL: &str = "[DONE]";

pub fn create_openai_stream(
    request: reqwest::RequestBuilder,
) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send + 'static>> {
    Box::pin(async_stream::try_stream! {
        let response = request.send().await.map_err(send_error)?;
        if !response.status().is_success() {
            Err::<(), LlmError>(error_from_response(response).await)?;
            return;
        }

        let mut events = response.bytes_stream().eventsource();

        while let Some(event) = events.next().await {
            let event = event.map_err(|e| LlmError::Stream(e.to_string()))?;
            let data = event.data.trim();
            if data.is_empty() {
                continue;
            }
            if data == DONE_SENTINEL {
                break;
            }

            if let Ok(body) = serde_json::from_str::<ErrorBody>(data) {
                Err::<(), LlmError>(LlmError::Provider {
                    message: body.error.message,
                })?;
            }

            let chunk: ChatCompletionChunk = serde_json::from_str(data).map_err(|e| {
                LlmError::Deserialization(format!("failed to parse stream chunk: {e}"))
            })?;

            for choice in chunk.choices {
                if let Some(text) = choice.delta.content {
                    if !text.is_empty() {
                        yield StreamEvent::TextDelta { text };
                    }
                }
            }

            if let Some(usage) = chunk.usage {
                yield StreamEvent::Usage(Usage {
                    input_tokens: usage.prompt_tokens,
                    output_tokens: usage.completion_tokens,
                });
            }
        }

        yield StreamEvent::Done;
    })
}
