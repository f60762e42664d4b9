//! SSE stream handling for the Anthropic Messages API.
//!
//! Event flow:
//! 1. `message_start` carries the input token count
//! 2. `content_block_delta` events carry the text
//! 3. `message_delta` carries the final output token count
//! 4. `message_stop` ends the message
//!
//! `ping` and any event type not listed here are skipped. An `error` event
//! terminates the stream with [`LlmError::Provider`].

use std::pin::Pin;

use eventsource_stream::Eventsource;
use futures_util::{Stream, StreamExt};
use serde::de::DeserializeOwned;

use mgdi_types::llm::{LlmError, StreamEvent, Usage};

use super::types::{
    AnthropicDelta, ContentBlockDeltaPayload, ErrorPayload, MessageDeltaPayload,
    MessageStartPayload,
};
use crate::llm::{error_from_response, send_error};

/// Send a prepared streaming request and map its SSE events to
/// [`StreamEvent`]s. The stream always ends with [`StreamEvent::Done`]
/// unless it fails first.
pub fn create_anthropic_stream(
    request: reqwest::RequestBuilder,
) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send + 'static>> {
    Box::pin(async_stream::try_stream! {
        let response = request.send().await.map_err(send_error)?;
        if !response.status().is_success() {
            Err::<(), LlmError>(error_from_response(response).await)?;
            return;
        }

        let mut events = response.bytes_stream().eventsource();
        let mut input_tokens = 0;

        while let Some(event) = events.next().await {
            let event = event.map_err(|e| LlmError::Stream(e.to_string()))?;
            match event.event.as_str() {
                "message_start" => {
                    let payload: MessageStartPayload = parse(&event.data, "message_start")?;
                    input_tokens = payload.message.usage.input_tokens;
                }
                "content_block_delta" => {
                    let payload: ContentBlockDeltaPayload =
                        parse(&event.data, "content_block_delta")?;
                    if let AnthropicDelta::TextDelta { text } = payload.delta {
                        if !text.is_empty() {
                            yield StreamEvent::TextDelta { text };
                        }
                    }
                }
                "message_delta" => {
                    let payload: MessageDeltaPayload = parse(&event.data, "message_delta")?;
                    yield StreamEvent::Usage(Usage {
                        input_tokens,
                        output_tokens: payload.usage.output_tokens,
                    });
                }
                "message_stop" => break,
                "error" => {
                    let payload: ErrorPayload = parse(&event.data, "error")?;
                    Err::<(), LlmError>(LlmError::Provider {
                        message: format!(
                            "{}: {}",
                            payload.error.error_type, payload.error.message
                        ),
                    })?;
                }
                _ => {}
            }
        }

        yield StreamEvent::Done;
    })
}

fn parse<T: DeserializeOwned>(data: &str, event: &str) -> Result<T, LlmError> {
    serde_json::from_str(data)
        .map_err(|e| LlmError::Deserialization(format!("failed to parse {event}: {e}")))
}
