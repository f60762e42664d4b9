//! Chat provider implementations and registry construction.
//!
//! Each provider is registered only when its API key is present, so the
//! registry doubles as the "configured providers" list served by the API.

pub mod anthropic;
pub mod openai;

use std::time::Duration;

use secrecy::SecretString;

use mgdi_core::llm::box_provider::BoxLlmProvider;
use mgdi_core::llm::registry::ProviderRegistry;
use mgdi_types::config::ChatConfig;
use mgdi_types::llm::{LlmError, ProviderKind};

pub use anthropic::AnthropicProvider;
pub use openai::OpenAiProvider;

/// Upper bound for a single chat call, streaming included.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Build the provider registry from the chat configuration and whichever
/// API keys were found at startup.
pub fn build_registry(
    config: &ChatConfig,
    openai_key: Option<SecretString>,
    anthropic_key: Option<SecretString>,
) -> Result<ProviderRegistry, LlmError> {
    let mut registry = ProviderRegistry::new();

    match openai_key {
        Some(key) => {
            let provider = OpenAiProvider::new(key)?.with_base_url(config.openai_base_url.clone());
            registry.register(BoxLlmProvider::new(provider));
        }
        None => tracing::warn!(
            env = ProviderKind::OpenAi.api_key_env(),
            "openai api key not set; provider disabled"
        ),
    }

    match anthropic_key {
        Some(key) => {
            let provider =
                AnthropicProvider::new(key)?.with_base_url(config.anthropic_base_url.clone());
            registry.register(BoxLlmProvider::new(provider));
        }
        None => tracing::warn!(
            env = ProviderKind::Anthropic.api_key_env(),
            "anthropic api key not set; provider disabled"
        ),
    }

    tracing::info!(providers = ?registry.list_names(), "chat providers ready");
    Ok(registry)
}

pub(crate) fn http_client() -> Result<reqwest::Client, LlmError> {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| LlmError::Provider {
            message: format!("failed to create HTTP client: {e}"),
        })
}

/// Map a non-success HTTP response to an [`LlmError`], consuming the body.
pub(crate) async fn error_from_response(response: reqwest::Response) -> LlmError {
    let status = response.status();
    let retry_after_ms = response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(|secs| secs.saturating_mul(1000));
    let body = response.text().await.unwrap_or_default();

    match status.as_u16() {
        401 | 403 => LlmError::AuthenticationFailed,
        429 => LlmError::RateLimited { retry_after_ms },
        400 | 404 | 422 => LlmError::InvalidRequest(body),
        503 | 529 => LlmError::Overloaded(body),
        _ => LlmError::Provider {
            message: format!("HTTP {status}: {body}"),
        },
    }
}

pub(crate) fn send_error(e: reqwest::Error) -> LlmError {
    LlmError::Provider {
        message: format!("HTTP request failed: {e}"),
    }
}
