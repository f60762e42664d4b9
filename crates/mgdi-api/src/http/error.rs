//! Application error type mapping to HTTP status codes and envelope format.

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use mgdi_types::error::{AuthError, EmbeddingError, MemoryError, PromptError};
use mgdi_types::llm::LlmError;

use crate::http::response::ApiResponse;

/// Which memory operation failed; picks the error code and message prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryOperation {
    Store,
    Search,
    Timeline,
}

impl MemoryOperation {
    fn code(self) -> &'static str {
        match self {
            MemoryOperation::Store => "MEMORY_STORE_FAILED",
            MemoryOperation::Search => "MEMORY_SEARCH_FAILED",
            MemoryOperation::Timeline => "TIMELINE_FETCH_FAILED",
        }
    }

    fn prefix(self) -> &'static str {
        match self {
            MemoryOperation::Store => "Memory storage failed",
            MemoryOperation::Search => "Memory search failed",
            MemoryOperation::Timeline => "Timeline fetch failed",
        }
    }
}

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    Memory {
        operation: MemoryOperation,
        error: MemoryError,
    },
    Prompt(PromptError),
    /// The chat provider call failed.
    Chat {
        provider: String,
        error: LlmError,
    },
    /// The requested chat provider is unknown or has no API key.
    ProviderNotConfigured(String),
    Unauthorized(String),
    Validation(String),
    Internal(String),
}

impl AppError {
    pub fn memory(operation: MemoryOperation) -> impl FnOnce(MemoryError) -> AppError {
        move |error| AppError::Memory { operation, error }
    }

    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Memory {
                error: MemoryError::InvalidRequest(msg),
                ..
            } => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Memory {
                operation,
                error: error @ MemoryError::Embedding(EmbeddingError::RetriesExhausted { .. }),
            } => (
                StatusCode::SERVICE_UNAVAILABLE,
                "UPSTREAM_UNAVAILABLE",
                format!("{}: {error}", operation.prefix()),
            ),
            AppError::Memory { operation, error } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                operation.code(),
                format!("{}: {error}", operation.prefix()),
            ),
            AppError::Prompt(PromptError::NotFound) => (
                StatusCode::NOT_FOUND,
                "PROMPT_NOT_FOUND",
                "Prompt not found".to_string(),
            ),
            AppError::Prompt(PromptError::Invalid(msg)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::Prompt(e) => (StatusCode::INTERNAL_SERVER_ERROR, "PROMPT_ERROR", e.to_string()),
            AppError::Chat { provider, error } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "CHAT_FAILED",
                format!("{provider} API error: {error}"),
            ),
            AppError::ProviderNotConfigured(name) => (
                StatusCode::BAD_REQUEST,
                "PROVIDER_NOT_CONFIGURED",
                format!("Provider '{name}' not supported or not configured."),
            ),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg.clone())
            }
        }
    }
}

impl From<PromptError> for AppError {
    fn from(e: PromptError) -> Self {
        AppError::Prompt(e)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::MissingCredentials => AppError::Unauthorized(
                "Missing API key. Provide via 'Authorization: Bearer <key>' or 'X-API-Key: <key>' header.".to_string(),
            ),
            AuthError::InvalidCredentials => AppError::Unauthorized("Invalid API key.".to_string()),
            AuthError::Unavailable(msg) => AppError::Internal(format!("Key verification failed: {msg}")),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        if status.is_server_error() {
            tracing::error!(code, %message, "request failed");
        } else {
            tracing::debug!(code, %message, "request rejected");
        }

        let request_id = uuid::Uuid::now_v7().to_string();
        (status, Json(ApiResponse::error(code, &message, request_id, 0))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_error_codes() {
        let (status, code, message) = AppError::Memory {
            operation: MemoryOperation::Store,
            error: MemoryError::Storage("disk full".to_string()),
        }
        .parts();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(code, "MEMORY_STORE_FAILED");
        assert!(message.starts_with("Memory storage failed: "));

        let (status, code, message) = AppError::Memory {
            operation: MemoryOperation::Search,
            error: MemoryError::Embedding(EmbeddingError::RetriesExhausted {
                attempts: 3,
                last: Box::new(EmbeddingError::RateLimited),
            }),
        }
        .parts();
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(code, "UPSTREAM_UNAVAILABLE");
        assert!(message.starts_with("Memory search failed: "));

        let (status, code, _) = AppError::Memory {
            operation: MemoryOperation::Timeline,
            error: MemoryError::InvalidRequest("limit".to_string()),
        }
        .parts();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(code, "VALIDATION_ERROR");
    }

    #[test]
    fn test_provider_not_configured_message() {
        let (status, code, message) = AppError::ProviderNotConfigured("gemini".to_string()).parts();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(code, "PROVIDER_NOT_CONFIGURED");
        assert_eq!(message, "Provider 'gemini' not supported or not configured.");
    }

    #[test]
    fn test_auth_errors_map_to_401() {
        let (status, _, _) = AppError::from(AuthError::InvalidCredentials).parts();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let (status, _, _) = AppError::from(AuthError::Unavailable("db".to_string())).parts();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
