//! OpenTelemetry GenAI semantic convention attribute names.
//!
//! Used as field names on chat and embedding spans so exported traces line
//! up with other GenAI tooling. Span naming: `"{operation} {model}"`.

/// The operation being performed (see the `OP_*` values).
pub const GEN_AI_OPERATION_NAME: &str = "gen_ai.operation.name";

/// The provider serving the call (e.g., "openai").
pub const GEN_AI_PROVIDER_NAME: &str = "gen_ai.provider.name";

pub const GEN_AI_REQUEST_MODEL: &str = "gen_ai.request.model";
pub const GEN_AI_REQUEST_TEMPERATURE: &str = "gen_ai.request.temperature";
pub const GEN_AI_REQUEST_MAX_TOKENS: &str = "gen_ai.request.max_tokens";

pub const GEN_AI_USAGE_INPUT_TOKENS: &str = "gen_ai.usage.input_tokens";
pub const GEN_AI_USAGE_OUTPUT_TOKENS: &str = "gen_ai.usage.output_tokens";

// Operation name values

/// Chat completion, streaming or not.
pub const OP_CHAT: &str = "chat";

/// Text embedding for memory store and search.
pub const OP_EMBEDDINGS: &str = "embeddings";

/// Format a span name per the GenAI convention.
pub fn span_name(operation: &str, model: &str) -> String {
    format!("{operation} {model}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_name() {
        assert_eq!(span_name(OP_CHAT, "gpt-4"), "chat gpt-4");
    }
}
