//! Anthropic Claude chat provider.
//!
//! [`AnthropicProvider`] implements the
//! [`LlmProvider`](mgdi_core::llm::provider::LlmProvider) trait for the
//! Anthropic Messages API, including SSE streaming.

pub mod client;
pub mod streaming;
pub mod types;

pub use client::AnthropicProvider;
