//! OpenAI chat provider (Chat Completions API, SSE streaming).

pub mod client;
pub mod streaming;
pub mod types;

pub use client::OpenAiProvider;
