//! LLM provider abstractions for MGDI chat.
//!
//! - `LlmProvider`: RPITIT trait for concrete provider implementations
//! - `BoxLlmProvider`: object-safe wrapper for dynamic dispatch
//! - `ProviderRegistry`: name-indexed lookup of the configured providers

pub mod box_provider;
pub mod provider;
pub mod registry;
