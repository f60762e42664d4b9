//! Shared domain types for MGDI.
//!
//! This crate contains the core domain types used across the MGDI backend:
//! memory entries, system prompts, LLM request/response shapes, the verified
//! principal, configuration, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod identity;
pub mod llm;
pub mod memory;
pub mod prompt;
