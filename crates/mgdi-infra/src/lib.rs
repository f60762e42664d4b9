//! Infrastructure layer for MGDI.
//!
//! Implements the ports defined in `mgdi-core`: SQLite storage for memories
//! and API keys, the OpenAI embedder, OpenAI/Anthropic chat providers, the
//! in-memory prompt store and the configuration loader.

pub mod config;
pub mod embedding;
pub mod llm;
pub mod prompt;
pub mod sqlite;
