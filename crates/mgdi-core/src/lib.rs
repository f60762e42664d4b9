//! Business logic and port trait definitions for MGDI.
//!
//! This crate defines the "ports" (repository, embedder, provider and
//! verifier traits) that the infrastructure layer implements, plus the
//! services built on top of them. It depends only on `mgdi-types` -- never on
//! `mgdi-infra` or any database/IO crate.

pub mod auth;
pub mod llm;
pub mod memory;
pub mod policy;
pub mod prompt;
