//! Axum extractors.

pub mod auth;
pub mod body;
