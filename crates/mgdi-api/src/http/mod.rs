//! HTTP/REST API layer for MGDI.
//!
//! Axum-based REST API under `/api/` with API key authentication, envelope
//! response format and CORS.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod response;
pub mod router;

#[cfg(test)]
mod test_support;
