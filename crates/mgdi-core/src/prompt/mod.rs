//! System prompt management.

pub mod repository;
pub mod service;
