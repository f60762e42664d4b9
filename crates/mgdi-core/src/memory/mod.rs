//! Per-user vector memory for MGDI.
//!
//! This module defines the `Embedder` and `MemoryRepository` ports that the
//! infrastructure layer implements, the cosine ranking shared by every
//! repository, and the `MemoryService` that ties them together.

pub mod box_embedder;
pub mod embedder;
pub mod service;
pub mod similarity;
pub mod store;
