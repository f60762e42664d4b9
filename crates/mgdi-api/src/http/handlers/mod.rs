//! REST endpoint handlers, one module per resource.

pub mod chat;
pub mod memory;
pub mod prompt;
