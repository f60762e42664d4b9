//! Named system prompts and the fields callers may set on them.

use serde::{Deserialize, Serialize};

/// A named system prompt.
///
/// Ids are assigned by the repository on insert, start at 1 and are never
/// reused, even after the prompt holding them is deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemPrompt {
    pub id: i64,
    pub name: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Caller-supplied fields of a system prompt, used for create and update.
///
/// An `id` in the body is accepted and ignored: the repository owns ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptInput {
    pub name: String,
    pub content: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl PromptInput {
    pub fn into_prompt(self, id: i64) -> SystemPrompt {
        SystemPrompt {
            id,
            name: self.name,
            content: self.content,
            description: self.description,
        }
    }
}
