//! Process-local prompt store.
//!
//! Prompts live for the lifetime of the server and are not persisted. One
//! mutex guards both the id counter and the list, so concurrent creates
//! never share an id.

use std::sync::{Arc, Mutex, MutexGuard};

use mgdi_core::prompt::repository::PromptRepository;
use mgdi_types::error::RepositoryError;
use mgdi_types::prompt::{PromptInput, SystemPrompt};

#[derive(Debug)]
struct PromptTable {
    last_id: i64,
    prompts: Vec<SystemPrompt>,
}

/// Cloning produces a shared view of the same store.
#[derive(Debug, Clone)]
pub struct InMemoryPromptRepository {
    table: Arc<Mutex<PromptTable>>,
}

impl InMemoryPromptRepository {
    /// An empty store. The first prompt gets id 1.
    pub fn new() -> Self {
        Self {
            table: Arc::new(Mutex::new(PromptTable {
                last_id: 0,
                prompts: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, PromptTable>, RepositoryError> {
        self.table
            .lock()
            .map_err(|_| RepositoryError::Query("prompt store lock poisoned".to_string()))
    }
}

impl Default for InMemoryPromptRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptRepository for InMemoryPromptRepository {
    async fn list(&self) -> Result<Vec<SystemPrompt>, RepositoryError> {
        Ok(self.lock()?.prompts.clone())
    }

    async fn get(&self, id: i64) -> Result<Option<SystemPrompt>, RepositoryError> {
        Ok(self.lock()?.prompts.iter().find(|p| p.id == id).cloned())
    }

    async fn add(&self, input: PromptInput) -> Result<SystemPrompt, RepositoryError> {
        let mut table = self.lock()?;
        table.last_id += 1;
        let prompt = input.into_prompt(table.last_id);
        table.prompts.push(prompt.clone());
        Ok(prompt)
    }

    async fn update(
        &self,
        id: i64,
        input: PromptInput,
    ) -> Result<Option<SystemPrompt>, RepositoryError> {
        let mut table = self.lock()?;
        let Some(slot) = table.prompts.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        *slot = input.into_prompt(id);
        Ok(Some(slot.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool, RepositoryError> {
        let mut table = self.lock()?;
        let before = table.prompts.len();
        table.prompts.retain(|p| p.id != id);
        Ok(table.prompts.len() != before)
    }
}
