//! System prompt service.
//!
//! Validates input and turns missing prompts into `PromptError::NotFound`.

use mgdi_types::error::{PromptError, RepositoryError};
use mgdi_types::prompt::{PromptInput, SystemPrompt};

use super::repository::PromptRepository;

pub struct PromptService<R: PromptRepository> {
    repo: R,
}

impl<R: PromptRepository> PromptService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> Result<Vec<SystemPrompt>, PromptError> {
        self.repo.list().await.map_err(storage)
    }

    pub async fn get(&self, id: i64) -> Result<SystemPrompt, PromptError> {
        self.repo
            .get(id)
            .await
            .map_err(storage)?
            .ok_or(PromptError::NotFound)
    }

    pub async fn create(&self, input: PromptInput) -> Result<SystemPrompt, PromptError> {
        validate(&input)?;
        let prompt = self.repo.add(input).await.map_err(storage)?;
        tracing::info!(prompt_id = prompt.id, name = %prompt.name, "created system prompt");
        Ok(prompt)
    }

    /// Replace the prompt at `id`. The id in the path always wins.
    pub async fn update(&self, id: i64, input: PromptInput) -> Result<SystemPrompt, PromptError> {
        validate(&input)?;
        self.repo
            .update(id, input)
            .await
            .map_err(storage)?
            .ok_or(PromptError::NotFound)
    }

    /// Idempotent delete. Returns whether a prompt was removed.
    pub async fn delete(&self, id: i64) -> Result<bool, PromptError> {
        let removed = self.repo.delete(id).await.map_err(storage)?;
        if removed {
            tracing::info!(prompt_id = id, "deleted system prompt");
        }
        Ok(removed)
    }
}

fn validate(input: &PromptInput) -> Result<(), PromptError> {
    if input.name.trim().is_empty() {
        return Err(PromptError::Invalid("name cannot be empty".to_string()));
    }
    if input.content.trim().is_empty() {
        return Err(PromptError::Invalid("content cannot be empty".to_string()));
    }
    Ok(())
}

fn storage(e: RepositoryError) -> PromptError {
    PromptError::StorageError(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct VecRepo {
        inner: Mutex<(i64, Vec<SystemPrompt>)>,
    }

    impl PromptRepository for VecRepo {
        async fn list(&self) -> Result<Vec<SystemPrompt>, RepositoryError> {
            Ok(self.inner.lock().unwrap().1.clone())
        }

        async fn get(&self, id: i64) -> Result<Option<SystemPrompt>, RepositoryError> {
            Ok(self.inner.lock().unwrap().1.iter().find(|p| p.id == id).cloned())
        }

        async fn add(&self, input: PromptInput) -> Result<SystemPrompt, RepositoryError> {
            let mut guard = self.inner.lock().unwrap();
            guard.0 += 1;
            let prompt = input.into_prompt(guard.0);
            guard.1.push(prompt.clone());
            Ok(prompt)
        }

        async fn update(
            &self,
            id: i64,
            input: PromptInput,
        ) -> Result<Option<SystemPrompt>, RepositoryError> {
            let mut guard = self.inner.lock().unwrap();
            Ok(guard.1.iter_mut().find(|p| p.id == id).map(|slot| {
                *slot = input.into_prompt(id);
                slot.clone()
            }))
        }

        async fn delete(&self, id: i64) -> Result<bool, RepositoryError> {
            let mut guard = self.inner.lock().unwrap();
            let before = guard.1.len();
            guard.1.retain(|p| p.id != id);
            Ok(guard.1.len() != before)
        }
    }

    fn input(name: &str, content: &str) -> PromptInput {
        PromptInput {
            name: name.to_string(),
            content: content.to_string(),
            description: None,
        }
    }

    #[tokio::test]
    async fn create_and_get() {
        let service = PromptService::new(VecRepo::default());
        let created = service.create(input("Coder", "Write Rust")).await.unwrap();
        assert_eq!(created.id, 1);
        assert_eq!(service.get(1).await.unwrap(), created);
    }

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let service = PromptService::new(VecRepo::default());
        assert!(matches!(service.get(7).await, Err(PromptError::NotFound)));
    }

    #[tokio::test]
    async fn create_rejects_blank_fields() {
        let service = PromptService::new(VecRepo::default());
        assert!(matches!(
            service.create(input(" ", "x")).await,
            Err(PromptError::Invalid(_))
        ));
        assert!(matches!(
            service.create(input("x", "")).await,
            Err(PromptError::Invalid(_))
        ));
        assert!(service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_keeps_path_id() {
        let service = PromptService::new(VecRepo::default());
        service.create(input("a", "one")).await.unwrap();
        let updated = service.update(1, input("b", "two")).await.unwrap();
        assert_eq!(updated.id, 1);
        assert_eq!(updated.name, "b");
        assert_eq!(service.list().await.unwrap(), vec![updated]);
    }

    #[tokio::test]
    async fn update_missing_is_not_found() {
        let service = PromptService::new(VecRepo::default());
        assert!(matches!(
            service.update(3, input("a", "b")).await,
            Err(PromptError::NotFound)
        ));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let service = PromptService::new(VecRepo::default());
        service.create(input("a", "one")).await.unwrap();
        assert!(service.delete(1).await.unwrap());
        assert!(!service.delete(1).await.unwrap());
        assert!(!service.delete(42).await.unwrap());
    }
}
