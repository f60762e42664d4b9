//! PromptRepository trait definition.

use mgdi_types::error::RepositoryError;
use mgdi_types::prompt::{PromptInput, SystemPrompt};

/// Storage for system prompts.
///
/// The repository owns id assignment: ids start at 1, increase
/// monotonically and are never handed out twice.
pub trait PromptRepository: Send + Sync {
    /// All prompts in insertion order.
    fn list(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<SystemPrompt>, RepositoryError>> + Send;

    fn get(
        &self,
        id: i64,
    ) -> impl std::future::Future<Output = Result<Option<SystemPrompt>, RepositoryError>> + Send;

    /// Store a new prompt under the next id and return it.
    fn add(
        &self,
        input: PromptInput,
    ) -> impl std::future::Future<Output = Result<SystemPrompt, RepositoryError>> + Send;

    /// Replace the prompt with `id`, keeping its position. `None` if absent.
    fn update(
        &self,
        id: i64,
        input: PromptInput,
    ) -> impl std::future::Future<Output = Result<Option<SystemPrompt>, RepositoryError>> + Send;

    /// Remove the prompt with `id`. Returns whether anything was removed.
    fn delete(
        &self,
        id: i64,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;
}
