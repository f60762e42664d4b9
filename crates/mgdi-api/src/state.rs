//! Application state wiring all services together.
//!
//! Services are generic over repository traits; AppState pins them to the
//! concrete infra implementations and is shared by the CLI and the REST API.

use std::path::PathBuf;
use std::sync::Arc;

use mgdi_core::llm::registry::ProviderRegistry;
use mgdi_core::memory::box_embedder::BoxEmbedder;
use mgdi_core::memory::service::MemoryService;
use mgdi_core::policy::CallPolicy;
use mgdi_core::prompt::service::PromptService;
use mgdi_infra::config::{ProviderKeys, resolve_database_url};
use mgdi_infra::embedding::{DisabledEmbedder, OpenAiEmbedder};
use mgdi_infra::llm::build_registry;
use mgdi_infra::prompt::InMemoryPromptRepository;
use mgdi_infra::sqlite::api_key::SqliteApiKeyRepository;
use mgdi_infra::sqlite::memory::SqliteMemoryRepository;
use mgdi_infra::sqlite::pool::DatabasePool;
use mgdi_types::config::AppConfig;

pub type ConcreteMemoryService = MemoryService<SqliteMemoryRepository>;
pub type ConcretePromptService = PromptService<InMemoryPromptRepository>;

/// Shared application state holding all services.
#[derive(Clone)]
pub struct AppState {
    pub memory_service: Arc<ConcreteMemoryService>,
    pub prompt_service: Arc<ConcretePromptService>,
    pub providers: Arc<ProviderRegistry>,
    pub api_keys: SqliteApiKeyRepository,
    pub config: Arc<AppConfig>,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Connect to the database, pick the embedder and register whichever
    /// chat providers have keys.
    pub async fn init(config: AppConfig, data_dir: PathBuf) -> anyhow::Result<Self> {
        tokio::fs::create_dir_all(&data_dir).await?;

        let db_url = resolve_database_url(&config, &data_dir);
        let db_pool = DatabasePool::new(&db_url).await?;

        let keys = ProviderKeys::from_env();
        let embedder = match keys.openai.clone() {
            Some(key) => BoxEmbedder::new(OpenAiEmbedder::new(key, &config.embedding)?),
            None => {
                tracing::warn!("OPENAI_API_KEY not set; memory store and search will fail");
                BoxEmbedder::new(DisabledEmbedder::new(
                    config.embedding.model.clone(),
                    config.embedding.dimension,
                ))
            }
        };

        let providers = build_registry(&config.chat, keys.openai, keys.anthropic)?;

        Ok(Self::from_parts(config, data_dir, db_pool, embedder, providers))
    }

    /// Assemble state from already-built parts.
    pub fn from_parts(
        config: AppConfig,
        data_dir: PathBuf,
        db_pool: DatabasePool,
        embedder: BoxEmbedder,
        providers: ProviderRegistry,
    ) -> Self {
        let memory_service = MemoryService::new(
            SqliteMemoryRepository::new(db_pool.clone()),
            embedder,
            CallPolicy::from_config(&config.embedding),
        );
        let prompt_service = PromptService::new(InMemoryPromptRepository::new());

        Self {
            memory_service: Arc::new(memory_service),
            prompt_service: Arc::new(prompt_service),
            providers: Arc::new(providers),
            api_keys: SqliteApiKeyRepository::new(db_pool),
            config: Arc::new(config),
            data_dir,
        }
    }
}
