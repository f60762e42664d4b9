//! Configuration loader for MGDI.
//!
//! Reads `config.toml` from the data directory (`~/.mgdi/` by default) and
//! deserializes it into [`AppConfig`]. Falls back to defaults when the file
//! is missing or malformed. Secrets never come from the file: API keys are
//! read from the environment only.

use std::path::{Path, PathBuf};

use secrecy::SecretString;

use mgdi_types::config::AppConfig;
use mgdi_types::llm::ProviderKind;

use crate::sqlite::pool::default_database_url;

pub const DATA_DIR_ENV: &str = "MGDI_DATA_DIR";
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

/// Resolve the data directory: `$MGDI_DATA_DIR`, else `~/.mgdi`, else
/// `./.mgdi` when no home directory can be determined.
pub fn resolve_data_dir() -> PathBuf {
    data_dir_from(|name| std::env::var(name).ok())
}

fn data_dir_from(lookup: impl Fn(&str) -> Option<String>) -> PathBuf {
    if let Some(dir) = lookup(DATA_DIR_ENV).filter(|d| !d.trim().is_empty()) {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".mgdi")
}

/// Load configuration from `path`, or `{data_dir}/config.toml` when `path`
/// is `None`.
///
/// - Missing file: [`AppConfig::default()`].
/// - Unreadable or unparsable file: logs a warning and returns the default.
pub async fn load_config(data_dir: &Path, path: Option<&Path>) -> AppConfig {
    let config_path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| data_dir.join("config.toml"));

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return AppConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return AppConfig::default();
        }
    };

    match toml::from_str::<AppConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            AppConfig::default()
        }
    }
}

/// Database URL, in priority order: `$DATABASE_URL`, `[database] url`,
/// `sqlite://{data_dir}/mgdi.db`.
pub fn resolve_database_url(config: &AppConfig, data_dir: &Path) -> String {
    database_url_from(config, data_dir, |name| std::env::var(name).ok())
}

fn database_url_from(
    config: &AppConfig,
    data_dir: &Path,
    lookup: impl Fn(&str) -> Option<String>,
) -> String {
    lookup(DATABASE_URL_ENV)
        .filter(|url| !url.trim().is_empty())
        .or_else(|| config.database.url.clone())
        .unwrap_or_else(|| default_database_url(data_dir))
}

/// Provider API keys found in the environment.
pub struct ProviderKeys {
    pub openai: Option<SecretString>,
    pub anthropic: Option<SecretString>,
}

impl ProviderKeys {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let key = |kind: ProviderKind| {
            lookup(kind.api_key_env())
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .map(SecretString::from)
        };
        Self {
            openai: key(ProviderKind::OpenAi),
            anthropic: key(ProviderKind::Anthropic),
        }
    }
}
