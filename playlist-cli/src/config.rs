use std::path::{Path, PathBuf};
use std::time::Duration;

use channel_playlist::config::DEFAULT_USER_AGENT;
use channel_playlist::writer::DEFAULT_OUTPUT_DIR;
use channel_playlist::{FetcherConfig, SortKey, SourceConfig, SourceRegistry};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Settings read from the optional TOML configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory the playlists are written to
    pub output_dir: PathBuf,

    /// Sort order used when `--sort` is not given
    pub default_sort: SortKey,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// User agent string for requests
    pub user_agent: String,

    /// Extra sources; a source named like a built-in one replaces it
    pub sources: Vec<SourceConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            default_sort: SortKey::default(),
            timeout_secs: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            sources: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Load the configuration file, or the defaults when no path is given.
    pub fn load(config_path: Option<&Path>) -> Result<Self, AppError> {
        let Some(path) = config_path else {
            return Ok(Self::default());
        };

        if !path.exists() {
            return Err(AppError::ConfigNotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path)?;
        Self::parse(&content).map_err(|source| AppError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Built-in sources merged with the ones from the configuration file.
    pub fn registry(&self) -> Result<SourceRegistry, AppError> {
        let configured = SourceRegistry::from_sources(self.sources.iter().cloned())?;

        let mut registry = SourceRegistry::builtin();
        for source in configured.iter() {
            registry.register(source.clone())?;
        }
        Ok(registry)
    }

    pub fn fetcher_config(&self) -> FetcherConfig {
        FetcherConfig::default()
            .with_timeout(Duration::from_secs(self.timeout_secs))
            .with_user_agent(&self.user_agent)
    }
}
