use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const API_KEY_ENV: &str = "RESEPI_API_KEY";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub site: SiteConfig,
    #[serde(default)]
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub remote: Option<RemoteConfig>,
    #[serde(default)]
    pub content: ContentConfig,
    #[serde(default)]
    pub media: MediaConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SiteConfig {
    pub title: String,
    pub description: String,
    pub url: String,
    #[serde(default = "default_language")]
    pub language: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub path: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Local,
    Remote,
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Remote => write!(f, "remote"),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SourceConfig {
    #[serde(default)]
    pub backend: Backend,
}

/// A hosted PostgREST-compatible recipe table.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RemoteConfig {
    pub url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_table")]
    pub table: String,
    #[serde(default = "default_remote_timeout")]
    pub timeout_secs: u64,
}

impl RemoteConfig {
    /// The key from the config file, falling back to `RESEPI_API_KEY`.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .filter(|k| !k.trim().is_empty())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ContentConfig {
    #[serde(default = "default_recipes_per_page")]
    pub recipes_per_page: usize,
    /// How many tags a recipe card shows.
    #[serde(default = "default_card_tags")]
    pub card_tags: usize,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            recipes_per_page: default_recipes_per_page(),
            card_tags: default_card_tags(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MediaConfig {
    /// Base URL that relative thumbnail references are resolved against.
    #[serde(default)]
    pub thumbnail_base_url: Option<String>,
}

fn default_language() -> String {
    "ms".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_pool_size() -> u32 {
    10
}

fn default_table() -> String {
    "recipes".to_string()
}

fn default_remote_timeout() -> u64 {
    10
}

fn default_recipes_per_page() -> usize {
    24
}

fn default_card_tags() -> usize {
    3
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!(
                "Could not read config file '{}': {}. Run 'resepi init' to create one.",
                path.display(),
                e
            )
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.content.recipes_per_page == 0 {
            anyhow::bail!("content.recipes_per_page must be greater than 0");
        }
        if self.content.recipes_per_page > 100 {
            anyhow::bail!("content.recipes_per_page must be 100 or less");
        }
        if self.database.pool_size == 0 {
            anyhow::bail!("database.pool_size must be greater than 0");
        }
        if let Some(base) = &self.media.thumbnail_base_url {
            url::Url::parse(base).map_err(|e| {
                anyhow::anyhow!("media.thumbnail_base_url '{}' is not a valid URL: {}", base, e)
            })?;
        }
        if self.source.backend == Backend::Remote {
            let remote = self
                .remote
                .as_ref()
                .ok_or_else(|| anyhow::anyhow!("source.backend = \"remote\" requires a [remote] section"))?;
            url::Url::parse(&remote.url).map_err(|e| {
                anyhow::anyhow!("remote.url '{}' is not a valid URL: {}", remote.url, e)
            })?;
            if remote.table.trim().is_empty() {
                anyhow::bail!("remote.table must not be empty");
            }
            if cfg!(not(feature = "remote")) {
                anyhow::bail!("this build of resepi was compiled without the 'remote' feature");
            }
        }
        Ok(())
    }
}
