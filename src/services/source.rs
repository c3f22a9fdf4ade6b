use crate::config::{Backend, Config};
use crate::models::{Recipe, RecipeRef};
use crate::services::recipes;
use crate::Database;
use anyhow::Result;

#[cfg(feature = "remote")]
use crate::services::remote::RemoteClient;

#[cfg(feature = "remote")]
const REF_COLUMNS: &str = "id,title,thumbnail_url";
#[cfg(feature = "remote")]
const RECIPE_COLUMNS: &str = "id,title,description,thumbnail_url,total_time_minutes,servings,difficulty_level,tags,ingredients,instructions,created_at";

/// Where recipe rows come from. Built once at startup and handed to whoever
/// needs to read recipes; both backends return rows in ascending id order.
#[derive(Clone)]
pub enum RecipeSource {
    Local(Database),
    #[cfg(feature = "remote")]
    Remote(RemoteClient),
}

impl RecipeSource {
    pub fn from_config(config: &Config) -> Result<Self> {
        match config.source.backend {
            Backend::Local => {
                let db = Database::open_with_pool_size(
                    &config.database.path,
                    config.database.pool_size,
                )?;
                db.migrate()?;
                Ok(Self::Local(db))
            }
            #[cfg(feature = "remote")]
            Backend::Remote => {
                let remote = config
                    .remote
                    .as_ref()
                    .ok_or_else(|| anyhow::anyhow!("missing [remote] section"))?;
                let client = RemoteClient::new(remote)?;
                tracing::info!("Reading recipes from {}", client.endpoint());
                Ok(Self::Remote(client))
            }
            #[cfg(not(feature = "remote"))]
            Backend::Remote => {
                anyhow::bail!("this build of resepi was compiled without the 'remote' feature")
            }
        }
    }

    pub fn backend(&self) -> Backend {
        match self {
            Self::Local(_) => Backend::Local,
            #[cfg(feature = "remote")]
            Self::Remote(_) => Backend::Remote,
        }
    }

    pub async fn fetch_recipes(&self) -> Result<Vec<Recipe>> {
        match self {
            Self::Local(db) => recipes::list_recipes(db),
            #[cfg(feature = "remote")]
            Self::Remote(client) => Ok(client.select(RECIPE_COLUMNS).await?),
        }
    }

    pub async fn fetch_refs(&self) -> Result<Vec<RecipeRef>> {
        match self {
            Self::Local(db) => recipes::list_recipe_refs(db),
            #[cfg(feature = "remote")]
            Self::Remote(client) => Ok(client.select(REF_COLUMNS).await?),
        }
    }
}
