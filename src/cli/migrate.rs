use crate::services::recipes;
use crate::{Config, Database};
use anyhow::Result;
use std::path::Path;

pub async fn run(config_path: &Path) -> Result<()> {
    let config = Config::load(config_path)?;
    let db = Database::open_with_pool_size(&config.database.path, config.database.pool_size)?;

    db.migrate()?;
    let count = recipes::count_recipes(&db)?;
    tracing::info!("Migrations complete ({} recipes in {})", count, config.database.path);

    Ok(())
}
