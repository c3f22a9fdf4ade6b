use crate::services::{random, RecipeSource};
use crate::Config;
use anyhow::Result;
use std::path::Path;

/// Prints the chosen path, or nothing when there is nowhere to go.
pub async fn run(config_path: &Path) -> Result<()> {
    let config = Config::load(config_path)?;
    let source = RecipeSource::from_config(&config)?;

    if let Some(path) = random::random_destination(&source).await {
        println!("{}", path);
    }

    Ok(())
}
