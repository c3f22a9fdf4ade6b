use crate::models::NewRecipe;
use crate::services::recipes;
use crate::services::slug::derive_slug;
use crate::{Config, Database};
use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: usize,
    /// Titles whose slug another recipe already has.
    pub shadowed: Vec<String>,
    /// Titles with no usable slug.
    pub unroutable: Vec<String>,
}

pub async fn run(config_path: &Path, file: &Path, overwrite: bool) -> Result<()> {
    let config = Config::load(config_path)?;
    let db = Database::open_with_pool_size(&config.database.path, config.database.pool_size)?;
    db.migrate()?;

    let raw = fs::read_to_string(file)
        .with_context(|| format!("Could not read import file '{}'", file.display()))?;
    let input: Vec<NewRecipe> = serde_json::from_str(&raw)
        .with_context(|| format!("'{}' is not a JSON array of recipes", file.display()))?;

    let report = import_recipes(&db, &input, overwrite)?;

    for title in &report.shadowed {
        tracing::warn!("'{}' shares its slug with another recipe; only the lowest id is reachable", title);
    }
    for title in &report.unroutable {
        tracing::warn!("'{}' has no usable slug and will not be reachable", title);
    }
    tracing::info!(
        "Import complete: {} imported, {} skipped",
        report.imported,
        report.skipped
    );
    Ok(())
}

pub fn import_recipes(db: &Database, input: &[NewRecipe], overwrite: bool) -> Result<ImportReport> {
    let mut report = ImportReport::default();
    let mut taken: HashSet<String> = recipes::list_recipes(db)?
        .iter()
        .map(|r| derive_slug(&r.title))
        .collect();

    for recipe in input {
        if recipe.title.trim().is_empty() {
            tracing::warn!("Skipping recipe without a title (id {:?})", recipe.id);
            report.skipped += 1;
            continue;
        }

        let existing = match recipe.id {
            Some(id) => recipes::get_recipe(db, id)?,
            None => None,
        };
        if existing.is_some() && !overwrite {
            tracing::info!("Skipping existing: {}", recipe.title);
            report.skipped += 1;
            continue;
        }

        let slug = derive_slug(&recipe.title);
        let replaces_same_slug = existing
            .as_ref()
            .is_some_and(|e| derive_slug(&e.title) == slug);
        if slug.is_empty() {
            report.unroutable.push(recipe.title.clone());
        } else if !taken.insert(slug.clone()) && !replaces_same_slug {
            report.shadowed.push(recipe.title.clone());
        }

        recipes::upsert_recipe(db, recipe)?;
        tracing::info!("Imported: {} ({})", recipe.title, slug);
        report.imported += 1;
    }

    Ok(report)
}
