use crate::models::Recipe;
use crate::services::recipes::SlugIndex;
use crate::services::RecipeSource;
use crate::Config;
use anyhow::Result;
use std::path::Path;

/// Exits non-zero when two titles derive to the same slug, since only the first
/// of them can ever be opened.
pub async fn run(config_path: &Path) -> Result<()> {
    let config = Config::load(config_path)?;
    let source = RecipeSource::from_config(&config)?;
    let all = source.fetch_recipes().await?;
    let index = SlugIndex::from_recipes(&all);

    println!("\n  Slug check ({} source)\n", source.backend());
    println!("  {} recipes, {} distinct slugs", all.len(), index.len());

    for collision in index.collisions() {
        println!("\n  \x1b[31m✗ collision\x1b[0m  /resepi/{}", collision.slug);
        for (n, pos) in collision.positions.iter().enumerate() {
            println!("{}", collision_line(n == 0, &all[*pos]));
        }
    }

    for pos in index.unroutable() {
        println!(
            "\n  \x1b[33m⚠ no slug\x1b[0m    #{} {:?}",
            all[*pos].id, all[*pos].title
        );
    }

    if !index.collisions().is_empty() {
        anyhow::bail!(
            "{} slug collision(s) found; rename the hidden recipes",
            index.collisions().len()
        );
    }

    println!("\n  \x1b[32m✓ every recipe has its own slug\x1b[0m\n");
    Ok(())
}

/// One member of a collision: the first is served, the rest are hidden.
pub(crate) fn collision_line(served: bool, recipe: &Recipe) -> String {
    let marker = if served { "served" } else { "hidden" };
    format!("      {} #{} {}", marker, recipe.id, recipe.title)
}
