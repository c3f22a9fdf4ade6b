use crate::models::{NewRecipe, Recipe, RecipeRef, TagCount};
use crate::services::slug::{derive_slug, is_canonical_slug};
use crate::Database;
use anyhow::Result;
use rusqlite::{params, OptionalExtension, Row};
use std::collections::HashMap;

const RECIPE_COLUMNS: &str = "id, title, description, thumbnail_url, total_time_minutes, servings, difficulty_level, tags, ingredients, instructions, created_at";

fn row_to_recipe(row: &Row<'_>) -> rusqlite::Result<Recipe> {
    Ok(Recipe {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        thumbnail_url: row.get(3)?,
        total_time_minutes: row.get(4)?,
        servings: row.get(5)?,
        difficulty_level: row.get(6)?,
        tags: serde_json::from_str(&row.get::<_, String>(7)?).unwrap_or_default(),
        ingredients: serde_json::from_str(&row.get::<_, String>(8)?).unwrap_or_default(),
        instructions: row.get(9)?,
        created_at: row.get(10)?,
    })
}

pub fn create_recipe(db: &Database, input: &NewRecipe) -> Result<i64> {
    let conn = db.get()?;
    conn.execute(
        r#"
        INSERT INTO recipes (id, title, description, thumbnail_url, total_time_minutes, servings, difficulty_level, tags, ingredients, instructions)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        "#,
        params![
            input.id,
            input.title,
            input.description,
            input.thumbnail_url,
            input.total_time_minutes,
            input.servings,
            input.difficulty_level,
            serde_json::to_string(&input.tags)?,
            serde_json::to_string(&input.ingredients)?,
            input.instructions,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Insert, or replace the row with the same id. Rows without an id are always inserted.
pub fn upsert_recipe(db: &Database, input: &NewRecipe) -> Result<i64> {
    let Some(id) = input.id else {
        return create_recipe(db, input);
    };
    let conn = db.get()?;
    conn.execute(
        r#"
        INSERT INTO recipes (id, title, description, thumbnail_url, total_time_minutes, servings, difficulty_level, tags, ingredients, instructions)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        ON CONFLICT(id) DO UPDATE SET
            title = excluded.title,
            description = excluded.description,
            thumbnail_url = excluded.thumbnail_url,
            total_time_minutes = excluded.total_time_minutes,
            servings = excluded.servings,
            difficulty_level = excluded.difficulty_level,
            tags = excluded.tags,
            ingredients = excluded.ingredients,
            instructions = excluded.instructions
        "#,
        params![
            id,
            input.title,
            input.description,
            input.thumbnail_url,
            input.total_time_minutes,
            input.servings,
            input.difficulty_level,
            serde_json::to_string(&input.tags)?,
            serde_json::to_string(&input.ingredients)?,
            input.instructions,
        ],
    )?;
    Ok(id)
}

pub fn get_recipe(db: &Database, id: i64) -> Result<Option<Recipe>> {
    let conn = db.get()?;
    let recipe = conn
        .query_row(
            &format!("SELECT {} FROM recipes WHERE id = ?", RECIPE_COLUMNS),
            [id],
            row_to_recipe,
        )
        .optional()?;
    Ok(recipe)
}

/// All recipes in fetch order (ascending id).
pub fn list_recipes(db: &Database) -> Result<Vec<Recipe>> {
    let conn = db.get()?;
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM recipes ORDER BY id ASC",
        RECIPE_COLUMNS
    ))?;
    let recipes = stmt
        .query_map([], row_to_recipe)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(recipes)
}

pub fn list_recipe_refs(db: &Database) -> Result<Vec<RecipeRef>> {
    let conn = db.get()?;
    let mut stmt = conn.prepare("SELECT id, title, thumbnail_url FROM recipes ORDER BY id ASC")?;
    let refs = stmt
        .query_map([], |row| {
            Ok(RecipeRef {
                id: row.get(0)?,
                title: row.get(1)?,
                thumbnail_url: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(refs)
}

pub fn count_recipes(db: &Database) -> Result<i64> {
    let conn = db.get()?;
    let count = conn.query_row("SELECT COUNT(*) FROM recipes", [], |row| row.get(0))?;
    Ok(count)
}

pub fn delete_recipe(db: &Database, id: i64) -> Result<bool> {
    let conn = db.get()?;
    let deleted = conn.execute("DELETE FROM recipes WHERE id = ?", [id])?;
    Ok(deleted > 0)
}

/// Resolve a slug from a URL to a recipe by deriving every title in turn.
///
/// When several titles derive to the same slug the earliest one in `recipes`
/// wins; later ones are unreachable.
pub fn find_by_slug<'a>(recipes: &'a [Recipe], slug: &str) -> Option<&'a Recipe> {
    if !is_canonical_slug(slug) {
        return None;
    }
    recipes.iter().find(|r| derive_slug(&r.title) == slug)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlugCollision {
    pub slug: String,
    /// Positions in the dataset, in fetch order. The first one is the one served.
    pub positions: Vec<usize>,
}

/// Slug lookup table computed once per fetched dataset.
#[derive(Debug, Default)]
pub struct SlugIndex {
    slugs: Vec<String>,
    first: HashMap<String, usize>,
    collisions: Vec<SlugCollision>,
    unroutable: Vec<usize>,
}

impl SlugIndex {
    pub fn build<'a, I>(titles: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut index = SlugIndex::default();
        let mut seen: HashMap<String, Vec<usize>> = HashMap::new();

        for (pos, title) in titles.into_iter().enumerate() {
            let slug = derive_slug(title);
            if slug.is_empty() {
                index.unroutable.push(pos);
            } else {
                index.first.entry(slug.clone()).or_insert(pos);
                seen.entry(slug.clone()).or_default().push(pos);
            }
            index.slugs.push(slug);
        }

        index.collisions = seen
            .into_iter()
            .filter(|(_, positions)| positions.len() > 1)
            .map(|(slug, positions)| SlugCollision { slug, positions })
            .collect();
        index.collisions.sort_by_key(|c| c.positions[0]);
        index
    }

    pub fn from_recipes(recipes: &[Recipe]) -> Self {
        Self::build(recipes.iter().map(|r| r.title.as_str()))
    }

    pub fn position(&self, slug: &str) -> Option<usize> {
        self.first.get(slug).copied()
    }

    /// Slug at a dataset position; empty for unroutable titles.
    pub fn slug_at(&self, pos: usize) -> Option<&str> {
        self.slugs.get(pos).map(String::as_str)
    }

    /// True when the row at `pos` is the one its slug resolves to.
    pub fn is_reachable(&self, pos: usize) -> bool {
        self.slug_at(pos)
            .and_then(|slug| self.position(slug))
            .is_some_and(|first| first == pos)
    }

    pub fn collisions(&self) -> &[SlugCollision] {
        &self.collisions
    }

    pub fn unroutable(&self) -> &[usize] {
        &self.unroutable
    }

    pub fn len(&self) -> usize {
        self.first.len()
    }

    pub fn is_empty(&self) -> bool {
        self.first.is_empty()
    }
}

/// Tags across the dataset with the number of recipes carrying each, most used first.
pub fn collect_tags(recipes: &[Recipe]) -> Vec<TagCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for recipe in recipes {
        let mut seen: Vec<&str> = Vec::new();
        for tag in &recipe.tags {
            let tag = tag.trim();
            if tag.is_empty() || seen.contains(&tag) {
                continue;
            }
            seen.push(tag);
            *counts.entry(tag).or_default() += 1;
        }
    }

    let mut tags: Vec<TagCount> = counts
        .into_iter()
        .map(|(name, count)| TagCount {
            name: name.to_string(),
            count,
        })
        .collect();
    tags.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    tags
}

/// Narrow a listing by title search and selected tags, keeping fetch order.
///
/// A recipe passes the tag filter when it carries any selected tag.
pub fn filter_recipes<'a>(
    recipes: &'a [Recipe],
    query: Option<&str>,
    selected_tags: &[String],
) -> Vec<&'a Recipe> {
    let needle = query
        .map(|q| q.trim().to_lowercase())
        .filter(|q| !q.is_empty());

    recipes
        .iter()
        .filter(|r| match &needle {
            Some(n) => r.title.to_lowercase().contains(n.as_str()),
            None => true,
        })
        .filter(|r| selected_tags.is_empty() || r.has_any_tag(selected_tags))
        .collect()
}
