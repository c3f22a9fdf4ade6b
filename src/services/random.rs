use crate::models::RecipeRef;
use crate::services::slug::{derive_slug, recipe_path};
use crate::services::source::RecipeSource;
use rand::Rng;

/// Uniformly pick one element. `None` for an empty list.
pub fn pick_random<'a, T, R: Rng + ?Sized>(items: &'a [T], rng: &mut R) -> Option<&'a T> {
    if items.is_empty() {
        return None;
    }
    items.get(rng.gen_range(0..items.len()))
}

/// Pick a recipe and return the path to navigate to, if there is one.
pub fn choose_destination<R: Rng + ?Sized>(refs: &[RecipeRef], rng: &mut R) -> Option<String> {
    let picked = pick_random(refs, rng)?;
    let slug = derive_slug(picked.title.as_deref().unwrap_or(""));
    let path = recipe_path(&slug);
    if path.is_none() {
        tracing::warn!("Random pick {} has no usable slug", picked.id);
    }
    path
}

/// Fetch the recipe list and choose a random destination.
///
/// Failures are logged and end in "nothing happened"; there is no retry.
pub async fn random_destination(source: &RecipeSource) -> Option<String> {
    let refs = match source.fetch_refs().await {
        Ok(refs) => refs,
        Err(e) => {
            tracing::error!("Randomize error: {:#}", e);
            return None;
        }
    };

    if refs.is_empty() {
        tracing::debug!("Randomize: no recipes to pick from");
        return None;
    }

    choose_destination(&refs, &mut rand::thread_rng())
}
