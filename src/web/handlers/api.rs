use crate::models::Recipe;
use crate::services::display::thumbnail_url;
use crate::services::slug::{derive_slug, is_canonical_slug, recipe_path};
use crate::services::{random, recipes};
use crate::web::handlers::public::normalize_tags;
use crate::web::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum_extra::extract::Query;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const MAX_PAGE_SIZE: usize = 100;

#[derive(Deserialize)]
pub struct ListParams {
    pub q: Option<String>,
    #[serde(default)]
    pub tag: Vec<String>,
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

/// A recipe as the API returns it: the row plus its derived routing fields.
#[derive(Serialize)]
struct ApiRecipe<'a> {
    #[serde(flatten)]
    recipe: &'a Recipe,
    slug: String,
    path: Option<String>,
    thumbnail: Option<String>,
}

impl<'a> ApiRecipe<'a> {
    fn new(recipe: &'a Recipe, thumbnail_base: Option<&str>) -> Self {
        let slug = derive_slug(&recipe.title);
        Self {
            recipe,
            path: recipe_path(&slug),
            slug,
            thumbnail: thumbnail_url(recipe.thumbnail_url.as_deref(), thumbnail_base),
        }
    }
}

fn paginate(
    page: Option<usize>,
    per_page: Option<usize>,
    default_size: usize,
    max_size: usize,
) -> (usize, usize, usize) {
    let page = page.unwrap_or(1).max(1);
    let per_page = per_page.unwrap_or(default_size).clamp(1, max_size);
    let offset = (page - 1).saturating_mul(per_page);
    (page, per_page, offset)
}

fn not_found(msg: &str) -> Response {
    let body = serde_json::json!({
        "error": "Not Found",
        "message": msg,
    });
    (StatusCode::NOT_FOUND, Json(body)).into_response()
}

fn service_error(context: &str, e: anyhow::Error) -> Response {
    tracing::error!("API {} error: {:#}", context, e);
    (
        StatusCode::BAD_GATEWAY,
        Json(serde_json::json!({"error": "Data service unavailable"})),
    )
        .into_response()
}

/// GET /api/recipes
pub async fn list_recipes(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Response {
    let all = match state.source.fetch_recipes().await {
        Ok(all) => all,
        Err(e) => return service_error("list_recipes", e),
    };

    let selected = normalize_tags(params.tag);
    let filtered = recipes::filter_recipes(&all, params.q.as_deref(), &selected);
    let (page, per_page, offset) = paginate(
        params.page,
        params.per_page,
        state.config.content.recipes_per_page,
        MAX_PAGE_SIZE,
    );

    let total = filtered.len();
    let data: Vec<ApiRecipe> = filtered
        .into_iter()
        .skip(offset)
        .take(per_page)
        .map(|r| ApiRecipe::new(r, state.thumbnail_base()))
        .collect();

    Json(serde_json::json!({
        "data": data,
        "meta": {
            "total": total,
            "page": page,
            "per_page": per_page,
        }
    }))
    .into_response()
}

/// GET /api/recipes/:slug
pub async fn get_recipe(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Response {
    if !is_canonical_slug(&slug) {
        return not_found("Recipe not found");
    }

    let all = match state.source.fetch_recipes().await {
        Ok(all) => all,
        Err(e) => return service_error("get_recipe", e),
    };

    match recipes::find_by_slug(&all, &slug) {
        Some(recipe) => Json(serde_json::json!({
            "data": ApiRecipe::new(recipe, state.thumbnail_base()),
        }))
        .into_response(),
        None => not_found("Recipe not found"),
    }
}

/// GET /api/random
pub async fn random_recipe(State(state): State<Arc<AppState>>) -> Response {
    match random::random_destination(&state.source).await {
        Some(path) => Json(serde_json::json!({ "data": { "path": path } })).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}
