use super::handlers;
use super::state::AppState;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;

pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(handlers::public::index))
        .route("/resepi/:slug", get(handlers::public::recipe))
        .route(
            "/rawak",
            get(handlers::public::random).post(handlers::public::random),
        )
        .route("/sitemap.xml", get(handlers::public::sitemap))
        .route("/robots.txt", get(handlers::public::robots))
        .route("/health", get(handlers::public::health))
}

pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/recipes", get(handlers::api::list_recipes))
        .route("/api/recipes/:slug", get(handlers::api::get_recipe))
        .route("/api/random", get(handlers::api::random_recipe))
}
