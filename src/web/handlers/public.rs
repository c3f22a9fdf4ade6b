use crate::models::TagCount;
use crate::services::display::{ListingState, RecipeCard};
use crate::services::slug::{is_canonical_slug, recipe_path};
use crate::services::{random, recipes};
use crate::web::error::AppResult;
use crate::web::state::AppState;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum_extra::extract::Query;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tera::Context;

fn make_context(state: &AppState) -> Context {
    let mut ctx = Context::new();
    ctx.insert("site", &state.config.site);
    ctx
}

const MAX_PAGE: usize = 10000;

#[derive(Deserialize)]
pub struct ListingQuery {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub tag: Vec<String>,
    #[serde(default = "default_page")]
    pub page: usize,
}

fn default_page() -> usize {
    1
}

fn clamp_page(page: usize, total_pages: usize) -> usize {
    page.max(1).min(total_pages.clamp(1, MAX_PAGE))
}

/// Trimmed, non-empty, first occurrence wins.
pub(crate) fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !out.iter().any(|t| t == tag) {
            out.push(tag.to_string());
        }
    }
    out
}

#[derive(Serialize)]
struct TagChip {
    name: String,
    count: usize,
    active: bool,
    href: String,
}

fn tag_chips(tags: Vec<TagCount>, listing: &ListingState<'_>) -> Vec<TagChip> {
    tags.into_iter()
        .map(|t| TagChip {
            active: listing.is_selected(&t.name),
            href: listing.toggle_href(&t.name),
            name: t.name,
            count: t.count,
        })
        .collect()
}

pub async fn index(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListingQuery>,
) -> AppResult<Html<String>> {
    let all = state.source.fetch_recipes().await?;
    let selected = normalize_tags(query.tag);
    let listing = ListingState {
        query: query.q.as_deref(),
        selected_tags: &selected,
    };

    let filtered = recipes::filter_recipes(&all, listing.query, &selected);
    let per_page = state.config.content.recipes_per_page;
    let total = filtered.len();
    let total_pages = total.div_ceil(per_page).max(1);
    let page = clamp_page(query.page, total_pages);

    let cards: Vec<RecipeCard> = filtered
        .into_iter()
        .skip((page - 1) * per_page)
        .take(per_page)
        .map(|r| {
            RecipeCard::new(
                r,
                state.thumbnail_base(),
                state.config.content.card_tags,
                &listing,
            )
        })
        .collect();

    let mut ctx = make_context(&state);
    ctx.insert("cards", &cards);
    ctx.insert("tags", &tag_chips(recipes::collect_tags(&all), &listing));
    ctx.insert("selected_tags", &selected);
    ctx.insert("query", listing.query.unwrap_or(""));
    ctx.insert("clear_href", &listing.href(&[], 1));
    ctx.insert("total", &total);
    ctx.insert("page", &page);
    ctx.insert("total_pages", &total_pages);
    ctx.insert(
        "prev_href",
        &(page > 1).then(|| listing.page_href(page - 1)),
    );
    ctx.insert(
        "next_href",
        &(page < total_pages).then(|| listing.page_href(page + 1)),
    );

    let html = state.templates.render("public/index.html", &ctx)?;
    Ok(Html(html))
}

pub async fn recipe(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> AppResult<Response> {
    if !is_canonical_slug(&slug) {
        return not_found_page(&state);
    }

    let all = state.source.fetch_recipes().await?;

    match recipes::find_by_slug(&all, &slug) {
        Some(recipe) => {
            let listing = ListingState::default();
            let card = RecipeCard::new(
                recipe,
                state.thumbnail_base(),
                usize::MAX,
                &listing,
            );
            let instructions_html = recipe
                .instructions
                .as_deref()
                .filter(|md| !md.trim().is_empty())
                .map(|md| state.markdown.render(md));

            let mut ctx = make_context(&state);
            ctx.insert("recipe", recipe);
            ctx.insert("card", &card);
            ctx.insert("instructions_html", &instructions_html);
            ctx.insert("canonical_path", &recipe_path(&slug));

            let html = state.templates.render("public/recipe.html", &ctx)?;
            Ok(Html(html).into_response())
        }
        None => {
            tracing::debug!("No recipe matches slug '{}'", slug);
            not_found_page(&state)
        }
    }
}

fn not_found_page(state: &AppState) -> AppResult<Response> {
    let ctx = make_context(state);
    let html = state.templates.render("public/404.html", &ctx)?;
    Ok((StatusCode::NOT_FOUND, Html(html)).into_response())
}

pub async fn not_found(State(state): State<Arc<AppState>>) -> AppResult<Response> {
    not_found_page(&state)
}

/// The "Tak tahu nak masak apa?" button. When there is nowhere to go the
/// browser gets 204 and stays on the page it was on.
pub async fn random(State(state): State<Arc<AppState>>) -> Response {
    match random::random_destination(&state.source).await {
        Some(path) => Redirect::to(&path).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

pub async fn sitemap(State(state): State<Arc<AppState>>) -> AppResult<Response> {
    let all = state.source.fetch_recipes().await?;
    let index = recipes::SlugIndex::from_recipes(&all);
    let base = state.config.site.url.trim_end_matches('/');

    let mut urls = String::new();

    urls.push_str(&format!(
        r#"  <url>
    <loc>{}/</loc>
    <changefreq>daily</changefreq>
    <priority>1.0</priority>
  </url>
"#,
        xml_escape(base)
    ));

    for (pos, recipe) in all.iter().enumerate() {
        if !index.is_reachable(pos) {
            continue;
        }
        let Some(path) = index.slug_at(pos).and_then(recipe_path) else {
            continue;
        };
        let lastmod = recipe
            .created_at
            .as_deref()
            .and_then(|d| d.split(['T', ' ']).next())
            .map(|d| format!("\n    <lastmod>{}</lastmod>", xml_escape(d)))
            .unwrap_or_default();
        urls.push_str(&format!(
            r#"  <url>
    <loc>{}{}</loc>{}
    <changefreq>weekly</changefreq>
    <priority>0.8</priority>
  </url>
"#,
            xml_escape(base),
            path,
            lastmod
        ));
    }

    let sitemap = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
{}</urlset>"#,
        urls
    );

    Ok((
        [(header::CONTENT_TYPE, "application/xml; charset=utf-8")],
        sitemap,
    )
        .into_response())
}

pub async fn robots(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let body = format!(
        "User-agent: *\nAllow: /\nDisallow: /rawak\nDisallow: /api/\n\nSitemap: {}/sitemap.xml\n",
        state.config.site.url.trim_end_matches('/')
    );
    ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], body)
}

pub async fn health() -> &'static str {
    "ok"
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
