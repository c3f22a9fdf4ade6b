use crate::models::{DifficultyTone, Recipe};
use crate::services::slug::{derive_slug, recipe_path};
use serde::Serialize;
use url::{form_urlencoded, Url};

/// Human-readable cooking time. Missing or non-positive values are not shown.
pub fn format_time(minutes: Option<i64>) -> Option<String> {
    let minutes = minutes.filter(|m| *m > 0)?;
    let (hours, rest) = (minutes / 60, minutes % 60);
    let label = match (hours, rest) {
        (0, m) => format!("{} minit", m),
        (h, 0) => format!("{} jam", h),
        (h, m) => format!("{} jam {} minit", h, m),
    };
    Some(label)
}

/// Resolve a stored thumbnail reference to a URL the browser can load.
///
/// `None` means the page shows the placeholder image instead.
pub fn thumbnail_url(raw: Option<&str>, base: Option<&str>) -> Option<String> {
    let raw = raw.map(str::trim).filter(|r| !r.is_empty())?;

    if raw.starts_with("//") {
        return Some(format!("https:{}", raw));
    }

    if let Ok(url) = Url::parse(raw) {
        return match url.scheme() {
            "http" | "https" => Some(raw.to_string()),
            _ => None,
        };
    }

    let mut base = Url::parse(base?).ok()?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(raw.trim_start_matches('/'))
        .ok()
        .map(|u| u.to_string())
}

/// The filters a listing was requested with. Used to build links that keep
/// the search while toggling one tag or moving between pages.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListingState<'a> {
    pub query: Option<&'a str>,
    pub selected_tags: &'a [String],
}

impl<'a> ListingState<'a> {
    pub fn is_selected(&self, tag: &str) -> bool {
        self.selected_tags.iter().any(|s| s.as_str() == tag.trim())
    }

    pub fn href(&self, tags: &[&str], page: usize) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        if let Some(q) = self.query.map(str::trim).filter(|q| !q.is_empty()) {
            query.append_pair("q", q);
        }
        for tag in tags {
            query.append_pair("tag", tag);
        }
        if page > 1 {
            query.append_pair("page", &page.to_string());
        }
        let query = query.finish();
        if query.is_empty() {
            "/".to_string()
        } else {
            format!("/?{}", query)
        }
    }

    /// Link to the first page with `tag` added to or removed from the selection.
    pub fn toggle_href(&self, tag: &str) -> String {
        let tag = tag.trim();
        let mut tags: Vec<&str> = self
            .selected_tags
            .iter()
            .map(String::as_str)
            .filter(|s| *s != tag)
            .collect();
        if !self.is_selected(tag) {
            tags.push(tag);
        }
        self.href(&tags, 1)
    }

    pub fn page_href(&self, page: usize) -> String {
        let tags: Vec<&str> = self.selected_tags.iter().map(String::as_str).collect();
        self.href(&tags, page)
    }
}

/// Everything a recipe card needs, computed once per render.
#[derive(Debug, Clone, Serialize)]
pub struct RecipeCard<'a> {
    pub recipe: &'a Recipe,
    pub slug: String,
    pub path: Option<String>,
    pub thumbnail: Option<String>,
    pub time_label: Option<String>,
    pub servings: Option<i64>,
    pub tone: Option<DifficultyTone>,
    pub tags: Vec<CardTag>,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CardTag {
    pub name: String,
    pub active: bool,
    pub href: String,
}

impl<'a> RecipeCard<'a> {
    pub fn new(
        recipe: &'a Recipe,
        thumbnail_base: Option<&str>,
        tag_limit: usize,
        listing: &ListingState<'_>,
    ) -> Self {
        let slug = derive_slug(&recipe.title);
        let path = recipe_path(&slug);
        let tags = recipe
            .tags
            .iter()
            .take(tag_limit)
            .map(|t| CardTag {
                name: t.clone(),
                active: listing.is_selected(t),
                href: listing.toggle_href(t),
            })
            .collect();

        Self {
            recipe,
            slug,
            path,
            thumbnail: thumbnail_url(recipe.thumbnail_url.as_deref(), thumbnail_base),
            time_label: format_time(recipe.total_time_minutes),
            servings: recipe.servings.filter(|s| *s > 0),
            tone: recipe
                .difficulty_level
                .as_deref()
                .filter(|d| !d.trim().is_empty())
                .map(DifficultyTone::from_label),
            tags,
            active: recipe.has_any_tag(listing.selected_tags),
        }
    }
}
