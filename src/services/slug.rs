use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("Invalid whitespace regex pattern"));
static NOT_SLUG_CHAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9-]").expect("Invalid slug charset regex pattern"));
static HYPHEN_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-{2,}").expect("Invalid hyphen regex pattern"));

pub const RECIPE_PATH_PREFIX: &str = "/resepi/";

/// Derive the URL slug for a recipe title.
///
/// Slugs are never stored; every link and every detail-page lookup recomputes
/// them from the title, so this must stay stable byte-for-byte. Characters
/// outside `[a-z0-9-]` are dropped rather than transliterated.
pub fn derive_slug(title: &str) -> String {
    let lowered = title.to_lowercase();
    let hyphenated = WHITESPACE_RUN.replace_all(lowered.trim(), "-");
    let stripped = NOT_SLUG_CHAR.replace_all(&hyphenated, "");
    let collapsed = HYPHEN_RUN.replace_all(&stripped, "-");
    collapsed.trim_matches('-').to_string()
}

/// A slug that `derive_slug` could have produced for some title and that
/// points somewhere.
pub fn is_canonical_slug(slug: &str) -> bool {
    !slug.is_empty() && derive_slug(slug) == slug
}

/// Path of the detail page for a slug. The empty slug has no destination.
pub fn recipe_path(slug: &str) -> Option<String> {
    if slug.is_empty() {
        None
    } else {
        Some(format!("{}{}", RECIPE_PATH_PREFIX, slug))
    }
}
