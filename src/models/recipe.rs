use serde::{Deserialize, Deserializer, Serialize};

/// A recipe row as supplied by the data service.
///
/// Titles are free text and not guaranteed unique. Every optional field may be
/// absent (or `null` from the hosted service). A `null` title or list reads as
/// empty, so such a row derives no slug and is simply unroutable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub total_time_minutes: Option<i64>,
    #[serde(default)]
    pub servings: Option<i64>,
    #[serde(default)]
    pub difficulty_level: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Recipe {
    pub fn has_any_tag(&self, selected: &[String]) -> bool {
        self.tags
            .iter()
            .any(|t| selected.iter().any(|s| s.as_str() == t.trim()))
    }
}

/// The minimal projection fetched for the random pick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeRef {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
}

impl From<&Recipe> for RecipeRef {
    fn from(recipe: &Recipe) -> Self {
        Self {
            id: recipe.id,
            title: Some(recipe.title.clone()),
            thumbnail_url: recipe.thumbnail_url.clone(),
        }
    }
}

/// Input for inserting into the local store, as read by `resepi import`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewRecipe {
    #[serde(default)]
    pub id: Option<i64>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub total_time_minutes: Option<i64>,
    #[serde(default)]
    pub servings: Option<i64>,
    #[serde(default)]
    pub difficulty_level: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub instructions: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyTone {
    Easy,
    Medium,
    Hard,
}

impl DifficultyTone {
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "mudah" => Self::Easy,
            "sederhana" => Self::Medium,
            _ => Self::Hard,
        }
    }
}

impl std::fmt::Display for DifficultyTone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Easy => write!(f, "easy"),
            Self::Medium => write!(f, "medium"),
            Self::Hard => write!(f, "hard"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount {
    pub name: String,
    pub count: usize,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
