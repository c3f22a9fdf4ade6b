use crate::services::display::format_time;
use crate::services::markdown::MarkdownRenderer;
use crate::services::RecipeSource;
use crate::Config;
use anyhow::Result;
use std::collections::HashMap;
use tera::{Tera, Value};

pub struct AppState {
    pub config: Config,
    pub source: RecipeSource,
    pub templates: Tera,
    pub markdown: MarkdownRenderer,
}

impl AppState {
    pub fn new(config: Config, source: RecipeSource) -> Result<Self> {
        let mut templates = Tera::default();

        templates.register_filter("format_date", format_date_filter);
        templates.register_filter("format_time", format_time_filter);
        templates.add_raw_templates(vec![
            ("base.html", include_str!("../../templates/base.html")),
            ("public/index.html", include_str!("../../templates/public/index.html")),
            ("public/recipe.html", include_str!("../../templates/public/recipe.html")),
            ("public/404.html", include_str!("../../templates/public/404.html")),
        ])?;

        Ok(Self {
            config,
            source,
            templates,
            markdown: MarkdownRenderer::new(),
        })
    }

    pub fn thumbnail_base(&self) -> Option<&str> {
        self.config.media.thumbnail_base_url.as_deref()
    }
}

fn format_date_filter(value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
    let date_str = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("format_date requires a string"))?;

    let format = args
        .get("format")
        .and_then(|v| v.as_str())
        .unwrap_or("%d/%m/%Y");

    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(date_str) {
        return Ok(Value::String(dt.format(format).to_string()));
    }

    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(date_str, "%Y-%m-%d %H:%M:%S") {
        return Ok(Value::String(dt.format(format).to_string()));
    }

    Ok(Value::String(date_str.to_string()))
}

fn format_time_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let label = format_time(value.as_i64()).unwrap_or_default();
    Ok(Value::String(label))
}
