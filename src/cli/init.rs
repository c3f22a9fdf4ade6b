use anyhow::Result;
use std::path::PathBuf;

pub async fn run(path: PathBuf, name: Option<String>) -> Result<()> {
    let site_name = name.unwrap_or_else(|| "Resepi Saya".to_string());

    std::fs::create_dir_all(&path)?;
    std::fs::create_dir_all(path.join("data"))?;

    let config_path = path.join("resepi.toml");
    if config_path.exists() {
        anyhow::bail!("{} already exists", config_path.display());
    }

    std::fs::write(&config_path, default_config(&site_name))?;

    tracing::info!("Created new recipe site at {:?}", path);
    tracing::info!("Run 'resepi import <recipes.json>' to load recipes");
    tracing::info!("Run 'resepi serve' to start the server");

    Ok(())
}

pub fn default_config(site_name: &str) -> String {
    format!(
        r#"[site]
title = "{}"
description = "Koleksi resepi masakan"
url = "http://localhost:3000"
language = "ms"

[server]
host = "127.0.0.1"
port = 3000

[database]
path = "./data/resepi.db"

[source]
# "local" reads the SQLite database above; "remote" reads a hosted table.
backend = "local"

# [remote]
# url = "https://your-project.supabase.co"
# table = "recipes"
# api_key is read from RESEPI_API_KEY when not set here

[content]
recipes_per_page = 24
card_tags = 3

[media]
# thumbnail_base_url = "https://your-project.supabase.co/storage/v1/object/public/thumbnails/"
"#,
        site_name.replace('\\', "\\\\").replace('"', "\\\"")
    )
}
