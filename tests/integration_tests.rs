use resepi::cli::import::import_recipes;
use resepi::models::NewRecipe;
use resepi::services::{random, recipes, RecipeSource};
use resepi::{Config, Database};

fn create_test_db() -> Database {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    let id: u32 = rng.gen();
    let name = format!("test_db_{}", id);

    let db = Database::open_memory(&name).expect("Failed to create test database");
    db.migrate().expect("Failed to run migrations");
    db
}

/// A store whose tables were never created, so every read fails.
fn create_broken_db() -> Database {
    use rand::Rng;
    let id: u32 = rand::thread_rng().gen();
    Database::open_memory(&format!("broken_db_{}", id)).expect("Failed to create test database")
}

fn new_recipe(title: &str) -> NewRecipe {
    NewRecipe {
        title: title.to_string(),
        ..Default::default()
    }
}

fn test_config() -> Config {
    Config::parse(
        r#"
[site]
title = "Resepi Ujian"
description = "Koleksi resepi ujian"
url = "https://resepi.example"

[database]
path = "unused.db"

[content]
recipes_per_page = 2

[media]
thumbnail_base_url = "https://cdn.example.com/thumbs/"
"#,
    )
    .expect("test config should parse")
}

mod recipe_store_tests {
    use super::*;

    #[test]
    fn test_create_and_get_recipe() {
        let db = create_test_db();

        let id = recipes::create_recipe(
            &db,
            &NewRecipe {
                title: "Ayam Masak Merah".to_string(),
                description: Some("Ayam dalam kuah tomato pedas".to_string()),
                thumbnail_url: Some("ayam.jpg".to_string()),
                total_time_minutes: Some(60),
                servings: Some(4),
                difficulty_level: Some("Sederhana".to_string()),
                tags: vec!["ayam".into(), "pedas".into(), "ayam".into()],
                ingredients: vec!["1 ekor ayam".into(), "3 sudu cili kisar".into()],
                instructions: Some("1. Goreng ayam\n2. Masak kuah".to_string()),
                ..Default::default()
            },
        )
        .expect("Failed to create recipe");

        let recipe = recipes::get_recipe(&db, id)
            .expect("Query error")
            .expect("Recipe should exist");

        assert_eq!(recipe.title, "Ayam Masak Merah");
        assert_eq!(recipe.servings, Some(4));
        assert_eq!(recipe.tags, vec!["ayam", "pedas", "ayam"]);
        assert_eq!(recipe.ingredients.len(), 2);
        assert!(recipe.created_at.is_some());
    }

    #[test]
    fn test_get_missing_recipe() {
        let db = create_test_db();
        assert!(recipes::get_recipe(&db, 42).unwrap().is_none());
    }

    #[test]
    fn test_list_in_id_order() {
        let db = create_test_db();
        for title in ["Nasi Lemak", "Rendang", "Laksa"] {
            recipes::create_recipe(&db, &new_recipe(title)).unwrap();
        }

        let titles: Vec<String> = recipes::list_recipes(&db)
            .unwrap()
            .into_iter()
            .map(|r| r.title)
            .collect();
        assert_eq!(titles, vec!["Nasi Lemak", "Rendang", "Laksa"]);

        let refs = recipes::list_recipe_refs(&db).unwrap();
        assert_eq!(refs.len(), 3);
        assert_eq!(refs[1].title.as_deref(), Some("Rendang"));
        assert_eq!(recipes::count_recipes(&db).unwrap(), 3);
    }

    #[test]
    fn test_upsert_replaces_by_id() {
        let db = create_test_db();
        let mut input = new_recipe("Roti Jala");
        input.id = Some(10);
        recipes::upsert_recipe(&db, &input).unwrap();

        input.title = "Roti Jala Kari".to_string();
        recipes::upsert_recipe(&db, &input).unwrap();

        let all = recipes::list_recipes(&db).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, 10);
        assert_eq!(all[0].title, "Roti Jala Kari");
    }

    #[test]
    fn test_delete_recipe() {
        let db = create_test_db();
        let id = recipes::create_recipe(&db, &new_recipe("Cendol")).unwrap();

        assert!(recipes::delete_recipe(&db, id).unwrap());
        assert!(!recipes::delete_recipe(&db, id).unwrap());
        assert_eq!(recipes::count_recipes(&db).unwrap(), 0);
    }

    #[test]
    fn test_migrate_twice() {
        let db = create_test_db();
        db.migrate().expect("Second migration run should be a no-op");
    }
}

mod source_tests {
    use super::*;

    #[tokio::test]
    async fn test_local_source_fetches_rows() {
        let db = create_test_db();
        recipes::create_recipe(&db, &new_recipe("Kuih Ketayap (Pandan)")).unwrap();
        let source = RecipeSource::Local(db);

        let all = source.fetch_recipes().await.unwrap();
        assert_eq!(all.len(), 1);
        let found = recipes::find_by_slug(&all, "kuih-ketayap-pandan");
        assert_eq!(found.map(|r| r.title.as_str()), Some("Kuih Ketayap (Pandan)"));
    }

    #[tokio::test]
    async fn test_random_over_empty_dataset_goes_nowhere() {
        let source = RecipeSource::Local(create_test_db());
        assert_eq!(random::random_destination(&source).await, None);
    }

    #[tokio::test]
    async fn test_random_single_recipe() {
        let db = create_test_db();
        recipes::create_recipe(&db, &new_recipe("Ayam Masak Merah")).unwrap();
        let source = RecipeSource::Local(db);

        assert_eq!(
            random::random_destination(&source).await.as_deref(),
            Some("/resepi/ayam-masak-merah")
        );
    }

    #[tokio::test]
    async fn test_random_unroutable_title_goes_nowhere() {
        let db = create_test_db();
        recipes::create_recipe(&db, &new_recipe("!!!")).unwrap();
        let source = RecipeSource::Local(db);

        assert_eq!(random::random_destination(&source).await, None);
    }

    #[tokio::test]
    async fn test_random_swallows_fetch_failure() {
        let source = RecipeSource::Local(create_broken_db());

        assert!(source.fetch_refs().await.is_err());
        assert_eq!(random::random_destination(&source).await, None);
    }
}

mod import_tests {
    use super::*;

    #[test]
    fn test_import_reports_slug_problems() {
        let db = create_test_db();
        let input = vec![
            new_recipe("Nasi Lemak"),
            new_recipe("nasi lemak!!"),
            new_recipe("???"),
            new_recipe("   "),
        ];

        let report = import_recipes(&db, &input, false).unwrap();

        assert_eq!(report.imported, 3);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.shadowed, vec!["nasi lemak!!"]);
        assert_eq!(report.unroutable, vec!["???"]);
    }

    #[test]
    fn test_import_skips_existing_ids_unless_overwriting() {
        let db = create_test_db();
        let mut first = new_recipe("Rendang");
        first.id = Some(1);
        import_recipes(&db, &[first], false).unwrap();

        let mut updated = new_recipe("Rendang Tok");
        updated.id = Some(1);

        let report = import_recipes(&db, &[updated.clone()], false).unwrap();
        assert_eq!(report.skipped, 1);
        assert_eq!(recipes::get_recipe(&db, 1).unwrap().unwrap().title, "Rendang");

        let report = import_recipes(&db, &[updated], true).unwrap();
        assert_eq!(report.imported, 1);
        assert!(report.shadowed.is_empty());
        assert_eq!(recipes::get_recipe(&db, 1).unwrap().unwrap().title, "Rendang Tok");
    }

    #[test]
    fn test_import_json_shape() {
        let json = r#"[
            {"id": 7, "title": "Laksa Penang", "tags": null, "servings": 2},
            {"title": "Cendol", "tags": ["manis"], "thumbnail_url": null}
        ]"#;
        let input: Vec<NewRecipe> = serde_json::from_str(json).unwrap();
        let db = create_test_db();

        let report = import_recipes(&db, &input, false).unwrap();
        assert_eq!(report.imported, 2);

        let laksa = recipes::get_recipe(&db, 7).unwrap().unwrap();
        assert!(laksa.tags.is_empty());
        assert_eq!(laksa.servings, Some(2));
    }
}

mod web_tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::Router;
    use resepi::web::{router, AppState};
    use std::sync::Arc;
    use tower::ServiceExt;

    /// Each entry is a title and its space-separated tags.
    fn app_with(titles: &[(&str, &str)]) -> Router {
        let db = create_test_db();
        for (title, tags) in titles {
            recipes::create_recipe(
                &db,
                &NewRecipe {
                    title: title.to_string(),
                    description: Some(format!("Penerangan {}", title)),
                    thumbnail_url: Some("gambar.jpg".to_string()),
                    total_time_minutes: Some(30),
                    tags: tags.split_whitespace().map(String::from).collect(),
                    instructions: Some("## Langkah\n\n1. Masak".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        }
        let state = AppState::new(test_config(), RecipeSource::Local(db)).unwrap();
        router(Arc::new(state))
    }

    async fn get(app: &Router, uri: &str) -> (StatusCode, String) {
        send(app, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, String) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8_lossy(&bytes).to_string())
    }

    #[tokio::test]
    async fn test_index_lists_cards() {
        let app = app_with(&[("Ayam Masak Merah", "ayam"), ("Nasi Lemak", "nasi")]);

        let (status, body) = get(&app, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Ayam Masak Merah"));
        assert!(body.contains("ayam-masak-merah"));
        assert!(body.contains("Nasi Lemak"));
        assert!(body.contains("30 minit"));
        assert!(body.contains("gambar.jpg"));
    }

    #[tokio::test]
    async fn test_index_tag_filter() {
        let app = app_with(&[("Ayam Masak Merah", "ayam"), ("Nasi Lemak", "nasi")]);

        let (status, body) = get(&app, "/?tag=nasi").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Nasi Lemak"));
        assert!(!body.contains("Ayam Masak Merah"));
    }

    #[tokio::test]
    async fn test_index_paginates() {
        let app = app_with(&[("Satu", ""), ("Dua", ""), ("Tiga", "")]);

        let (_, first) = get(&app, "/").await;
        assert!(first.contains("Satu") && first.contains("Dua"));
        assert!(!first.contains("Tiga"));

        let (status, second) = get(&app, "/?page=2").await;
        assert_eq!(status, StatusCode::OK);
        assert!(second.contains("Tiga"));
    }

    #[tokio::test]
    async fn test_recipe_detail() {
        let app = app_with(&[("Kuih Ketayap (Pandan)", "kuih")]);

        let (status, body) = get(&app, "/resepi/kuih-ketayap-pandan").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Kuih Ketayap (Pandan)"));
        assert!(body.contains("Penerangan Kuih Ketayap (Pandan)"));
        assert!(body.contains(r#"id="langkah""#));
    }

    #[tokio::test]
    async fn test_recipe_detail_first_match_wins() {
        let app = app_with(&[("Nasi Lemak", ""), ("nasi lemak!!", "")]);

        let (status, body) = get(&app, "/resepi/nasi-lemak").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Penerangan Nasi Lemak"));
        assert!(!body.contains("Penerangan nasi lemak!!"));
    }

    #[tokio::test]
    async fn test_recipe_not_found() {
        let app = app_with(&[("Nasi Lemak", "")]);

        let (status, body) = get(&app, "/resepi/rendang").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("Resepi tidak dijumpai"));

        let (status, _) = get(&app, "/resepi/Nasi-Lemak").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unknown_route_renders_not_found() {
        let app = app_with(&[]);
        let (status, body) = get(&app, "/tiada/di/sini").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("Resepi tidak dijumpai"));
    }

    #[tokio::test]
    async fn test_random_redirects_to_recipe() {
        let app = app_with(&[("Ayam Masak Merah", "")]);

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/rawak")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/resepi/ayam-masak-merah"
        );
    }

    #[tokio::test]
    async fn test_random_on_empty_dataset_does_nothing() {
        let app = app_with(&[]);

        let (status, body) = get(&app, "/rawak").await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_random_button_recovers_when_nothing_is_picked() {
        let app = app_with(&[]);

        let (_, page) = get(&app, "/").await;
        assert!(page.contains("fetch('/api/random'"));
        assert!(page.contains("button.disabled = false;"));
        assert!(page.contains("button.textContent = label;"));

        let (status, body) = get(&app, "/api/random").await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_api_random_returns_path() {
        let app = app_with(&[("Ayam Masak Merah", "")]);

        let (status, body) = get(&app, "/api/random").await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["data"]["path"], "/resepi/ayam-masak-merah");
    }

    #[tokio::test]
    async fn test_random_when_store_fails_does_nothing() {
        let state = AppState::new(test_config(), RecipeSource::Local(create_broken_db())).unwrap();
        let app = router(Arc::new(state));

        let request = Request::builder()
            .method("POST")
            .uri("/rawak")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_api_recipe_by_slug() {
        let app = app_with(&[("Ayam Masak Merah", "ayam")]);

        let (status, body) = get(&app, "/api/recipes/ayam-masak-merah").await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["data"]["slug"], "ayam-masak-merah");
        assert_eq!(json["data"]["path"], "/resepi/ayam-masak-merah");
        assert_eq!(json["data"]["title"], "Ayam Masak Merah");
        assert_eq!(json["data"]["thumbnail"], "https://cdn.example.com/thumbs/gambar.jpg");

        let (status, _) = get(&app, "/api/recipes/rendang").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_api_list_meta() {
        let app = app_with(&[("Satu", ""), ("Dua", ""), ("Tiga", "")]);

        let (status, body) = get(&app, "/api/recipes?per_page=2&page=2").await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["meta"]["total"], 3);
        assert_eq!(json["data"].as_array().unwrap().len(), 1);
        assert_eq!(json["data"][0]["slug"], "tiga");
    }

    #[tokio::test]
    async fn test_sitemap_skips_shadowed_and_unroutable() {
        let app = app_with(&[("Nasi Lemak", ""), ("nasi lemak!!", ""), ("???", ""), ("Rendang", "")]);

        let (status, body) = get(&app, "/sitemap.xml").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.matches("/resepi/nasi-lemak</loc>").count(), 1);
        assert!(body.contains("https://resepi.example/resepi/rendang</loc>"));
        assert_eq!(body.matches("<url>").count(), 3);
    }

    #[tokio::test]
    async fn test_security_headers_applied() {
        let app = app_with(&[]);
        let response = app
            .clone()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::X_CONTENT_TYPE_OPTIONS).unwrap(),
            "nosniff"
        );
    }
}
