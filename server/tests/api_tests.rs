//! Router tests against an in-memory catalog.

use std::collections::BTreeSet;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use larder_core::types::{
    BookmarkOwner, CandidateRecipe, RecipeDetail, RecipeId, RecipeSummary, TagMatch,
};
use larder_core::{
    load, CatalogError, CatalogStore, CatalogWriter, Cell, LoadOptions, MemoryCatalog, Table,
};
use larder_server::app;
use serde_json::{json, Value};
use tower::ServiceExt;

fn seeded_app() -> Router {
    let catalog = MemoryCatalog::new();
    let table = Table::new(
        vec![
            "title".to_string(),
            "ingredients".to_string(),
            "tags".to_string(),
            "prep".to_string(),
        ],
        vec![
            vec![
                Cell::text("Omelette"),
                Cell::text("Eggs, Milk"),
                Cell::text("breakfast"),
                Cell::text("PT10M"),
            ],
            vec![
                Cell::text("Pancakes"),
                Cell::text("eggs, milk, flour, sugar"),
                Cell::text("breakfast, sweet"),
                Cell::text("25"),
            ],
            vec![
                Cell::text("Tomato Salad"),
                Cell::text("tomatoes, basil"),
                Cell::Empty,
                Cell::Empty,
            ],
        ],
    );
    load(&catalog, &table, LoadOptions::default()).unwrap();
    app(Arc::new(catalog))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_health_ok() {
    let app = seeded_app();
    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok", "backend": "memory"}));
}

#[tokio::test]
async fn test_search_ranks_by_overlap() {
    let app = seeded_app();
    let (status, body) = send(
        &app,
        post_json("/api/recipes/search", json!({"ingredients": ["eggs"]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["title"], "Omelette");
    assert_eq!(results[0]["match_count"], 1);
    assert_eq!(results[0]["match_pct"], 0.5);
    assert_eq!(results[0]["prep_time_min"], 10);
    assert_eq!(results[1]["title"], "Pancakes");
    assert_eq!(results[1]["match_pct"], 0.25);
}

#[tokio::test]
async fn test_search_tags_and_limit() {
    let app = seeded_app();

    let (_, body) = send(
        &app,
        post_json(
            "/api/recipes/search",
            json!({"ingredients": ["eggs", "milk"], "tags": ["Sweet"]}),
        ),
    )
    .await;
    let titles: Vec<&str> = body["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Pancakes"]);

    let (_, body) = send(
        &app,
        post_json(
            "/api/recipes/search",
            json!({"ingredients": ["eggs", "tomatoes"], "limit": 0}),
        ),
    )
    .await;
    assert_eq!(body["results"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_search_with_only_stop_words_is_empty() {
    let app = seeded_app();
    let (status, body) = send(
        &app,
        post_json(
            "/api/recipes/search",
            json!({"ingredients": ["cups", "  ", "fresh"]}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"results": []}));
}

#[tokio::test]
async fn test_search_rejects_missing_ingredients() {
    let app = seeded_app();
    let (status, _) = send(&app, post_json("/api/recipes/search", json!({"tags": ["x"]}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_get_recipe_and_not_found() {
    let app = seeded_app();

    let (status, body) = send(&app, get("/api/recipes/1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Omelette");
    assert_eq!(body["ingredients"][0], json!({"display": "Eggs", "normalized": "eggs"}));
    assert_eq!(body["normalized_tags"], json!(["breakfast"]));

    let (status, body) = send(&app, get("/api/recipes/999")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Recipe not found"}));
}

#[tokio::test]
async fn test_bookmarks_by_device() {
    let app = seeded_app();
    let bookmark = |recipe_id: i64| {
        Request::builder()
            .method("POST")
            .uri("/api/bookmarks")
            .header(header::CONTENT_TYPE, "application/json")
            .header("X-Device-Key", "phone-1")
            .body(Body::from(json!({ "recipe_id": recipe_id }).to_string()))
            .unwrap()
    };

    let (status, body) = send(&app, bookmark(2)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({"created": true}));

    let (status, body) = send(&app, bookmark(2)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"created": false}));

    let (status, _) = send(&app, bookmark(404)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let list = Request::builder()
        .uri("/api/bookmarks")
        .header("X-Device-Key", "phone-1")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, list).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"recipe_ids": [2]}));

    let (status, body) = send(&app, get("/api/bookmarks")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"error": "Missing X-User-Id or X-Device-Key header"})
    );
}

#[tokio::test]
async fn test_openapi_document_served() {
    let app = seeded_app();
    let (status, body) = send(&app, get("/api-docs/openapi.json")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/recipes/search"].is_object());
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let app = seeded_app();
    let request = Request::builder()
        .uri("/health")
        .header(header::ORIGIN, "https://example.org")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
}

/// A catalog whose backing store is gone.
#[derive(Debug)]
struct UnreachableCatalog;

impl CatalogStore for UnreachableCatalog {
    fn backend_name(&self) -> &'static str {
        "unreachable"
    }

    fn ping(&self) -> Result<(), CatalogError> {
        Err(CatalogError::Unavailable("connection refused".to_string()))
    }

    fn write(
        &self,
        _f: &mut dyn FnMut(&mut dyn CatalogWriter) -> Result<(), CatalogError>,
    ) -> Result<(), CatalogError> {
        self.ping()
    }

    fn find_by_normalized_ingredients(
        &self,
        _keys: &BTreeSet<String>,
    ) -> Result<Vec<CandidateRecipe>, CatalogError> {
        Err(CatalogError::Unavailable("connection refused".to_string()))
    }

    fn find_by_normalized_tags(
        &self,
        _keys: &BTreeSet<String>,
        _mode: TagMatch,
    ) -> Result<Vec<RecipeId>, CatalogError> {
        Err(CatalogError::Unavailable("connection refused".to_string()))
    }

    fn recipe_summaries(&self, _ids: &[RecipeId]) -> Result<Vec<RecipeSummary>, CatalogError> {
        Err(CatalogError::Unavailable("connection refused".to_string()))
    }

    fn get_recipe(&self, _id: RecipeId) -> Result<Option<RecipeDetail>, CatalogError> {
        Err(CatalogError::Unavailable("connection refused".to_string()))
    }

    fn add_bookmark(
        &self,
        _owner: &BookmarkOwner,
        _recipe: RecipeId,
    ) -> Result<bool, CatalogError> {
        Err(CatalogError::Unavailable("connection refused".to_string()))
    }

    fn bookmarks(&self, _owner: &BookmarkOwner) -> Result<Vec<RecipeId>, CatalogError> {
        Err(CatalogError::Unavailable("connection refused".to_string()))
    }
}

#[tokio::test]
async fn test_unreachable_catalog_degrades() {
    let app = app(Arc::new(UnreachableCatalog));

    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "degraded");
    assert!(body["error"].as_str().unwrap().contains("connection refused"));

    let (status, body) = send(
        &app,
        post_json("/api/recipes/search", json!({"ingredients": ["eggs"]})),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body, json!({"error": "Catalog unavailable"}));

    let (status, _) = send(&app, get("/api/recipes/1")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}
