pub mod get;
pub mod search;

use crate::AppState;
use axum::routing::{get, post};
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for /api/recipes endpoints (mounted at /api/recipes)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/search", post(search::search_recipes))
        .route("/{id}", get(get::get_recipe))
}

#[derive(OpenApi)]
#[openapi(
    paths(search::search_recipes, get::get_recipe),
    components(schemas(
        search::SearchRequest,
        search::SearchResponse,
        search::RecipeMatchResponse,
        get::RecipeResponse,
        get::IngredientResponse,
        get::TagResponse,
    ))
)]
pub struct ApiDoc;
