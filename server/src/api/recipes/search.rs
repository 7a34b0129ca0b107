use crate::api::{catalog_error_response, ErrorResponse};
use crate::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use larder_core::types::RecipeMatch;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 50;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SearchRequest {
    /// Ingredients on hand, free text ("2 ripe tomatoes" is fine)
    pub ingredients: Vec<String>,
    /// Every listed tag must be present on a result
    #[serde(default)]
    pub tags: Vec<String>,
    /// Maximum number of results (default: 10, clamped to 1..=50)
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeMatchResponse {
    pub recipe_id: i64,
    pub title: String,
    pub image_url: Option<String>,
    pub prep_time_min: Option<u32>,
    pub cuisine: Option<String>,
    /// Query ingredients found in the recipe
    pub match_count: usize,
    /// match_count divided by the recipe's ingredient count
    pub match_pct: f64,
}

impl From<RecipeMatch> for RecipeMatchResponse {
    fn from(m: RecipeMatch) -> Self {
        Self {
            recipe_id: m.recipe_id,
            title: m.title,
            image_url: m.image_url,
            prep_time_min: m.prep_time_min,
            cuisine: m.cuisine,
            match_count: m.match_count,
            match_pct: m.match_pct,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SearchResponse {
    pub results: Vec<RecipeMatchResponse>,
}

fn effective_limit(requested: Option<i64>) -> usize {
    requested.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT) as usize
}

#[utoipa::path(
    post,
    path = "/api/recipes/search",
    tag = "recipes",
    request_body = SearchRequest,
    responses(
        (status = 200, description = "Ranked matches, best first", body = SearchResponse),
        (status = 500, description = "Catalog query failed", body = ErrorResponse),
        (status = 503, description = "Catalog unavailable", body = ErrorResponse)
    )
)]
pub async fn search_recipes(
    State(catalog): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> impl IntoResponse {
    let limit = effective_limit(request.limit);

    match larder_core::rank(catalog.as_ref(), &request.ingredients, &request.tags, limit) {
        Ok(matches) => (
            StatusCode::OK,
            Json(SearchResponse {
                results: matches.into_iter().map(Into::into).collect(),
            }),
        )
            .into_response(),
        Err(err) => catalog_error_response(&err, "Failed to search recipes"),
    }
}
