use crate::api::{catalog_error_response, error_response, ErrorResponse};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use larder_core::types::{IngredientEntry, RecipeDetail, TagEntry};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct IngredientResponse {
    pub display: String,
    pub normalized: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TagResponse {
    pub display: String,
    pub normalized: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeResponse {
    pub id: i64,
    pub external_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub prep_time_min: Option<u32>,
    pub cuisine: Option<String>,
    pub source_url: Option<String>,
    pub steps: Vec<String>,
    pub ingredients: Vec<IngredientResponse>,
    pub tags: Vec<TagResponse>,
    pub normalized_ingredients: Vec<String>,
    pub normalized_tags: Vec<String>,
}

impl From<IngredientEntry> for IngredientResponse {
    fn from(entry: IngredientEntry) -> Self {
        Self {
            display: entry.display,
            normalized: entry.normalized,
        }
    }
}

impl From<TagEntry> for TagResponse {
    fn from(entry: TagEntry) -> Self {
        Self {
            display: entry.display,
            normalized: entry.normalized,
            kind: entry.kind,
        }
    }
}

impl From<RecipeDetail> for RecipeResponse {
    fn from(detail: RecipeDetail) -> Self {
        Self {
            id: detail.id,
            external_id: detail.external_id,
            title: detail.title,
            description: detail.description,
            image_url: detail.image_url,
            prep_time_min: detail.prep_time_min,
            cuisine: detail.cuisine,
            source_url: detail.source_url,
            steps: detail.steps,
            ingredients: detail.ingredients.into_iter().map(Into::into).collect(),
            tags: detail.tags.into_iter().map(Into::into).collect(),
            normalized_ingredients: detail.normalized_ingredients.into_iter().collect(),
            normalized_tags: detail.normalized_tags.into_iter().collect(),
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/recipes/{id}",
    tag = "recipes",
    params(
        ("id" = i64, Path, description = "Recipe ID")
    ),
    responses(
        (status = 200, description = "Recipe details", body = RecipeResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse),
        (status = 503, description = "Catalog unavailable", body = ErrorResponse)
    )
)]
pub async fn get_recipe(
    State(catalog): State<AppState>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    match catalog.get_recipe(id) {
        Ok(Some(detail)) => (StatusCode::OK, Json(RecipeResponse::from(detail))).into_response(),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "Recipe not found"),
        Err(err) => catalog_error_response(&err, "Failed to fetch recipe"),
    }
}
