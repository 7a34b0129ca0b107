use crate::AppState;
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HealthResponse {
    /// "ok" when the catalog answered, "degraded" otherwise
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service status; reports degraded when the catalog is unreachable", body = HealthResponse)
    )
)]
pub async fn health(State(catalog): State<AppState>) -> Json<HealthResponse> {
    let response = match catalog.ping() {
        Ok(()) => HealthResponse {
            status: "ok".to_string(),
            backend: Some(catalog.backend_name().to_string()),
            error: None,
        },
        Err(err) => {
            tracing::warn!(error = %err, "health check failed");
            HealthResponse {
                status: "degraded".to_string(),
                backend: None,
                error: Some(err.to_string()),
            }
        }
    };
    Json(response)
}

#[derive(OpenApi)]
#[openapi(paths(health), components(schemas(HealthResponse)))]
pub struct ApiDoc;
