pub mod bookmarks;
pub mod health;
pub mod recipes;

use axum::{http::StatusCode, response::IntoResponse, response::Response, Json};
use larder_core::CatalogError;
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

/// Shared error response used by all endpoints
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

/// Map a catalog failure to a response. Details go to the log, not the client.
pub fn catalog_error_response(err: &CatalogError, context: &str) -> Response {
    match err {
        CatalogError::Unavailable(_) => {
            tracing::warn!(error = %err, "{}", context);
            error_response(StatusCode::SERVICE_UNAVAILABLE, "Catalog unavailable")
        }
        CatalogError::Database(_) | CatalogError::Conflict(_) => {
            tracing::error!(error = %err, "{}", context);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, context)
        }
    }
}

/// Generate the complete OpenAPI spec by merging all module specs
pub fn openapi() -> utoipa::openapi::OpenApi {
    #[derive(OpenApi)]
    #[openapi(
        info(title = "Larder API", description = "Ingredient-overlap recipe search"),
        components(schemas(ErrorResponse))
    )]
    struct BaseApi;

    let mut spec = BaseApi::openapi();

    let modules: Vec<utoipa::openapi::OpenApi> = vec![
        health::ApiDoc::openapi(),
        recipes::ApiDoc::openapi(),
        bookmarks::ApiDoc::openapi(),
    ];

    for module_spec in modules {
        spec.paths.paths.extend(module_spec.paths.paths);

        if let Some(module_components) = module_spec.components {
            if let Some(spec_components) = spec.components.as_mut() {
                spec_components.schemas.extend(module_components.schemas);
            }
        }
    }

    spec
}
