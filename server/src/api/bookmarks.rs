use crate::api::{catalog_error_response, error_response, ErrorResponse};
use crate::AppState;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use larder_core::types::BookmarkOwner;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};

pub const USER_HEADER: &str = "x-user-id";
pub const DEVICE_HEADER: &str = "x-device-key";

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateBookmarkRequest {
    pub recipe_id: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CreateBookmarkResponse {
    /// False when the bookmark already existed
    pub created: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookmarksResponse {
    /// Oldest first
    pub recipe_ids: Vec<i64>,
}

/// Returns the router for /api/bookmarks (mounted at /api/bookmarks)
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_bookmarks).post(create_bookmark))
}

fn owner_from_headers(headers: &HeaderMap) -> Result<BookmarkOwner, Response> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    if let Some(user_id) = header(USER_HEADER) {
        return Ok(BookmarkOwner::User(user_id));
    }
    if let Some(device_key) = header(DEVICE_HEADER) {
        return Ok(BookmarkOwner::Device(device_key));
    }
    Err(error_response(
        StatusCode::BAD_REQUEST,
        "Missing X-User-Id or X-Device-Key header",
    ))
}

#[utoipa::path(
    post,
    path = "/api/bookmarks",
    tag = "bookmarks",
    request_body = CreateBookmarkRequest,
    params(
        ("X-User-Id" = Option<String>, Header, description = "Signed-in user id"),
        ("X-Device-Key" = Option<String>, Header, description = "Anonymous device key, used when no user id is sent")
    ),
    responses(
        (status = 201, description = "Bookmark created", body = CreateBookmarkResponse),
        (status = 200, description = "Bookmark already existed", body = CreateBookmarkResponse),
        (status = 400, description = "No owner header", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    )
)]
pub async fn create_bookmark(
    State(catalog): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreateBookmarkRequest>,
) -> impl IntoResponse {
    let owner = match owner_from_headers(&headers) {
        Ok(owner) => owner,
        Err(response) => return response,
    };

    match catalog.get_recipe(request.recipe_id) {
        Ok(Some(_)) => {}
        Ok(None) => return error_response(StatusCode::NOT_FOUND, "Recipe not found"),
        Err(err) => return catalog_error_response(&err, "Failed to fetch recipe"),
    }

    match catalog.add_bookmark(&owner, request.recipe_id) {
        Ok(created) => {
            let status = if created {
                StatusCode::CREATED
            } else {
                StatusCode::OK
            };
            (status, Json(CreateBookmarkResponse { created })).into_response()
        }
        Err(err) => catalog_error_response(&err, "Failed to save bookmark"),
    }
}

#[utoipa::path(
    get,
    path = "/api/bookmarks",
    tag = "bookmarks",
    params(
        ("X-User-Id" = Option<String>, Header, description = "Signed-in user id"),
        ("X-Device-Key" = Option<String>, Header, description = "Anonymous device key, used when no user id is sent")
    ),
    responses(
        (status = 200, description = "Bookmarked recipe ids", body = BookmarksResponse),
        (status = 400, description = "No owner header", body = ErrorResponse)
    )
)]
pub async fn list_bookmarks(
    State(catalog): State<AppState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let owner = match owner_from_headers(&headers) {
        Ok(owner) => owner,
        Err(response) => return response,
    };

    match catalog.bookmarks(&owner) {
        Ok(recipe_ids) => (StatusCode::OK, Json(BookmarksResponse { recipe_ids })).into_response(),
        Err(err) => catalog_error_response(&err, "Failed to list bookmarks"),
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(create_bookmark, list_bookmarks),
    components(schemas(CreateBookmarkRequest, CreateBookmarkResponse, BookmarksResponse))
)]
pub struct ApiDoc;
