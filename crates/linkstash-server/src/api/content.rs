// ABOUTME: Owner-scoped content CRUD handlers for the linkstash API.
// ABOUTME: Every handler takes Identity, so the token gate runs before any query.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use linkstash_core::{ContentPatch, NewContent};
use serde_json::json;
use ulid::Ulid;

use crate::app_state::SharedState;
use crate::auth::Identity;

/// GET /api/v1/content - List the caller's content, newest first.
pub async fn list_content(
    State(state): State<SharedState>,
    identity: Identity,
) -> impl IntoResponse {
    let store = state.store.lock().await;
    match store.list_content(identity.user_id) {
        Ok(items) => (StatusCode::OK, Json(json!({ "content": items }))).into_response(),
        Err(e) => {
            tracing::error!("failed to list content: {}", e);
            internal_error()
        }
    }
}

/// POST /api/v1/content - Save a new content item for the caller.
pub async fn create_content(
    State(state): State<SharedState>,
    identity: Identity,
    Json(input): Json<NewContent>,
) -> impl IntoResponse {
    let store = state.store.lock().await;
    match store.create_content(identity.user_id, input) {
        Ok(content) => (
            StatusCode::OK,
            Json(json!({ "message": "saved", "id": content.id.to_string() })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("failed to create content: {}", e);
            internal_error()
        }
    }
}

/// PUT /api/v1/content/{id} - Apply a partial update, scoped to the
/// caller. A foreign owner and a missing id produce the same 404.
pub async fn update_content(
    State(state): State<SharedState>,
    identity: Identity,
    Path(id): Path<String>,
    Json(patch): Json<ContentPatch>,
) -> impl IntoResponse {
    let content_id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let mut store = state.store.lock().await;
    match store.update_content(content_id, identity.user_id, patch) {
        Ok(Some(_)) => (StatusCode::OK, Json(json!({ "message": "updated" }))).into_response(),
        Ok(None) => not_found(),
        Err(e) => {
            tracing::error!("failed to update content: {}", e);
            internal_error()
        }
    }
}

/// DELETE /api/v1/content/{id} - Delete scoped to the caller and return
/// the deleted record.
pub async fn delete_content(
    State(state): State<SharedState>,
    identity: Identity,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let content_id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let mut store = state.store.lock().await;
    match store.delete_content(content_id, identity.user_id) {
        Ok(Some(content)) => (
            StatusCode::OK,
            Json(json!({ "message": "content deleted", "content": content })),
        )
            .into_response(),
        Ok(None) => not_found(),
        Err(e) => {
            tracing::error!("failed to delete content: {}", e);
            internal_error()
        }
    }
}

// A malformed id cannot name any record, so it collapses into the same
// 404 as a missing or foreign-owned one.
pub(crate) fn parse_id(raw: &str) -> Result<Ulid, Response> {
    raw.parse::<Ulid>().map_err(|_| not_found())
}

pub(crate) fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "content not found" })),
    )
        .into_response()
}

pub(crate) fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "internal server error" })),
    )
        .into_response()
}
