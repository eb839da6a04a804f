// ABOUTME: Sharing workflow handlers: visibility toggling and the public read path.
// ABOUTME: Shareable ids are assigned once and retained; access follows is_public.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::api::content::{internal_error, not_found, parse_id};
use crate::app_state::SharedState;
use crate::auth::Identity;

/// Request body for the visibility toggle.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibilityRequest {
    pub is_public: bool,
}

/// POST /api/v1/content/{id}/isPublic - Toggle visibility, scoped to
/// the caller. The first transition to public permanently assigns a
/// shareable id; the response carries the composed link only while
/// public.
pub async fn set_visibility(
    State(state): State<SharedState>,
    identity: Identity,
    Path(id): Path<String>,
    Json(req): Json<VisibilityRequest>,
) -> impl IntoResponse {
    let content_id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let mut store = state.store.lock().await;
    let content = match store.set_visibility(content_id, identity.user_id, req.is_public) {
        Ok(Some(c)) => c,
        Ok(None) => return not_found(),
        Err(e) => {
            tracing::error!("failed to set visibility: {}", e);
            return internal_error();
        }
    };

    let shareable_link = match (content.is_public, content.shareable_id) {
        (true, Some(shareable_id)) => {
            Some(state.config.shareable_link(&shareable_id.to_string()))
        }
        _ => None,
    };

    let message = if content.is_public {
        "content is now public"
    } else {
        "content is now private"
    };

    (
        StatusCode::OK,
        Json(json!({ "message": message, "shareableLink": shareable_link })),
    )
        .into_response()
}

/// GET /share/{shareableId} - Unauthenticated read of a public item. A
/// malformed or unknown id, or an id whose item has been re-privated,
/// all come back as the same 404.
pub async fn get_shared(
    State(state): State<SharedState>,
    Path(shareable_id): Path<String>,
) -> impl IntoResponse {
    let Ok(shareable_id) = shareable_id.parse::<Uuid>() else {
        return shared_not_found();
    };

    let store = state.store.lock().await;
    match store.find_shared(shareable_id) {
        Ok(Some(content)) => (StatusCode::OK, Json(json!({ "content": content }))).into_response(),
        Ok(None) => shared_not_found(),
        Err(e) => {
            tracing::error!("failed to read shared content: {}", e);
            internal_error()
        }
    }
}

fn shared_not_found() -> axum::response::Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "link is broken or has been made private" })),
    )
        .into_response()
}
