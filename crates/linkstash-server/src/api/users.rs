// ABOUTME: Signup and signin handlers for the linkstash API.
// ABOUTME: Hashes passwords with bcrypt and issues signed bearer tokens.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use linkstash_core::NewUser;
use linkstash_store::StoreError;
use serde::Deserialize;
use serde_json::json;

use crate::app_state::SharedState;
use crate::auth;

/// Request body for signup and signin.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialsRequest {
    pub user_name: String,
    pub password: String,
}

/// POST /api/v1/signup - Register a new user.
pub async fn signup(
    State(state): State<SharedState>,
    Json(req): Json<CredentialsRequest>,
) -> impl IntoResponse {
    let new_user = match NewUser::validate(&req.user_name, &req.password) {
        Ok(v) => v,
        Err(e) => {
            return (StatusCode::BAD_REQUEST, Json(json!({ "error": e.to_string() })))
                .into_response();
        }
    };

    let password_hash = match auth::hash_password(&new_user.password) {
        Ok(h) => h,
        Err(e) => {
            tracing::error!("failed to hash password: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "internal server error" })),
            )
                .into_response();
        }
    };

    let store = state.store.lock().await;
    match store.create_user(&new_user.user_name, &password_hash) {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({ "message": "registered successfully" })),
        )
            .into_response(),
        Err(StoreError::DuplicateUserName(_)) => (
            StatusCode::CONFLICT,
            Json(json!({ "error": "user name already taken" })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("failed to create user: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "internal server error" })),
            )
                .into_response()
        }
    }
}

/// POST /api/v1/signin - Exchange credentials for a bearer token. An
/// unknown username and a wrong password both come back as a plain 401;
/// the response never distinguishes the two.
pub async fn signin(
    State(state): State<SharedState>,
    Json(req): Json<CredentialsRequest>,
) -> impl IntoResponse {
    let user = {
        let store = state.store.lock().await;
        match store.find_user_by_name(&req.user_name) {
            Ok(Some(u)) => u,
            Ok(None) => {
                return (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({ "error": "invalid username or password" })),
                )
                    .into_response();
            }
            Err(e) => {
                tracing::error!("store error during signin: {}", e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "internal server error" })),
                )
                    .into_response();
            }
        }
    };

    match auth::verify_password(&req.password, &user.password_hash) {
        Ok(true) => {}
        Ok(false) => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "invalid username or password" })),
            )
                .into_response();
        }
        Err(e) => {
            tracing::error!("password verification error: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "internal server error" })),
            )
                .into_response();
        }
    }

    match auth::issue_token(user.id, &state.config) {
        Ok(token) => (
            StatusCode::OK,
            Json(json!({
                "message": format!("welcome {}", user.user_name),
                "token": token,
            })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("failed to issue token: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "internal server error" })),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::app_state::{AppState, SharedState};
    use crate::auth;
    use crate::config::ServerConfig;
    use crate::routes::create_router;
    use axum::body::Body;
    use http::Request;
    use linkstash_store::Store;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_state() -> SharedState {
        let dir = tempfile::TempDir::new().unwrap();
        let store = Store::open(&dir.path().join("linkstash.db")).unwrap();
        let config = ServerConfig {
            home: dir.keep(),
            bind: "127.0.0.1:3000".parse().unwrap(),
            jwt_secret: "test-jwt-secret".to_string(),
            public_base_url: "http://localhost:3000".to_string(),
            token_ttl_secs: None,
        };
        Arc::new(AppState::new(store, config))
    }

    fn json_request(path: &str, body: serde_json::Value) -> Request<Body> {
        Request::post(path)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap()
    }

    async fn json_body(resp: axum::response::Response) -> serde_json::Value {
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn signup_then_signin_returns_verifiable_token() {
        let state = test_state();

        let app = create_router(Arc::clone(&state));
        let resp = app
            .oneshot(json_request(
                "/api/v1/signup",
                serde_json::json!({ "userName": "bob123", "password": "secret1" }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);

        let app = create_router(Arc::clone(&state));
        let resp = app
            .oneshot(json_request(
                "/api/v1/signin",
                serde_json::json!({ "userName": "bob123", "password": "secret1" }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);

        let json = json_body(resp).await;
        let token = json["token"].as_str().unwrap();
        let claims = auth::verify_token(token, "test-jwt-secret").unwrap();

        let store = state.store.lock().await;
        let user = store.find_user_by_name("bob123").unwrap().unwrap();
        assert_eq!(claims.sub, user.id.to_string());
    }

    #[tokio::test]
    async fn signup_duplicate_user_name_conflicts() {
        let state = test_state();
        let body = serde_json::json!({ "userName": "bob123", "password": "secret1" });

        let app = create_router(Arc::clone(&state));
        let resp = app
            .oneshot(json_request("/api/v1/signup", body.clone()))
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);

        let app = create_router(Arc::clone(&state));
        let resp = app
            .oneshot(json_request("/api/v1/signup", body))
            .await
            .unwrap();
        assert_eq!(resp.status(), 409);
    }

    #[tokio::test]
    async fn signup_rejects_invalid_lengths() {
        let state = test_state();

        let app = create_router(Arc::clone(&state));
        let resp = app
            .oneshot(json_request(
                "/api/v1/signup",
                serde_json::json!({ "userName": "ab", "password": "secret1" }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);

        let app = create_router(Arc::clone(&state));
        let resp = app
            .oneshot(json_request(
                "/api/v1/signup",
                serde_json::json!({ "userName": "bob123", "password": "12345" }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);
    }

    #[tokio::test]
    async fn signin_wrong_password_is_401() {
        let state = test_state();

        let app = create_router(Arc::clone(&state));
        let resp = app
            .oneshot(json_request(
                "/api/v1/signup",
                serde_json::json!({ "userName": "bob123", "password": "secret1" }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);

        let app = create_router(Arc::clone(&state));
        let resp = app
            .oneshot(json_request(
                "/api/v1/signin",
                serde_json::json!({ "userName": "bob123", "password": "wrong-1" }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), 401);
    }

    #[tokio::test]
    async fn signin_unknown_user_is_401() {
        let state = test_state();

        let app = create_router(state);
        let resp = app
            .oneshot(json_request(
                "/api/v1/signin",
                serde_json::json!({ "userName": "nobody", "password": "secret1" }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), 401);
    }
}
