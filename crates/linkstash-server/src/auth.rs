// ABOUTME: Password hashing, token issue/verify, and the Identity extractor.
// ABOUTME: Every protected route resolves the Authorization header through here.

use axum::Json;
use axum::extract::FromRequestParts;
use axum::http::{StatusCode, header, request::Parts};
use axum::response::{IntoResponse, Response};
use bcrypt::DEFAULT_COST;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use linkstash_core::Claims;
use serde_json::json;
use thiserror::Error;
use ulid::Ulid;

use crate::app_state::SharedState;
use crate::config::ServerConfig;

/// Errors from the token service and password primitives.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    #[error("token expired")]
    TokenExpired,

    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}

/// Hash a password with bcrypt at the default cost.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    Ok(bcrypt::hash(password, DEFAULT_COST)?)
}

/// Verify a password against a stored bcrypt hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    Ok(bcrypt::verify(password, hash)?)
}

/// Issue a signed token for a user. The expiry claim is only set when
/// the config carries a token TTL; without one, tokens are valid until
/// the secret rotates.
pub fn issue_token(user_id: Ulid, config: &ServerConfig) -> Result<String, AuthError> {
    let claims = Claims::for_user(user_id, config.token_ttl_secs);
    Ok(jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )?)
}

/// Verify a token signature and return its claims. Expiry is checked
/// manually because tokens without a TTL carry no exp claim at all.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.required_spec_claims = Default::default();
    validation.validate_exp = false;

    let data = jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )?;

    if data.claims.is_expired() {
        return Err(AuthError::TokenExpired);
    }
    Ok(data.claims)
}

/// The identity attached to a request after the token gate. Extracting
/// this runs the full middleware state machine: missing header -> 401,
/// bad or expired token -> 401, token subject no longer in the store
/// -> 403. Never mutates store state.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: Ulid,
    pub user_name: String,
}

impl FromRequestParts<SharedState> for Identity {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty());

        // The raw header value is the token; this API does not use the
        // `Bearer` scheme.
        let token = match header {
            Some(t) => t,
            None => {
                return Err(reject(
                    StatusCode::UNAUTHORIZED,
                    "missing authorization header",
                ));
            }
        };

        let claims = match verify_token(token, &state.config.jwt_secret) {
            Ok(c) => c,
            Err(AuthError::TokenExpired) => {
                return Err(reject(StatusCode::UNAUTHORIZED, "token expired"));
            }
            Err(_) => return Err(reject(StatusCode::UNAUTHORIZED, "invalid token")),
        };

        let user_id = match claims.sub.parse::<Ulid>() {
            Ok(id) => id,
            Err(_) => return Err(reject(StatusCode::UNAUTHORIZED, "invalid token")),
        };

        let store = state.store.lock().await;
        match store.find_user_by_id(user_id) {
            Ok(Some(user)) => Ok(Identity {
                user_id: user.id,
                user_name: user.user_name,
            }),
            Ok(None) => Err(reject(
                StatusCode::FORBIDDEN,
                "token does not match a known user",
            )),
            Err(e) => {
                tracing::error!("store error resolving token subject: {}", e);
                Err(reject(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error",
                ))
            }
        }
    }
}

fn reject(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(secret: &str, ttl: Option<i64>) -> ServerConfig {
        ServerConfig {
            home: std::env::temp_dir().join("linkstash-test"),
            bind: "127.0.0.1:3000".parse().unwrap(),
            jwt_secret: secret.to_string(),
            public_base_url: "http://localhost:3000".to_string(),
            token_ttl_secs: ttl,
        }
    }

    #[test]
    fn password_hash_and_verify_correct() {
        let hash = hash_password("secret1").unwrap();
        assert!(verify_password("secret1", &hash).unwrap());
    }

    #[test]
    fn password_verify_wrong() {
        let hash = hash_password("correct-password").unwrap();
        assert!(!verify_password("wrong-password", &hash).unwrap());
    }

    #[test]
    fn password_hashes_use_different_salts() {
        let hash1 = hash_password("same-password").unwrap();
        let hash2 = hash_password("same-password").unwrap();
        assert_ne!(hash1, hash2);
        assert!(verify_password("same-password", &hash1).unwrap());
        assert!(verify_password("same-password", &hash2).unwrap());
    }

    #[test]
    fn token_round_trip_recovers_subject() {
        let config = test_config("test-jwt-secret", None);
        let user_id = Ulid::new();

        let token = issue_token(user_id, &config).unwrap();
        let claims = verify_token(&token, &config.jwt_secret).unwrap();

        assert_eq!(claims.sub, user_id.to_string());
        assert!(claims.exp.is_none());
    }

    #[test]
    fn token_wrong_secret_fails() {
        let config = test_config("secret-1", None);
        let token = issue_token(Ulid::new(), &config).unwrap();

        let result = verify_token(&token, "secret-2");
        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn token_with_ttl_carries_expiry() {
        let config = test_config("test-jwt-secret", Some(900));
        let token = issue_token(Ulid::new(), &config).unwrap();

        let claims = verify_token(&token, &config.jwt_secret).unwrap();
        assert_eq!(claims.exp, Some(claims.iat + 900));
    }

    #[test]
    fn expired_token_rejected() {
        let config = test_config("test-jwt-secret", Some(-10));
        let token = issue_token(Ulid::new(), &config).unwrap();

        let result = verify_token(&token, &config.jwt_secret);
        assert!(matches!(result, Err(AuthError::TokenExpired)));
    }

    #[test]
    fn garbage_token_rejected() {
        let result = verify_token("not-a-jwt", "test-jwt-secret");
        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }
}
