//! REST API routes

pub mod auth;
pub mod health;
pub mod task;

use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::Serialize;

use crate::auth::{AuthError, AuthSession};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub type RouteError = (StatusCode, Json<ErrorResponse>);

pub fn route_error(status: StatusCode, error: impl Into<String>) -> RouteError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
}

pub fn auth_error(err: AuthError) -> RouteError {
    let status = match err {
        AuthError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        AuthError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        AuthError::Conflict(_) => StatusCode::CONFLICT,
        AuthError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    route_error(status, err.to_string())
}

pub fn internal_error(error: impl std::fmt::Display) -> RouteError {
    route_error(StatusCode::INTERNAL_SERVER_ERROR, error.to_string())
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, RouteError> {
    headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| route_error(StatusCode::UNAUTHORIZED, "Missing bearer token"))
}

/// Resolve the bearer token in `headers` to a user session
pub async fn authorize(state: &AppState, headers: &HeaderMap) -> Result<AuthSession, RouteError> {
    let token = bearer_token(headers)?;
    state
        .auth_store()
        .authorize_bearer(token)
        .await
        .map_err(auth_error)
}
