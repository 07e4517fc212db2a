//! Auth endpoints
//!
//! Registration, login, and the current-user lookup the client uses to
//! build its session.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::{AuthSession, UserSummary};
use crate::state::AppState;

use super::{auth_error, authorize, internal_error, RouteError};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterRequest {
    email: String,
    password: String,
    #[serde(default)]
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AuthResponse {
    token: String,
    expires_at: String,
    user: UserSummary,
}

fn format_expiry(exp: usize) -> String {
    DateTime::<Utc>::from_timestamp(exp as i64, 0)
        .map(|value| value.to_rfc3339())
        .unwrap_or_else(|| Utc::now().to_rfc3339())
}

fn auth_response(state: &AppState, session: AuthSession) -> Result<AuthResponse, RouteError> {
    let token = state
        .auth_store()
        .encode_claims(&session.claims)
        .map_err(internal_error)?;
    Ok(AuthResponse {
        token,
        expires_at: format_expiry(session.claims.exp),
        user: session.user,
    })
}

/// POST /api/auth/register - Create an account and sign it in
async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), RouteError> {
    let session = state
        .auth_store()
        .register(&req.email, &req.password, req.display_name)
        .await
        .map_err(auth_error)?;

    Ok((
        StatusCode::CREATED,
        Json(auth_response(&state, session)?),
    ))
}

/// POST /api/auth/login - Sign an existing account in
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, RouteError> {
    let session = state
        .auth_store()
        .login(&req.email, &req.password)
        .await
        .map_err(auth_error)?;

    Ok(Json(auth_response(&state, session)?))
}

/// GET /api/auth/me - The user behind the bearer token
async fn me(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<UserSummary>, RouteError> {
    let session = authorize(&state, &headers).await?;
    Ok(Json(session.user))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/me", get(me))
}
