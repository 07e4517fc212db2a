use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

const DEFAULT_JWT_SECRET: &str = "dev-jwt-secret-change-me";
const DEFAULT_TOKEN_TTL_SECONDS: i64 = 60 * 60 * 8;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthClaims {
    pub sub: String,
    pub email: String,
    pub exp: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub email: String,
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct AuthSession {
    pub claims: AuthClaims,
    pub user: UserSummary,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("storage error: {0}")]
    Storage(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct User {
    id: Uuid,
    email: String,
    display_name: Option<String>,
    password_hash: String,
    created_at: DateTime<Utc>,
    disabled_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
struct AuthState {
    users: HashMap<Uuid, User>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredAuthState {
    users: Vec<User>,
}

impl From<StoredAuthState> for AuthState {
    fn from(value: StoredAuthState) -> Self {
        Self {
            users: value
                .users
                .into_iter()
                .map(|item| (item.id, item))
                .collect(),
        }
    }
}

impl From<&AuthState> for StoredAuthState {
    fn from(value: &AuthState) -> Self {
        Self {
            users: value.users.values().cloned().collect(),
        }
    }
}

#[derive(Clone)]
pub struct AuthStore {
    state: Arc<RwLock<AuthState>>,
    file_path: PathBuf,
    jwt_secret: String,
    token_ttl_seconds: i64,
}

impl AuthStore {
    pub async fn new(base_dir: PathBuf) -> Result<Self, AuthError> {
        tokio::fs::create_dir_all(&base_dir).await.map_err(|err| {
            AuthError::Storage(format!("Failed to create auth directory: {}", err))
        })?;

        let file_path = base_dir.join("users.json");
        let state = load_state(&file_path).await?;
        let jwt_secret = std::env::var("TASKO_AUTH_JWT_SECRET")
            .unwrap_or_else(|_| DEFAULT_JWT_SECRET.to_string());
        let token_ttl_seconds = std::env::var("TASKO_AUTH_TOKEN_TTL_SECONDS")
            .ok()
            .and_then(|raw| raw.parse::<i64>().ok())
            .filter(|ttl| *ttl > 0)
            .unwrap_or(DEFAULT_TOKEN_TTL_SECONDS);

        Ok(Self {
            state: Arc::new(RwLock::new(state)),
            file_path,
            jwt_secret,
            token_ttl_seconds,
        })
    }

    pub async fn register(
        &self,
        email: &str,
        password: &str,
        display_name: Option<String>,
    ) -> Result<AuthSession, AuthError> {
        let normalized_email = normalize_email(email)?;
        validate_password(password)?;

        let mut state = self.state.write().await;
        if state
            .users
            .values()
            .any(|user| user.email == normalized_email)
        {
            return Err(AuthError::Conflict(format!(
                "User '{}' already exists",
                normalized_email
            )));
        }

        let user = User {
            id: Uuid::new_v4(),
            email: normalized_email,
            display_name: sanitize_optional_string(display_name),
            password_hash: hash_password(password),
            created_at: Utc::now(),
            disabled_at: None,
        };
        state.users.insert(user.id, user.clone());
        persist_state(&self.file_path, &state).await?;
        drop(state);

        self.build_session(user)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let normalized_email = normalize_email(email)?;
        let state = self.state.read().await;

        let user = state
            .users
            .values()
            .find(|user| user.email == normalized_email)
            .cloned()
            .ok_or_else(|| AuthError::Unauthorized("Invalid credentials".to_string()))?;
        if user.disabled_at.is_some() || !verify_password(&user.password_hash, password) {
            return Err(AuthError::Unauthorized("Invalid credentials".to_string()));
        }
        drop(state);

        self.build_session(user)
    }

    pub async fn authorize_bearer(&self, token: &str) -> Result<AuthSession, AuthError> {
        let claims = self.decode_claims(token)?;
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AuthError::Unauthorized("Invalid token subject".to_string()))?;

        let state = self.state.read().await;
        let user = state
            .users
            .get(&user_id)
            .cloned()
            .ok_or_else(|| AuthError::Unauthorized("User not found".to_string()))?;
        if user.disabled_at.is_some() {
            return Err(AuthError::Unauthorized("User is disabled".to_string()));
        }

        Ok(AuthSession {
            claims,
            user: user_to_summary(&user),
        })
    }

    fn build_session(&self, user: User) -> Result<AuthSession, AuthError> {
        let claims = self.issue_claims(&user)?;
        Ok(AuthSession {
            claims,
            user: user_to_summary(&user),
        })
    }

    fn issue_claims(&self, user: &User) -> Result<AuthClaims, AuthError> {
        let exp = (Utc::now() + Duration::seconds(self.token_ttl_seconds)).timestamp();
        let exp = usize::try_from(exp)
            .map_err(|_| AuthError::Storage("Failed to encode token expiration".to_string()))?;

        Ok(AuthClaims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            exp,
        })
    }

    pub fn encode_claims(&self, claims: &AuthClaims) -> Result<String, AuthError> {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|err| AuthError::Storage(format!("Failed to encode JWT: {}", err)))
    }

    pub fn decode_claims(&self, token: &str) -> Result<AuthClaims, AuthError> {
        let decoded = decode::<AuthClaims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|err| AuthError::Unauthorized(format!("Invalid token: {}", err)))?;
        Ok(decoded.claims)
    }
}

fn user_to_summary(user: &User) -> UserSummary {
    UserSummary {
        id: user.id,
        email: user.email.clone(),
        display_name: user.display_name.clone(),
        created_at: user.created_at,
    }
}

async fn load_state(path: &Path) -> Result<AuthState, AuthError> {
    if !path.exists() {
        return Ok(AuthState::default());
    }
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|err| AuthError::Storage(format!("Failed to read auth state: {}", err)))?;
    if content.trim().is_empty() {
        return Ok(AuthState::default());
    }
    let stored: StoredAuthState = serde_json::from_str(&content)
        .map_err(|err| AuthError::Storage(format!("Failed to parse auth state: {}", err)))?;
    Ok(stored.into())
}

async fn persist_state(path: &Path, state: &AuthState) -> Result<(), AuthError> {
    let content = serde_json::to_string_pretty(&StoredAuthState::from(state))
        .map_err(|err| AuthError::Storage(format!("Failed to serialize auth state: {}", err)))?;
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(|err| {
            AuthError::Storage(format!("Failed to create auth parent dir: {}", err))
        })?;
    }
    tokio::fs::write(path, content)
        .await
        .map_err(|err| AuthError::Storage(format!("Failed to write auth state: {}", err)))?;
    Ok(())
}

fn sanitize_optional_string(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn normalize_email(email: &str) -> Result<String, AuthError> {
    let normalized = email.trim().to_lowercase();
    if normalized.is_empty() || !normalized.contains('@') {
        return Err(AuthError::InvalidInput("Invalid email".to_string()));
    }
    Ok(normalized)
}

fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < 8 {
        return Err(AuthError::InvalidInput(
            "Password must be at least 8 characters".to_string(),
        ));
    }
    Ok(())
}

fn hash_password(password: &str) -> String {
    let mut salt = [0_u8; 16];
    rand::thread_rng().fill_bytes(&mut salt);

    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    let digest = hasher.finalize();

    format!(
        "v1${}${}",
        URL_SAFE_NO_PAD.encode(salt),
        URL_SAFE_NO_PAD.encode(digest)
    )
}

fn verify_password(stored_hash: &str, password: &str) -> bool {
    let mut parts = stored_hash.split('$');
    let version = parts.next();
    let encoded_salt = parts.next();
    let encoded_digest = parts.next();
    let (Some(encoded_salt), Some(encoded_digest)) = (encoded_salt, encoded_digest) else {
        return false;
    };
    if version != Some("v1") {
        return false;
    }

    let salt = match URL_SAFE_NO_PAD.decode(encoded_salt) {
        Ok(value) => value,
        Err(_) => return false,
    };
    let expected_digest = match URL_SAFE_NO_PAD.decode(encoded_digest) {
        Ok(value) => value,
        Err(_) => return false,
    };

    let mut hasher = Sha256::new();
    hasher.update(&salt);
    hasher.update(password.as_bytes());
    let actual_digest = hasher.finalize();
    expected_digest == actual_digest.as_slice()
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    async fn build_store() -> (AuthStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = AuthStore::new(temp_dir.path().join("auth")).await.unwrap();
        (store, temp_dir)
    }

    #[tokio::test]
    async fn register_and_authorize_roundtrip() {
        let (store, _temp_dir) = build_store().await;
        let session = store
            .register("user@example.com", "verysecurepw", Some("User".to_string()))
            .await
            .unwrap();
        let token = store.encode_claims(&session.claims).unwrap();
        let authed = store.authorize_bearer(&token).await.unwrap();
        assert_eq!(authed.user.email, "user@example.com");
        assert_eq!(authed.user.id, session.user.id);
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let (store, _temp_dir) = build_store().await;
        store
            .register("user@example.com", "verysecurepw", None)
            .await
            .unwrap();
        let result = store.register("User@Example.com", "verysecurepw", None).await;
        assert!(matches!(result, Err(AuthError::Conflict(_))));
    }

    #[tokio::test]
    async fn login_rejects_wrong_password() {
        let (store, _temp_dir) = build_store().await;
        store
            .register("user@example.com", "verysecurepw", None)
            .await
            .unwrap();
        let result = store.login("user@example.com", "wrongpassword").await;
        assert!(matches!(result, Err(AuthError::Unauthorized(_))));

        let session = store.login("user@example.com", "verysecurepw").await.unwrap();
        assert_eq!(session.user.email, "user@example.com");
    }
}
