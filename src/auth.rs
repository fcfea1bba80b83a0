// Identity: password hashing, opaque session tokens, extractors and the
// register/login/logout handlers.

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::{FromRef, FromRequestParts, State},
    http::{request::Parts, StatusCode},
    response::IntoResponse,
    Json,
};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::db::Database;
use crate::error::AppError;

/// Attempts at drawing an unused session token before giving up.
pub const MAX_SESSION_ATTEMPTS: usize = 5;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("username already taken")]
    UsernameTaken,
    #[error("could not allocate a unique session token")]
    SessionCollision,
    #[error("password hashing failed: {0}")]
    Hash(String),
    #[error("storage failure")]
    Storage(#[from] sqlx::Error),
}

/// An issued session. `token` is only ever returned to the client; storage
/// keeps its SHA-256 digest.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub token: String,
    pub user_id: i64,
    pub expires_at: String,
}

/// What the quiz core needs from identity.
pub trait Identity: Send + Sync {
    fn authenticate(&self, username: &str, password: &str)
        -> BoxFuture<'static, Result<Session, AuthError>>;

    /// `None` for unknown or expired sessions.
    fn resolve_user(&self, session: &str) -> BoxFuture<'static, Result<Option<i64>, AuthError>>;
}

// ── Password hashing ─────────────────────────────────────────────────

pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AuthError::Hash(e.to_string()))
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(hash).map_err(|e| AuthError::Hash(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

// ── Session tokens ───────────────────────────────────────────────────

fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

fn new_token() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|e| e.is_unique_violation())
}

/// Store a session under a fresh token, drawing a new token on collision.
async fn issue_session(
    db: &Database,
    user_id: i64,
    ttl: chrono::Duration,
    mut next_token: impl FnMut() -> String,
) -> Result<Session, AuthError> {
    let expires_at = (chrono::Utc::now() + ttl)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string();

    for attempt in 1..=MAX_SESSION_ATTEMPTS {
        let token = next_token();
        match db.create_session(&hash_token(&token), user_id, &expires_at).await {
            Ok(()) => {
                return Ok(Session {
                    token,
                    user_id,
                    expires_at,
                })
            }
            Err(e) if is_unique_violation(&e) => {
                tracing::warn!(user_id, attempt, "session token collision");
            }
            Err(e) => return Err(e.into()),
        }
    }
    Err(AuthError::SessionCollision)
}

/// Database-backed identity with expiring, revocable sessions.
pub struct SessionIdentity {
    db: Arc<Database>,
    ttl: chrono::Duration,
}

impl SessionIdentity {
    pub fn new(db: Arc<Database>, ttl_hours: i64) -> Self {
        Self {
            db,
            ttl: chrono::Duration::hours(ttl_hours),
        }
    }

    /// Create an account and open a first session for it.
    pub async fn register(&self, username: &str, password: &str) -> Result<Session, AuthError> {
        let password_hash = hash_password(password)?;
        let user = match self.db.create_user(username, &password_hash).await {
            Ok(user) => user,
            Err(e) if is_unique_violation(&e) => return Err(AuthError::UsernameTaken),
            Err(e) => return Err(e.into()),
        };
        tracing::info!(user_id = user.id, "registered user");
        issue_session(&self.db, user.id, self.ttl, new_token).await
    }

    /// Revoke a session. Returns false if it did not exist.
    pub async fn logout(&self, token: &str) -> Result<bool, AuthError> {
        Ok(self.db.delete_session(&hash_token(token)).await?)
    }
}

impl Identity for SessionIdentity {
    fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> BoxFuture<'static, Result<Session, AuthError>> {
        let db = self.db.clone();
        let ttl = self.ttl;
        let username = username.to_string();
        let password = password.to_string();
        Box::pin(async move {
            let user = db
                .get_user_by_username(&username)
                .await?
                .ok_or(AuthError::InvalidCredentials)?;
            if !verify_password(&password, &user.password_hash)? {
                return Err(AuthError::InvalidCredentials);
            }
            issue_session(&db, user.id, ttl, new_token).await
        })
    }

    fn resolve_user(&self, session: &str) -> BoxFuture<'static, Result<Option<i64>, AuthError>> {
        let db = self.db.clone();
        let token_hash = hash_token(session);
        Box::pin(async move { Ok(db.session_user(&token_hash).await?) })
    }
}

// ── Axum extractors ──────────────────────────────────────────────────

/// The raw bearer token from the `Authorization` header.
#[derive(Debug, Clone)]
pub struct SessionToken(pub String);

impl<S> FromRequestParts<S> for SessionToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Unauthorized("Invalid Authorization header format".into()))?;

        Ok(SessionToken(token.to_string()))
    }
}

/// A bearer token resolved to a user id.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user_id: i64,
    pub token: String,
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
    Arc<dyn Identity>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let SessionToken(token) = SessionToken::from_request_parts(parts, state).await?;
        let identity = <Arc<dyn Identity> as FromRef<S>>::from_ref(state);
        match identity.resolve_user(&token).await? {
            Some(user_id) => Ok(CurrentUser { user_id, token }),
            None => Err(AppError::Unauthorized("invalid or expired session".into())),
        }
    }
}

// ── Auth API handlers ────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

fn validate_credentials(req: &Credentials) -> Result<(), AppError> {
    if req.username.len() < 3 || req.username.len() > 30 {
        return Err(AppError::BadRequest("username must be 3-30 characters".into()));
    }
    if req.password.len() < 8 {
        return Err(AppError::BadRequest(
            "password must be at least 8 characters".into(),
        ));
    }
    Ok(())
}

pub async fn register(
    State(identity): State<Arc<SessionIdentity>>,
    Json(req): Json<Credentials>,
) -> Result<impl IntoResponse, AppError> {
    validate_credentials(&req)?;
    let session = identity.register(&req.username, &req.password).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

pub async fn login(
    State(identity): State<Arc<SessionIdentity>>,
    Json(req): Json<Credentials>,
) -> Result<impl IntoResponse, AppError> {
    let session = identity.authenticate(&req.username, &req.password).await?;
    Ok((StatusCode::OK, Json(session)))
}

pub async fn logout(
    State(identity): State<Arc<SessionIdentity>>,
    SessionToken(token): SessionToken,
) -> Result<impl IntoResponse, AppError> {
    if identity.logout(&token).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Unauthorized("invalid or expired session".into()))
    }
}
