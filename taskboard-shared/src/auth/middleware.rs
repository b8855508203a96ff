/// Bearer token authentication middleware for Axum
///
/// Reads `Authorization: Bearer <token>`, resolves the token against the
/// `access_tokens` table, and inserts an [`AuthContext`] into the request
/// extensions. Requests without a live token never reach a handler.
///
/// # Example
///
/// ```no_run
/// use axum::{http::StatusCode, middleware, routing::get, Extension, Router};
/// use taskboard_shared::auth::middleware::{bearer_auth_middleware, AuthContext};
/// use sqlx::PgPool;
///
/// async fn whoami(Extension(auth): Extension<AuthContext>) -> String {
///     auth.user_id.to_string()
/// }
///
/// fn router(pool: PgPool) -> Router {
///     Router::new()
///         .route("/whoami", get(whoami))
///         .layer(middleware::from_fn(move |req, next| {
///             let pool = pool.clone();
///             async move {
///                 bearer_auth_middleware(pool, req, next)
///                     .await
///                     .map_err(|_| StatusCode::UNAUTHORIZED)
///             }
///         }))
/// }
/// ```

use axum::{
    extract::Request,
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::token::{parse_bearer, validate_token_format};
use crate::models::access_token::AccessToken;

/// Identity of the caller, available to handlers via `Extension<AuthContext>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user
    pub user_id: Uuid,

    /// Token used for this request; logout deletes exactly this one
    pub token_id: Uuid,
}

impl AuthContext {
    pub fn new(user_id: Uuid, token_id: Uuid) -> Self {
        Self { user_id, token_id }
    }

    pub fn from_token(token: &AccessToken) -> Self {
        Self::new(token.user_id, token.id)
    }
}

/// Error type for authentication
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No `Authorization` header
    #[error("Missing credentials")]
    MissingCredentials,

    /// Header present but not `Bearer <token>`
    #[error("Invalid authorization header: {0}")]
    InvalidFormat(String),

    /// Unknown, revoked or expired token
    #[error("Invalid or expired token")]
    InvalidToken,

    /// Token lookup failed
    #[error("Database error: {0}")]
    DatabaseError(String),
}

/// Resolves the `Authorization` header to an [`AuthContext`]
pub async fn authenticate(pool: &PgPool, headers: &HeaderMap) -> Result<AuthContext, AuthError> {
    let header_value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingCredentials)?
        .to_str()
        .map_err(|_| AuthError::InvalidFormat("Header is not valid ASCII".to_string()))?;

    let token = parse_bearer(header_value)
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))?;

    // Malformed tokens cannot exist in the table
    if !validate_token_format(token) {
        return Err(AuthError::InvalidToken);
    }

    let record = AccessToken::authenticate(pool, token)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?
        .ok_or(AuthError::InvalidToken)?;

    Ok(AuthContext::from_token(&record))
}

/// Middleware body: authenticates, then forwards with the [`AuthContext`] attached
///
/// The request is split so only its headers are borrowed across the token
/// lookup; the body stays untouched until `next` runs.
pub async fn bearer_auth_middleware(
    pool: PgPool,
    req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let (mut parts, body) = req.into_parts();

    let auth = authenticate(&pool, &parts.headers).await.map_err(|e| {
        tracing::debug!(error = %e, path = %parts.uri.path(), "Authentication failed");
        e
    })?;

    parts.extensions.insert(auth);

    Ok(next.run(Request::from_parts(parts, body)).await)
}
