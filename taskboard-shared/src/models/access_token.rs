/// Access token model and database operations
///
/// Each login or registration issues one opaque bearer token. The row holds
/// only the SHA-256 digest; deleting the row (logout) immediately
/// invalidates the token.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE access_tokens (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     name VARCHAR(255) NOT NULL,
///     token_hash VARCHAR(64) NOT NULL UNIQUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     last_used_at TIMESTAMPTZ,
///     expires_at TIMESTAMPTZ
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::models::access_token::{AccessToken, IssueToken};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, user_id: Uuid) -> Result<(), sqlx::Error> {
/// let (record, plaintext) = AccessToken::issue(&pool, IssueToken {
///     user_id,
///     name: "auth_token".to_string(),
///     expires_at: None,
/// }).await?;
///
/// // Later, on each request
/// let found = AccessToken::authenticate(&pool, &plaintext).await?;
/// assert_eq!(found.map(|t| t.id), Some(record.id));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::token;

/// Stored token record
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AccessToken {
    pub id: Uuid,

    /// Owner of the token
    pub user_id: Uuid,

    /// Label, e.g. `auth_token`
    pub name: String,

    /// SHA-256 hex digest of the plaintext
    #[serde(skip_serializing)]
    pub token_hash: String,

    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,

    /// `None` means the token never expires
    pub expires_at: Option<DateTime<Utc>>,
}

/// Input for issuing a token
#[derive(Debug, Clone)]
pub struct IssueToken {
    pub user_id: Uuid,
    pub name: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    /// Generates and stores a new token
    ///
    /// Returns the record and the plaintext. The plaintext is not
    /// recoverable afterwards.
    pub async fn issue(pool: &PgPool, data: IssueToken) -> Result<(Self, String), sqlx::Error> {
        let (plaintext, token_hash) = token::generate_token();

        let record = sqlx::query_as::<_, AccessToken>(
            r#"
            INSERT INTO access_tokens (user_id, name, token_hash, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, name, token_hash, created_at, last_used_at, expires_at
            "#,
        )
        .bind(data.user_id)
        .bind(data.name)
        .bind(token_hash)
        .bind(data.expires_at)
        .fetch_one(pool)
        .await?;

        Ok((record, plaintext))
    }

    /// Resolves a plaintext token to its live record
    ///
    /// Unknown and expired tokens yield `None`. A hit also stamps
    /// `last_used_at`.
    pub async fn authenticate(pool: &PgPool, plaintext: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, AccessToken>(
            r#"
            UPDATE access_tokens
            SET last_used_at = NOW()
            WHERE token_hash = $1
              AND (expires_at IS NULL OR expires_at > NOW())
            RETURNING id, user_id, name, token_hash, created_at, last_used_at, expires_at
            "#,
        )
        .bind(token::hash_token(plaintext))
        .fetch_optional(pool)
        .await
    }

    /// Deletes one token (logout)
    pub async fn revoke(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM access_tokens WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Removes tokens whose expiry has passed
    pub async fn prune_expired(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM access_tokens WHERE expires_at <= NOW()")
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }
}
