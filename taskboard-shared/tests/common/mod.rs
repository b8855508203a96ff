//! Shared helpers for database-backed tests
//!
//! Tests need PostgreSQL at `DATABASE_URL`. When it is unset the helpers
//! return `None` and the calling test returns early.

#![allow(dead_code)]

use sqlx::PgPool;
use taskboard_shared::db::migrations::run_migrations;
use taskboard_shared::db::pool::{create_pool, DatabaseConfig};
use taskboard_shared::models::user::{CreateUser, User};
use uuid::Uuid;

pub fn database_url() -> Option<String> {
    std::env::var("DATABASE_URL").ok().filter(|url| !url.is_empty())
}

/// Connected and migrated pool, or `None` without a database
pub async fn try_pool() -> Option<PgPool> {
    let Some(url) = database_url() else {
        eprintln!("DATABASE_URL not set; skipping database test");
        return None;
    };

    let config = DatabaseConfig {
        max_connections: 5,
        ..DatabaseConfig::new(url)
    };
    let pool = create_pool(config).await.expect("Failed to create pool");
    run_migrations(&pool).await.expect("Failed to run migrations");
    Some(pool)
}

/// Inserts a user with a unique email
pub async fn create_user(pool: &PgPool, name: &str) -> User {
    User::create(
        pool,
        CreateUser {
            name: name.to_string(),
            email: format!("{}-{}@example.com", name.to_lowercase(), Uuid::new_v4()),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$placeholder".to_string(),
        },
    )
    .await
    .expect("Failed to create user")
}
