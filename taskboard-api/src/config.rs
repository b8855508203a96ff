/// Configuration management for the API server
///
/// Values are layered with the `config` crate: built-in defaults, then
/// `TASKBOARD_`-prefixed environment variables (nested keys joined by `__`),
/// then `DATABASE_URL`. A `.env` file is loaded first if present.
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `TASKBOARD_API__HOST`: host to bind to (default: 0.0.0.0)
/// - `TASKBOARD_API__PORT`: port to bind to (default: 8080)
/// - `TASKBOARD_API__CORS_ORIGINS`: comma separated origins (default: `*`)
/// - `TASKBOARD_DATABASE__MAX_CONNECTIONS`: pool size (default: 10)
/// - `TASKBOARD_AUTH__TOKEN_TTL_HOURS`: token lifetime; unset means tokens never expire
/// - `RUST_LOG`: log filter
///
/// # Example
///
/// ```no_run
/// use taskboard_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Duration, Utc};
use config::{Environment, Map};
use serde::{Deserialize, Serialize};
use std::env;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub database: DatabaseConfig,

    #[serde(default)]
    pub auth: AuthConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins; `*` allows any
    pub cors_origins: Vec<String>,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// Access token settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Lifetime of issued tokens in hours
    #[serde(default)]
    pub token_ttl_hours: Option<i64>,
}

impl AuthConfig {
    /// Expiry for a token issued at `now`
    pub fn expires_at(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.token_ttl_hours.map(|hours| now + Duration::hours(hours))
    }
}

impl Config {
    /// Loads configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns an error if `DATABASE_URL` is missing or a variable has an
    /// invalid value.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::load(None, env::var("DATABASE_URL").ok())
    }

    /// Loads configuration from an explicit variable map instead of the
    /// process environment
    pub fn from_vars(vars: Map<String, String>) -> anyhow::Result<Self> {
        let database_url = vars.get("DATABASE_URL").cloned();
        Self::load(Some(vars), database_url)
    }

    fn load(
        vars: Option<Map<String, String>>,
        database_url: Option<String>,
    ) -> anyhow::Result<Self> {
        let config: Config = config::Config::builder()
            .set_default("api.host", "0.0.0.0")?
            .set_default("api.port", 8080)?
            .set_default("api.cors_origins", vec!["*"])?
            .set_default("database.url", "")?
            .set_default("database.max_connections", 10)?
            .add_source(
                Environment::with_prefix("TASKBOARD")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("api.cors_origins")
                    .source(vars),
            )
            .set_override_option("database.url", database_url)?
            .build()?
            .try_deserialize()?;

        if config.database.url.is_empty() {
            anyhow::bail!("DATABASE_URL environment variable is required");
        }

        if matches!(config.auth.token_ttl_hours, Some(hours) if hours <= 0) {
            anyhow::bail!("TASKBOARD_AUTH__TOKEN_TTL_HOURS must be positive");
        }

        Ok(config)
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Whether CORS should accept any origin
    pub fn cors_allows_any(&self) -> bool {
        self.api.cors_origins.iter().any(|origin| origin == "*")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Map<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config =
            Config::from_vars(vars(&[("DATABASE_URL", "postgresql://localhost/test")])).unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.database.url, "postgresql://localhost/test");
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.auth.token_ttl_hours, None);
        assert!(config.cors_allows_any());
    }

    #[test]
    fn test_prefixed_overrides() {
        let config = Config::from_vars(vars(&[
            ("DATABASE_URL", "postgresql://localhost/test"),
            ("TASKBOARD_API__PORT", "9090"),
            ("TASKBOARD_API__HOST", "127.0.0.1"),
            ("TASKBOARD_API__CORS_ORIGINS", "https://a.example,https://b.example"),
            ("TASKBOARD_DATABASE__MAX_CONNECTIONS", "3"),
            ("TASKBOARD_AUTH__TOKEN_TTL_HOURS", "24"),
        ]))
        .unwrap();

        assert_eq!(config.bind_address(), "127.0.0.1:9090");
        assert_eq!(
            config.api.cors_origins,
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
        assert!(!config.cors_allows_any());
        assert_eq!(config.database.max_connections, 3);
        assert_eq!(config.auth.token_ttl_hours, Some(24));

        let now = Utc::now();
        assert_eq!(config.auth.expires_at(now), Some(now + Duration::hours(24)));
    }

    #[test]
    fn test_database_url_required() {
        let err = Config::from_vars(vars(&[])).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn test_token_ttl_must_be_positive() {
        let result = Config::from_vars(vars(&[
            ("DATABASE_URL", "postgresql://localhost/test"),
            ("TASKBOARD_AUTH__TOKEN_TTL_HOURS", "0"),
        ]));
        assert!(result.is_err());
    }
}
