//! # Taskboard Shared Library
//!
//! Types and persistence shared by the Taskboard API server and client.
//!
//! ## Module Organization
//!
//! - `models`: database rows and their queries
//! - `auth`: passwords, bearer tokens, middleware and ownership policies
//! - `db`: connection pool and migrations
//! - `pagination`: page requests and the paginated response shape
//! - `resources`: JSON representations exchanged over HTTP

pub mod auth;
pub mod db;
pub mod models;
pub mod pagination;
pub mod resources;

/// Current version of the Taskboard shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
