//! # Taskboard Client
//!
//! Client-side pieces for a Taskboard front end.
//!
//! - `api`: typed reqwest client for every API endpoint
//! - `session`: session state and token persistence
//! - `router`: route table and the authentication guard
//! - `error`: client error types
//!
//! One [`SessionStore`] is shared (behind an `Arc`) by the [`ApiClient`] and
//! the [`router::guard`], so a login or logout is visible to both.

pub mod api;
pub mod error;
pub mod router;
pub mod session;

pub use api::{
    ApiClient, LoginInput, ProjectInput, ProjectUpdate, RegisterInput, TaskInput, TaskUpdate,
};
pub use error::{ClientError, ClientResult};
pub use router::{guard, Navigation};
pub use session::{FileTokenStorage, MemoryTokenStorage, SessionState, SessionStore, TokenStorage};
