/// API route handlers
///
/// Handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Register, login and logout
/// - `projects`: Project CRUD
/// - `tasks`: Task CRUD, nested under projects for list and create

pub mod health;
pub mod auth;
pub mod projects;
pub mod tasks;
