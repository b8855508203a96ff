/// Database models
///
/// - `user`: accounts
/// - `access_token`: issued bearer tokens
/// - `project`: projects owned by a user
/// - `task`: tasks inside a project, optionally assigned to a user

pub mod user;
pub mod access_token;
pub mod project;
pub mod task;
