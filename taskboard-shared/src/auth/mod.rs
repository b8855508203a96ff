/// Authentication and authorization
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing
/// - [`token`]: opaque bearer token generation and hashing
/// - [`middleware`]: Axum middleware resolving bearer tokens to an [`middleware::AuthContext`]
/// - [`authorization`]: ownership policies for projects and tasks
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::auth::password::{hash_password, verify_password};
/// use taskboard_shared::auth::token::{generate_token, hash_token};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("correct horse")?;
/// assert!(verify_password("correct horse", &hash)?);
///
/// let (token, token_hash) = generate_token();
/// assert_eq!(hash_token(&token), token_hash);
/// # Ok(())
/// # }
/// ```

pub mod password;
pub mod token;
pub mod middleware;
pub mod authorization;
