/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /api/register` - Register and receive a token
/// - `POST /api/login` - Exchange credentials for a token
/// - `POST /api/logout` - Revoke the presented token
///
/// Tokens are opaque (`tbk_...`) and stored only as SHA-256 digests, so
/// logging out takes effect immediately.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    validation::FieldErrors,
};
use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Extension, Json};
use chrono::Utc;
use serde::Deserialize;
use taskboard_shared::{
    auth::{middleware::AuthContext, password},
    models::{
        access_token::{AccessToken, IssueToken},
        user::{CreateUser, User},
    },
    resources::{AuthResponse, MessageResponse, UserResource},
};
use validator::Validate;

/// Name recorded on tokens issued by register and login
const AUTH_TOKEN_NAME: &str = "auth_token";

/// Register request
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct RegisterRequest {
    #[validate(length(max = 255, message = "The name may not be greater than 255 characters."))]
    pub name: Option<String>,

    #[validate(
        email(message = "The email must be a valid email address."),
        length(max = 255, message = "The email may not be greater than 255 characters.")
    )]
    pub email: Option<String>,

    #[validate(
        length(min = 8, message = "The password must be at least 8 characters."),
        must_match(
            other = "password_confirmation",
            message = "The password confirmation does not match."
        )
    )]
    pub password: Option<String>,

    pub password_confirmation: Option<String>,
}

impl RegisterRequest {
    /// Register rules, minus the uniqueness check which needs the database
    pub fn rules(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors
            .required("name", self.name.as_deref())
            .required("email", self.email.as_deref())
            .required("password", self.password.as_deref())
            .validate(self);
        errors
    }
}

/// Login request
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct LoginRequest {
    #[validate(email(message = "The email must be a valid email address."))]
    pub email: Option<String>,

    pub password: Option<String>,
}

impl LoginRequest {
    pub fn rules(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors
            .required("email", self.email.as_deref())
            .required("password", self.password.as_deref())
            .validate(self);
        errors
    }
}

async fn issue_token(state: &AppState, user: &User) -> ApiResult<String> {
    let (_, plaintext) = AccessToken::issue(
        &state.db,
        IssueToken {
            user_id: user.id,
            name: AUTH_TOKEN_NAME.to_string(),
            expires_at: state.config.auth.expires_at(Utc::now()),
        },
    )
    .await?;

    Ok(plaintext)
}

/// Register a new user
///
/// # Endpoint
///
/// ```text
/// POST /api/register
/// Content-Type: application/json
///
/// {
///   "name": "Ada",
///   "email": "ada@example.com",
///   "password": "correct horse",
///   "password_confirmation": "correct horse"
/// }
/// ```
///
/// # Response (201)
///
/// ```json
/// { "user": { "id": "uuid", "name": "Ada", "email": "ada@example.com" }, "token": "tbk_..." }
/// ```
///
/// # Errors
///
/// - `422 Unprocessable Entity`: validation failed or email already taken
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let Json(req) = payload?;

    let mut errors = req.rules();
    let name = req.name.unwrap_or_default();
    let email = req.email.unwrap_or_default();
    let plain_password = req.password.unwrap_or_default();

    if !errors.has("email") && User::email_taken(&state.db, &email).await? {
        errors.push("email", "The email has already been taken.");
    }
    errors.into_result()?;

    let password_hash = password::hash_password(&plain_password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            name,
            email,
            password_hash,
        },
    )
    .await?;

    let token = issue_token(&state, &user).await?;

    tracing::info!(user_id = %user.id, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: UserResource::from(&user),
            token,
        }),
    ))
}

/// Login endpoint
///
/// # Endpoint
///
/// ```text
/// POST /api/login
/// Content-Type: application/json
///
/// { "email": "ada@example.com", "password": "correct horse" }
/// ```
///
/// # Errors
///
/// - `422 Unprocessable Entity`: validation failed
/// - `401 Unauthorized`: invalid credentials
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<AuthResponse>> {
    let Json(req) = payload?;
    req.rules().into_result()?;

    let email = req.email.unwrap_or_default();
    let plain_password = req.password.unwrap_or_default();
    let invalid = || ApiError::Unauthorized("Invalid email or password".to_string());

    let Some(user) = User::find_by_email(&state.db, &email).await? else {
        // Keep response time independent of whether the email exists
        password::dummy_verify(&plain_password);
        tracing::debug!("Login attempt for unknown email");
        return Err(invalid());
    };

    if !password::verify_password(&plain_password, &user.password_hash)? {
        tracing::debug!(user_id = %user.id, "Login attempt with wrong password");
        return Err(invalid());
    }

    let token = issue_token(&state, &user).await?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(AuthResponse {
        user: UserResource::from(&user),
        token,
    }))
}

/// Logout endpoint
///
/// Deletes the token used for this request. Other tokens of the same user
/// stay valid.
pub async fn logout(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<MessageResponse>> {
    AccessToken::revoke(&state.db, auth.token_id).await?;

    tracing::info!(user_id = %auth.user_id, token_id = %auth.token_id, "User logged out");

    Ok(Json(MessageResponse::new("Logged out successfully")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(name: &str, email: &str, password: &str, confirmation: &str) -> RegisterRequest {
        RegisterRequest {
            name: Some(name.to_string()),
            email: Some(email.to_string()),
            password: Some(password.to_string()),
            password_confirmation: Some(confirmation.to_string()),
        }
    }

    fn fields(errors: FieldErrors) -> Vec<String> {
        errors.into_details().into_iter().map(|d| d.field).collect()
    }

    #[test]
    fn test_register_rules_accept_valid_request() {
        let req = register("Ada", "ada@example.com", "correct horse", "correct horse");
        assert!(req.rules().is_empty());
    }

    #[test]
    fn test_register_rules_reject_each_field() {
        let req = register("", "not-an-email", "short", "different");
        let failed = fields(req.rules());

        assert!(failed.contains(&"name".to_string()));
        assert!(failed.contains(&"email".to_string()));
        assert!(failed.contains(&"password".to_string()));
    }

    #[test]
    fn test_register_rules_confirmation_must_match() {
        let req = register("Ada", "ada@example.com", "correct horse", "correct h0rse");
        let details = req.rules().into_details();

        assert_eq!(details.len(), 1);
        assert_eq!(details[0].field, "password");
        assert_eq!(details[0].message, "The password confirmation does not match.");
    }

    #[test]
    fn test_register_rules_missing_email_reports_required_once() {
        let req = register("Ada", "", "correct horse", "correct horse");
        let details = req.rules().into_details();

        assert_eq!(details.len(), 1);
        assert_eq!(details[0].message, "The email field is required.");
    }

    #[test]
    fn test_register_request_fields_default_when_absent() {
        let req: RegisterRequest = serde_json::from_str(r#"{"name":"Ada"}"#).unwrap();
        assert_eq!(req.email, None);
        assert!(fields(req.rules()).contains(&"password".to_string()));
    }

    #[test]
    fn test_register_null_fields_are_required_errors() {
        let req: RegisterRequest = serde_json::from_str(
            r#"{"name":null,"email":null,"password":null,"password_confirmation":null}"#,
        )
        .unwrap();

        let details = req.rules().into_details();
        let messages: Vec<&str> = details.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "The name field is required.",
                "The email field is required.",
                "The password field is required.",
            ]
        );
    }

    #[test]
    fn test_login_null_fields_are_required_errors() {
        let req: LoginRequest = serde_json::from_str(r#"{"email":null,"password":null}"#).unwrap();
        let details = req.rules().into_details();

        assert_eq!(details.len(), 2);
        assert_eq!(details[0].message, "The email field is required.");
        assert_eq!(details[1].message, "The password field is required.");
    }

    #[test]
    fn test_login_rules() {
        let ok = LoginRequest {
            email: Some("ada@example.com".to_string()),
            password: Some("x".to_string()),
        };
        assert!(ok.rules().is_empty());

        let bad = LoginRequest::default();
        assert_eq!(fields(bad.rules()), vec!["email".to_string(), "password".to_string()]);
    }
}
