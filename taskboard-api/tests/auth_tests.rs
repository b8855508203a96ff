/// Integration tests for authentication
///
/// The first group runs without a database: every request is rejected before
/// a query is issued. The rest need `DATABASE_URL`.

mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use common::TestContext;
use serde_json::json;

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = common::offline_app();

    for (method, uri) in [
        (Method::GET, "/api/projects"),
        (Method::POST, "/api/projects"),
        (Method::GET, "/api/projects/00000000-0000-0000-0000-000000000000"),
        (Method::GET, "/api/projects/00000000-0000-0000-0000-000000000000/tasks"),
        (Method::DELETE, "/api/tasks/00000000-0000-0000-0000-000000000000"),
        (Method::POST, "/api/logout"),
    ] {
        let (status, body) = common::send(&app, method.clone(), uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
        assert_eq!(body["error"], "unauthorized");
    }
}

#[tokio::test]
async fn test_non_bearer_scheme_is_rejected() {
    let app = common::offline_app();

    let request = Request::builder()
        .uri("/api/projects")
        .header(header::AUTHORIZATION, "Basic YWRhOmhvcnNl")
        .body(Body::empty())
        .unwrap();

    let (status, _) = common::send_raw(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_malformed_token_is_rejected() {
    let app = common::offline_app();

    let (status, _) =
        common::send(&app, Method::GET, "/api/projects", Some("not-a-token"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_validation_runs_before_database() {
    let app = common::offline_app();

    let (status, body) = common::send(
        &app,
        Method::POST,
        "/api/register",
        None,
        Some(json!({ "email": "nope", "password": "short", "password_confirmation": "other" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation_error");

    let fields: Vec<&str> = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"name"));
    assert!(fields.contains(&"email"));
    assert!(fields.contains(&"password"));
}

#[tokio::test]
async fn test_null_required_fields_are_field_errors() {
    let app = common::offline_app();

    let (status, body) = common::send(
        &app,
        Method::POST,
        "/api/register",
        None,
        Some(json!({
            "name": null,
            "email": null,
            "password": null,
            "password_confirmation": null
        })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let details = body["details"].as_array().unwrap();
    assert_eq!(details.len(), 3);
    assert_eq!(details[0]["field"], "name");
    assert_eq!(details[0]["message"], "The name field is required.");
    assert_eq!(details[1]["field"], "email");
    assert_eq!(details[2]["field"], "password");

    let (status, body) = common::send(
        &app,
        Method::POST,
        "/api/login",
        None,
        Some(json!({ "email": null, "password": null })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"][0]["message"], "The email field is required.");
}

#[tokio::test]
async fn test_malformed_json_is_a_body_error() {
    let app = common::offline_app();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"email\": "))
        .unwrap();

    let (status, body) = common::send_raw(&app, request).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"][0]["field"], "body");
}

#[tokio::test]
async fn test_register_returns_user_and_token() {
    let Some(ctx) = TestContext::try_new().await else {
        return;
    };

    let user = ctx.register("Ada").await;
    assert!(user.token.starts_with("tbk_"));
    assert_eq!(user.token.len(), 44);
}

#[tokio::test]
async fn test_register_rejects_taken_email_case_insensitively() {
    let Some(ctx) = TestContext::try_new().await else {
        return;
    };

    let user = ctx.register("Grace").await;

    let (status, body) = ctx
        .send(
            Method::POST,
            "/api/register",
            None,
            Some(json!({
                "name": "Impostor",
                "email": user.email.to_uppercase(),
                "password": "correct horse",
                "password_confirmation": "correct horse",
            })),
        )
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"][0]["field"], "email");
    assert_eq!(body["details"][0]["message"], "The email has already been taken.");
}

#[tokio::test]
async fn test_login_with_valid_and_invalid_credentials() {
    let Some(ctx) = TestContext::try_new().await else {
        return;
    };

    let user = ctx.register("Linus").await;

    let (status, body) = ctx
        .send(
            Method::POST,
            "/api/login",
            None,
            Some(json!({ "email": user.email, "password": "correct horse" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["id"], user.id.to_string());
    assert_ne!(body["token"], user.token);

    let (status, _) = ctx
        .send(
            Method::POST,
            "/api/login",
            None,
            Some(json!({ "email": user.email, "password": "wrong horse" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = ctx
        .send(
            Method::POST,
            "/api/login",
            None,
            Some(json!({ "email": "nobody@example.com", "password": "correct horse" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_invalidates_token() {
    let Some(ctx) = TestContext::try_new().await else {
        return;
    };

    let user = ctx.register("Barbara").await;

    let (status, _) = ctx.send(Method::GET, "/api/projects", Some(&user), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = ctx.send(Method::POST, "/api/logout", Some(&user), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Logged out successfully");

    let (status, _) = ctx.send(Method::GET, "/api/projects", Some(&user), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unknown_well_formed_token_is_rejected() {
    let Some(ctx) = TestContext::try_new().await else {
        return;
    };

    let (token, _) = taskboard_shared::auth::token::generate_token();
    let (status, _) =
        common::send(&ctx.app, Method::GET, "/api/projects", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_health_reports_database() {
    let Some(ctx) = TestContext::try_new().await else {
        return;
    };

    let (status, body) = ctx.send(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");
}
