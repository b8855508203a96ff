//! In-process stub of the Taskboard API
//!
//! Serves just enough of the real response shapes for client tests, on an
//! ephemeral localhost port. Writes echo the request body back so tests can
//! see exactly what the client sent.

#![allow(dead_code)]

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::{collections::HashMap, sync::Arc};
use uuid::Uuid;

pub const TOKEN: &str = "tbk_aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
pub const PASSWORD: &str = "correct horse";
pub const TAKEN_EMAIL: &str = "taken@example.com";
pub const USER_ID: &str = "6f1c5a4e-4c6b-4d0e-9d51-5b2f3c1e7a10";
pub const PROJECT_ID: &str = "0b6e2a2c-7d5f-4a8e-8c3b-2f9e1d4c6a70";
pub const TASK_ID: &str = "3d7a9c1b-2e4f-4b6a-8d0c-1f3e5a7b9c20";

/// Description every stored project has until a request changes it
pub const STORED_DESCRIPTION: &str = "Ship the first release";

#[derive(Clone, Copy, Default)]
pub struct StubOptions {
    pub logout_fails: bool,
}

fn user() -> Value {
    json!({ "id": USER_ID, "name": "Ada", "email": "ada@example.com" })
}

fn project() -> Value {
    json!({
        "id": PROJECT_ID,
        "user_id": USER_ID,
        "title": "Launch",
        "description": null,
        "tasks_count": 1,
        "created_at": "2026-01-01T00:00:00Z",
        "updated_at": "2026-01-01T00:00:00Z"
    })
}

fn task(id: &str) -> Value {
    json!({
        "id": id,
        "project_id": PROJECT_ID,
        "title": "Draft",
        "description": null,
        "status": "pending",
        "priority": "medium",
        "due_date": null,
        "assigned_to": null,
        "assigned_user": null,
        "created_at": "2026-01-01T00:00:00Z",
        "updated_at": "2026-01-02T00:00:00Z"
    })
}

/// Copies every key the client sent onto the stored record
fn apply(mut record: Value, body: &Value) -> Value {
    if let Some(fields) = body.as_object() {
        for (key, value) in fields {
            record[key.as_str()] = value.clone();
        }
    }
    record
}

fn error(status: StatusCode, code: &str, message: &str) -> Response {
    (status, Json(json!({ "error": code, "message": message }))).into_response()
}

fn unauthorized() -> Response {
    error(StatusCode::UNAUTHORIZED, "unauthorized", "Invalid or expired token")
}

fn title_required() -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({
            "error": "validation_error",
            "message": "Request validation failed",
            "details": [{ "field": "title", "message": "The title field is required." }]
        })),
    )
        .into_response()
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {TOKEN}"))
}

fn page(query: &HashMap<String, String>) -> i64 {
    query.get("page").and_then(|p| p.parse().ok()).unwrap_or(1)
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["password"] == PASSWORD {
        Json(json!({ "user": user(), "token": TOKEN })).into_response()
    } else {
        error(StatusCode::UNAUTHORIZED, "unauthorized", "Invalid email or password")
    }
}

async fn register(Json(body): Json<Value>) -> Response {
    if body["email"] == TAKEN_EMAIL {
        let details = json!([{ "field": "email", "message": "The email has already been taken." }]);
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "error": "validation_error",
                "message": "Request validation failed",
                "details": details
            })),
        )
            .into_response();
    }

    (StatusCode::CREATED, Json(json!({ "user": user(), "token": TOKEN }))).into_response()
}

async fn logout(State(options): State<Arc<StubOptions>>, headers: HeaderMap) -> Response {
    if options.logout_fails {
        return error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "Internal server error");
    }
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!({ "message": "Logged out successfully" })).into_response()
}

async fn projects(headers: HeaderMap, Query(query): Query<HashMap<String, String>>) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }

    Json(json!({
        "data": [project()],
        "meta": {
            "current_page": page(&query),
            "per_page": 10,
            "total": 11,
            "last_page": 2,
            "from": 1,
            "to": 1
        }
    }))
    .into_response()
}

async fn create_project(headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    if body["title"].as_str().map_or(true, |t| t.trim().is_empty()) {
        return title_required();
    }

    let mut created = apply(project(), &body);
    created["id"] = json!(Uuid::new_v4());
    created["tasks_count"] = json!(0);
    (StatusCode::CREATED, Json(json!({ "data": created }))).into_response()
}

async fn show_project(headers: HeaderMap, Path(id): Path<Uuid>) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    if id.to_string() != PROJECT_ID {
        return error(StatusCode::NOT_FOUND, "not_found", "Project not found");
    }

    let mut detail = project();
    detail["user"] = user();
    detail["tasks"] = json!([task(TASK_ID)]);
    Json(json!({ "data": detail })).into_response()
}

async fn update_project(
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }

    let mut stored = project();
    stored["id"] = json!(id);
    stored["description"] = json!(STORED_DESCRIPTION);
    Json(json!({ "data": apply(stored, &body) })).into_response()
}

async fn delete_project(headers: HeaderMap, Path(id): Path<Uuid>) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    if id.to_string() != PROJECT_ID {
        return error(StatusCode::NOT_FOUND, "not_found", "Project not found");
    }
    Json(json!({ "message": "Project deleted successfully" })).into_response()
}

async fn tasks(
    headers: HeaderMap,
    Path(project_id): Path<Uuid>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }

    let mut listed = task(TASK_ID);
    listed["project_id"] = json!(project_id);
    Json(json!({
        "data": [listed],
        "meta": {
            "current_page": page(&query),
            "per_page": 10,
            "total": 1,
            "last_page": 1,
            "from": 1,
            "to": 1
        }
    }))
    .into_response()
}

async fn create_task(
    headers: HeaderMap,
    Path(project_id): Path<Uuid>,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    if body["title"].as_str().map_or(true, |t| t.trim().is_empty()) {
        return title_required();
    }

    let mut created = apply(task(&Uuid::new_v4().to_string()), &body);
    created["project_id"] = json!(project_id);
    (StatusCode::CREATED, Json(json!({ "data": created }))).into_response()
}

async fn show_task(headers: HeaderMap, Path(id): Path<Uuid>) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }

    let mut detail = task(&id.to_string());
    detail["status"] = json!("done");
    detail["due_date"] = json!("2030-01-31");
    detail["project"] = project();
    Json(json!({ "data": detail })).into_response()
}

async fn update_task(
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }

    let mut stored = task(&id.to_string());
    stored["assigned_to"] = json!(USER_ID);
    Json(json!({ "data": apply(stored, &body) })).into_response()
}

async fn delete_task(headers: HeaderMap, Path(_id): Path<Uuid>) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!({ "message": "Task deleted successfully" })).into_response()
}

/// Starts the stub server and returns its base URL
pub async fn spawn_stub(options: StubOptions) -> String {
    let app = Router::new()
        .route("/api/login", post(login))
        .route("/api/register", post(register))
        .route("/api/logout", post(logout))
        .route("/api/projects", get(projects).post(create_project))
        .route(
            "/api/projects/:id",
            get(show_project).patch(update_project).delete(delete_project),
        )
        .route("/api/projects/:id/tasks", get(tasks).post(create_task))
        .route(
            "/api/tasks/:id",
            get(show_task).patch(update_task).delete(delete_task),
        )
        .with_state(Arc::new(options));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}")
}
