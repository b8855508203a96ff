/// Task endpoints
///
/// # Endpoints
///
/// - `GET /api/projects/:id/tasks` - Tasks of a project, newest first, 10 per page
/// - `POST /api/projects/:id/tasks` - Create a task in a project
/// - `GET /api/tasks/:id` - Task with its project and assignee
/// - `PUT|PATCH /api/tasks/:id` - Partial update
/// - `DELETE /api/tasks/:id` - Delete a task
///
/// Access to a task follows access to its parent project. Creating a task
/// only needs `view` on the project.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::projects::find_project,
    validation::{parse_id, FieldErrors},
};
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use sqlx::PgPool;
use taskboard_shared::{
    auth::{
        authorization::{authorize_project, authorize_task, Ability},
        middleware::AuthContext,
    },
    models::{
        project::Project,
        task::{CreateTask, Task, TaskPriority, TaskStatus, UpdateTask},
        user::{User, UserSummary},
    },
    pagination::{PageQuery, Paginated},
    resources::{double_option, DataResponse, MessageResponse, TaskResource},
};
use uuid::Uuid;
use validator::Validate;

/// Create task request
///
/// Enum, date and id fields are taken as strings so that a bad value is
/// reported against its field. A `project_id` in the body is ignored; the
/// route decides the project.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct CreateTaskRequest {
    #[validate(length(max = 255, message = "The title may not be greater than 255 characters."))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub due_date: Option<String>,
    pub assigned_to: Option<String>,
}

impl CreateTaskRequest {
    /// task-create rules that need no database
    ///
    /// Returns the parsed input alongside every field error found.
    pub fn parse(self, project_id: Uuid) -> (CreateTask, FieldErrors) {
        let mut errors = FieldErrors::new();
        errors.required("title", self.title.as_deref()).validate(&self);

        let status = errors.choice::<TaskStatus>("status", self.status.as_deref());
        let priority = errors.choice::<TaskPriority>("priority", self.priority.as_deref());
        let due_date = errors.date("due_date", self.due_date.as_deref());
        let assigned_to = errors.uuid("assigned_to", self.assigned_to.as_deref());

        let input = CreateTask {
            project_id,
            title: self.title.unwrap_or_default(),
            description: self.description,
            status,
            priority,
            due_date,
            assigned_to,
        };

        (input, errors)
    }
}

/// Update task request; absent fields are left untouched
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct UpdateTaskRequest {
    #[validate(length(max = 255, message = "The title may not be greater than 255 characters."))]
    pub title: Option<String>,

    #[serde(deserialize_with = "double_option")]
    pub description: Option<Option<String>>,

    pub status: Option<String>,
    pub priority: Option<String>,

    #[serde(deserialize_with = "double_option")]
    pub due_date: Option<Option<String>>,

    #[serde(deserialize_with = "double_option")]
    pub assigned_to: Option<Option<String>>,
}

impl UpdateTaskRequest {
    /// task-update rules that need no database
    pub fn parse(self) -> (UpdateTask, FieldErrors) {
        let mut errors = FieldErrors::new();
        if let Some(title) = &self.title {
            errors.required("title", Some(title));
        }
        errors.validate(&self);

        let status = errors.choice::<TaskStatus>("status", self.status.as_deref());
        let priority = errors.choice::<TaskPriority>("priority", self.priority.as_deref());
        let due_date = self
            .due_date
            .map(|value| errors.date("due_date", value.as_deref()));
        let assigned_to = self
            .assigned_to
            .map(|value| errors.uuid("assigned_to", value.as_deref()));

        let input = UpdateTask {
            title: self.title,
            description: self.description,
            status,
            priority,
            due_date,
            assigned_to,
        };

        (input, errors)
    }
}

/// The `assigned_to` existence rule
async fn check_assignee(
    db: &PgPool,
    assigned_to: Option<Uuid>,
    errors: &mut FieldErrors,
) -> ApiResult<()> {
    if let Some(user_id) = assigned_to {
        if !User::exists(db, user_id).await? {
            errors.push("assigned_to", "The selected assigned to is invalid.");
        }
    }
    Ok(())
}

async fn load_assignee(db: &PgPool, task: &Task) -> ApiResult<Option<UserSummary>> {
    match task.assigned_to {
        Some(user_id) => Ok(User::find_summary(db, user_id).await?),
        None => Ok(None),
    }
}

/// Loads a task and its parent project or fails with 404
async fn find_task(db: &PgPool, raw_id: &str) -> ApiResult<(Task, Project)> {
    let id = parse_id(raw_id, "Task")?;
    let task = Task::find_by_id(db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    let project = Project::find_by_id(db, task.project_id)
        .await?
        .ok_or_else(|| ApiError::InternalError(format!("Project of task {} missing", task.id)))?;

    Ok((task, project))
}

/// List a project's tasks
///
/// ```text
/// GET /api/projects/:id/tasks?page=1
/// ```
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<String>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<Paginated<TaskResource>>> {
    let project = find_project(&state.db, &project_id).await?;
    authorize_project(&auth, Ability::View, &project)?;

    let tasks = Task::list_for_project(&state.db, project.id, query.into_request()).await?;

    Ok(Json(tasks.map(TaskResource::from)))
}

/// Create a task in a project
///
/// ```text
/// POST /api/projects/:id/tasks
/// Content-Type: application/json
///
/// {
///   "title": "Draft",
///   "status": "pending",
///   "priority": "high",
///   "due_date": "2030-01-31",
///   "assigned_to": null
/// }
/// ```
///
/// # Errors
///
/// - `403 Forbidden`: caller may not view the project
/// - `422 Unprocessable Entity`: validation failed
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<String>,
    payload: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<DataResponse<TaskResource>>)> {
    let project = find_project(&state.db, &project_id).await?;
    authorize_project(&auth, Ability::View, &project)?;

    let Json(req) = payload?;
    let (input, mut errors) = req.parse(project.id);
    check_assignee(&state.db, input.assigned_to, &mut errors).await?;
    errors.into_result()?;

    let task = Task::create(&state.db, input).await?;
    let assignee = load_assignee(&state.db, &task).await?;

    tracing::info!(
        user_id = %auth.user_id,
        project_id = %project.id,
        task_id = %task.id,
        "Task created"
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new(TaskResource::from(task).with_assignee(assignee))),
    ))
}

/// Show a task with its project and assignee
pub async fn get_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<DataResponse<TaskResource>>> {
    let (task, project) = find_task(&state.db, &id).await?;
    authorize_task(&auth, Ability::View, &task, &project)?;

    let assignee = load_assignee(&state.db, &task).await?;
    let resource = TaskResource::from(task)
        .with_assignee(assignee)
        .with_project(project);

    Ok(Json(DataResponse::new(resource)))
}

/// Update a task
///
/// ```text
/// PATCH /api/tasks/:id
/// Content-Type: application/json
///
/// { "status": "done" }
/// ```
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> ApiResult<Json<DataResponse<TaskResource>>> {
    let (task, project) = find_task(&state.db, &id).await?;
    authorize_task(&auth, Ability::Update, &task, &project)?;

    let Json(req) = payload?;
    let (input, mut errors) = req.parse();
    check_assignee(&state.db, input.assigned_to.flatten(), &mut errors).await?;
    errors.into_result()?;

    let updated = Task::update(&state.db, task.id, input)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;
    let assignee = load_assignee(&state.db, &updated).await?;

    tracing::info!(user_id = %auth.user_id, task_id = %updated.id, "Task updated");

    Ok(Json(DataResponse::new(
        TaskResource::from(updated).with_assignee(assignee),
    )))
}

/// Delete a task
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let (task, project) = find_task(&state.db, &id).await?;
    authorize_task(&auth, Ability::Delete, &task, &project)?;

    Task::delete(&state.db, task.id).await?;

    tracing::info!(user_id = %auth.user_id, task_id = %task.id, "Task deleted");

    Ok(Json(MessageResponse::new("Task deleted successfully")))
}
