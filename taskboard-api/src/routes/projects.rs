/// Project endpoints
///
/// # Endpoints
///
/// - `GET /api/projects` - List own projects, newest first, 10 per page
/// - `POST /api/projects` - Create a project owned by the caller
/// - `GET /api/projects/:id` - Project with owner and tasks
/// - `PUT|PATCH /api/projects/:id` - Partial update
/// - `DELETE /api/projects/:id` - Delete project and its tasks
///
/// Only the owner may view, update or delete a project.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
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
        authorization::{authorize_project, Ability},
        middleware::AuthContext,
    },
    models::{
        project::{CreateProject, Project, UpdateProject},
        task::Task,
        user::User,
    },
    pagination::{PageQuery, Paginated},
    resources::{
        double_option, DataResponse, MessageResponse, ProjectResource, TaskResource, UserResource,
    },
};
use validator::Validate;

/// Create project request
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct CreateProjectRequest {
    #[validate(length(max = 255, message = "The title may not be greater than 255 characters."))]
    pub title: Option<String>,

    pub description: Option<String>,
}

impl CreateProjectRequest {
    /// project-create rules
    pub fn rules(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.required("title", self.title.as_deref()).validate(self);
        errors
    }

    fn into_model(self, user_id: uuid::Uuid) -> CreateProject {
        CreateProject {
            user_id,
            title: self.title.unwrap_or_default(),
            description: self.description,
        }
    }
}

/// Update project request; absent fields are left untouched
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct UpdateProjectRequest {
    #[validate(length(max = 255, message = "The title may not be greater than 255 characters."))]
    pub title: Option<String>,

    /// `null` clears the description
    #[serde(deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
}

impl UpdateProjectRequest {
    /// project-update rules
    pub fn rules(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if let Some(title) = &self.title {
            errors.required("title", Some(title));
        }
        errors.validate(self);
        errors
    }
}

impl From<UpdateProjectRequest> for UpdateProject {
    fn from(req: UpdateProjectRequest) -> Self {
        UpdateProject {
            title: req.title,
            description: req.description,
        }
    }
}

/// Loads a project or fails with 404
pub(crate) async fn find_project(db: &PgPool, raw_id: &str) -> ApiResult<Project> {
    let id = parse_id(raw_id, "Project")?;
    Project::find_by_id(db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))
}

/// List the caller's projects
///
/// ```text
/// GET /api/projects?page=2
/// ```
pub async fn list_projects(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<Paginated<ProjectResource>>> {
    let page = query.into_request();
    let projects = Project::list_for_user(&state.db, auth.user_id, page).await?;

    tracing::debug!(
        user_id = %auth.user_id,
        page = page.page(),
        total = projects.meta.total,
        "Listed projects"
    );

    Ok(Json(projects.map(ProjectResource::from)))
}

/// Create a project
///
/// ```text
/// POST /api/projects
/// Content-Type: application/json
///
/// { "title": "Launch", "description": "Q3 release" }
/// ```
///
/// # Errors
///
/// - `422 Unprocessable Entity`: title missing or too long
pub async fn create_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    payload: Result<Json<CreateProjectRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<DataResponse<ProjectResource>>)> {
    let Json(req) = payload?;
    req.rules().into_result()?;

    let project = Project::create(&state.db, req.into_model(auth.user_id)).await?;

    tracing::info!(user_id = %auth.user_id, project_id = %project.id, "Project created");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new(ProjectResource::from(project))),
    ))
}

/// Show a project with its owner and every task (with assignees)
pub async fn get_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<DataResponse<ProjectResource>>> {
    let project = find_project(&state.db, &id).await?;
    authorize_project(&auth, Ability::View, &project)?;

    let owner = User::find_summary(&state.db, project.user_id)
        .await?
        .ok_or_else(|| {
            ApiError::InternalError(format!("Owner of project {} missing", project.id))
        })?;

    let tasks = Task::all_for_project(&state.db, project.id)
        .await?
        .into_iter()
        .map(TaskResource::from)
        .collect();

    let resource = ProjectResource::from(project)
        .with_owner(UserResource::from(owner))
        .with_tasks(tasks);

    Ok(Json(DataResponse::new(resource)))
}

/// Update a project
///
/// ```text
/// PATCH /api/projects/:id
/// Content-Type: application/json
///
/// { "description": null }
/// ```
pub async fn update_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateProjectRequest>, JsonRejection>,
) -> ApiResult<Json<DataResponse<ProjectResource>>> {
    let project = find_project(&state.db, &id).await?;
    authorize_project(&auth, Ability::Update, &project)?;

    let Json(req) = payload?;
    req.rules().into_result()?;

    let updated = Project::update(&state.db, project.id, req.into())
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    tracing::info!(user_id = %auth.user_id, project_id = %updated.id, "Project updated");

    Ok(Json(DataResponse::new(ProjectResource::from(updated))))
}

/// Delete a project; its tasks are removed by cascade
pub async fn delete_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let project = find_project(&state.db, &id).await?;
    authorize_project(&auth, Ability::Delete, &project)?;

    Project::delete(&state.db, project.id).await?;

    tracing::info!(user_id = %auth.user_id, project_id = %project.id, "Project deleted");

    Ok(Json(MessageResponse::new("Project deleted successfully")))
}
