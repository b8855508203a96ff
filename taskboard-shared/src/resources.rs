/// JSON resource representations
///
/// These are the wire shapes of the HTTP API. The server builds them from
/// model rows; the client deserializes them. Relations are only present
/// when the endpoint loads them, so they are skipped rather than sent as
/// `null` when absent.
///
/// A single resource is wrapped as `{"data": {...}}` ([`DataResponse`]);
/// collections use [`crate::pagination::Paginated`].

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::models::{
    project::{Project, ProjectWithCount},
    task::{Task, TaskPriority, TaskStatus, TaskWithAssignee},
    user::{User, UserSummary},
};

/// `{"data": ...}` envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataResponse<T> {
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// `{"message": ...}` body returned by deletes and logout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// One field-level validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

impl ValidationErrorDetail {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Body of every non-2xx response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "not_found", "unauthorized")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Field errors; only validation failures carry any
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<ValidationErrorDetail>,
}

/// Body of a successful register or login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: UserResource,

    /// Plaintext bearer token; shown once
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserResource {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl From<&User> for UserResource {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

impl From<UserSummary> for UserResource {
    fn from(user: UserSummary) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectResource {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tasks_count: Option<i64>,

    /// Owner, on the detail endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserResource>,

    /// Every task with its assignee, on the detail endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tasks: Option<Vec<TaskResource>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProjectResource {
    pub fn with_owner(mut self, owner: UserResource) -> Self {
        self.user = Some(owner);
        self
    }

    pub fn with_tasks(mut self, tasks: Vec<TaskResource>) -> Self {
        self.tasks = Some(tasks);
        self
    }
}

impl From<Project> for ProjectResource {
    fn from(project: Project) -> Self {
        Self {
            id: project.id,
            user_id: project.user_id,
            title: project.title,
            description: project.description,
            tasks_count: None,
            user: None,
            tasks: None,
            created_at: project.created_at,
            updated_at: project.updated_at,
        }
    }
}

impl From<ProjectWithCount> for ProjectResource {
    fn from(row: ProjectWithCount) -> Self {
        Self {
            tasks_count: Some(row.tasks_count),
            ..Self::from(row.project)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResource {
    pub id: Uuid,
    pub project_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<NaiveDate>,
    pub assigned_to: Option<Uuid>,

    /// `Some(None)` serializes as `"assigned_user": null`; `None` omits the key
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "double_option"
    )]
    pub assigned_user: Option<Option<UserResource>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<Box<ProjectResource>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TaskResource {
    /// Marks the assignee relation as loaded
    pub fn with_assignee(mut self, assignee: Option<UserSummary>) -> Self {
        self.assigned_user = Some(assignee.map(UserResource::from));
        self
    }

    pub fn with_project(mut self, project: Project) -> Self {
        self.project = Some(Box::new(ProjectResource::from(project)));
        self
    }
}

impl From<Task> for TaskResource {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            project_id: task.project_id,
            title: task.title,
            description: task.description,
            status: task.status,
            priority: task.priority,
            due_date: task.due_date,
            assigned_to: task.assigned_to,
            assigned_user: None,
            project: None,
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}

impl From<TaskWithAssignee> for TaskResource {
    fn from(row: TaskWithAssignee) -> Self {
        let (task, assignee) = row.into_parts();
        Self::from(task).with_assignee(assignee)
    }
}

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`)
///
/// Use together with `#[serde(default)]`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
