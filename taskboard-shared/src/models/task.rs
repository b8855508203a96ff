/// Task model and database operations
///
/// A task belongs to one project for its whole life and may be assigned to
/// any user. Assignment is a weak reference: deleting the assignee sets
/// `assigned_to` to NULL.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('pending', 'in_progress', 'done');
/// CREATE TYPE task_priority AS ENUM ('low', 'medium', 'high');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     assigned_to UUID REFERENCES users(id) ON DELETE SET NULL,
///     title VARCHAR(255) NOT NULL,
///     description TEXT,
///     status task_status NOT NULL DEFAULT 'pending',
///     priority task_priority NOT NULL DEFAULT 'medium',
///     due_date DATE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT clock_timestamp(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT clock_timestamp()
/// );
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::{fmt, str::FromStr};
use uuid::Uuid;

use super::user::UserSummary;
use crate::pagination::{PageRequest, Paginated};

const TASK_COLUMNS: &str =
    "id, project_id, assigned_to, title, description, status, priority, due_date, created_at, updated_at";

/// Workflow status of a task
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Done,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] =
        [TaskStatus::Pending, TaskStatus::InProgress, TaskStatus::Done];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Done => "done",
        }
    }
}

/// Priority of a task
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl TaskPriority {
    pub const ALL: [TaskPriority; 3] =
        [TaskPriority::Low, TaskPriority::Medium, TaskPriority::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
        }
    }
}

/// Returned when a string is not one of an enum's wire values
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{value}' is not one of: {expected}")]
pub struct UnknownVariant {
    pub value: String,
    pub expected: String,
}

macro_rules! wire_enum_impls {
    ($ty:ty) => {
        impl FromStr for $ty {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <$ty>::ALL
                    .into_iter()
                    .find(|v| v.as_str() == s)
                    .ok_or_else(|| UnknownVariant {
                        value: s.to_string(),
                        expected: <$ty>::ALL.map(|v| v.as_str()).join(", "),
                    })
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

wire_enum_impls!(TaskStatus);
wire_enum_impls!(TaskPriority);

/// A task row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    pub id: Uuid,

    /// Parent project; immutable
    pub project_id: Uuid,

    /// Assigned user, if any
    pub assigned_to: Option<Uuid>,

    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A task joined with its assignee's public columns
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TaskWithAssignee {
    #[sqlx(flatten)]
    pub task: Task,

    pub assignee_name: Option<String>,
    pub assignee_email: Option<String>,
}

impl TaskWithAssignee {
    /// Splits the row into the task and its (optional) assignee
    pub fn into_parts(self) -> (Task, Option<UserSummary>) {
        let assignee = match (self.task.assigned_to, self.assignee_name, self.assignee_email) {
            (Some(id), Some(name), Some(email)) => Some(UserSummary { id, name, email }),
            _ => None,
        };

        (self.task, assignee)
    }
}

/// Input for creating a task
#[derive(Debug, Clone, Default)]
pub struct CreateTask {
    pub project_id: Uuid,
    pub title: String,
    pub description: Option<String>,

    /// Defaults to `pending`
    pub status: Option<TaskStatus>,

    /// Defaults to `medium`
    pub priority: Option<TaskPriority>,

    pub due_date: Option<NaiveDate>,
    pub assigned_to: Option<Uuid>,
}

/// Partial update; the project cannot be changed
///
/// Nullable columns use `Option<Option<_>>`: `Some(None)` writes NULL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<Option<NaiveDate>>,
    pub assigned_to: Option<Option<Uuid>>,
}

impl Task {
    /// Inserts a task under `data.project_id`
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Task>(&format!(
            r#"
            INSERT INTO tasks (project_id, assigned_to, title, description, status, priority, due_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {TASK_COLUMNS}
            "#
        ))
        .bind(data.project_id)
        .bind(data.assigned_to)
        .bind(data.title)
        .bind(data.description)
        .bind(data.status.unwrap_or_default())
        .bind(data.priority.unwrap_or_default())
        .bind(data.due_date)
        .fetch_one(pool)
        .await
    }

    /// Finds a task by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// One page of a project's tasks, newest first, assignees joined
    pub async fn list_for_project(
        pool: &PgPool,
        project_id: Uuid,
        page: PageRequest,
    ) -> Result<Paginated<TaskWithAssignee>, sqlx::Error> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tasks WHERE project_id = $1")
            .bind(project_id)
            .fetch_one(pool)
            .await?;

        let rows = sqlx::query_as::<_, TaskWithAssignee>(
            r#"
            SELECT t.id, t.project_id, t.assigned_to, t.title, t.description, t.status,
                   t.priority, t.due_date, t.created_at, t.updated_at,
                   u.name AS assignee_name, u.email AS assignee_email
            FROM tasks t
            LEFT JOIN users u ON u.id = t.assigned_to
            WHERE t.project_id = $1
            ORDER BY t.created_at DESC, t.id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(project_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(pool)
        .await?;

        Ok(Paginated::new(rows, total, page))
    }

    /// Every task of a project with assignees joined (project detail view)
    pub async fn all_for_project(
        pool: &PgPool,
        project_id: Uuid,
    ) -> Result<Vec<TaskWithAssignee>, sqlx::Error> {
        sqlx::query_as::<_, TaskWithAssignee>(
            r#"
            SELECT t.id, t.project_id, t.assigned_to, t.title, t.description, t.status,
                   t.priority, t.due_date, t.created_at, t.updated_at,
                   u.name AS assignee_name, u.email AS assignee_email
            FROM tasks t
            LEFT JOIN users u ON u.id = t.assigned_to
            WHERE t.project_id = $1
            ORDER BY t.created_at ASC, t.id ASC
            "#,
        )
        .bind(project_id)
        .fetch_all(pool)
        .await
    }

    /// Applies a partial update and returns the new row
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new("UPDATE tasks SET updated_at = clock_timestamp()");

        if let Some(title) = data.title {
            query.push(", title = ").push_bind(title);
        }
        if let Some(description) = data.description {
            query.push(", description = ").push_bind(description);
        }
        if let Some(status) = data.status {
            query.push(", status = ").push_bind(status);
        }
        if let Some(priority) = data.priority {
            query.push(", priority = ").push_bind(priority);
        }
        if let Some(due_date) = data.due_date {
            query.push(", due_date = ").push_bind(due_date);
        }
        if let Some(assigned_to) = data.assigned_to {
            query.push(", assigned_to = ").push_bind(assigned_to);
        }

        query
            .push(" WHERE id = ")
            .push_bind(id)
            .push(format!(" RETURNING {TASK_COLUMNS}"));

        query.build_query_as::<Task>().fetch_optional(pool).await
    }

    /// Hard-deletes a task
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_values() {
        assert_eq!(TaskStatus::InProgress.as_str(), "in_progress");
        assert_eq!("done".parse::<TaskStatus>().unwrap(), TaskStatus::Done);
        assert_eq!(
            serde_json::to_string(&TaskStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
        assert_eq!(TaskStatus::default(), TaskStatus::Pending);
    }

    #[test]
    fn test_priority_wire_values() {
        assert_eq!("high".parse::<TaskPriority>().unwrap(), TaskPriority::High);
        assert_eq!(TaskPriority::default(), TaskPriority::Medium);
        assert_eq!(TaskPriority::Low.to_string(), "low");
    }

    #[test]
    fn test_unknown_variant_lists_expected() {
        let err = "urgent".parse::<TaskPriority>().unwrap_err();
        assert_eq!(err.value, "urgent");
        assert_eq!(err.expected, "low, medium, high");

        assert!("In_Progress".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn test_into_parts_with_and_without_assignee() {
        let assignee_id = Uuid::new_v4();
        let task = Task {
            id: Uuid::new_v4(),
            project_id: Uuid::new_v4(),
            assigned_to: Some(assignee_id),
            title: "Draft".to_string(),
            description: None,
            status: TaskStatus::Pending,
            priority: TaskPriority::Medium,
            due_date: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let row = TaskWithAssignee {
            task: task.clone(),
            assignee_name: Some("Ada".to_string()),
            assignee_email: Some("ada@example.com".to_string()),
        };
        let (_, assignee) = row.into_parts();
        assert_eq!(assignee.map(|a| a.id), Some(assignee_id));

        let unassigned = TaskWithAssignee {
            task: Task {
                assigned_to: None,
                ..task
            },
            assignee_name: None,
            assignee_email: None,
        };
        assert!(unassigned.into_parts().1.is_none());
    }
}
