/// Project model and database operations
///
/// A project belongs to exactly one user, fixed at creation. Deleting a
/// project removes its tasks through `ON DELETE CASCADE`.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE projects (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     title VARCHAR(255) NOT NULL,
///     description TEXT,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT clock_timestamp(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT clock_timestamp()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::models::project::{CreateProject, Project};
/// use taskboard_shared::pagination::PageRequest;
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, user_id: Uuid) -> Result<(), sqlx::Error> {
/// Project::create(&pool, CreateProject {
///     user_id,
///     title: "Launch".to_string(),
///     description: None,
/// }).await?;
///
/// let page = Project::list_for_user(&pool, user_id, PageRequest::default()).await?;
/// assert_eq!(page.data[0].project.title, "Launch");
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::pagination::{PageRequest, Paginated};

const PROJECT_COLUMNS: &str = "id, user_id, title, description, created_at, updated_at";

/// A project row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    pub title: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A project annotated with the number of its tasks
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProjectWithCount {
    #[sqlx(flatten)]
    pub project: Project,

    pub tasks_count: i64,
}

/// Input for creating a project
#[derive(Debug, Clone)]
pub struct CreateProject {
    /// Authenticated requester; becomes the owner
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
}

/// Partial update; `None` leaves a column untouched
///
/// `description: Some(None)` clears the description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateProject {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
}

impl UpdateProject {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none()
    }
}

impl Project {
    /// Inserts a project owned by `data.user_id`
    pub async fn create(pool: &PgPool, data: CreateProject) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Project>(&format!(
            r#"
            INSERT INTO projects (user_id, title, description)
            VALUES ($1, $2, $3)
            RETURNING {PROJECT_COLUMNS}
            "#
        ))
        .bind(data.user_id)
        .bind(data.title)
        .bind(data.description)
        .fetch_one(pool)
        .await
    }

    /// Finds a project by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Project>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// One page of a user's projects, newest first, with task counts
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Paginated<ProjectWithCount>, sqlx::Error> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM projects WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await?;

        let rows = sqlx::query_as::<_, ProjectWithCount>(
            r#"
            SELECT p.id, p.user_id, p.title, p.description, p.created_at, p.updated_at,
                   (SELECT COUNT(*) FROM tasks t WHERE t.project_id = p.id) AS tasks_count
            FROM projects p
            WHERE p.user_id = $1
            ORDER BY p.created_at DESC, p.id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(pool)
        .await?;

        Ok(Paginated::new(rows, total, page))
    }

    /// Applies a partial update and returns the new row
    ///
    /// Returns `None` if the project does not exist. An empty update only
    /// bumps `updated_at`.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateProject,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new("UPDATE projects SET updated_at = clock_timestamp()");

        if let Some(title) = data.title {
            query.push(", title = ").push_bind(title);
        }
        if let Some(description) = data.description {
            query.push(", description = ").push_bind(description);
        }

        query
            .push(" WHERE id = ")
            .push_bind(id)
            .push(format!(" RETURNING {PROJECT_COLUMNS}"));

        query.build_query_as::<Project>().fetch_optional(pool).await
    }

    /// Hard-deletes a project; its tasks go with it
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
