/// Typed HTTP client for the Taskboard API
///
/// Every authenticated call reads the bearer token from the shared
/// [`SessionStore`] at send time, so a login on one clone of the client is
/// seen by all others.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use taskboard_client::{ApiClient, FileTokenStorage, LoginInput, SessionStore};
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let session = Arc::new(SessionStore::load(FileTokenStorage::new("session.json"))?);
/// let client = ApiClient::new("http://localhost:8080", session)?;
///
/// client
///     .login(&LoginInput {
///         email: "ada@example.com".into(),
///         password: "correct horse".into(),
///     })
///     .await?;
///
/// let projects = client.projects(1).await?;
/// println!("{} projects", projects.meta.total);
/// # Ok(())
/// # }
/// ```

use chrono::NaiveDate;
use reqwest::{Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{sync::Arc, time::Duration};
use taskboard_shared::{
    models::task::{TaskPriority, TaskStatus},
    pagination::Paginated,
    resources::{
        AuthResponse, DataResponse, ErrorResponse, MessageResponse, ProjectResource, TaskResource,
        UserResource,
    },
};
use uuid::Uuid;

use crate::{
    error::{ClientError, ClientResult},
    session::SessionStore,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Serialize)]
pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProjectInput {
    pub title: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Partial project update; `description: Some(None)` clears it
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProjectUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TaskInput {
    pub title: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<Uuid>,
}

/// Partial task update; `Some(None)` clears a nullable field
#[derive(Debug, Clone, Default, Serialize)]
pub struct TaskUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Option<NaiveDate>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<Option<Uuid>>,
}

/// `GET /health` body
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Health {
    pub status: String,
    pub version: String,
    pub database: String,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<SessionStore>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, session: Arc<SessionStore>) -> ClientResult<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        reqwest::Url::parse(&base_url)
            .map_err(|e| ClientError::InvalidUrl(format!("{base_url}: {e}")))?;

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            base_url,
            session,
        })
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        tracing::debug!(%method, path, "API request");
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .header(reqwest::header::ACCEPT, "application/json")
    }

    fn authed(&self, method: Method, path: &str) -> ClientResult<RequestBuilder> {
        let token = self.session.token().ok_or(ClientError::NotAuthenticated)?;
        Ok(self.request(method, path).bearer_auth(token))
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body = response.json::<ErrorResponse>().await.ok();
        tracing::debug!(%status, error = ?body.as_ref().map(|b| &b.error), "API error response");
        Err(ClientError::Api { status, body })
    }

    async fn data<T: DeserializeOwned>(builder: RequestBuilder) -> ClientResult<T> {
        let envelope: DataResponse<T> = Self::decode(builder.send().await?).await?;
        Ok(envelope.data)
    }

    async fn message(builder: RequestBuilder) -> ClientResult<String> {
        let body: MessageResponse = Self::decode(builder.send().await?).await?;
        Ok(body.message)
    }

    pub async fn health(&self) -> ClientResult<Health> {
        Self::decode(self.request(Method::GET, "/health").send().await?).await
    }

    /// Registers and signs in; the token is persisted in the session
    pub async fn register(&self, input: &RegisterInput) -> ClientResult<UserResource> {
        let response = self.request(Method::POST, "/api/register").json(input).send().await?;
        let auth: AuthResponse = Self::decode(response).await?;
        self.sign_in(auth)
    }

    pub async fn login(&self, input: &LoginInput) -> ClientResult<UserResource> {
        let response = self.request(Method::POST, "/api/login").json(input).send().await?;
        let auth: AuthResponse = Self::decode(response).await?;
        self.sign_in(auth)
    }

    fn sign_in(&self, auth: AuthResponse) -> ClientResult<UserResource> {
        let user = auth.user.clone();
        self.session.establish(auth)?;
        tracing::info!(user_id = %user.id, "Signed in");
        Ok(user)
    }

    /// Revokes the token server-side and always clears the local session
    ///
    /// The server result is returned after the session is cleared, so a
    /// failed call still leaves the client signed out.
    pub async fn logout(&self) -> ClientResult<()> {
        let result = match self.authed(Method::POST, "/api/logout") {
            Ok(builder) => Self::message(builder).await.map(|_| ()),
            Err(e) => Err(e),
        };

        self.session.clear()?;

        if let Err(e) = &result {
            tracing::warn!(error = %e, "Server-side logout failed; local session cleared");
        }

        result
    }

    pub async fn projects(&self, page: i64) -> ClientResult<Paginated<ProjectResource>> {
        let builder = self.authed(Method::GET, "/api/projects")?.query(&[("page", page)]);
        Self::decode(builder.send().await?).await
    }

    /// Project with owner and tasks
    pub async fn project(&self, id: Uuid) -> ClientResult<ProjectResource> {
        Self::data(self.authed(Method::GET, &format!("/api/projects/{id}"))?).await
    }

    pub async fn create_project(&self, input: &ProjectInput) -> ClientResult<ProjectResource> {
        Self::data(self.authed(Method::POST, "/api/projects")?.json(input)).await
    }

    pub async fn update_project(
        &self,
        id: Uuid,
        input: &ProjectUpdate,
    ) -> ClientResult<ProjectResource> {
        Self::data(self.authed(Method::PATCH, &format!("/api/projects/{id}"))?.json(input)).await
    }

    pub async fn delete_project(&self, id: Uuid) -> ClientResult<String> {
        Self::message(self.authed(Method::DELETE, &format!("/api/projects/{id}"))?).await
    }

    pub async fn tasks(
        &self,
        project_id: Uuid,
        page: i64,
    ) -> ClientResult<Paginated<TaskResource>> {
        let builder = self
            .authed(Method::GET, &format!("/api/projects/{project_id}/tasks"))?
            .query(&[("page", page)]);
        Self::decode(builder.send().await?).await
    }

    /// Task with its project and assignee
    pub async fn task(&self, id: Uuid) -> ClientResult<TaskResource> {
        Self::data(self.authed(Method::GET, &format!("/api/tasks/{id}"))?).await
    }

    pub async fn create_task(
        &self,
        project_id: Uuid,
        input: &TaskInput,
    ) -> ClientResult<TaskResource> {
        Self::data(
            self.authed(Method::POST, &format!("/api/projects/{project_id}/tasks"))?
                .json(input),
        )
        .await
    }

    pub async fn update_task(&self, id: Uuid, input: &TaskUpdate) -> ClientResult<TaskResource> {
        Self::data(self.authed(Method::PATCH, &format!("/api/tasks/{id}"))?.json(input)).await
    }

    pub async fn delete_task(&self, id: Uuid) -> ClientResult<String> {
        Self::message(self.authed(Method::DELETE, &format!("/api/tasks/{id}"))?).await
    }
}
