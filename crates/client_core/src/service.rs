use async_trait::async_trait;
use reqwest::{Client, Response};
use shared::{
    domain::{Project, ProjectId},
    error::ApiErrorBody,
    protocol::{CountResponse, ProjectListResponse, ProjectNameRequest},
};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("project service unreachable: {0}")]
    Transport(String),
    #[error("project service responded with status {status}")]
    Status { status: u16, message: Option<String> },
    #[error("malformed project service response: {0}")]
    Decode(String),
}

impl ServiceError {
    /// Message the service attached to the failure, or `fallback` when it gave none.
    pub fn message_or(&self, fallback: &str) -> String {
        match self {
            Self::Status {
                message: Some(message),
                ..
            } => message.clone(),
            _ => fallback.to_string(),
        }
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

#[async_trait]
pub trait ProjectService: Send + Sync {
    async fn count(&self) -> Result<u64, ServiceError>;
    async fn list(&self) -> Result<Vec<Project>, ServiceError>;
    async fn create(&self, name: &str) -> Result<(), ServiceError>;
    async fn update(&self, id: &ProjectId, name: &str) -> Result<(), ServiceError>;
    async fn delete(&self, id: &ProjectId) -> Result<(), ServiceError>;
}

/// `ProjectService` backed by the REST endpoints under `{base}/api/projects`.
pub struct HttpProjectService {
    http: Client,
    base_url: String,
}

impl HttpProjectService {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self) -> String {
        format!("{}/api/projects", self.base_url)
    }

    fn item_url(&self, id: &ProjectId) -> String {
        format!("{}/api/projects/{}", self.base_url, id)
    }
}

/// Turns a non-2xx response into `ServiceError::Status`.
///
/// Only create and update surface the body's `message`; the other
/// operations report a generic failure regardless of what the body says.
async fn ensure_success(
    response: Response,
    operation: &'static str,
    read_message: bool,
) -> Result<Response, ServiceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = if read_message {
        let body = response.bytes().await.unwrap_or_default();
        ApiErrorBody::from_body(&body).into_message()
    } else {
        None
    };
    warn!(
        operation,
        status = status.as_u16(),
        message = message.as_deref().unwrap_or(""),
        "projects: request rejected"
    );
    Err(ServiceError::Status {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl ProjectService for HttpProjectService {
    async fn count(&self) -> Result<u64, ServiceError> {
        let url = format!("{}/count", self.collection_url());
        debug!(%url, "projects: fetching count");
        let response = self.http.get(url).send().await?;
        let body: CountResponse = ensure_success(response, "count", false)
            .await?
            .json()
            .await?;
        Ok(body.count)
    }

    async fn list(&self) -> Result<Vec<Project>, ServiceError> {
        let url = self.collection_url();
        debug!(%url, "projects: fetching list");
        let response = self.http.get(url).send().await?;
        let body: ProjectListResponse = ensure_success(response, "list", false)
            .await?
            .json()
            .await?;
        Ok(body.projects)
    }

    async fn create(&self, name: &str) -> Result<(), ServiceError> {
        let url = self.collection_url();
        debug!(%url, "projects: creating project");
        let response = self
            .http
            .post(url)
            .json(&ProjectNameRequest {
                name: name.to_string(),
            })
            .send()
            .await?;
        ensure_success(response, "create", true).await?;
        Ok(())
    }

    async fn update(&self, id: &ProjectId, name: &str) -> Result<(), ServiceError> {
        let url = self.item_url(id);
        debug!(%url, project_id = %id, "projects: updating project");
        let response = self
            .http
            .put(url)
            .json(&ProjectNameRequest {
                name: name.to_string(),
            })
            .send()
            .await?;
        ensure_success(response, "update", true).await?;
        Ok(())
    }

    async fn delete(&self, id: &ProjectId) -> Result<(), ServiceError> {
        let url = self.item_url(id);
        debug!(%url, project_id = %id, "projects: deleting project");
        let response = self.http.delete(url).send().await?;
        ensure_success(response, "delete", false).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/service_tests.rs"]
mod tests;
