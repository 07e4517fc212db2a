//! HTTP task record store
//!
//! Talks to the Tasko API server. Carries the signed-in user's bearer token;
//! the server scopes every call to that token's owner, so `select` trusts
//! the server-side scoping rather than filtering again here.

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;
use uuid::Uuid;

use super::model::{Task, TaskDraft};
use super::patch::TaskPatch;
use super::repository::TaskRepository;
use crate::{Error, Result};

/// Configuration for the HTTP record store
#[derive(Debug, Clone)]
pub struct HttpStoreConfig {
    /// Base URL of the API server, e.g. `http://localhost:8080`
    pub base_url: String,
    /// Bearer token identifying the signed-in user
    pub token: String,
}

/// Record store backed by the Tasko API server
pub struct HttpTaskStore {
    config: HttpStoreConfig,
    client: reqwest::Client,
}

impl HttpTaskStore {
    /// Create a new HTTP record store
    pub fn new(config: HttpStoreConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn check(response: reqwest::Response, context: &str) -> Result<reqwest::Response> {
        match response.status() {
            status if status.is_success() => Ok(response),
            StatusCode::NOT_FOUND => Err(Error::TaskNotFound(context.to_string())),
            StatusCode::UNAUTHORIZED => {
                Err(Error::Unauthorized("Bearer token rejected".to_string()))
            }
            status => Err(Error::Http(format!(
                "{} failed with status {}",
                context, status
            ))),
        }
    }
}

#[async_trait]
impl TaskRepository for HttpTaskStore {
    async fn select(&self, owner_id: Uuid) -> Result<Vec<Task>> {
        debug!("Selecting tasks for owner {}", owner_id);
        let response = self
            .client
            .get(self.url("/api/tasks"))
            .bearer_auth(&self.config.token)
            .send()
            .await
            .map_err(|e| Error::Http(format!("Failed to select tasks: {}", e)))?;

        Self::check(response, "select tasks")
            .await?
            .json::<Vec<Task>>()
            .await
            .map_err(|e| Error::Http(format!("Failed to parse task list: {}", e)))
    }

    async fn insert(&self, owner_id: Uuid, draft: TaskDraft) -> Result<Task> {
        debug!("Inserting task '{}' for owner {}", draft.title, owner_id);
        let response = self
            .client
            .post(self.url("/api/tasks"))
            .bearer_auth(&self.config.token)
            .json(&draft)
            .send()
            .await
            .map_err(|e| Error::Http(format!("Failed to insert task: {}", e)))?;

        Self::check(response, "insert task")
            .await?
            .json::<Task>()
            .await
            .map_err(|e| Error::Http(format!("Failed to parse inserted task: {}", e)))
    }

    async fn update(&self, id: Uuid, patch: &TaskPatch) -> Result<()> {
        let response = self
            .client
            .patch(self.url(&format!("/api/tasks/{}", id)))
            .bearer_auth(&self.config.token)
            .json(&patch.to_json())
            .send()
            .await
            .map_err(|e| Error::Http(format!("Failed to update task: {}", e)))?;

        Self::check(response, &id.to_string()).await?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let response = self
            .client
            .delete(self.url(&format!("/api/tasks/{}", id)))
            .bearer_auth(&self.config.token)
            .send()
            .await
            .map_err(|e| Error::Http(format!("Failed to delete task: {}", e)))?;

        Self::check(response, &id.to_string()).await?;
        Ok(())
    }
}
