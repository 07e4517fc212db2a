//! Task record store trait
//!
//! Defines the interface to the authoritative remote store. Each call is a
//! single atomic write or read; the mirror layer never assumes more than
//! that.

use async_trait::async_trait;
use uuid::Uuid;

use super::model::{Task, TaskDraft};
use super::patch::TaskPatch;
use crate::Result;

/// Record store interface for durable task CRUD
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Fetch every task belonging to `owner_id`
    async fn select(&self, owner_id: Uuid) -> Result<Vec<Task>>;

    /// Insert a new task for `owner_id` and return the authoritative record
    /// with its generated id and creation timestamp
    async fn insert(&self, owner_id: Uuid, draft: TaskDraft) -> Result<Task>;

    /// Apply a partial update to the task with the given id
    async fn update(&self, id: Uuid, patch: &TaskPatch) -> Result<()>;

    /// Permanently delete the task with the given id
    async fn delete(&self, id: Uuid) -> Result<()>;
}
