//! File-based task record store
//!
//! Stores tasks as JSON in a file on disk. Doubles as the backing store of
//! the API server and as the record store used by the core test-suite.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::model::{Task, TaskDraft};
use super::patch::TaskPatch;
use super::repository::TaskRepository;
use crate::{Error, Result};

/// File-based record store using JSON
pub struct FileTaskStore {
    /// Path to the JSON file
    path: PathBuf,
    /// In-memory cache of tasks
    cache: RwLock<HashMap<Uuid, Task>>,
}

impl FileTaskStore {
    /// Create a new FileTaskStore
    ///
    /// If the file doesn't exist, it will be created on first write.
    pub async fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let cache = if path.exists() {
            let content = tokio::fs::read_to_string(&path).await?;
            let tasks: Vec<Task> = serde_json::from_str(&content)?;
            tasks.into_iter().map(|t| (t.id, t)).collect()
        } else {
            HashMap::new()
        };

        Ok(Self {
            path,
            cache: RwLock::new(cache),
        })
    }

    /// Persist the cache to disk
    async fn persist(&self) -> Result<()> {
        let cache = self.cache.read().await;
        let mut tasks: Vec<&Task> = cache.values().collect();
        tasks.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        let content = serde_json::to_string_pretty(&tasks)?;

        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(&self.path, content).await?;
        Ok(())
    }
}

#[async_trait]
impl TaskRepository for FileTaskStore {
    async fn select(&self, owner_id: Uuid) -> Result<Vec<Task>> {
        let cache = self.cache.read().await;
        let mut tasks: Vec<Task> = cache
            .values()
            .filter(|t| t.owner_id == owner_id)
            .cloned()
            .collect();
        // Oldest first, matching insertion order
        tasks.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(tasks)
    }

    async fn insert(&self, owner_id: Uuid, draft: TaskDraft) -> Result<Task> {
        if draft.title.trim().is_empty() {
            return Err(Error::InvalidInput("Title cannot be empty".to_string()));
        }

        let task = Task::new(owner_id, draft);
        {
            let mut cache = self.cache.write().await;
            cache.insert(task.id, task.clone());
        }
        self.persist().await?;
        Ok(task)
    }

    async fn update(&self, id: Uuid, patch: &TaskPatch) -> Result<()> {
        {
            let mut cache = self.cache.write().await;
            let task = cache
                .get_mut(&id)
                .ok_or_else(|| Error::TaskNotFound(id.to_string()))?;
            patch.apply(task);
        }
        self.persist().await?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        {
            let mut cache = self.cache.write().await;
            if cache.remove(&id).is_none() {
                return Err(Error::TaskNotFound(id.to_string()));
            }
        }
        self.persist().await?;
        Ok(())
    }
}
