//! Application state

use std::path::PathBuf;
use std::sync::Arc;

use tasko_core::task::FileTaskStore;
use tasko_core::Error;

use crate::auth::AuthStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    task_store: FileTaskStore,
    auth_store: AuthStore,
}

impl AppState {
    /// Create a new AppState with the given data directory
    pub async fn new(data_dir: PathBuf) -> tasko_core::Result<Self> {
        let task_store = FileTaskStore::new(data_dir.join("tasks.json")).await?;
        let auth_store = AuthStore::new(data_dir.join("auth"))
            .await
            .map_err(|e| Error::Storage(format!("Failed to initialize auth store: {}", e)))?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                task_store,
                auth_store,
            }),
        })
    }

    /// Get reference to the task store
    pub fn task_store(&self) -> &FileTaskStore {
        &self.inner.task_store
    }

    /// Get reference to the auth store
    pub fn auth_store(&self) -> &AuthStore {
        &self.inner.auth_store
    }
}
