//! Task module
//!
//! This module contains task-related types and record store access.

mod file_store;
mod http_store;
mod model;
mod patch;
mod repository;

pub use file_store::FileTaskStore;
pub use http_store::{HttpStoreConfig, HttpTaskStore};
pub use model::*;
pub use patch::TaskPatch;
pub use repository::TaskRepository;
