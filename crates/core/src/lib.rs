//! Core library for Tasko
//!
//! This crate contains the task synchronization and query layer:
//! - Task model and record store access
//! - Session tracking
//! - The per-user task mirror and its derived views

pub mod error;
pub mod notify;
pub mod session;
pub mod store;
pub mod task;

pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;
