//! Per-user task mirror
//!
//! `TaskStore` keeps an in-memory copy of the signed-in user's tasks and
//! categories, consistent with the remote record store. Every mutation is
//! written through: the remote call goes first, and only a confirmed success
//! is merged into the mirror, so a failed write never desyncs local state.
//! Queries read the mirror only and never touch the network.

mod stats;

pub use stats::{CategoryStats, CompletionStats, PriorityBreakdown};

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::broadcast;
use tracing::{info, warn};
use uuid::Uuid;

use crate::notify::{Notification, NotificationSink};
use crate::session::{Identity, Session, SessionEvent};
use crate::task::{Task, TaskDraft, TaskFilter, TaskPatch, TaskPriority, TaskRepository};

const DEFAULT_CATEGORIES: [&str; 3] = ["Personal", "Work", "Study"];

fn default_categories() -> Vec<String> {
    DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect()
}

struct MirrorState {
    identity: Option<Identity>,
    tasks: Vec<Task>,
    categories: Vec<String>,
    initialized: bool,
}

impl MirrorState {
    fn new() -> Self {
        Self {
            identity: None,
            tasks: Vec::new(),
            categories: default_categories(),
            initialized: false,
        }
    }

    fn owner_is(&self, owner_id: Uuid) -> bool {
        self.identity.as_ref().map(|identity| identity.id) == Some(owner_id)
    }

    fn observe_category(&mut self, category: Option<&str>) {
        if let Some(category) = category {
            if !self.categories.iter().any(|existing| existing == category) {
                self.categories.push(category.to_string());
            }
        }
    }
}

/// Task mirror for the current user
#[derive(Clone)]
pub struct TaskStore {
    repository: Arc<dyn TaskRepository>,
    notifier: Arc<dyn NotificationSink>,
    state: Arc<RwLock<MirrorState>>,
}

impl TaskStore {
    /// Create a new store over the given record store and notification sink
    pub fn new(repository: Arc<dyn TaskRepository>, notifier: Arc<dyn NotificationSink>) -> Self {
        Self {
            repository,
            notifier,
            state: Arc::new(RwLock::new(MirrorState::new())),
        }
    }

    fn read_state(&self) -> RwLockReadGuard<'_, MirrorState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, MirrorState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Replace the mirror for a new identity.
    ///
    /// The previous mirror is discarded wholesale before any remote call,
    /// so tasks never bleed across users. With an identity present the
    /// owner's tasks are bulk-loaded; a load failure leaves an empty,
    /// usable mirror and reports the error.
    pub async fn set_identity(&self, identity: Option<Identity>) {
        {
            let mut state = self.write_state();
            state.identity = identity.clone();
            state.tasks.clear();
            state.categories = default_categories();
            state.initialized = identity.is_none();
        }

        let Some(identity) = identity else {
            return;
        };

        match self.repository.select(identity.id).await {
            Ok(tasks) => {
                let mut state = self.write_state();
                // A newer identity change owns the mirror now
                if !state.owner_is(identity.id) {
                    return;
                }
                for task in &tasks {
                    state.observe_category(task.category.as_deref());
                }
                info!("Loaded {} tasks for {}", tasks.len(), identity.email);
                state.tasks = tasks;
                state.initialized = true;
            }
            Err(err) => {
                warn!("Failed to load tasks for {}: {}", identity.email, err);
                {
                    let mut state = self.write_state();
                    if !state.owner_is(identity.id) {
                        return;
                    }
                    state.initialized = true;
                }
                self.notifier
                    .notify(Notification::destructive("Error", "Failed to load your tasks"));
            }
        }
    }

    /// Drive the mirror from session transitions.
    ///
    /// Applies the session's current identity first, then follows
    /// login/logout events until the session is dropped.
    pub fn observe(&self, session: &Session) -> tokio::task::JoinHandle<()> {
        let store = self.clone();
        let current = session.current();
        let mut events = session.subscribe();
        tokio::spawn(async move {
            store.set_identity(current).await;
            loop {
                match events.recv().await {
                    Ok(SessionEvent::LoggedIn(identity)) => {
                        store.set_identity(Some(identity)).await;
                    }
                    Ok(SessionEvent::LoggedOut) => {
                        store.set_identity(None).await;
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("Session listener lagged by {} events", skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    /// The identity the mirror currently belongs to
    pub fn identity(&self) -> Option<Identity> {
        self.read_state().identity.clone()
    }

    /// True once the first load (or clear) has finished
    pub fn is_initialized(&self) -> bool {
        self.read_state().initialized
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Create a task for the current identity.
    ///
    /// The record returned by the store, with its generated id and creation
    /// timestamp, is what lands in the mirror, not the draft.
    pub async fn add_task(&self, draft: TaskDraft) {
        let Some(identity) = self.identity() else {
            return;
        };

        match self.repository.insert(identity.id, draft).await {
            Ok(task) => {
                let title = task.title.clone();
                {
                    let mut state = self.write_state();
                    // The identity changed while the insert was in flight;
                    // this mirror belongs to someone else now
                    if !state.owner_is(identity.id) {
                        return;
                    }
                    state.observe_category(task.category.as_deref());
                    state.tasks.push(task);
                }
                self.notifier.notify(Notification::normal(
                    "Task added",
                    format!("\"{}\" has been added to your tasks", title),
                ));
            }
            Err(err) => {
                warn!("Failed to add task: {}", err);
                self.notifier
                    .notify(Notification::destructive("Error", "Failed to add task"));
            }
        }
    }

    /// Apply a field patch to a task.
    ///
    /// The remote update is attempted by id even when the task is not
    /// mirrored locally; the record store is the source of truth for
    /// existence.
    pub async fn update_task(&self, id: Uuid, patch: TaskPatch) {
        let Some(identity) = self.identity() else {
            return;
        };

        match self.patch_task(&identity, id, &patch).await {
            Ok(()) => {
                self.notifier.notify(Notification::normal(
                    "Task updated",
                    "Your task has been updated successfully",
                ));
            }
            Err(err) => {
                warn!("Failed to update task {}: {}", id, err);
                self.notifier
                    .notify(Notification::destructive("Error", "Failed to update task"));
            }
        }
    }

    /// Move a task to the trash. The task stays in the mirror, flagged as
    /// deleted, so it remains addressable for restore and purge.
    pub async fn delete_task(&self, id: Uuid) {
        let Some(identity) = self.identity() else {
            return;
        };

        let patch = TaskPatch::default().with_deleted(true);
        match self.patch_task(&identity, id, &patch).await {
            Ok(()) => {
                self.notifier.notify(Notification::normal(
                    "Task moved to trash",
                    "You can restore it from the trash if needed",
                ));
            }
            Err(err) => {
                warn!("Failed to trash task {}: {}", id, err);
                self.notifier.notify(Notification::destructive(
                    "Error",
                    "Failed to move task to trash",
                ));
            }
        }
    }

    /// Bring a trashed task back
    pub async fn restore_task(&self, id: Uuid) {
        let Some(identity) = self.identity() else {
            return;
        };

        let patch = TaskPatch::default().with_deleted(false);
        match self.patch_task(&identity, id, &patch).await {
            Ok(()) => {
                self.notifier.notify(Notification::normal(
                    "Task restored",
                    "Your task has been restored successfully",
                ));
            }
            Err(err) => {
                warn!("Failed to restore task {}: {}", id, err);
                self.notifier
                    .notify(Notification::destructive("Error", "Failed to restore task"));
            }
        }
    }

    /// Hard-delete a task. This is the only operation that shrinks the
    /// mirror, and it is irreversible.
    pub async fn permanently_delete_task(&self, id: Uuid) {
        let Some(identity) = self.identity() else {
            return;
        };

        match self.repository.delete(id).await {
            Ok(()) => {
                {
                    let mut state = self.write_state();
                    if state.owner_is(identity.id) {
                        state.tasks.retain(|task| task.id != id);
                    }
                }
                self.notifier.notify(Notification::normal(
                    "Task permanently deleted",
                    "The task has been permanently removed",
                ));
            }
            Err(err) => {
                warn!("Failed to permanently delete task {}: {}", id, err);
                self.notifier.notify(Notification::destructive(
                    "Error",
                    "Failed to permanently delete task",
                ));
            }
        }
    }

    /// Toggle a task's completion state. Reads the current value from the
    /// mirror, so an unmirrored id is a silent no-op.
    pub async fn complete_task(&self, id: Uuid) {
        let Some(identity) = self.identity() else {
            return;
        };

        let current = {
            let state = self.read_state();
            state
                .tasks
                .iter()
                .find(|task| task.id == id)
                .map(|task| (task.completed, task.title.clone()))
        };
        let Some((completed, title)) = current else {
            return;
        };

        let next = !completed;
        let patch = TaskPatch::default().with_completed(next);
        match self.patch_task(&identity, id, &patch).await {
            Ok(()) => {
                let action = if next { "completed" } else { "marked as incomplete" };
                self.notifier.notify(Notification::normal(
                    format!("Task {}", action),
                    format!("\"{}\" has been {}", title, action),
                ));
            }
            Err(err) => {
                warn!("Failed to toggle task {}: {}", id, err);
                self.notifier.notify(Notification::destructive(
                    "Error",
                    "Failed to update task status",
                ));
            }
        }
    }

    /// Write a patch through to the record store, then merge it into the
    /// mirrored task if it is present and the identity hasn't changed while
    /// the call was in flight.
    async fn patch_task(&self, owner: &Identity, id: Uuid, patch: &TaskPatch) -> crate::Result<()> {
        self.repository.update(id, patch).await?;

        let mut state = self.write_state();
        if state.owner_is(owner.id) {
            let mut observed = None;
            if let Some(task) = state.tasks.iter_mut().find(|task| task.id == id) {
                patch.apply(task);
                observed = task.category.clone();
            }
            if let Some(category) = observed {
                state.observe_category(Some(&category));
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Category management
    // ------------------------------------------------------------------

    /// The category set, default seed first, then in insertion order
    pub fn categories(&self) -> Vec<String> {
        self.read_state().categories.clone()
    }

    /// Add a category. Idempotent: an existing name is left alone and no
    /// notification is emitted for it.
    pub fn add_category(&self, name: impl Into<String>) {
        let name = name.into();
        {
            let mut state = self.write_state();
            if state.categories.iter().any(|existing| *existing == name) {
                return;
            }
            state.categories.push(name.clone());
        }
        self.notifier.notify(Notification::normal(
            "Category added",
            format!("\"{}\" has been added to your categories", name),
        ));
    }

    /// Remove a category. Tasks already carrying the name keep it; the
    /// dangling reference is permitted.
    pub fn remove_category(&self, name: &str) {
        {
            let mut state = self.write_state();
            state.categories.retain(|existing| existing != name);
        }
        self.notifier.notify(Notification::normal(
            "Category removed",
            format!("\"{}\" has been removed from your categories", name),
        ));
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Tasks of the current identity passing the filter, in mirror order.
    /// Returns an empty list when nobody is signed in.
    pub fn get_tasks(&self, filter: &TaskFilter) -> Vec<Task> {
        let state = self.read_state();
        let Some(identity) = &state.identity else {
            return Vec::new();
        };
        state
            .tasks
            .iter()
            .filter(|task| task.owner_id == identity.id && filter.matches(task))
            .cloned()
            .collect()
    }

    /// Look a task up by id, trashed or not
    pub fn get_task_by_id(&self, id: Uuid) -> Option<Task> {
        self.read_state()
            .tasks
            .iter()
            .find(|task| task.id == id)
            .cloned()
    }

    /// Completion counts over the current owner's non-deleted tasks
    pub fn completion_stats(&self) -> CompletionStats {
        let active = self.get_tasks(&TaskFilter::active());
        let completed = active.iter().filter(|task| task.completed).count();
        let total = active.len();
        CompletionStats {
            completed,
            total,
            percentage: stats::percentage(completed, total),
        }
    }

    /// Per-category completion counts, one entry per category in the set
    pub fn category_stats(&self) -> Vec<CategoryStats> {
        let active = self.get_tasks(&TaskFilter::active());
        self.categories()
            .into_iter()
            .map(|name| {
                let total = active
                    .iter()
                    .filter(|task| task.category.as_deref() == Some(name.as_str()))
                    .count();
                let completed = active
                    .iter()
                    .filter(|task| {
                        task.category.as_deref() == Some(name.as_str()) && task.completed
                    })
                    .count();
                CategoryStats {
                    completion_rate: stats::percentage(completed, total),
                    active: total - completed,
                    name,
                    total,
                    completed,
                }
            })
            .collect()
    }

    /// Non-deleted task counts per priority level
    pub fn priority_breakdown(&self) -> PriorityBreakdown {
        let active = self.get_tasks(&TaskFilter::active());
        let mut breakdown = PriorityBreakdown::default();
        for task in &active {
            match task.priority {
                TaskPriority::Low => breakdown.low += 1,
                TaskPriority::Medium => breakdown.medium += 1,
                TaskPriority::High => breakdown.high += 1,
            }
        }
        breakdown
    }
}
