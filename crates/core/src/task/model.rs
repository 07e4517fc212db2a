//! Task model definitions

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Task priority level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

impl Default for TaskPriority {
    fn default() -> Self {
        Self::Medium
    }
}

/// A task owned by a single user.
///
/// `id` and `created_at` are assigned by the record store at insertion and
/// never change afterwards. `is_deleted` marks the task as trashed without
/// removing it, so it stays addressable for restore and purge.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub category: Option<String>,
    pub priority: TaskPriority,
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub is_deleted: bool,
}

impl Task {
    /// Materialize a draft into a full record for the given owner.
    ///
    /// Only record store implementations should call this; the assigned
    /// `id` and `created_at` are authoritative from that point on.
    pub fn new(owner_id: Uuid, draft: TaskDraft) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            title: draft.title,
            description: draft.description,
            completed: draft.completed,
            category: draft.category,
            priority: draft.priority,
            due_date: draft.due_date,
            created_at: Utc::now(),
            is_deleted: false,
        }
    }
}

/// Caller-supplied fields for a new task
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDraft {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
}

impl TaskDraft {
    /// Create a draft with the given title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            completed: false,
            category: None,
            priority: TaskPriority::default(),
            due_date: None,
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the initial completion state
    pub fn with_completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }

    /// Set the category
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Set the priority
    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Set the due date
    pub fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }
}

/// Filter for mirror queries. Fields left as `None` impose no constraint.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub completed: Option<bool>,
    pub category: Option<String>,
    pub deleted: Option<bool>,
}

impl TaskFilter {
    /// Non-deleted tasks only
    pub fn active() -> Self {
        Self {
            deleted: Some(false),
            ..Self::default()
        }
    }

    /// Trashed tasks only
    pub fn trashed() -> Self {
        Self {
            deleted: Some(true),
            ..Self::default()
        }
    }

    pub fn with_completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// True when the task passes every constraint set on this filter.
    /// Ownership is checked by the caller, not here.
    pub fn matches(&self, task: &Task) -> bool {
        if let Some(deleted) = self.deleted {
            if task.is_deleted != deleted {
                return false;
            }
        }
        if let Some(completed) = self.completed {
            if task.completed != completed {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if task.category.as_deref() != Some(category.as_str()) {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_defaults() {
        let draft = TaskDraft::new("Write report");
        assert_eq!(draft.title, "Write report");
        assert!(draft.description.is_none());
        assert!(!draft.completed);
        assert!(draft.category.is_none());
        assert_eq!(draft.priority, TaskPriority::Medium);
        assert!(draft.due_date.is_none());
    }

    #[test]
    fn test_task_from_draft() {
        let owner = Uuid::new_v4();
        let task = Task::new(
            owner,
            TaskDraft::new("Write report")
                .with_description("Quarterly numbers")
                .with_priority(TaskPriority::High),
        );

        assert_eq!(task.owner_id, owner);
        assert_eq!(task.title, "Write report");
        assert_eq!(task.description, Some("Quarterly numbers".to_string()));
        assert_eq!(task.priority, TaskPriority::High);
        assert!(!task.completed);
        assert!(!task.is_deleted);
    }

    #[test]
    fn test_filter_matches() {
        let owner = Uuid::new_v4();
        let mut task = Task::new(owner, TaskDraft::new("Errand").with_category("Personal"));

        assert!(TaskFilter::default().matches(&task));
        assert!(TaskFilter::active().matches(&task));
        assert!(!TaskFilter::trashed().matches(&task));
        assert!(TaskFilter::default().with_category("Personal").matches(&task));
        assert!(!TaskFilter::default().with_category("Work").matches(&task));

        task.is_deleted = true;
        assert!(TaskFilter::trashed().matches(&task));
        assert!(!TaskFilter::active().matches(&task));
    }

    #[test]
    fn test_filter_fields_are_independent() {
        let owner = Uuid::new_v4();
        let mut task = Task::new(owner, TaskDraft::new("Errand"));
        task.completed = true;
        task.is_deleted = true;

        // Completion filtering says nothing about deletion
        assert!(TaskFilter::default().with_completed(true).matches(&task));
    }
}
