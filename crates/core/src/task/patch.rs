//! Partial task updates
//!
//! A `TaskPatch` carries only the fields a mutation wants to change. For the
//! optional task fields the patch distinguishes "leave untouched" (outer
//! `None`) from "clear" (inner `None`), and the JSON object form keeps that
//! distinction on the wire: an untouched field has no key, a cleared field is
//! an explicit null.

use std::str::FromStr;

use chrono::NaiveDate;
use serde_json::{Map, Value};

use super::model::{Task, TaskPriority};
use crate::{Error, Result};

impl TaskPriority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl FromStr for TaskPriority {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(Error::InvalidInput(format!(
                "Unsupported priority '{}'",
                other
            ))),
        }
    }
}

/// Partial update over the mutable task fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub completed: Option<bool>,
    pub category: Option<Option<String>>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<Option<NaiveDate>>,
    pub is_deleted: Option<bool>,
}

impl TaskPatch {
    /// Set the title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set or clear the description
    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = Some(description);
        self
    }

    /// Set the completion state
    pub fn with_completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }

    /// Set or clear the category
    pub fn with_category(mut self, category: Option<String>) -> Self {
        self.category = Some(category);
        self
    }

    /// Set the priority
    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Set or clear the due date
    pub fn with_due_date(mut self, due_date: Option<NaiveDate>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Set the trash flag
    pub fn with_deleted(mut self, is_deleted: bool) -> Self {
        self.is_deleted = Some(is_deleted);
        self
    }

    /// True when no field is set
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.completed.is_none()
            && self.category.is_none()
            && self.priority.is_none()
            && self.due_date.is_none()
            && self.is_deleted.is_none()
    }

    /// Merge the set fields into `task`, leaving the rest untouched
    pub fn apply(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
        if let Some(category) = &self.category {
            task.category = category.clone();
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        if let Some(is_deleted) = self.is_deleted {
            task.is_deleted = is_deleted;
        }
    }

    /// Wire form: a JSON object holding only the set fields
    pub fn to_json(&self) -> Map<String, Value> {
        let mut fields = Map::new();
        if let Some(title) = &self.title {
            fields.insert("title".into(), Value::String(title.clone()));
        }
        if let Some(description) = &self.description {
            fields.insert("description".into(), optional_string(description));
        }
        if let Some(completed) = self.completed {
            fields.insert("completed".into(), Value::Bool(completed));
        }
        if let Some(category) = &self.category {
            fields.insert("category".into(), optional_string(category));
        }
        if let Some(priority) = self.priority {
            fields.insert("priority".into(), Value::String(priority.as_str().into()));
        }
        if let Some(due_date) = self.due_date {
            let value = match due_date {
                Some(date) => Value::String(date.to_string()),
                None => Value::Null,
            };
            fields.insert("dueDate".into(), value);
        }
        if let Some(is_deleted) = self.is_deleted {
            fields.insert("isDeleted".into(), Value::Bool(is_deleted));
        }
        fields
    }

    /// Parse the wire form back into a patch. Keys other than the mutable
    /// task fields are ignored.
    pub fn from_json(fields: &Map<String, Value>) -> Result<Self> {
        let mut patch = Self::default();
        for (key, value) in fields {
            match key.as_str() {
                "title" => {
                    patch.title = Some(require_string(key, value)?);
                }
                "description" => {
                    patch.description = Some(parse_optional_string(key, value)?);
                }
                "completed" => {
                    patch.completed = Some(require_bool(key, value)?);
                }
                "category" => {
                    patch.category = Some(parse_optional_string(key, value)?);
                }
                "priority" => {
                    patch.priority = Some(require_string(key, value)?.parse()?);
                }
                "dueDate" => {
                    patch.due_date = Some(match parse_optional_string(key, value)? {
                        Some(raw) => Some(raw.parse::<NaiveDate>().map_err(|_| {
                            Error::InvalidInput(format!("Invalid due date '{}'", raw))
                        })?),
                        None => None,
                    });
                }
                "isDeleted" => {
                    patch.is_deleted = Some(require_bool(key, value)?);
                }
                _ => {}
            }
        }
        Ok(patch)
    }
}

fn optional_string(value: &Option<String>) -> Value {
    match value {
        Some(inner) => Value::String(inner.clone()),
        None => Value::Null,
    }
}

fn require_string(key: &str, value: &Value) -> Result<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| Error::InvalidInput(format!("Field '{}' must be a string", key)))
}

fn require_bool(key: &str, value: &Value) -> Result<bool> {
    value
        .as_bool()
        .ok_or_else(|| Error::InvalidInput(format!("Field '{}' must be a boolean", key)))
}

fn parse_optional_string(key: &str, value: &Value) -> Result<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::String(inner) => Ok(Some(inner.clone())),
        _ => Err(Error::InvalidInput(format!(
            "Field '{}' must be a string or null",
            key
        ))),
    }
}
