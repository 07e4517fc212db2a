//! User-facing outcome notifications
//!
//! Every mutation outcome and every load failure surfaces as a short
//! human-readable notification. Delivery is fire-and-forget: the store never
//! waits for anyone to acknowledge, and a hub with no subscribers drops the
//! message on the floor.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

/// How the notification should be presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Normal,
    Destructive,
}

/// A short human-readable outcome message
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub severity: Severity,
}

impl Notification {
    pub fn normal(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity: Severity::Normal,
        }
    }

    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity: Severity::Destructive,
        }
    }
}

/// Receives outcome notifications
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Broadcast-backed sink the UI subscribes to
#[derive(Clone)]
pub struct NotificationHub {
    tx: broadcast::Sender<Notification>,
}

impl NotificationHub {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(64);
        Self { tx }
    }

    /// Subscribe to notifications
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationSink for NotificationHub {
    fn notify(&self, notification: Notification) {
        debug!(
            "Notification [{:?}] {}: {}",
            notification.severity, notification.title, notification.description
        );
        let _ = self.tx.send(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hub_delivers_to_subscriber() {
        let hub = NotificationHub::new();
        let mut rx = hub.subscribe();

        hub.notify(Notification::normal("Task added", "done"));

        let received = rx.recv().await.unwrap();
        assert_eq!(received.title, "Task added");
        assert_eq!(received.severity, Severity::Normal);
    }

    #[test]
    fn test_notify_without_subscribers_is_silent() {
        let hub = NotificationHub::new();
        hub.notify(Notification::destructive("Error", "Failed to add task"));
    }
}
