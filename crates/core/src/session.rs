//! Session tracking
//!
//! Holds the current signed-in identity and fans out login/logout
//! transitions to observers. The task store subscribes to these events and
//! reloads or clears its mirror accordingly.

use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::broadcast;
use uuid::Uuid;

/// The signed-in user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: Uuid,
    pub email: String,
}

impl Identity {
    pub fn new(id: Uuid, email: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
        }
    }
}

/// Session lifecycle transitions
#[derive(Debug, Clone)]
pub enum SessionEvent {
    LoggedIn(Identity),
    LoggedOut,
}

/// Current identity plus a broadcast of its transitions
#[derive(Clone)]
pub struct Session {
    current: Arc<RwLock<Option<Identity>>>,
    event_tx: broadcast::Sender<SessionEvent>,
}

impl Session {
    pub fn new() -> Self {
        let (event_tx, _) = broadcast::channel(16);
        Self {
            current: Arc::new(RwLock::new(None)),
            event_tx,
        }
    }

    /// The identity signed in right now, if any
    pub fn current(&self) -> Option<Identity> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Subscribe to login/logout transitions
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.event_tx.subscribe()
    }

    /// Sign an identity in, replacing any previous one
    pub fn login(&self, identity: Identity) {
        *self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(identity.clone());
        let _ = self.event_tx.send(SessionEvent::LoggedIn(identity));
    }

    /// Sign the current identity out
    pub fn logout(&self) {
        *self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
        let _ = self.event_tx.send(SessionEvent::LoggedOut);
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_login_sets_current_and_fires_event() {
        let session = Session::new();
        let mut events = session.subscribe();
        assert!(session.current().is_none());

        let identity = Identity::new(Uuid::new_v4(), "user@example.com");
        session.login(identity.clone());

        assert_eq!(session.current(), Some(identity.clone()));
        match events.recv().await.unwrap() {
            SessionEvent::LoggedIn(logged_in) => assert_eq!(logged_in, identity),
            other => panic!("Expected LoggedIn, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_logout_clears_current() {
        let session = Session::new();
        session.login(Identity::new(Uuid::new_v4(), "user@example.com"));

        let mut events = session.subscribe();
        session.logout();

        assert!(session.current().is_none());
        assert!(matches!(
            events.recv().await.unwrap(),
            SessionEvent::LoggedOut
        ));
    }
}
