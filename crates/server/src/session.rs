//! Session Management
//!
//! In-memory store for widget sessions. Each session owns the
//! value-threaded [`SessionState`] the engine reads and replaces every
//! turn, plus the authenticated email used for order ownership checks.
//! Sessions are ephemeral: nothing survives a restart, idle sessions are
//! pruned by a background sweep.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use tokio::sync::watch;

use concierge_core::SessionState;

use crate::ServerError;

/// One widget session.
pub struct Session {
    pub id: String,
    /// Email verified by the storefront at widget open, if any.
    /// Used for the order ownership check, never echoed to the widget.
    pub auth_email: Option<String>,
    /// Engine-visible state, replaced wholesale after each turn
    pub state: RwLock<SessionState>,
    pub created_at: Instant,
    last_activity: RwLock<Instant>,
}

impl Session {
    pub fn new(id: impl Into<String>, auth_email: Option<String>) -> Self {
        let id = id.into();
        Self {
            state: RwLock::new(SessionState::new(&id)),
            id,
            auth_email,
            created_at: Instant::now(),
            last_activity: RwLock::new(Instant::now()),
        }
    }

    /// Update last activity
    pub fn touch(&self) {
        *self.last_activity.write() = Instant::now();
    }

    /// Check if session is expired
    pub fn is_expired(&self, timeout: Duration) -> bool {
        self.last_activity.read().elapsed() > timeout
    }

    /// Snapshot of the engine state for the next turn.
    pub fn snapshot(&self) -> SessionState {
        self.state.read().clone()
    }

    /// Replace the engine state after a completed turn.
    pub fn replace_state(&self, state: SessionState) {
        *self.state.write() = state;
    }
}

/// Session manager
pub struct SessionManager {
    sessions: RwLock<HashMap<String, Arc<Session>>>,
    max_sessions: usize,
    session_timeout: Duration,
    cleanup_interval: Duration,
}

impl SessionManager {
    pub fn new(max_sessions: usize) -> Self {
        Self::with_config(
            max_sessions,
            Duration::from_secs(1800),
            Duration::from_secs(300),
        )
    }

    pub fn with_config(
        max_sessions: usize,
        session_timeout: Duration,
        cleanup_interval: Duration,
    ) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            max_sessions,
            session_timeout,
            cleanup_interval,
        }
    }

    /// Start a background task that periodically prunes expired sessions.
    ///
    /// Returns a shutdown sender that stops the task.
    pub fn start_cleanup_task(self: &Arc<Self>) -> watch::Sender<bool> {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let manager = Arc::clone(self);
        let interval = manager.cleanup_interval;

        tokio::spawn(async move {
            let mut interval_timer = tokio::time::interval(interval);
            interval_timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = interval_timer.tick() => {
                        let before = manager.count();
                        manager.cleanup_expired();
                        let after = manager.count();
                        if before != after {
                            tracing::info!(
                                "Session cleanup: removed {} expired sessions ({} remaining)",
                                before - after,
                                after
                            );
                        }
                    }
                    _ = shutdown_rx.changed() => {
                        if *shutdown_rx.borrow() {
                            tracing::info!("Session cleanup task shutting down");
                            break;
                        }
                    }
                }
            }
        });

        shutdown_tx
    }

    /// Create a new session
    pub fn create(&self, auth_email: Option<String>) -> Result<Arc<Session>, ServerError> {
        let mut sessions = self.sessions.write();

        if sessions.len() >= self.max_sessions {
            // Reclaim idle slots before refusing
            self.cleanup_expired_internal(&mut sessions);

            if sessions.len() >= self.max_sessions {
                return Err(ServerError::Internal("Max sessions reached".to_string()));
            }
        }

        let id = uuid::Uuid::new_v4().to_string();
        let session = Arc::new(Session::new(&id, auth_email));
        sessions.insert(id.clone(), session.clone());

        tracing::info!("Created session: {}", id);

        Ok(session)
    }

    /// Get a session by ID
    pub fn get(&self, id: &str) -> Option<Arc<Session>> {
        self.sessions.read().get(id).cloned()
    }

    /// Remove a session
    pub fn remove(&self, id: &str) {
        let mut sessions = self.sessions.write();
        if sessions.remove(id).is_some() {
            tracing::info!("Removed session: {}", id);
        }
    }

    /// Get stored session count
    pub fn count(&self) -> usize {
        self.sessions.read().len()
    }

    /// Cleanup expired sessions
    pub fn cleanup_expired(&self) {
        let mut sessions = self.sessions.write();
        self.cleanup_expired_internal(&mut sessions);
    }

    fn cleanup_expired_internal(&self, sessions: &mut HashMap<String, Arc<Session>>) {
        let timeout = self.session_timeout;
        let expired: Vec<String> = sessions
            .iter()
            .filter(|(_, s)| s.is_expired(timeout))
            .map(|(id, _)| id.clone())
            .collect();

        for id in expired {
            sessions.remove(&id);
            tracing::info!("Expired session: {}", id);
        }
    }

    /// List all session IDs
    pub fn list(&self) -> Vec<String> {
        self.sessions.read().keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use concierge_core::Intent;

    #[test]
    fn test_session_creation() {
        let manager = SessionManager::new(10);
        let session = manager.create(None).unwrap();

        assert!(!session.is_expired(Duration::from_secs(60)));
        assert!(session.snapshot().last_intent.is_none());
    }

    #[test]
    fn test_session_get_and_remove() {
        let manager = SessionManager::new(10);
        let session = manager.create(Some("client@example.com".to_string())).unwrap();
        let id = session.id.clone();

        let retrieved = manager.get(&id).unwrap();
        assert_eq!(retrieved.auth_email.as_deref(), Some("client@example.com"));

        manager.remove(&id);
        assert!(manager.get(&id).is_none());
    }

    #[test]
    fn test_state_replaced_wholesale() {
        let manager = SessionManager::new(10);
        let session = manager.create(None).unwrap();

        let mut state = session.snapshot();
        state.last_intent = Some(Intent::FindProduct);
        session.replace_state(state);

        assert_eq!(session.snapshot().last_intent, Some(Intent::FindProduct));
    }

    #[test]
    fn test_capacity_enforced() {
        let manager = SessionManager::with_config(
            1,
            Duration::from_secs(3600),
            Duration::from_secs(300),
        );
        manager.create(None).unwrap();
        assert!(manager.create(None).is_err());
    }
}
