//! Session registry and process-wide completion signal
//!
//! A session is tracked from the moment it asks for admission, including
//! while it waits for a free slot. Every admitted session holds a
//! `SessionGuard` for its whole lifetime. The drop that leaves no session
//! tracked fires the completion signal. Fatal server errors fire it directly.

use crate::error::SessionError;
use metrics::gauge;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{OwnedSemaphorePermit, Semaphore, watch};
use tracing::{debug, info};

/// Admission cap on concurrently registered sessions
pub const DEFAULT_MAX_SESSIONS: usize = 100;

/// Shared by the accept loop and every session of one server
pub struct Coordinator {
    admission: Arc<Semaphore>,
    /// Admitted sessions
    active: AtomicUsize,
    /// Admitted sessions plus those waiting for admission
    tracked: AtomicUsize,
    completed: watch::Sender<bool>,
}

impl Coordinator {
    pub fn new(max_sessions: usize) -> Arc<Self> {
        let (completed, _) = watch::channel(false);
        Arc::new(Self {
            admission: Arc::new(Semaphore::new(max_sessions)),
            active: AtomicUsize::new(0),
            tracked: AtomicUsize::new(0),
            completed,
        })
    }

    /// Register a new session, waiting while the registry is full.
    ///
    /// The session counts against completion while it waits, so the last
    /// admitted session leaving does not end the run under a queued one.
    pub async fn register(self: &Arc<Self>) -> Result<SessionGuard, SessionError> {
        let membership = self.enter();

        let permit = Arc::clone(&self.admission)
            .acquire_owned()
            .await
            .map_err(|_| SessionError::RegistryClosed)?;

        let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        gauge!("ratestub_sessions_active").set(active as f64);

        Ok(SessionGuard {
            _permit: permit,
            membership,
        })
    }

    /// Number of currently admitted sessions
    pub fn active_sessions(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Number of sessions waiting for a free slot
    pub fn queued_sessions(&self) -> usize {
        self.tracked
            .load(Ordering::SeqCst)
            .saturating_sub(self.active.load(Ordering::SeqCst))
    }

    /// Fire the completion signal. Returns false if it had already fired.
    pub fn complete(&self) -> bool {
        self.completed.send_if_modified(|done| {
            if *done {
                false
            } else {
                *done = true;
                true
            }
        })
    }

    pub fn is_complete(&self) -> bool {
        *self.completed.borrow()
    }

    /// Wait until the completion signal fires
    pub async fn completed(&self) {
        let mut rx = self.completed.subscribe();
        // The sender lives in `self`, so this cannot observe a closed channel
        let _ = rx.wait_for(|done| *done).await;
    }

    fn enter(self: &Arc<Self>) -> Membership {
        self.tracked.fetch_add(1, Ordering::SeqCst);
        Membership {
            coordinator: Arc::clone(self),
        }
    }

    fn deactivate(&self) {
        let previous = self.active.fetch_sub(1, Ordering::SeqCst);
        gauge!("ratestub_sessions_active").set((previous - 1) as f64);
        debug!("Session deregistered, {} still active", previous - 1);
    }

    fn leave(&self) {
        let previous = self.tracked.fetch_sub(1, Ordering::SeqCst);
        if previous == 1 && self.complete() {
            info!("All sessions drained, signalling completion");
        }
    }
}

/// Counts one session against completion until dropped, admitted or not
struct Membership {
    coordinator: Arc<Coordinator>,
}

impl Drop for Membership {
    fn drop(&mut self) {
        self.coordinator.leave();
    }
}

/// Registry membership of one admitted session; deregisters on drop
pub struct SessionGuard {
    _permit: OwnedSemaphorePermit,
    membership: Membership,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.membership.coordinator.deactivate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_completion_fires_when_last_session_leaves() {
        let coordinator = Coordinator::new(DEFAULT_MAX_SESSIONS);

        let first = coordinator.register().await.unwrap();
        let second = coordinator.register().await.unwrap();
        assert_eq!(coordinator.active_sessions(), 2);

        drop(first);
        assert!(!coordinator.is_complete());

        drop(second);
        assert!(coordinator.is_complete());
        assert_eq!(coordinator.active_sessions(), 0);

        tokio::time::timeout(Duration::from_secs(1), coordinator.completed())
            .await
            .expect("completion should already be observable");
    }

    #[tokio::test]
    async fn test_completion_fires_only_once() {
        let coordinator = Coordinator::new(DEFAULT_MAX_SESSIONS);

        drop(coordinator.register().await.unwrap());
        assert!(coordinator.is_complete());

        // A later session emptying the registry again does not re-fire
        drop(coordinator.register().await.unwrap());
        assert!(!coordinator.complete());
    }

    #[tokio::test]
    async fn test_no_sessions_never_completes() {
        let coordinator = Coordinator::new(DEFAULT_MAX_SESSIONS);

        let waited =
            tokio::time::timeout(Duration::from_millis(50), coordinator.completed()).await;
        assert!(waited.is_err());
        assert!(!coordinator.is_complete());
    }

    #[tokio::test]
    async fn test_explicit_completion_wakes_waiters() {
        let coordinator = Coordinator::new(DEFAULT_MAX_SESSIONS);
        let waiter = {
            let coordinator = Arc::clone(&coordinator);
            tokio::spawn(async move { coordinator.completed().await })
        };

        assert!(coordinator.complete());
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_full_registry_blocks_admission() {
        let coordinator = Coordinator::new(1);
        let held = coordinator.register().await.unwrap();

        let blocked =
            tokio::time::timeout(Duration::from_millis(50), coordinator.register()).await;
        assert!(blocked.is_err());
        assert_eq!(coordinator.active_sessions(), 1);

        drop(held);
        let admitted = tokio::time::timeout(Duration::from_secs(1), coordinator.register())
            .await
            .unwrap();
        assert!(admitted.is_ok());
    }

    #[tokio::test]
    async fn test_queued_session_holds_off_completion() {
        let coordinator = Coordinator::new(1);
        let held = coordinator.register().await.unwrap();

        let queued = {
            let coordinator = Arc::clone(&coordinator);
            tokio::spawn(async move { coordinator.register().await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(coordinator.queued_sessions(), 1);

        drop(held);
        assert!(!coordinator.is_complete());

        let admitted = tokio::time::timeout(Duration::from_secs(1), queued)
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert_eq!(coordinator.active_sessions(), 1);
        assert!(!coordinator.is_complete());

        drop(admitted);
        assert!(coordinator.is_complete());
    }

    #[tokio::test]
    async fn test_abandoned_wait_stops_counting() {
        let coordinator = Coordinator::new(1);
        let held = coordinator.register().await.unwrap();

        let waited =
            tokio::time::timeout(Duration::from_millis(20), coordinator.register()).await;
        assert!(waited.is_err());
        assert_eq!(coordinator.queued_sessions(), 0);

        drop(held);
        assert!(coordinator.is_complete());
    }
}
