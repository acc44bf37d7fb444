//! End-of-session side effects.
//!
//! When a countdown reaches zero the completion handler notifies the user and
//! writes one [`FocusSession`] for the owning account. Both steps are
//! attempted exactly once; their results are handed back to the caller in a
//! [`CompletionReport`] instead of being swallowed.

use tracing::{debug, info, warn};

use super::timer::CompletedSession;
use crate::notify::{Notifier, NotifyError};
use crate::store::{SessionStore, StoreError};
use crate::types::FocusSession;

/// Outcome of handling one completed session.
#[derive(Debug)]
pub struct CompletionReport {
    /// The record that was (or failed to be) written
    pub session: FocusSession,
    /// Document id on success
    pub persisted: Result<String, StoreError>,
    /// Notification delivery
    pub notified: Result<(), NotifyError>,
}

impl CompletionReport {
    /// Returns true if the session record was written.
    pub fn is_persisted(&self) -> bool {
        self.persisted.is_ok()
    }
}

/// Runs completion side effects against a store and a notifier.
pub struct SessionCompleter<S, N> {
    store: S,
    notifier: N,
}

impl<S: SessionStore, N: Notifier> SessionCompleter<S, N> {
    /// Creates a completer writing to `store` and notifying through `notifier`.
    pub fn new(store: S, notifier: N) -> Self {
        Self { store, notifier }
    }

    /// Notifies and persists one completed session for `user_id`.
    pub async fn complete(&self, user_id: &str, completed: CompletedSession) -> CompletionReport {
        let mut session = FocusSession::completed(user_id, completed.completed_at);
        session.duration_seconds = completed.duration_seconds;

        let notified = self.notifier.session_complete(&session);
        if let Err(e) = &notified {
            debug!(error = %e, "completion notification failed");
        }

        let persisted = self.store.add(&session).await;
        match &persisted {
            Ok(id) => info!(id = %id, user = %user_id, "focus session saved"),
            Err(e) => warn!(error = %e, user = %user_id, "failed to save focus session"),
        }

        CompletionReport {
            session,
            persisted,
            notified,
        }
    }
}
