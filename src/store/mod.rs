//! Persistence of completed focus sessions.
//!
//! The focus timer writes one record per completed session into the
//! `focusSessions` collection of a document store. This module provides:
//!
//! - [`SessionStore`], the collaborator interface the completion handler uses
//! - [`JsonFileStore`], a local file-backed collection
//! - [`MockSessionStore`], an in-memory store for tests
//! - [`FocusStats`], the aggregate view dashboards derive from the collection

mod error;
mod json;
mod stats;

pub use error::StoreError;
pub use json::{JsonFileStore, SessionDocument};
pub use stats::FocusStats;

use crate::types::FocusSession;

/// Document-store collaborator for focus sessions.
#[allow(async_fn_in_trait)]
pub trait SessionStore {
    /// Inserts one session and returns the new document id.
    ///
    /// # Errors
    ///
    /// Returns an error if the record could not be written.
    async fn add(&self, session: &FocusSession) -> Result<String, StoreError>;

    /// Returns every session recorded for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection could not be read.
    async fn list_by_user(&self, user_id: &str) -> Result<Vec<FocusSession>, StoreError>;
}

/// In-memory session store for testing.
#[derive(Debug, Default)]
pub struct MockSessionStore {
    sessions: std::sync::Mutex<Vec<FocusSession>>,
    add_attempts: std::sync::atomic::AtomicUsize,
    should_fail: std::sync::atomic::AtomicBool,
}

impl MockSessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail
            .store(should_fail, std::sync::atomic::Ordering::SeqCst);
    }

    /// Number of `add` calls, including failed ones.
    #[must_use]
    pub fn add_attempts(&self) -> usize {
        self.add_attempts.load(std::sync::atomic::Ordering::SeqCst)
    }

    #[must_use]
    pub fn sessions(&self) -> Vec<FocusSession> {
        self.sessions.lock().unwrap().clone()
    }
}

impl SessionStore for MockSessionStore {
    async fn add(&self, session: &FocusSession) -> Result<String, StoreError> {
        let attempt = self
            .add_attempts
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        if self.should_fail.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(StoreError::Write("Mock failure".to_string()));
        }
        self.sessions.lock().unwrap().push(session.clone());
        Ok(format!("mock-{attempt}"))
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<FocusSession>, StoreError> {
        Ok(self
            .sessions
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect())
    }
}

impl<S: SessionStore> SessionStore for std::sync::Arc<S> {
    async fn add(&self, session: &FocusSession) -> Result<String, StoreError> {
        S::add(self, session).await
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<FocusSession>, StoreError> {
        S::list_by_user(self, user_id).await
    }
}
