//! Completion notifications.
//!
//! When a focus session completes the user gets an audible cue and a
//! completion message. Delivery is best effort:
//!
//! - [`TerminalNotifier`] rings the terminal bell and prints a message
//! - [`SoundNotifier`] plays a short tone on the default audio device
//!   (cargo feature `sound`)
//! - [`MockNotifier`] records calls for tests

mod error;
#[cfg(feature = "sound")]
mod sound;

use std::io::Write;

pub use error::NotifyError;
#[cfg(feature = "sound")]
pub use sound::SoundNotifier;

use crate::types::FocusSession;

/// Message shown when a session completes.
pub const COMPLETION_MESSAGE: &str = "Focus session complete!";

/// Notification collaborator invoked once per completed session.
pub trait Notifier {
    /// Notifies the user that `session` has completed.
    ///
    /// Implementations must not block for longer than it takes to start the
    /// cue.
    ///
    /// # Errors
    ///
    /// Returns an error if the cue could not be delivered.
    fn session_complete(&self, session: &FocusSession) -> Result<(), NotifyError>;
}

impl<N: Notifier + ?Sized> Notifier for Box<N> {
    fn session_complete(&self, session: &FocusSession) -> Result<(), NotifyError> {
        (**self).session_complete(session)
    }
}

impl<N: Notifier + ?Sized> Notifier for std::sync::Arc<N> {
    fn session_complete(&self, session: &FocusSession) -> Result<(), NotifyError> {
        (**self).session_complete(session)
    }
}

/// Writes the completion message, optionally preceded by the BEL character,
/// to stderr.
#[derive(Debug, Clone)]
pub struct TerminalNotifier {
    bell: bool,
}

impl TerminalNotifier {
    #[must_use]
    pub fn new(bell: bool) -> Self {
        Self { bell }
    }

    fn write_to(&self, out: &mut impl Write, session: &FocusSession) -> std::io::Result<()> {
        if self.bell {
            out.write_all(b"\x07")?;
        }
        writeln!(out, "{} ({})", COMPLETION_MESSAGE, session.completed_at)?;
        out.flush()
    }
}

impl Default for TerminalNotifier {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Notifier for TerminalNotifier {
    fn session_complete(&self, session: &FocusSession) -> Result<(), NotifyError> {
        let stderr = std::io::stderr();
        let mut out = stderr.lock();
        self.write_to(&mut out, session)
            .map_err(|e| NotifyError::Output(e.to_string()))
    }
}

/// Mock notifier for testing.
#[derive(Debug, Default)]
pub struct MockNotifier {
    calls: std::sync::Mutex<Vec<FocusSession>>,
    should_fail: std::sync::atomic::AtomicBool,
}

impl MockNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail
            .store(should_fail, std::sync::atomic::Ordering::SeqCst);
    }

    #[must_use]
    pub fn notify_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    #[must_use]
    pub fn get_calls(&self) -> Vec<FocusSession> {
        self.calls.lock().unwrap().clone()
    }
}

impl Notifier for MockNotifier {
    fn session_complete(&self, session: &FocusSession) -> Result<(), NotifyError> {
        if self.should_fail.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(NotifyError::Playback("Mock failure".to_string()));
        }
        self.calls.lock().unwrap().push(session.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn session() -> FocusSession {
        FocusSession::completed("alice", Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap())
    }

    #[test]
    fn test_terminal_notifier_with_bell() {
        let mut out = Vec::new();
        TerminalNotifier::new(true)
            .write_to(&mut out, &session())
            .unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with('\x07'));
        assert!(text.contains(COMPLETION_MESSAGE));
        assert!(text.contains("2026-10-19T09:00:00.000Z"));
    }

    #[test]
    fn test_terminal_notifier_without_bell() {
        let mut out = Vec::new();
        TerminalNotifier::new(false)
            .write_to(&mut out, &session())
            .unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(!text.contains('\x07'));
        assert!(text.starts_with(COMPLETION_MESSAGE));
    }

    #[test]
    fn test_mock_notifier_records_and_fails() {
        let mock = MockNotifier::new();
        mock.session_complete(&session()).unwrap();
        assert_eq!(mock.notify_count(), 1);
        assert_eq!(mock.get_calls()[0].user_id, "alice");

        mock.set_should_fail(true);
        assert!(mock.session_complete(&session()).is_err());
        assert_eq!(mock.notify_count(), 1);
    }

    #[test]
    fn test_boxed_notifier_delegates() {
        let boxed: Box<dyn Notifier> = Box::new(MockNotifier::new());
        assert!(boxed.session_complete(&session()).is_ok());
    }
}
