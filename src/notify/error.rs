//! Notification error types.
//!
//! Notifications are best effort; these errors are reported to the host and
//! logged but never change timer state.

use thiserror::Error;

/// Errors that can occur while notifying the user of a completed session.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Audio device is not available (e.g., no speakers connected).
    #[error("audio device not available: {0}")]
    DeviceNotAvailable(String),

    /// Writing the terminal cue failed.
    #[error("failed to write notification: {0}")]
    Output(String),

    /// Generic playback error.
    #[error("notification playback failed: {0}")]
    Playback(String),
}

impl NotifyError {
    /// Returns true if this error is related to device availability.
    #[must_use]
    pub fn is_device_error(&self) -> bool {
        matches!(self, Self::DeviceNotAvailable(_))
    }

    /// Returns a user-friendly suggestion for resolving this error.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::DeviceNotAvailable(_) => "connect an audio device or run the daemon with --no-sound",
            Self::Output(_) => "run the daemon attached to a terminal to see completion messages",
            Self::Playback(_) => "restart the daemon",
        }
    }
}
