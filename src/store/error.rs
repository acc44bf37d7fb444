//! Session store error types.

use thiserror::Error;

/// Errors that can occur while reading or writing focus sessions.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing file or service could not be read.
    #[error("failed to read session store: {0}")]
    Read(String),

    /// The backing file or service rejected the write.
    #[error("failed to write session store: {0}")]
    Write(String),

    /// Stored data could not be decoded.
    #[error("session store is corrupt: {0}")]
    Corrupt(String),

    /// The record is not acceptable for storage.
    #[error("invalid session record: {0}")]
    InvalidRecord(String),
}

impl StoreError {
    /// Returns true if retrying the same call may succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Read(_) | Self::Write(_))
    }

    /// Returns a user-friendly suggestion for resolving this error.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::Read(_) => "check that the data directory exists and is readable",
            Self::Write(_) => "check free disk space and data directory permissions",
            Self::Corrupt(_) => "move the damaged focusSessions.json aside; a new one will be created",
            Self::InvalidRecord(_) => "sessions need a non-empty user id",
        }
    }
}
