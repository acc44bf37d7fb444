//! Core data types for the focus timer.
//!
//! This module defines the data structures used for:
//! - Timer state management
//! - The persisted focus session record
//! - IPC request/response serialization

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Length of one focus session in seconds (25 minutes).
pub const SESSION_SECONDS: u32 = 25 * 60;

/// Name of the logical collection completed sessions are written to.
pub const FOCUS_SESSIONS_COLLECTION: &str = "focusSessions";

// ============================================================================
// Display helpers
// ============================================================================

/// Formats remaining seconds as zero-padded `MM:SS`.
pub fn format_time(total_seconds: u32) -> String {
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}

/// Fraction of the session already elapsed, in `[0.0, 1.0]`.
pub fn progress(remaining_seconds: u32) -> f64 {
    let remaining = remaining_seconds.min(SESSION_SECONDS);
    f64::from(SESSION_SECONDS - remaining) / f64::from(SESSION_SECONDS)
}

// ============================================================================
// TimerPhase
// ============================================================================

/// Observable state of the timer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerPhase {
    /// Full session loaded, not counting down
    #[default]
    Idle,
    /// Counting down
    Running,
    /// Countdown suspended part way through
    Paused,
}

impl TimerPhase {
    /// Returns the string representation of the phase.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerPhase::Idle => "idle",
            TimerPhase::Running => "running",
            TimerPhase::Paused => "paused",
        }
    }
}

// ============================================================================
// TimerState
// ============================================================================

/// In-memory countdown state. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    /// Current phase of the timer
    pub phase: TimerPhase,
    /// Remaining seconds in the current session
    pub remaining_seconds: u32,
}

impl Default for TimerState {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerState {
    /// Creates a new TimerState in the idle state with a full session loaded.
    pub fn new() -> Self {
        Self {
            phase: TimerPhase::Idle,
            remaining_seconds: SESSION_SECONDS,
        }
    }

    /// Moves to `Running`. Returns false if already running.
    pub fn start(&mut self) -> bool {
        if self.is_running() {
            return false;
        }
        self.phase = TimerPhase::Running;
        true
    }

    /// Moves `Running` to `Paused`. Returns false in any other phase.
    pub fn pause(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.phase = TimerPhase::Paused;
        true
    }

    /// Returns to `Idle` with a full session loaded.
    pub fn reset(&mut self) {
        self.phase = TimerPhase::Idle;
        self.remaining_seconds = SESSION_SECONDS;
    }

    /// Decrements the countdown by one second.
    ///
    /// Does nothing unless running. Returns true if the countdown has just
    /// reached zero.
    pub fn tick(&mut self) -> bool {
        if !self.is_running() || self.remaining_seconds == 0 {
            return false;
        }
        self.remaining_seconds -= 1;
        self.remaining_seconds == 0
    }

    /// Returns true if the timer is counting down.
    pub fn is_running(&self) -> bool {
        self.phase == TimerPhase::Running
    }

    /// Returns the remaining time as `MM:SS`.
    pub fn display(&self) -> String {
        format_time(self.remaining_seconds)
    }

    /// Returns the elapsed fraction of the session.
    pub fn progress(&self) -> f64 {
        progress(self.remaining_seconds)
    }
}

// ============================================================================
// FocusSession
// ============================================================================

/// One completed focus session as written to the `focusSessions` collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusSession {
    /// Owning account
    #[serde(rename = "userId")]
    pub user_id: String,
    /// Session length in seconds
    #[serde(rename = "duration", default)]
    pub duration_seconds: u32,
    /// ISO-8601 completion timestamp; empty when the record has none
    #[serde(rename = "completedAt", default)]
    pub completed_at: String,
}

impl FocusSession {
    /// Creates a full-length session record completed at the given instant.
    pub fn completed(user_id: impl Into<String>, completed_at: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.into(),
            duration_seconds: SESSION_SECONDS,
            completed_at: to_iso8601(completed_at),
        }
    }

    /// Parses `completed_at`, returning None if it is not valid RFC 3339.
    pub fn completed_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.completed_at)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }
}

/// Formats a timestamp the way browsers' `toISOString` does.
pub fn to_iso8601(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

// ============================================================================
// IPC Types
// ============================================================================

/// IPC request from client to daemon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "lowercase")]
pub enum IpcRequest {
    /// Start or resume the countdown
    Start,
    /// Pause the countdown
    Pause,
    /// Start when stopped, pause when running
    Toggle,
    /// Return to a full idle session
    Reset,
    /// Query the current status
    Status,
}

impl IpcRequest {
    /// Returns true if applying the request twice has the same effect as
    /// applying it once.
    pub fn is_idempotent(&self) -> bool {
        !matches!(self, Self::Toggle)
    }
}

/// Response data for IPC responses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseData {
    /// Current phase
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Remaining seconds
    #[serde(rename = "remainingSeconds", skip_serializing_if = "Option::is_none")]
    pub remaining_seconds: Option<u32>,
    /// Remaining time as `MM:SS`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
    /// Elapsed fraction of the session
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
    /// Sessions completed since the daemon started
    #[serde(rename = "completedSessions", skip_serializing_if = "Option::is_none")]
    pub completed_sessions: Option<u32>,
    /// Timestamp of the most recent completion
    #[serde(rename = "lastCompletedAt", skip_serializing_if = "Option::is_none")]
    pub last_completed_at: Option<String>,
    /// Account the daemon records sessions for
    #[serde(rename = "userId", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// IPC response from daemon to client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IpcResponse {
    /// Response status ("success" or "error")
    pub status: String,
    /// Human-readable message
    pub message: String,
    /// Optional response data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ResponseData>,
}

impl IpcResponse {
    /// Creates a success response.
    pub fn success(message: impl Into<String>, data: Option<ResponseData>) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
            data,
        }
    }

    /// Creates an error response.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            data: None,
        }
    }

    /// Returns true if this is an error response.
    pub fn is_error(&self) -> bool {
        self.status == "error"
    }
}

// ============================================================================
// Tests
// ============================================================================
