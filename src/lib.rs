//! StudyFocus Library
//!
//! This library provides the core functionality for the studyfocus CLI.
//! It includes:
//! - Focus timer state machine and tick driver
//! - IPC server/client for daemon-CLI communication
//! - Persistence of completed sessions and derived statistics
//! - Completion notifications (terminal bell, optional audio cue)
//! - Configuration file handling
//! - CLI command parsing and display utilities

pub mod cli;
pub mod config;
pub mod daemon;
pub mod notify;
pub mod store;
pub mod types;

// Re-export commonly used types for convenience
pub use types::{
    FocusSession, IpcRequest, IpcResponse, ResponseData, TimerPhase, TimerState, SESSION_SECONDS,
};

pub use config::{AppConfig, ConfigError};

pub use daemon::{
    CompletedSession, CompletionReport, FocusTimer, IntervalTicker, ManualTicker,
    SessionCompleter, TickOutcome, Ticker, TimerDriver, TimerEvent,
};

pub use notify::{MockNotifier, Notifier, NotifyError, TerminalNotifier};

pub use store::{FocusStats, JsonFileStore, MockSessionStore, SessionStore, StoreError};
