//! Daemon module for the focus timer.
//!
//! This module contains the core daemon functionality:
//! - `timer`: focus session state machine
//! - `ticker`: one-second tick source abstraction
//! - `driver`: binds a ticker to the timer while it runs
//! - `completion`: notifies and persists finished sessions
//! - `ipc`: Unix socket server for CLI requests

pub mod completion;
pub mod driver;
pub mod ipc;
pub mod ticker;
pub mod timer;

pub use completion::{CompletionReport, SessionCompleter};
pub use driver::TimerDriver;
pub use ipc::{IpcError, IpcServer, RequestHandler};
pub use ticker::{IntervalTicker, ManualTickHandle, ManualTicker, Ticker, TICK_PERIOD};
pub use timer::{CompletedSession, FocusTimer, TickOutcome, TimerEvent};
