//! Focus timer state machine.
//!
//! This module provides the core timer functionality:
//! - State transitions (Idle → Running ⇄ Paused → Idle)
//! - One-second decrements driven by an external ticker
//! - Completion detection, after which the timer is Idle with a full session
//! - Event firing for display and notification consumers
//!
//! The timer never reads a clock on its own; the driver calls [`FocusTimer::tick`]
//! once per elapsed second while the timer is running.

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, watch};
use tracing::{debug, trace};

use crate::types::{to_iso8601, TimerPhase, TimerState, SESSION_SECONDS};

// ============================================================================
// TimerEvent
// ============================================================================

/// Timer events for display and external integrations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerEvent {
    /// Countdown started or resumed
    Started {
        /// Remaining seconds when the countdown started
        remaining_seconds: u32,
    },
    /// Countdown paused
    Paused {
        /// Remaining seconds when paused
        remaining_seconds: u32,
    },
    /// Timer reset to a full idle session
    Reset,
    /// One second elapsed
    Tick {
        /// Remaining seconds
        remaining_seconds: u32,
    },
    /// A session ran to zero
    Completed {
        /// Completion instant
        completed_at: DateTime<Utc>,
    },
}

// ============================================================================
// TickOutcome
// ============================================================================

/// A session that ran to zero, handed to the completion handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletedSession {
    /// When the countdown reached zero
    pub completed_at: DateTime<Utc>,
    /// Length of the completed session in seconds
    pub duration_seconds: u32,
}

/// Result of advancing the timer by one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The timer was not running; nothing changed
    Skipped,
    /// One second was counted
    Counted {
        /// Remaining seconds after the decrement
        remaining_seconds: u32,
    },
    /// The countdown reached zero and the timer is idle again
    Completed(CompletedSession),
}

// ============================================================================
// FocusTimer
// ============================================================================

/// Single-session pomodoro countdown.
pub struct FocusTimer {
    /// Current timer state
    state: TimerState,
    /// Sessions completed by this timer instance
    completed_sessions: u32,
    /// Most recent completion
    last_completed_at: Option<DateTime<Utc>>,
    /// Event sender channel
    event_tx: mpsc::UnboundedSender<TimerEvent>,
    /// Mirrors `state.is_running()` for the ticker driver
    running_tx: watch::Sender<bool>,
}

impl FocusTimer {
    /// Creates an idle timer that reports events on `event_tx`.
    pub fn new(event_tx: mpsc::UnboundedSender<TimerEvent>) -> Self {
        let (running_tx, _) = watch::channel(false);
        Self {
            state: TimerState::new(),
            completed_sessions: 0,
            last_completed_at: None,
            event_tx,
            running_tx,
        }
    }

    /// Starts or resumes the countdown.
    ///
    /// Returns false (and does nothing) if already running.
    pub fn start(&mut self) -> bool {
        if !self.state.start() {
            return false;
        }
        debug!(remaining = self.state.remaining_seconds, "focus timer started");
        self.publish_running();
        self.emit(TimerEvent::Started {
            remaining_seconds: self.state.remaining_seconds,
        });
        true
    }

    /// Pauses the countdown.
    ///
    /// Returns false (and does nothing) unless running.
    pub fn pause(&mut self) -> bool {
        if !self.state.pause() {
            return false;
        }
        debug!(remaining = self.state.remaining_seconds, "focus timer paused");
        self.publish_running();
        self.emit(TimerEvent::Paused {
            remaining_seconds: self.state.remaining_seconds,
        });
        true
    }

    /// Starts when stopped, pauses when running. Returns the new phase.
    pub fn toggle(&mut self) -> TimerPhase {
        if self.state.is_running() {
            self.pause();
        } else {
            self.start();
        }
        self.state.phase
    }

    /// Returns to Idle with a full session. Never records a session.
    pub fn reset(&mut self) {
        self.state.reset();
        debug!("focus timer reset");
        self.publish_running();
        self.emit(TimerEvent::Reset);
    }

    /// Advances the countdown by one second using the current time for a
    /// possible completion.
    pub fn tick(&mut self) -> TickOutcome {
        self.tick_at(Utc::now())
    }

    /// Advances the countdown by one second; `now` stamps a completion.
    pub fn tick_at(&mut self, now: DateTime<Utc>) -> TickOutcome {
        if !self.state.is_running() {
            return TickOutcome::Skipped;
        }

        let reached_zero = self.state.tick();
        let remaining_seconds = self.state.remaining_seconds;
        trace!(remaining = remaining_seconds, "tick");
        self.emit(TimerEvent::Tick { remaining_seconds });

        if !reached_zero {
            return TickOutcome::Counted { remaining_seconds };
        }

        self.handle_complete(now)
    }

    /// Returns the timer to Idle after a natural completion.
    fn handle_complete(&mut self, now: DateTime<Utc>) -> TickOutcome {
        self.state.reset();
        self.completed_sessions += 1;
        self.last_completed_at = Some(now);
        debug!(
            completed_sessions = self.completed_sessions,
            "focus session completed"
        );

        self.publish_running();
        self.emit(TimerEvent::Completed { completed_at: now });

        TickOutcome::Completed(CompletedSession {
            completed_at: now,
            duration_seconds: SESSION_SECONDS,
        })
    }

    /// Returns a reference to the current timer state.
    pub fn get_state(&self) -> &TimerState {
        &self.state
    }

    /// Returns the number of sessions this timer has completed.
    pub fn completed_sessions(&self) -> u32 {
        self.completed_sessions
    }

    /// Returns the most recent completion as an ISO-8601 string.
    pub fn last_completed_at(&self) -> Option<String> {
        self.last_completed_at.map(to_iso8601)
    }

    /// Subscribes to changes of the running flag.
    pub fn subscribe_running(&self) -> watch::Receiver<bool> {
        self.running_tx.subscribe()
    }

    fn publish_running(&self) {
        let running = self.state.is_running();
        self.running_tx.send_if_modified(|current| {
            if *current == running {
                return false;
            }
            *current = running;
            true
        });
    }

    fn emit(&self, event: TimerEvent) {
        if self.event_tx.send(event).is_err() {
            trace!("timer event receiver dropped");
        }
    }

    /// Returns a mutable reference to the timer state (for testing).
    #[cfg(test)]
    pub fn get_state_mut(&mut self) -> &mut TimerState {
        &mut self.state
    }
}

// ============================================================================
// Tests
// ============================================================================
