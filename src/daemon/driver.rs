//! Binds a ticker to a focus timer.
//!
//! The driver waits until the timer is running, arms the ticker and advances
//! the timer once per tick. As soon as the timer stops running (pause, reset
//! or completion) the ticker is disarmed. Shutdown disarms the ticker and ends
//! the driver. Any change of the running flag re-arms the ticker, so a
//! resumed countdown always waits a full period for its first decrement.

use std::sync::Arc;

use tokio::sync::{mpsc, watch, Mutex};
use tracing::{debug, info};

use super::completion::{CompletionReport, SessionCompleter};
use super::ticker::Ticker;
use super::timer::{CompletedSession, FocusTimer, TickOutcome};
use crate::notify::Notifier;
use crate::store::SessionStore;

/// Why an armed stretch ended.
enum Disarm {
    Changed,
    Shutdown,
}

/// Drives a shared [`FocusTimer`] from a [`Ticker`].
pub struct TimerDriver<T, S, N> {
    timer: Arc<Mutex<FocusTimer>>,
    ticker: T,
    completer: SessionCompleter<S, N>,
    user_id: String,
    report_tx: Option<mpsc::UnboundedSender<CompletionReport>>,
}

impl<T: Ticker, S: SessionStore, N: Notifier> TimerDriver<T, S, N> {
    /// Creates a driver recording completed sessions for `user_id`.
    pub fn new(
        timer: Arc<Mutex<FocusTimer>>,
        ticker: T,
        completer: SessionCompleter<S, N>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            timer,
            ticker,
            completer,
            user_id: user_id.into(),
            report_tx: None,
        }
    }

    /// Forwards every completion report to `report_tx`.
    pub fn with_reports(mut self, report_tx: mpsc::UnboundedSender<CompletionReport>) -> Self {
        self.report_tx = Some(report_tx);
        self
    }

    /// Runs until `shutdown` changes or its sender is dropped.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        let mut running = self.timer.lock().await.subscribe_running();
        info!(user = %self.user_id, "timer driver started");

        loop {
            if *shutdown.borrow_and_update() {
                break;
            }

            if !*running.borrow_and_update() {
                tokio::select! {
                    changed = running.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                    _ = shutdown.changed() => break,
                }
                continue;
            }

            self.ticker.arm();
            debug!("ticker armed");
            let reason = self.run_armed(&mut running, &mut shutdown).await;
            self.ticker.disarm();
            debug!("ticker disarmed");

            if matches!(reason, Disarm::Shutdown) {
                break;
            }
        }

        self.ticker.disarm();
        info!("timer driver stopped");
    }

    async fn run_armed(
        &mut self,
        running: &mut watch::Receiver<bool>,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Disarm {
        loop {
            tokio::select! {
                biased;
                _ = shutdown.changed() => return Disarm::Shutdown,
                // A pause and resume between polls still restarts the phase
                changed = running.changed() => {
                    if changed.is_err() {
                        return Disarm::Shutdown;
                    }
                    return Disarm::Changed;
                }
                _ = self.ticker.tick() => {
                    let outcome = self.timer.lock().await.tick();
                    if let TickOutcome::Completed(done) = outcome {
                        self.finish(done).await;
                    }
                }
            }
        }
    }

    async fn finish(&self, done: CompletedSession) {
        let report = self.completer.complete(&self.user_id, done).await;
        if let Some(tx) = &self.report_tx {
            if tx.send(report).is_err() {
                debug!("completion report receiver dropped");
            }
        }
    }
}
