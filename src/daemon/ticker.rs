//! One-second clock driving the focus timer.
//!
//! A [`Ticker`] only yields while armed. The driver arms it when the timer
//! starts running and disarms it on pause, reset, completion and shutdown, so
//! no tick can fire for a timer that is not running.

use tokio::sync::mpsc;
use tokio::time::{interval_at, Duration, Instant, Interval, MissedTickBehavior};

/// Interval between ticks.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// External clock abstraction for the focus timer.
#[allow(async_fn_in_trait)]
pub trait Ticker {
    /// Begins the cadence; the first tick fires one period after arming.
    fn arm(&mut self);

    /// Stops the cadence. A disarmed ticker never yields.
    fn disarm(&mut self);

    /// Returns true while armed.
    fn is_armed(&self) -> bool;

    /// Waits for the next tick. Pends forever while disarmed.
    async fn tick(&mut self);
}

/// Ticker backed by `tokio::time::interval`.
#[derive(Debug)]
pub struct IntervalTicker {
    period: Duration,
    interval: Option<Interval>,
}

impl IntervalTicker {
    /// Creates a disarmed ticker with the given period.
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            interval: None,
        }
    }
}

impl Default for IntervalTicker {
    fn default() -> Self {
        Self::new(TICK_PERIOD)
    }
}

impl Ticker for IntervalTicker {
    fn arm(&mut self) {
        let mut interval = interval_at(Instant::now() + self.period, self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        self.interval = Some(interval);
    }

    fn disarm(&mut self) {
        self.interval = None;
    }

    fn is_armed(&self) -> bool {
        self.interval.is_some()
    }

    async fn tick(&mut self) {
        match self.interval.as_mut() {
            Some(interval) => {
                interval.tick().await;
            }
            None => std::future::pending::<()>().await,
        }
    }
}

/// Ticker advanced by hand through a [`ManualTickHandle`].
///
/// Ticks sent while disarmed are discarded when the ticker is next armed.
#[derive(Debug)]
pub struct ManualTicker {
    rx: mpsc::UnboundedReceiver<()>,
    armed: bool,
}

/// Sends ticks to a [`ManualTicker`].
#[derive(Debug, Clone)]
pub struct ManualTickHandle {
    tx: mpsc::UnboundedSender<()>,
}

impl ManualTicker {
    /// Creates a disarmed manual ticker and its handle.
    pub fn new() -> (Self, ManualTickHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { rx, armed: false }, ManualTickHandle { tx })
    }
}

impl ManualTickHandle {
    /// Queues `n` ticks. Returns false if the ticker was dropped.
    pub fn advance(&self, n: u32) -> bool {
        (0..n).all(|_| self.tx.send(()).is_ok())
    }
}

impl Ticker for ManualTicker {
    fn arm(&mut self) {
        while self.rx.try_recv().is_ok() {}
        self.armed = true;
    }

    fn disarm(&mut self) {
        self.armed = false;
    }

    fn is_armed(&self) -> bool {
        self.armed
    }

    async fn tick(&mut self) {
        if !self.armed {
            return std::future::pending::<()>().await;
        }
        if self.rx.recv().await.is_none() {
            std::future::pending::<()>().await;
        }
    }
}
