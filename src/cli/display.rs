//! Display utilities for the studyfocus CLI.
//!
//! This module provides formatted output for:
//! - Command confirmations
//! - Error messages
//! - Status display with a progress bar
//! - Session statistics

use std::io::{BufRead, IsTerminal, Write};

use crate::notify::COMPLETION_MESSAGE;
use crate::store::FocusStats;
use crate::types::{format_time, IpcResponse, ResponseData};

/// Width of the status progress bar in characters
const PROGRESS_BAR_WIDTH: usize = 30;

// ============================================================================
// Display
// ============================================================================

/// Display utilities for CLI output.
pub struct Display;

impl Display {
    /// Shows the daemon's confirmation for a start, pause, toggle or reset.
    pub fn show_command_result(response: &IpcResponse) {
        println!("{}", Self::format_command_result(response));
    }

    /// Shows the current timer status.
    pub fn show_status(response: &IpcResponse) {
        println!("{}", Self::format_status(response));
    }

    /// Shows session statistics for `user_id`.
    pub fn show_stats(user_id: &str, stats: &FocusStats) {
        println!("{}", Self::format_stats(user_id, stats));
    }

    /// Overwrites the current terminal line with a countdown.
    pub fn show_countdown(data: &ResponseData) {
        let mut out = std::io::stdout().lock();
        let _ = write!(out, "\r{}", Self::format_countdown(data));
        let _ = out.flush();
    }

    /// Announces a completed session and, on a terminal, waits for Enter.
    pub fn confirm_completion() {
        let mut out = std::io::stdout().lock();
        let _ = writeln!(out, "\n\x07{}", COMPLETION_MESSAGE);

        if std::io::stdin().is_terminal() {
            let _ = write!(out, "Press Enter to continue...");
            let _ = out.flush();
            drop(out);
            let mut line = String::new();
            let _ = std::io::stdin().lock().read_line(&mut line);
        }
    }

    /// Shows an error message.
    pub fn show_error(message: &str) {
        eprintln!("error: {}", message);
    }

    fn format_command_result(response: &IpcResponse) -> String {
        match &response.data {
            Some(data) => format!(
                "{} ({})",
                response.message,
                data.display.as_deref().unwrap_or("--:--")
            ),
            None => response.message.clone(),
        }
    }

    fn format_status(response: &IpcResponse) -> String {
        let Some(data) = &response.data else {
            return "The timer daemon is not running".to_string();
        };

        let state = data.state.as_deref().unwrap_or("unknown");
        let label = match state {
            "idle" => "Idle",
            "running" => "Running",
            "paused" => "Paused",
            other => other,
        };

        let mut lines = vec![
            "Focus timer status".to_string(),
            "──────────────────".to_string(),
            format!("State:     {}", label),
            Self::format_countdown(data),
        ];

        if let Some(user) = &data.user_id {
            lines.push(format!("User:      {}", user));
        }
        if let Some(count) = data.completed_sessions {
            lines.push(format!("Completed: {}", count));
        }
        if let Some(at) = &data.last_completed_at {
            lines.push(format!("Last:      {}", at));
        }

        lines.join("\n")
    }

    fn format_countdown(data: &ResponseData) -> String {
        let display = match (&data.display, data.remaining_seconds) {
            (Some(display), _) => display.clone(),
            (None, Some(remaining)) => format_time(remaining),
            (None, None) => "--:--".to_string(),
        };
        let progress = data.progress.unwrap_or(0.0);

        format!(
            "{} [{}] {:>3.0}%",
            display,
            Self::progress_bar(progress, PROGRESS_BAR_WIDTH),
            progress * 100.0
        )
    }

    fn format_stats(user_id: &str, stats: &FocusStats) -> String {
        [
            format!("Focus sessions for {}", user_id),
            format!("Sessions:  {}", stats.session_count),
            format!("Minutes:   {}", stats.total_minutes),
            format!("Today:     {}", stats.today_count),
        ]
        .join("\n")
    }

    /// Renders `progress` (clamped to 0..=1) as a bar of `width` cells.
    fn progress_bar(progress: f64, width: usize) -> String {
        let filled = (progress.clamp(0.0, 1.0) * width as f64).round() as usize;
        format!("{}{}", "#".repeat(filled), "-".repeat(width - filled))
    }
}

// ============================================================================
// Tests
// ============================================================================
