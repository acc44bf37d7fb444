//! Aggregate focus statistics.
//!
//! Stats are always recomputed from the stored sessions; nothing is kept
//! incrementally.

use chrono::NaiveDate;
use serde::Serialize;

use crate::types::FocusSession;

/// Totals over a user's recorded focus sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FocusStats {
    /// Number of recorded sessions
    pub session_count: usize,
    /// Sum of session durations in seconds
    pub total_seconds: u64,
    /// `total_seconds / 60`, rounded to the nearest minute
    pub total_minutes: u64,
    /// Sessions completed on the reference day (UTC)
    pub today_count: usize,
}

impl FocusStats {
    /// Computes stats over `sessions`, counting `today` completions by UTC date.
    pub fn from_sessions(sessions: &[FocusSession], today: NaiveDate) -> Self {
        let total_seconds: u64 = sessions
            .iter()
            .map(|s| u64::from(s.duration_seconds))
            .sum();

        let today_count = sessions
            .iter()
            .filter_map(FocusSession::completed_at_utc)
            .filter(|at| at.date_naive() == today)
            .count();

        Self {
            session_count: sessions.len(),
            total_seconds,
            total_minutes: (total_seconds + 30) / 60,
            today_count,
        }
    }
}
