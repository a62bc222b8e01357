//! Streak and completion statistics derived from a habit's raw logs.
//!
//! Everything here is a pure function of (logs, created_at, reference date);
//! dates are compared at day granularity in the caller's calendar.

use chrono::{Days, NaiveDate};
use serde::Serialize;

use crate::models::habit::{Habit, LogEntry};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StreakStats {
    pub current_streak: u32,
    pub longest_streak: u32,
    /// Percentage of days completed in [creation date, reference date].
    /// Skipped and unrecorded days both count against it.
    pub completion_rate: f64,
    /// Days explicitly marked skipped in that window. Unrecorded days are
    /// absent history, not misses.
    pub missed_days: u32,
}

/// Completion overview for one calendar day across a habit collection.
#[derive(Debug, Clone, Serialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub total_habits: u32,
    pub completed_habits: u32,
    pub completion_rate: f64,
}

/// Derive streak/rate statistics for one habit as of `reference`.
pub fn streak_stats(habit: &Habit, reference: NaiveDate) -> StreakStats {
    let completed: Vec<NaiveDate> = habit
        .logs
        .iter()
        .filter(|(_, e)| **e == LogEntry::Completed)
        .map(|(d, _)| *d)
        .collect();

    // Current streak walks back from the most recent completed day at or
    // before the reference date; any gap (skipped or unrecorded) ends it.
    let mut current_streak = 0u32;
    if let Some(&anchor) = completed.iter().rev().find(|d| **d <= reference) {
        let mut day = anchor;
        while completed.binary_search(&day).is_ok() {
            current_streak += 1;
            match day.checked_sub_days(Days::new(1)) {
                Some(prev) => day = prev,
                None => break,
            }
        }
    }

    // Longest streak scans the whole history for the longest consecutive run.
    let mut longest_streak = 0u32;
    let mut run = 0u32;
    let mut prev: Option<NaiveDate> = None;
    for &date in &completed {
        run = match prev {
            Some(p) if Some(date) == p.checked_add_days(Days::new(1)) => run + 1,
            _ => 1,
        };
        longest_streak = longest_streak.max(run);
        prev = Some(date);
    }

    let created = habit.created_at.date_naive();
    let window_days = if reference < created {
        0
    } else {
        (reference - created).num_days() + 1
    };

    let mut completed_in_window = 0u32;
    let mut missed_days = 0u32;
    for (date, entry) in &habit.logs {
        if *date < created || *date > reference {
            continue;
        }
        match entry {
            LogEntry::Completed => completed_in_window += 1,
            LogEntry::Skipped => missed_days += 1,
        }
    }

    let completion_rate = if window_days > 0 {
        completed_in_window as f64 / window_days as f64 * 100.0
    } else {
        0.0
    };

    StreakStats {
        current_streak,
        longest_streak,
        completion_rate,
        missed_days,
    }
}

/// Completed-vs-active overview for a single date. Archived habits are
/// excluded from both sides of the ratio.
pub fn daily_summary(habits: &[Habit], date: NaiveDate) -> DailySummary {
    let active: Vec<&Habit> = habits.iter().filter(|h| !h.is_archived).collect();
    let completed_habits = active
        .iter()
        .filter(|h| h.logs.get(&date) == Some(&LogEntry::Completed))
        .count() as u32;
    let total_habits = active.len() as u32;

    let completion_rate = if total_habits > 0 {
        completed_habits as f64 / total_habits as f64 * 100.0
    } else {
        0.0
    };

    DailySummary {
        date,
        total_habits,
        completed_habits,
        completion_rate,
    }
}
