// Display formatting for hours, elapsed time and timestamps

use crate::models::Timestamp;
use chrono::{Local, TimeZone};

/// Allocated hours with one decimal: `0.1hrs`
pub fn format_hrs(hours: f64) -> String {
    let hours = if hours.is_finite() { hours } else { 0.0 };
    format!("{:.1}hrs", hours)
}

/// Compact elapsed time: `1h 5m`, `5m`, or `0m` under a minute
pub fn format_elapsed_short(seconds: u64) -> String {
    let minutes = seconds / 60;
    let hours = minutes / 60;
    if hours > 0 {
        format!("{}h {}m", hours, minutes % 60)
    } else {
        format!("{}m", minutes)
    }
}

/// Whole minutes: `12m`
pub fn format_minutes(seconds: u64) -> String {
    format!("{}m", seconds / 60)
}

/// Stage timer: `MM:SS`, minutes uncapped
pub fn format_mmss(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Shift clock: `HH:MM:SS`
pub fn format_clock(seconds: u64) -> String {
    format!("{:02}:{:02}:{:02}", seconds / 3600, (seconds % 3600) / 60, seconds % 60)
}

/// Local wall-clock `HH:MM` of an epoch-millisecond timestamp. Empty when absent.
pub fn format_started_time(timestamp: Option<Timestamp>) -> String {
    let Some(ms) = timestamp.filter(|ms| *ms > 0) else {
        return String::new();
    };
    match Local.timestamp_millis_opt(ms).single() {
        Some(dt) => dt.format("%H:%M").to_string(),
        None => String::new(),
    }
}
