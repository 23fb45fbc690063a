// Output formatting for status, job list and stage overview

use crate::engine::views::{self, StageRow, StageStats};
use crate::models::{AppState, ChipState, JobInfo, JobStages, JobStatus, Owner, ShiftStatus};
use crate::utils::{format_clock, format_elapsed_short, format_hrs, format_mmss, format_started_time};
use serde_json::json;
use std::io::IsTerminal;

// ANSI escape codes for terminal formatting
const ANSI_BOLD: &str = "\x1b[1m";
const ANSI_RESET: &str = "\x1b[0m";

const ANSI_FG_RED: &str = "\x1b[31m";
const ANSI_FG_GREEN: &str = "\x1b[32m";
const ANSI_FG_YELLOW: &str = "\x1b[33m";
const ANSI_FG_BLUE: &str = "\x1b[34m";
const ANSI_FG_BRIGHT_BLACK: &str = "\x1b[90m";

/// Foreground color for a stage chip
fn chip_color(chip: ChipState) -> &'static str {
    match chip {
        ChipState::Completed => ANSI_FG_GREEN,
        ChipState::InProgress => ANSI_FG_BLUE,
        ChipState::Paused => ANSI_FG_YELLOW,
        ChipState::Overdue => ANSI_FG_RED,
        ChipState::NotStarted => ANSI_FG_BRIGHT_BLACK,
    }
}

fn job_status_color(status: JobStatus) -> &'static str {
    match status {
        JobStatus::Completed => ANSI_FG_GREEN,
        JobStatus::InProgress => ANSI_FG_BLUE,
        JobStatus::Paused => ANSI_FG_YELLOW,
        JobStatus::NotStarted => ANSI_FG_BRIGHT_BLACK,
    }
}

fn shift_color(status: ShiftStatus) -> &'static str {
    match status {
        ShiftStatus::On => ANSI_FG_GREEN,
        ShiftStatus::Paused => ANSI_FG_YELLOW,
        ShiftStatus::Off => ANSI_FG_BRIGHT_BLACK,
    }
}

/// Pad to `width` first, then color, so ANSI codes don't break alignment
fn paint(text: &str, width: usize, color: &str, is_tty: bool) -> String {
    let padded = format!("{:<width$}", text, width = width);
    if is_tty {
        format!("{}{}{}", color, padded, ANSI_RESET)
    } else {
        padded
    }
}

fn bold_if_tty(text: &str, is_tty: bool) -> String {
    if is_tty {
        format!("{}{}{}", ANSI_BOLD, text, ANSI_RESET)
    } else {
        text.to_string()
    }
}

/// Check if stdout is a terminal (TTY)
pub fn is_tty() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width dynamically
///
/// Uses the `terminal_size` crate, with fallback to COLUMNS and a default.
pub fn get_terminal_width() -> usize {
    if let Some((terminal_size::Width(w), _)) = terminal_size::terminal_size() {
        if w > 0 {
            return w as usize;
        }
    }

    if let Ok(cols) = std::env::var("COLUMNS") {
        if let Ok(width) = cols.parse::<usize>() {
            if width > 0 && width < 10000 {
                return width;
            }
        }
    }

    120
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    if max <= 3 {
        return text.chars().take(max).collect();
    }
    let mut out: String = text.chars().take(max - 3).collect();
    out.push_str("...");
    out
}

/// One-line summary under a stage name: `In progress • 5m`
pub fn stage_subline(row: &StageRow) -> String {
    let elapsed = format_elapsed_short(row.seconds);
    match row.chip {
        ChipState::Completed => format!("Completed • {}", elapsed),
        ChipState::InProgress => format!("In progress • {}", elapsed),
        ChipState::Paused => format!("Paused • {}", elapsed),
        ChipState::Overdue => format!("Overdue • {}", elapsed),
        ChipState::NotStarted => "Not started".to_string(),
    }
}

/// Shift, lock and running-stage dashboard
pub fn format_status(state: &AppState, is_tty: bool) -> String {
    let shift = &state.shift;
    let mut out = String::new();

    let since = match shift.started_at {
        Some(ts) if shift.status != ShiftStatus::Off => format!(" (since {})", format_started_time(Some(ts))),
        _ => String::new(),
    };
    out.push_str(&format!(
        "Shift:    {} {} worked{}\n",
        paint(shift.status.as_str(), 6, shift_color(shift.status), is_tty),
        format_clock(shift.worked_seconds),
        since
    ));
    out.push_str(&format!(
        "Controls: {}\n",
        if state.session.ui_locked { "LOCKED (read only)" } else { "UNLOCKED" }
    ));

    let running = state.running_stages();
    if running.is_empty() {
        out.push_str("Running:  none\n");
    } else {
        for (i, stage_ref) in running.iter().enumerate() {
            let label = if i == 0 { "Running:" } else { "" };
            let (seconds, owner) = state
                .stage(&stage_ref.job_id, stage_ref.stage_id)
                .map(|s| (s.seconds, s.owner.as_ref().map(|o| o.name.clone()).unwrap_or_default()))
                .unwrap_or_default();
            out.push_str(&format!(
                "{:<9} {}  {}  {}\n",
                label,
                stage_ref,
                format_mmss(seconds),
                owner
            ));
        }
    }

    out
}

pub fn status_json(state: &AppState) -> serde_json::Value {
    let running: Vec<serde_json::Value> = state
        .running_stages()
        .into_iter()
        .map(|r| {
            let stage = state.stage(&r.job_id, r.stage_id);
            json!({
                "job": r.job_id,
                "stage": r.stage_id,
                "name": r.name,
                "seconds": stage.map(|s| s.seconds).unwrap_or(0),
                "owner": stage.and_then(|s| s.owner.clone()),
            })
        })
        .collect();

    json!({
        "shift": state.shift,
        "locked": state.session.ui_locked,
        "running": running,
    })
}

/// Roster table with each job's derived status
pub fn format_job_list(roster: &[JobInfo], state: &AppState, is_tty: bool, width: usize) -> String {
    if roster.is_empty() {
        return "No matching jobs.\n".to_string();
    }

    // Fixed columns: id 12, reg 9, in 7, customer 14, status 12, plus gaps
    let fixed = 12 + 9 + 7 + 14 + 12 + 5;
    let desc_width = width.saturating_sub(fixed).max(10);

    let mut out = String::new();
    out.push_str(&bold_if_tty(
        &format!("{:<12} {:<9} {:<7} {:<14} {:<12} {}", "JOB", "REG", "IN", "CUSTOMER", "STATUS", "DESCRIPTION"),
        is_tty,
    ));
    out.push('\n');

    for job in roster {
        let status = views::job_status(state.stages.get(&job.id));
        out.push_str(&format!(
            "{:<12} {:<9} {:<7} {:<14} {} {}\n",
            job.id,
            job.reg,
            job.in_date,
            truncate(&job.customer, 14),
            paint(status.label(), 12, job_status_color(status), is_tty),
            truncate(&job.desc, desc_width)
        ));
    }
    out
}

fn format_stats(stats: &StageStats) -> String {
    format!(
        "{} in progress, {} overdue, {} paused, {} completed, {} remaining; {} active tech(s)",
        stats.in_progress, stats.overdue, stats.paused, stats.completed, stats.remaining(), stats.active_techs
    )
}

/// Stage overview for one job
pub fn format_stage_overview(
    job_id: &str,
    info: Option<&JobInfo>,
    job: &JobStages,
    user: &Owner,
    is_tty: bool,
) -> String {
    let mut out = String::new();

    let header = match info {
        Some(info) => format!("{}  {}  {}  (in {})", job_id, info.reg, info.customer, info.in_date),
        None => job_id.to_string(),
    };
    out.push_str(&bold_if_tty(&header, is_tty));
    out.push('\n');
    out.push_str(&format!("Status: {}\n", views::job_status(Some(job)).label()));
    out.push_str(&format!("Stages: {}\n", format_stats(&views::stage_stats(job))));

    let owners = views::stage_owners(job);
    if !owners.is_empty() {
        let names: Vec<String> = owners.iter().map(|o| format!("{} ({})", o.name, o.initials)).collect();
        out.push_str(&format!("Working: {}\n", names.join(", ")));
    }
    out.push('\n');

    out.push_str(&bold_if_tty(
        &format!("{:>2}  {:<11} {:<12} {:<20} {:<8} {:<8} {}", "#", "STAGE", "CHIP", "DETAIL", "ALLOC", "STARTED", "OWNER"),
        is_tty,
    ));
    out.push('\n');

    for row in views::stage_rows(job, user) {
        let owner = match (&row.owner, &row.locked_by) {
            (Some(o), _) if row.mine => format!("{} (you)", o.initials),
            (Some(o), Some(_)) => format!("{} (locked)", o.initials),
            (Some(o), None) => o.initials.clone(),
            (None, _) => String::new(),
        };
        out.push_str(&format!(
            "{:>2}  {:<11} {} {:<20} {:<8} {:<8} {}\n",
            row.id,
            truncate(&row.name, 11),
            paint(row.chip.label(), 12, chip_color(row.chip), is_tty),
            stage_subline(&row),
            format_hrs(row.allocated_hours),
            format_started_time(row.started_at),
            owner
        ));
    }

    out
}

pub fn overview_json(job_id: &str, info: Option<&JobInfo>, job: &JobStages, user: &Owner) -> serde_json::Value {
    json!({
        "job": job_id,
        "info": info,
        "status": views::job_status(Some(job)).label(),
        "stats": views::stage_stats(job),
        "owners": views::stage_owners(job),
        "stages": views::stage_rows(job, user),
    })
}

/// One status line for `watch`
pub fn format_watch_line(state: &AppState) -> String {
    let running: Vec<String> = state
        .running_stages()
        .iter()
        .map(|r| {
            let seconds = state.stage(&r.job_id, r.stage_id).map(|s| s.seconds).unwrap_or(0);
            format!("{}/{} {} {}", r.job_id, r.stage_id, r.name, format_mmss(seconds))
        })
        .collect();

    format!(
        "shift {} {} | running: {}",
        state.shift.status.as_str(),
        format_clock(state.shift.worked_seconds),
        if running.is_empty() { "none".to_string() } else { running.join(", ") }
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{default_roster, new_job_stages, ShiftState};
    use std::collections::BTreeMap;

    fn state_with(job: JobStages) -> AppState {
        let mut stages = BTreeMap::new();
        stages.insert("GY545476788".to_string(), job);
        AppState::new(ShiftState::default(), stages, 0)
    }

    fn running_job() -> JobStages {
        let mut job = new_job_stages();
        let s = job.get_mut(&1).unwrap();
        s.started = true;
        s.running = true;
        s.seconds = 125;
        s.owner = Some(Owner::current_user());
        job
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a long description", 9), "a long...");
        assert_eq!(truncate("abc", 2), "ab");
    }

    #[test]
    fn test_stage_subline() {
        let job = running_job();
        let rows = views::stage_rows(&job, &Owner::current_user());
        assert_eq!(stage_subline(&rows[0]), "In progress • 2m");
        assert_eq!(stage_subline(&rows[1]), "Not started");
    }

    #[test]
    fn test_format_status_plain() {
        let state = state_with(running_job());
        let out = format_status(&state, false);
        assert!(out.contains("Shift:    OFF"));
        assert!(out.contains("00:00:00 worked"));
        assert!(out.contains("Controls: LOCKED"));
        assert!(out.contains("Pre Scan (GY545476788, stage 1)  02:05  Chris Quayle"));
        assert!(!out.contains('\x1b'));
    }

    #[test]
    fn test_status_json() {
        let state = state_with(running_job());
        let value = status_json(&state);
        assert_eq!(value["shift"]["status"], "OFF");
        assert_eq!(value["locked"], true);
        assert_eq!(value["running"][0]["stage"], 1);
        assert_eq!(value["running"][0]["seconds"], 125);
    }

    #[test]
    fn test_job_list_shows_status() {
        let state = state_with(running_job());
        let out = format_job_list(&default_roster(), &state, false, 100);
        let first = out.lines().nth(1).unwrap();
        assert!(first.starts_with("GY545476788"));
        assert!(first.contains("IN PROGRESS"));
        assert!(out.lines().nth(2).unwrap().contains("NOT STARTED"));
    }

    #[test]
    fn test_stage_overview() {
        let job = running_job();
        let roster = default_roster();
        let out = format_stage_overview("GY545476788", roster.first(), &job, &Owner::current_user(), false);
        assert!(out.contains("SB66HLF"));
        assert!(out.contains("1 in progress"));
        assert!(out.contains("Working: Chris Quayle (CQ)"));
        assert!(out.contains("CQ (you)"));
        assert!(out.contains("3.0hrs"));
    }

    #[test]
    fn test_stage_overview_marks_stages_held_by_others() {
        let mut job = running_job();
        let s = job.get_mut(&2).unwrap();
        s.started = true;
        s.owner = Some(Owner::ghost_roster().remove(0));

        let user = Owner::current_user();
        let out = format_stage_overview("GY545476788", None, &job, &user, false);
        assert!(out.lines().any(|l| l.trim_start().starts_with("2 ") && l.ends_with("DJ (locked)")));

        let value = overview_json("GY545476788", None, &job, &user);
        assert_eq!(value["stages"][1]["locked_by"], "Dave Jones");
        assert!(value["stages"][0].get("locked_by").is_none());
    }

    #[test]
    fn test_watch_line() {
        let state = state_with(running_job());
        assert_eq!(
            format_watch_line(&state),
            "shift OFF 00:00:00 | running: GY545476788/1 Pre Scan 02:05"
        );
    }
}
