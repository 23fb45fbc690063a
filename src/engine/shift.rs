// Shift engine: OFF -> ON <-> PAUSED -> OFF
//
// Failed preconditions are silent: the caller gets `None` and keeps the prior state.

use crate::engine::guard::require_unlocked;
use crate::models::{SessionState, ShiftState, ShiftStatus, Timestamp};

/// Shift clock actions exposed to the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftAction {
    ClockOn,
    Pause,
    Resume,
    ClockOff,
}

impl ShiftAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShiftAction::ClockOn => "on",
            ShiftAction::Pause => "pause",
            ShiftAction::Resume => "resume",
            ShiftAction::ClockOff => "off",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "on" => Some(ShiftAction::ClockOn),
            "pause" => Some(ShiftAction::Pause),
            "resume" => Some(ShiftAction::Resume),
            "off" => Some(ShiftAction::ClockOff),
            _ => None,
        }
    }

    /// Whether the action is permitted from `status` (lock aside)
    pub fn allowed_from(&self, status: ShiftStatus) -> bool {
        match self {
            ShiftAction::ClockOn => status == ShiftStatus::Off,
            ShiftAction::Pause => status == ShiftStatus::On,
            ShiftAction::Resume => status == ShiftStatus::Paused,
            ShiftAction::ClockOff => status != ShiftStatus::Off,
        }
    }
}

/// Apply a shift action. Returns the next shift state, or `None` when locked
/// or when the action is not allowed from the current status.
pub fn apply_shift_action(
    session: &SessionState,
    shift: &ShiftState,
    action: ShiftAction,
    now: Timestamp,
) -> Option<ShiftState> {
    require_unlocked(session).ok()?;
    if !action.allowed_from(shift.status) {
        return None;
    }

    let next = match action {
        ShiftAction::ClockOn => ShiftState {
            status: ShiftStatus::On,
            worked_seconds: shift.worked_seconds,
            started_at: Some(now),
        },
        ShiftAction::Pause => ShiftState { status: ShiftStatus::Paused, ..shift.clone() },
        ShiftAction::Resume => ShiftState { status: ShiftStatus::On, ..shift.clone() },
        ShiftAction::ClockOff => ShiftState { status: ShiftStatus::Off, ..shift.clone() },
    };
    Some(next)
}

pub fn clock_on(session: &SessionState, shift: &ShiftState, now: Timestamp) -> Option<ShiftState> {
    apply_shift_action(session, shift, ShiftAction::ClockOn, now)
}

pub fn pause_shift(session: &SessionState, shift: &ShiftState, now: Timestamp) -> Option<ShiftState> {
    apply_shift_action(session, shift, ShiftAction::Pause, now)
}

pub fn resume_shift(session: &SessionState, shift: &ShiftState, now: Timestamp) -> Option<ShiftState> {
    apply_shift_action(session, shift, ShiftAction::Resume, now)
}

pub fn clock_off(session: &SessionState, shift: &ShiftState, now: Timestamp) -> Option<ShiftState> {
    apply_shift_action(session, shift, ShiftAction::ClockOff, now)
}
