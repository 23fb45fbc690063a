// One tick of the shift and stage clocks

use crate::models::{AppState, ShiftStatus, StageRef};

/// Default tick period
pub const DEFAULT_TICK_MS: u64 = 1_000;

/// Which running stages a tick advances
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TickMode {
    /// Every running, non-completed stage gains a second
    #[default]
    All,
    /// Only the first running stage in (job id, stage id) order gains a second.
    /// Matches the legacy scan, which stopped at its first hit.
    First,
}

impl TickMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TickMode::All => "all",
            TickMode::First => "first",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "all" => Some(TickMode::All),
            "first" => Some(TickMode::First),
            _ => None,
        }
    }
}

/// What a tick changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub shift_advanced: bool,
    pub stages_advanced: Vec<StageRef>,
}

impl TickReport {
    pub fn changed(&self) -> bool {
        self.shift_advanced || !self.stages_advanced.is_empty()
    }
}

/// Advance counters by one second. The lock does not gate ticks.
pub fn tick(state: &mut AppState, mode: TickMode) -> TickReport {
    let mut report = TickReport::default();

    if state.shift.status == ShiftStatus::On {
        state.shift.worked_seconds += 1;
        report.shift_advanced = true;
    }

    'scan: for (job_id, job) in state.stages.iter_mut() {
        for (stage_id, s) in job.iter_mut() {
            if s.is_active() {
                s.seconds += 1;
                report.stages_advanced.push(StageRef {
                    job_id: job_id.clone(),
                    stage_id: *stage_id,
                    name: s.name.clone(),
                });
                if mode == TickMode::First {
                    break 'scan;
                }
            }
        }
    }

    report
}
