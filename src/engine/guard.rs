// Pre-condition combinators shared by every mutating operation

use crate::engine::{StageError, StageResult};
use crate::models::{AppState, SessionState, StageRecord};

/// First guard of every mutation: the UI must be unlocked
pub fn require_unlocked(session: &SessionState) -> StageResult<()> {
    if session.ui_locked {
        Err(StageError::Locked)
    } else {
        Ok(())
    }
}

/// Run `op` only when the UI is unlocked
pub fn when_unlocked<T>(
    session: &SessionState,
    op: impl FnOnce() -> StageResult<T>,
) -> StageResult<T> {
    require_unlocked(session)?;
    op()
}

/// Resolve a stage or fail with NOT_FOUND
pub fn locate<'a>(state: &'a AppState, job_id: &str, stage_id: u32) -> StageResult<&'a StageRecord> {
    state.stage(job_id, stage_id).ok_or(StageError::NotFound)
}

/// Ghost-owned stages are read-only to the user
pub fn not_ghost_owned(stage: &StageRecord) -> StageResult<()> {
    match &stage.owner {
        Some(owner) if owner.is_ghost() => Err(StageError::GhostOwned { owner: owner.name.clone() }),
        _ => Ok(()),
    }
}

pub fn shift_on(state: &AppState) -> StageResult<()> {
    if state.shift.can_work() {
        Ok(())
    } else {
        Err(StageError::ShiftOff)
    }
}

pub fn not_completed(stage: &StageRecord) -> StageResult<()> {
    if stage.completed {
        Err(StageError::AlreadyComplete)
    } else {
        Ok(())
    }
}
