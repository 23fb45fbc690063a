// Stage engine: start, switch, pause and sign-off transitions for a single stage.
//
// Every operation takes the current snapshot and returns the next one, or a
// StageError with the snapshot left as it was.

use crate::engine::guard::{locate, not_completed, not_ghost_owned, shift_on, when_unlocked};
use crate::engine::{StageError, StageResult};
use crate::models::{AppState, Owner, StageRef, Timestamp};

/// First stage (stable order) that is running and owned by `user`
pub fn find_running_owned_by(state: &AppState, user: &Owner) -> Option<StageRef> {
    state
        .iter_stages()
        .find(|(_, _, s)| s.is_active() && s.owner.as_ref().map_or(false, |o| o.is_user(user)))
        .map(|(job_id, stage_id, s)| StageRef {
            job_id: job_id.to_string(),
            stage_id,
            name: s.name.clone(),
        })
}

/// Guards shared by start and switch, after the lock check
fn check_startable(state: &AppState, job_id: &str, stage_id: u32) -> StageResult<()> {
    let stage = locate(state, job_id, stage_id)?;
    not_ghost_owned(stage)?;
    shift_on(state)?;
    not_completed(stage)
}

/// Start the target and pause its siblings. Guards must already have passed.
fn begin(next: &mut AppState, user: &Owner, job_id: &str, stage_id: u32, now: Timestamp) {
    if let Some(job) = next.stages.get_mut(job_id) {
        for (id, s) in job.iter_mut() {
            if *id != stage_id && s.running {
                s.running = false;
            }
        }
        if let Some(target) = job.get_mut(&stage_id) {
            target.started = true;
            target.running = true;
            if target.owner.is_none() {
                target.owner = Some(user.clone());
            }
            if target.started_at.is_none() {
                target.started_at = Some(now);
            }
        }
    }
}

/// Start (or resume) a stage.
///
/// Fails with OTHER_RUNNING when the user already has a different stage running
/// anywhere; the caller resolves that through [`switch_and_start`].
pub fn start_stage(
    state: &AppState,
    user: &Owner,
    job_id: &str,
    stage_id: u32,
    now: Timestamp,
) -> StageResult<AppState> {
    when_unlocked(&state.session, || {
        check_startable(state, job_id, stage_id)?;

        if let Some(running) = find_running_owned_by(state, user) {
            if !(running.job_id == job_id && running.stage_id == stage_id) {
                return Err(StageError::OtherRunning(running));
            }
        }

        let mut next = state.clone();
        begin(&mut next, user, job_id, stage_id, now);
        Ok(next)
    })
}

/// Pause every running non-ghost stage in the store, then start the target.
///
/// Scope is store-wide and not restricted to the user's own stages.
pub fn switch_and_start(
    state: &AppState,
    user: &Owner,
    job_id: &str,
    stage_id: u32,
    now: Timestamp,
) -> StageResult<AppState> {
    when_unlocked(&state.session, || {
        check_startable(state, job_id, stage_id)?;

        let mut next = state.clone();
        for job in next.stages.values_mut() {
            for s in job.values_mut() {
                if s.is_active() && !s.is_ghost_owned() {
                    s.running = false;
                }
            }
        }
        begin(&mut next, user, job_id, stage_id, now);
        Ok(next)
    })
}

/// Pause a running stage. Elapsed time, owner and start time are kept.
pub fn pause_stage(state: &AppState, job_id: &str, stage_id: u32) -> StageResult<AppState> {
    when_unlocked(&state.session, || {
        let stage = locate(state, job_id, stage_id)?;
        not_ghost_owned(stage)?;
        if !stage.running {
            return Err(StageError::NotRunning);
        }

        let mut next = state.clone();
        if let Some(s) = next.stage_mut(job_id, stage_id) {
            s.running = false;
        }
        Ok(next)
    })
}

/// Sign off a started stage
pub fn complete_stage(
    state: &AppState,
    job_id: &str,
    stage_id: u32,
    now: Timestamp,
) -> StageResult<AppState> {
    when_unlocked(&state.session, || {
        let stage = locate(state, job_id, stage_id)?;
        not_ghost_owned(stage)?;
        shift_on(state)?;
        if !stage.started {
            return Err(StageError::NotStarted);
        }
        not_completed(stage)?;

        let mut next = state.clone();
        if let Some(s) = next.stage_mut(job_id, stage_id) {
            s.running = false;
            s.completed = true;
            s.completed_at = Some(now);
        }
        Ok(next)
    })
}
