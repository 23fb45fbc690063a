// Read-side views derived from a snapshot. Nothing here is stored.

use crate::models::{ChipState, JobStages, JobStatus, Owner, OwnerKind, StageRecord};
use serde::Serialize;
use std::collections::BTreeMap;

/// Overall status of a job from its stages
pub fn job_status(job: Option<&JobStages>) -> JobStatus {
    let Some(job) = job else { return JobStatus::NotStarted };
    if !job.is_empty() && job.values().all(|s| s.completed) {
        JobStatus::Completed
    } else if job.values().any(|s| s.is_active()) {
        JobStatus::InProgress
    } else if job.values().any(|s| s.started) {
        JobStatus::Paused
    } else {
        JobStatus::NotStarted
    }
}

/// Whether the user may operate a stage; `Err` carries the blocking owner's name
pub fn can_user_control(stage: &StageRecord, user: &Owner) -> Result<(), String> {
    match &stage.owner {
        None => Ok(()),
        Some(owner) if owner.kind == OwnerKind::Ghost => Err(owner.name.clone()),
        Some(owner) if owner.initials == user.initials => Ok(()),
        Some(owner) => Err(owner.name.clone()),
    }
}

/// Counts for a job's stage overview banner
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StageStats {
    pub in_progress: usize,
    pub overdue: usize,
    pub paused: usize,
    pub completed: usize,
    pub not_started: usize,
    pub total: usize,
    /// Distinct owners of running stages
    pub active_techs: usize,
}

impl StageStats {
    pub fn remaining(&self) -> usize {
        self.total - self.completed
    }
}

pub fn stage_stats(job: &JobStages) -> StageStats {
    let mut stats = StageStats { total: job.len(), ..StageStats::default() };
    let mut active = std::collections::HashSet::new();

    for s in job.values() {
        match s.chip_state() {
            ChipState::Completed => stats.completed += 1,
            ChipState::InProgress => stats.in_progress += 1,
            ChipState::Overdue => stats.overdue += 1,
            ChipState::Paused => stats.paused += 1,
            ChipState::NotStarted => stats.not_started += 1,
        }
        if s.is_active() {
            if let Some(owner) = &s.owner {
                active.insert(owner.initials.clone());
            }
        }
    }
    stats.active_techs = active.len();
    stats
}

/// Owners with started, unfinished work in the job, sorted by first name
pub fn stage_owners(job: &JobStages) -> Vec<Owner> {
    let mut owners: BTreeMap<String, Owner> = BTreeMap::new();
    for s in job.values() {
        let Some(owner) = &s.owner else { continue };
        if s.running || (s.started && !s.completed) {
            owners.entry(owner.initials.clone()).or_insert_with(|| owner.clone());
        }
    }
    let mut owners: Vec<Owner> = owners.into_values().collect();
    owners.sort_by(|a, b| a.first_name().cmp(b.first_name()));
    owners
}

/// One row of a job's stage overview
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageRow {
    pub id: u32,
    pub name: String,
    pub chip: ChipState,
    pub seconds: u64,
    pub allocated_hours: f64,
    pub started_at: Option<i64>,
    pub owner: Option<Owner>,
    pub mine: bool,
    /// Name of whoever holds the stage when the user may not operate it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locked_by: Option<String>,
}

pub fn stage_rows(job: &JobStages, user: &Owner) -> Vec<StageRow> {
    job.iter()
        .map(|(id, s)| StageRow {
            id: *id,
            name: s.name.clone(),
            chip: s.chip_state(),
            seconds: s.seconds,
            allocated_hours: s.allocated_hours,
            started_at: s.started_at,
            owner: s.owner.clone(),
            mine: s.owner.as_ref().map_or(false, |o| o.is_user(user)),
            locked_by: can_user_control(s, user).err(),
        })
        .collect()
}
