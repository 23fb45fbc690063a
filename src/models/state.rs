use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use super::{JobStages, SessionState, ShiftState, StageRecord, Timestamp};

/// Reference to one stage of one job
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageRef {
    pub job_id: String,
    pub stage_id: u32,
    pub name: String,
}

impl fmt::Display for StageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, stage {})", self.name, self.job_id, self.stage_id)
    }
}

/// Full application state.
///
/// `shift` and `stages` are the durable part; `session` is rebuilt on every load.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppState {
    pub shift: ShiftState,
    pub stages: BTreeMap<String, JobStages>,
    #[serde(skip)]
    pub session: SessionState,
}

impl AppState {
    pub fn new(shift: ShiftState, stages: BTreeMap<String, JobStages>, now: Timestamp) -> Self {
        Self {
            shift,
            stages,
            session: SessionState::fresh(now),
        }
    }

    pub fn stage(&self, job_id: &str, stage_id: u32) -> Option<&StageRecord> {
        self.stages.get(job_id).and_then(|job| job.get(&stage_id))
    }

    pub fn stage_mut(&mut self, job_id: &str, stage_id: u32) -> Option<&mut StageRecord> {
        self.stages.get_mut(job_id).and_then(|job| job.get_mut(&stage_id))
    }

    /// All stages in stable (job id, stage id) order
    pub fn iter_stages(&self) -> impl Iterator<Item = (&str, u32, &StageRecord)> {
        self.stages
            .iter()
            .flat_map(|(job_id, job)| job.iter().map(move |(id, s)| (job_id.as_str(), *id, s)))
    }

    /// Stages that are running and not completed
    pub fn running_stages(&self) -> Vec<StageRef> {
        self.iter_stages()
            .filter(|(_, _, s)| s.is_active())
            .map(|(job_id, stage_id, s)| StageRef {
                job_id: job_id.to_string(),
                stage_id,
                name: s.name.clone(),
            })
            .collect()
    }

    /// Durable part equals another state's durable part
    pub fn same_persisted(&self, other: &AppState) -> bool {
        self.shift == other.shift && self.stages == other.stages
    }

    /// Describe every broken record invariant. Empty when the state is consistent.
    pub fn invariant_violations(&self) -> Vec<String> {
        let mut violations = Vec::new();
        for (job_id, job) in &self.stages {
            let running = job.values().filter(|s| s.running).count();
            if running > 1 {
                violations.push(format!("job {} has {} running stages", job_id, running));
            }
            for (id, s) in job {
                if s.completed && s.running {
                    violations.push(format!("{}/{} is completed but running", job_id, id));
                }
                if s.running && !s.started {
                    violations.push(format!("{}/{} is running but not started", job_id, id));
                }
                if s.started && s.owner.is_none() {
                    violations.push(format!("{}/{} is started without an owner", job_id, id));
                }
            }
        }
        violations
    }
}
