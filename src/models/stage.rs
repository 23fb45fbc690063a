use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use super::{Owner, Timestamp};

/// Static stage definition (one per work phase)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageDefinition {
    pub id: u32,
    pub name: &'static str,
    pub allocated_hours: f64,
}

impl StageDefinition {
    /// Allocated budget in seconds
    pub fn allocated_seconds(&self) -> f64 {
        self.allocated_hours * 3600.0
    }

    /// Look up a stage definition by id
    pub fn find(id: u32) -> Option<&'static StageDefinition> {
        STAGE_CATALOG.iter().find(|s| s.id == id)
    }
}

/// The ten stages every job moves through, in order
pub const STAGE_CATALOG: [StageDefinition; 10] = [
    StageDefinition { id: 1, name: "Pre Scan", allocated_hours: 0.1 },
    StageDefinition { id: 2, name: "Mechanical", allocated_hours: 0.1 },
    StageDefinition { id: 3, name: "Strip", allocated_hours: 0.1 },
    StageDefinition { id: 4, name: "Panel", allocated_hours: 0.1 },
    StageDefinition { id: 5, name: "Paint Prep", allocated_hours: 0.1 },
    StageDefinition { id: 6, name: "Paint", allocated_hours: 0.1 },
    StageDefinition { id: 7, name: "Polish", allocated_hours: 0.1 },
    StageDefinition { id: 8, name: "Refit", allocated_hours: 0.1 },
    StageDefinition { id: 9, name: "Post Scan", allocated_hours: 0.1 },
    StageDefinition { id: 10, name: "Final QC", allocated_hours: 3.0 },
];

/// Derived display state of a stage (never stored)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChipState {
    NotStarted,
    InProgress,
    Paused,
    Overdue,
    Completed,
}

impl ChipState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChipState::NotStarted => "notstarted",
            ChipState::InProgress => "inprogress",
            ChipState::Paused => "paused",
            ChipState::Overdue => "overdue",
            ChipState::Completed => "completed",
        }
    }

    /// Upper-case chip label
    pub fn label(&self) -> &'static str {
        match self {
            ChipState::NotStarted => "NOT STARTED",
            ChipState::InProgress => "IN PROGRESS",
            ChipState::Paused => "PAUSED",
            ChipState::Overdue => "OVERDUE",
            ChipState::Completed => "COMPLETED",
        }
    }
}

/// Mutable per-job stage record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageRecord {
    pub name: String,
    pub allocated_hours: f64,
    pub started: bool,
    pub running: bool,
    pub seconds: u64,
    pub completed: bool,
    pub started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub owner: Option<Owner>,
}

impl StageRecord {
    /// Fresh, untouched record for a catalog stage
    pub fn from_definition(def: &StageDefinition) -> Self {
        Self {
            name: def.name.to_string(),
            allocated_hours: def.allocated_hours,
            started: false,
            running: false,
            seconds: 0,
            completed: false,
            started_at: None,
            completed_at: None,
            owner: None,
        }
    }

    pub fn allocated_seconds(&self) -> f64 {
        self.allocated_hours * 3600.0
    }

    /// Elapsed time exceeds the allocation. A zero allocation is never overdue.
    pub fn is_overdue(&self) -> bool {
        let alloc = self.allocated_seconds();
        alloc > 0.0 && self.seconds as f64 > alloc
    }

    pub fn is_ghost_owned(&self) -> bool {
        self.owner.as_ref().map_or(false, |o| o.is_ghost())
    }

    /// Running and still accruing time
    pub fn is_active(&self) -> bool {
        self.running && !self.completed
    }

    pub fn chip_state(&self) -> ChipState {
        if self.completed {
            ChipState::Completed
        } else if self.running {
            if self.is_overdue() { ChipState::Overdue } else { ChipState::InProgress }
        } else if self.started {
            if self.is_overdue() { ChipState::Overdue } else { ChipState::Paused }
        } else {
            ChipState::NotStarted
        }
    }
}

/// Stage id (1..=10) to record, one map per job
pub type JobStages = BTreeMap<u32, StageRecord>;

/// Build the full ten-stage map for a new job
pub fn new_job_stages() -> JobStages {
    STAGE_CATALOG
        .iter()
        .map(|def| (def.id, StageRecord::from_definition(def)))
        .collect()
}
