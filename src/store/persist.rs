// Persisted form of the store: `{ shift, stages }` under a fixed key.
//
// Session fields are never written. On load every job is backfilled to the
// full catalog shape, and any field missing from a stored record takes its
// catalog default.

use crate::engine::ghost;
use crate::models::{
    AppState, JobStages, Owner, ShiftState, ShiftStatus, StageRecord, Timestamp, STAGE_CATALOG,
};
use crate::store::Storage;
use anyhow::{Context, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Storage key for the state document
pub const STORAGE_KEY: &str = "appState_v1";

#[derive(Serialize)]
struct PersistedState<'a> {
    shift: &'a ShiftState,
    stages: &'a BTreeMap<String, JobStages>,
}

/// Serialize the durable part of `state`
pub fn encode(state: &AppState) -> Result<String> {
    serde_json::to_string(&PersistedState { shift: &state.shift, stages: &state.stages })
        .context("Failed to serialize state")
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ShiftPatch {
    status: Option<ShiftStatus>,
    worked_seconds: Option<f64>,
    started_at: Option<f64>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct StagePatch {
    name: Option<String>,
    allocated_hours: Option<f64>,
    started: Option<bool>,
    running: Option<bool>,
    seconds: Option<f64>,
    completed: Option<bool>,
    started_at: Option<f64>,
    completed_at: Option<f64>,
    owner: Option<Owner>,
}

/// Epoch-millisecond timestamps may have been written as floats
fn to_timestamp(value: f64) -> Option<Timestamp> {
    (value.is_finite() && value > 0.0).then(|| value.round() as Timestamp)
}

/// Root document. Unknown fields (uiLocked, activeUnlock, ...) are ignored.
#[derive(Deserialize)]
struct PersistedPatch {
    shift: Option<ShiftPatch>,
    stages: Option<BTreeMap<String, Option<BTreeMap<String, Option<StagePatch>>>>>,
}

fn to_count(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value.floor() as u64
    } else {
        0
    }
}

impl ShiftPatch {
    fn into_shift(self) -> ShiftState {
        let defaults = ShiftState::default();
        ShiftState {
            status: self.status.unwrap_or(defaults.status),
            worked_seconds: self.worked_seconds.map(to_count).unwrap_or(defaults.worked_seconds),
            started_at: self.started_at.and_then(to_timestamp).or(defaults.started_at),
        }
    }
}

impl StagePatch {
    fn apply(self, record: &mut StageRecord) {
        if let Some(name) = self.name {
            record.name = name;
        }
        if let Some(hours) = self.allocated_hours {
            record.allocated_hours = hours;
        }
        if let Some(started) = self.started {
            record.started = started;
        }
        if let Some(running) = self.running {
            record.running = running;
        }
        if let Some(seconds) = self.seconds {
            record.seconds = to_count(seconds);
        }
        if let Some(completed) = self.completed {
            record.completed = completed;
        }
        record.started_at = self.started_at.and_then(to_timestamp);
        record.completed_at = self.completed_at.and_then(to_timestamp);
        record.owner = self.owner;
    }
}

/// Rebuild one job's stages from catalog defaults merged with whatever was stored
fn backfill_job(job_id: &str, stored: BTreeMap<String, Option<StagePatch>>) -> JobStages {
    let mut patches: BTreeMap<u32, StagePatch> = BTreeMap::new();
    for (key, patch) in stored {
        match key.parse::<u32>() {
            Ok(id) if STAGE_CATALOG.iter().any(|d| d.id == id) => {
                patches.insert(id, patch.unwrap_or_default());
            }
            _ => log::debug!("Dropping unknown stage '{}' from job {}", key, job_id),
        }
    }

    STAGE_CATALOG
        .iter()
        .map(|def| {
            let mut record = StageRecord::from_definition(def);
            if let Some(patch) = patches.remove(&def.id) {
                patch.apply(&mut record);
            }
            (def.id, record)
        })
        .collect()
}

/// Parse a stored document into a fresh-session state
pub fn decode(raw: &str, now: Timestamp) -> Result<AppState> {
    let patch: PersistedPatch = serde_json::from_str(raw).context("Failed to parse persisted state")?;

    let shift = patch.shift.map(ShiftPatch::into_shift).unwrap_or_default();
    let stages = patch
        .stages
        .unwrap_or_default()
        .into_iter()
        .map(|(job_id, job)| {
            let stages = backfill_job(&job_id, job.unwrap_or_default());
            (job_id, stages)
        })
        .collect();

    Ok(AppState::new(shift, stages, now))
}

/// Brand-new state: shift off, every job fresh, ghosts seeded
pub fn fresh_state<R: Rng + ?Sized>(job_ids: &[String], rng: &mut R, now: Timestamp) -> AppState {
    let stages = ghost::initial_stages(&STAGE_CATALOG, job_ids, &Owner::ghost_roster(), rng, now);
    AppState::new(ShiftState::default(), stages, now)
}

/// Load persisted state, falling back to a fresh state when nothing usable is stored
pub fn load_state<R: Rng + ?Sized>(
    storage: &dyn Storage,
    job_ids: &[String],
    rng: &mut R,
    now: Timestamp,
) -> AppState {
    let raw = match storage.load(STORAGE_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            log::info!("No stored state; starting fresh");
            return fresh_state(job_ids, rng, now);
        }
        Err(e) => {
            log::warn!("Failed to read stored state, starting fresh: {:#}", e);
            return fresh_state(job_ids, rng, now);
        }
    };

    match decode(&raw, now) {
        Ok(state) => {
            for violation in state.invariant_violations() {
                log::warn!("Stored state inconsistency: {}", violation);
            }
            state
        }
        Err(e) => {
            log::warn!("Stored state is corrupt, starting fresh: {:#}", e);
            fresh_state(job_ids, rng, now)
        }
    }
}
