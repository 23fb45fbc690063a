// Ghost worker seeding for a populated-shop feel.
//
// Pure: the same catalog, job ids, random source and clock give the same stages.

use crate::models::{JobStages, Owner, StageDefinition, StageRecord, Timestamp};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeMap;

/// Only these stages may ever be seeded with a ghost owner
pub const GHOST_STAGE_IDS: [u32; 3] = [1, 2, 3];

/// How a seeded stage looks when the user first sees it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GhostSeed {
    Paused,
    InProgress,
    Overdue,
}

const SEED_CYCLE: [GhostSeed; 3] = [GhostSeed::Paused, GhostSeed::InProgress, GhostSeed::Overdue];

impl GhostSeed {
    pub fn is_running(&self) -> bool {
        !matches!(self, GhostSeed::Paused)
    }
}

/// Fresh ten-stage map built from a catalog
pub fn job_stages_from(catalog: &[StageDefinition]) -> JobStages {
    catalog
        .iter()
        .map(|def| (def.id, StageRecord::from_definition(def)))
        .collect()
}

/// Build the stage maps for `job_ids` and seed 2 to 4 of the eligible stages
/// with ghost activity.
pub fn initial_stages<R: Rng + ?Sized>(
    catalog: &[StageDefinition],
    job_ids: &[String],
    roster: &[Owner],
    rng: &mut R,
    now: Timestamp,
) -> BTreeMap<String, JobStages> {
    let mut stages: BTreeMap<String, JobStages> = job_ids
        .iter()
        .map(|id| (id.clone(), job_stages_from(catalog)))
        .collect();
    seed_ghosts(&mut stages, job_ids, roster, rng, now);
    stages
}

fn seed_ghosts<R: Rng + ?Sized>(
    stages: &mut BTreeMap<String, JobStages>,
    job_ids: &[String],
    roster: &[Owner],
    rng: &mut R,
    now: Timestamp,
) {
    if job_ids.is_empty() || roster.is_empty() {
        return;
    }

    let mut candidates: Vec<(&String, u32)> = job_ids
        .iter()
        .flat_map(|job_id| GHOST_STAGE_IDS.iter().map(move |id| (job_id, *id)))
        .filter(|(job_id, id)| stages.get(*job_id).map_or(false, |job| job.contains_key(id)))
        .collect();
    candidates.shuffle(rng);

    let count = rng.random_range(2..5usize).min(candidates.len());

    for (idx, (job_id, stage_id)) in candidates.into_iter().take(count).enumerate() {
        let Some(job) = stages.get_mut(job_id) else { continue };

        let mut seed = SEED_CYCLE[idx % SEED_CYCLE.len()];
        // One running stage per job, ghosts included
        if seed.is_running() && job.values().any(|s| s.running) {
            seed = GhostSeed::Paused;
        }

        let Some(stage) = job.get_mut(&stage_id) else { continue };
        stage.owner = Some(roster[idx % roster.len()].clone());
        stage.started = true;
        stage.started_at = Some(now - rng.random_range(600..3600i64) * 1_000);

        match seed {
            GhostSeed::Paused => {
                stage.running = false;
                stage.seconds = rng.random_range(30..230);
            }
            GhostSeed::InProgress => {
                stage.running = true;
                stage.seconds = rng.random_range(60..360);
            }
            GhostSeed::Overdue => {
                let alloc = if stage.allocated_hours > 0.0 { stage.allocated_seconds() } else { 360.0 };
                stage.running = true;
                stage.seconds = alloc.ceil() as u64 + rng.random_range(60..360);
            }
        }
        log::debug!("Seeded ghost {} on {}/{} as {:?}", roster[idx % roster.len()].initials, job_id, stage_id, seed);
    }
}
