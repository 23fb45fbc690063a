// Store-level workflow tests: shift, stages, lock and ticks through the command interface

use rand::rngs::StdRng;
use rand::SeedableRng;
use shopclock::config::Config;
use shopclock::engine::{StageError, TickMode};
use shopclock::models::{
    new_job_stages, AppState, ChipState, Owner, ShiftState, ShiftStatus, StageRef, Timestamp,
};
use shopclock::store::persist::{encode, STORAGE_KEY};
use shopclock::store::{ManualClock, MemoryStorage, Store};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

const T0: Timestamp = 1_768_550_400_000;

fn config() -> Config {
    Config::with_data_location(PathBuf::from("unused.db"))
}

/// Store over `J1` and `J2` with no ghosts, unless `prepare` adds some
fn store_with(config: Config, prepare: impl FnOnce(&mut AppState)) -> (Store, Arc<ManualClock>) {
    let mut stages = BTreeMap::new();
    stages.insert("J1".to_string(), new_job_stages());
    stages.insert("J2".to_string(), new_job_stages());
    let mut state = AppState::new(ShiftState::default(), stages, T0);
    prepare(&mut state);

    let storage = MemoryStorage::new();
    storage.insert(STORAGE_KEY, &encode(&state).unwrap());

    let clock = Arc::new(ManualClock::new(T0));
    let store = Store::open_with_rng(
        Box::new(storage),
        clock.clone(),
        config,
        vec!["J1".to_string(), "J2".to_string()],
        &mut StdRng::seed_from_u64(1),
    );
    (store, clock)
}

fn unlocked_store() -> (Store, Arc<ManualClock>) {
    let (store, clock) = store_with(config(), |_| {});
    store.unlock();
    (store, clock)
}

fn ghost_running(state: &mut AppState, job: &str, stage: u32) {
    let s = state.stage_mut(job, stage).unwrap();
    s.started = true;
    s.running = true;
    s.seconds = 100;
    s.started_at = Some(T0 - 600_000);
    s.owner = Some(Owner::ghost_roster().remove(0));
}

#[test]
fn test_full_stage_scenario() {
    let (store, clock) = unlocked_store();

    assert!(store.clock_on());
    store.start_stage("J1", 1).unwrap();
    for _ in 0..5 {
        clock.advance(1_000);
        store.tick();
    }

    let state = store.snapshot();
    let stage = state.stage("J1", 1).unwrap();
    assert_eq!(stage.seconds, 5);
    assert_eq!(state.shift.worked_seconds, 5);
    assert_eq!(stage.chip_state(), ChipState::InProgress);
    assert_eq!(stage.started_at, Some(T0));
    assert!(stage.owner.as_ref().unwrap().is_user(&Owner::current_user()));

    store.complete_stage("J1", 1).unwrap();
    let state = store.snapshot();
    let stage = state.stage("J1", 1).unwrap();
    assert!(stage.completed && !stage.running);
    assert_eq!(stage.completed_at, Some(T0 + 5_000));
    assert_eq!(stage.chip_state(), ChipState::Completed);

    // Completed stages neither restart nor tick
    assert_eq!(store.start_stage("J1", 1), Err(StageError::AlreadyComplete));
    store.tick();
    assert_eq!(store.snapshot().stage("J1", 1).unwrap().seconds, 5);
}

#[test]
fn test_restart_keeps_elapsed_and_start_time() {
    let (store, clock) = unlocked_store();
    store.clock_on();
    store.start_stage("J1", 4).unwrap();
    store.tick();
    store.tick();
    store.pause_stage("J1", 4).unwrap();

    clock.advance(60_000);
    store.start_stage("J1", 4).unwrap();
    store.start_stage("J1", 4).unwrap();

    let state = store.snapshot();
    let stage = state.stage("J1", 4).unwrap();
    assert_eq!(stage.seconds, 2);
    assert_eq!(stage.started_at, Some(T0));
    assert!(stage.running);
}

#[test]
fn test_own_sibling_conflicts_until_switch() {
    let (store, _) = unlocked_store();
    store.clock_on();
    store.start_stage("J1", 4).unwrap();

    // The user's own running stage blocks a plain start, even in the same job
    assert!(matches!(store.start_stage("J1", 5), Err(StageError::OtherRunning(ref r)) if r.stage_id == 4));
    let state = store.snapshot();
    assert!(state.stage("J1", 4).unwrap().running);
    assert!(!state.stage("J1", 5).unwrap().started);

    store.switch_and_start("J1", 5).unwrap();
    let state = store.snapshot();
    assert!(!state.stage("J1", 4).unwrap().running);
    assert_eq!(state.stage("J1", 4).unwrap().chip_state(), ChipState::Paused);
    assert!(state.stage("J1", 5).unwrap().running);
}

#[test]
fn test_start_pauses_running_ghost_sibling() {
    let (store, _) = store_with(config(), |state| ghost_running(state, "J1", 2));
    store.unlock();
    store.clock_on();

    store.start_stage("J1", 5).unwrap();
    let state = store.snapshot();
    let ghost = state.stage("J1", 2).unwrap();
    assert!(!ghost.running);
    assert!(ghost.is_ghost_owned());
    assert_eq!(ghost.seconds, 100);
    assert!(state.stage("J1", 5).unwrap().running);
    assert!(state.invariant_violations().is_empty());
}

#[test]
fn test_conflict_then_switch() {
    let (store, _) = unlocked_store();
    store.clock_on();
    store.start_stage("J1", 4).unwrap();

    let err = store.start_stage("J2", 6).unwrap_err();
    assert_eq!(
        err,
        StageError::OtherRunning(StageRef { job_id: "J1".to_string(), stage_id: 4, name: "Panel".to_string() })
    );
    assert_eq!(err.to_string(), "Panel (J1, stage 4) is already running. Switch to continue.");
    assert!(!store.snapshot().stage("J2", 6).unwrap().started);

    store.switch_and_start("J2", 6).unwrap();
    let state = store.snapshot();
    let old = state.stage("J1", 4).unwrap();
    assert!(old.started && !old.running);
    assert!(state.stage("J2", 6).unwrap().running);
}

#[test]
fn test_switch_pauses_every_non_ghost_stage_store_wide() {
    let (store, _) = store_with(config(), |state| {
        ghost_running(state, "J2", 1);
        // A running stage owned by some other real technician
        let s = state.stage_mut("J1", 7).unwrap();
        s.started = true;
        s.running = true;
        s.owner = Some(Owner::new("AB", "Alex Brown", shopclock::models::OwnerKind::User));
    });
    store.unlock();
    store.clock_on();

    store.switch_and_start("J2", 5).unwrap();
    let state = store.snapshot();
    assert!(!state.stage("J1", 7).unwrap().running);
    assert!(state.stage("J2", 5).unwrap().running);
    // Same-job ghost is paused by the one-running-per-job rule
    assert!(!state.stage("J2", 1).unwrap().running);
}

#[test]
fn test_switch_leaves_other_jobs_ghosts_running() {
    let (store, _) = store_with(config(), |state| ghost_running(state, "J2", 1));
    store.unlock();
    store.clock_on();

    store.switch_and_start("J1", 5).unwrap();
    assert!(store.snapshot().stage("J2", 1).unwrap().running);
}

#[test]
fn test_ghost_stages_are_read_only() {
    let (store, _) = store_with(config(), |state| ghost_running(state, "J1", 2));
    store.unlock();
    store.clock_on();
    let before = store.snapshot().stage("J1", 2).cloned();

    let expected = StageError::GhostOwned { owner: "Dave Jones".to_string() };
    assert_eq!(store.start_stage("J1", 2), Err(expected.clone()));
    assert_eq!(store.switch_and_start("J1", 2), Err(expected.clone()));
    assert_eq!(store.pause_stage("J1", 2), Err(expected.clone()));
    assert_eq!(store.complete_stage("J1", 2), Err(expected.clone()));
    assert_eq!(expected.to_string(), "Locked – Dave Jones is working on this stage.");

    assert_eq!(store.snapshot().stage("J1", 2).cloned(), before);
}

#[test]
fn test_every_mutation_is_gated_by_lock() {
    let (store, _) = unlocked_store();
    store.clock_on();
    store.start_stage("J1", 4).unwrap();
    store.lock();
    let before = store.snapshot();

    assert_eq!(store.start_stage("J1", 5), Err(StageError::Locked));
    assert_eq!(store.switch_and_start("J2", 5), Err(StageError::Locked));
    assert_eq!(store.pause_stage("J1", 4), Err(StageError::Locked));
    assert_eq!(store.complete_stage("J1", 4), Err(StageError::Locked));
    // Lock wins over every other guard
    assert_eq!(store.start_stage("NOPE", 99), Err(StageError::Locked));

    assert!(!store.pause_shift());
    assert!(!store.clock_off());
    assert!(!store.set_drawer_open(true));

    let after = store.snapshot();
    assert_eq!(after.shift, before.shift);
    assert_eq!(after.stages, before.stages);
}

#[test]
fn test_ticks_run_while_locked() {
    let (store, _) = unlocked_store();
    store.clock_on();
    store.start_stage("J1", 4).unwrap();
    store.lock();

    let report = store.tick();
    assert!(report.shift_advanced);
    assert_eq!(report.stages_advanced.len(), 1);
    assert_eq!(store.snapshot().stage("J1", 4).unwrap().seconds, 1);
}

#[test]
fn test_shift_cycle() {
    let (store, clock) = unlocked_store();
    assert!(!store.pause_shift());
    assert!(!store.resume_shift());
    assert!(!store.clock_off());

    assert!(store.clock_on());
    store.tick();
    assert!(store.pause_shift());
    store.tick();
    assert_eq!(store.snapshot().shift.worked_seconds, 1);

    assert!(store.resume_shift());
    assert!(store.clock_off());
    let shift = store.snapshot().shift;
    assert_eq!(shift.status, ShiftStatus::Off);
    assert_eq!(shift.started_at, Some(T0));

    clock.advance(3_600_000);
    assert!(store.clock_on());
    let shift = store.snapshot().shift;
    assert_eq!(shift.worked_seconds, 1);
    assert_eq!(shift.started_at, Some(T0 + 3_600_000));
}

#[test]
fn test_stage_work_needs_shift_on() {
    let (store, _) = unlocked_store();
    assert_eq!(store.start_stage("J1", 4), Err(StageError::ShiftOff));

    store.clock_on();
    store.start_stage("J1", 4).unwrap();
    store.pause_shift();
    assert_eq!(store.complete_stage("J1", 4), Err(StageError::ShiftOff));
    // Pausing needs no shift
    store.pause_stage("J1", 4).unwrap();
    assert_eq!(store.pause_stage("J1", 4), Err(StageError::NotRunning));
}

#[test]
fn test_complete_needs_started_stage() {
    let (store, _) = unlocked_store();
    store.clock_on();
    assert_eq!(store.complete_stage("J1", 9), Err(StageError::NotStarted));
    assert_eq!(store.pause_stage("J1", 9), Err(StageError::NotRunning));
    assert_eq!(store.start_stage("J3", 1), Err(StageError::NotFound));
    assert_eq!(store.start_stage("J1", 11), Err(StageError::NotFound));
}

#[test]
fn test_auto_lock_after_idle_timeout() {
    let (store, clock) = unlocked_store();
    store.set_drawer_open(true);

    clock.advance(20_000);
    assert!(store.register_interaction());
    clock.advance(29_999);
    assert!(!store.watchdog_poll());
    assert!(!store.is_locked());

    clock.advance(1);
    assert!(store.watchdog_poll());
    let session = store.snapshot().session;
    assert!(session.ui_locked);
    assert!(!session.drawer_open);

    // Interactions while locked do not count as activity
    clock.advance(1_000);
    assert!(!store.register_interaction());
}

#[test]
fn test_interactions_are_throttled() {
    let (store, clock) = unlocked_store();
    clock.advance(100);
    assert!(!store.register_interaction());
    clock.advance(100);
    assert!(store.register_interaction());
    clock.advance(199);
    assert!(!store.register_interaction());
}

#[test]
fn test_tick_mode_all_advances_every_running_stage() {
    let (store, _) = store_with(config(), |state| ghost_running(state, "J2", 1));
    store.unlock();
    store.clock_on();
    store.start_stage("J1", 5).unwrap();

    let report = store.tick();
    assert_eq!(report.stages_advanced.len(), 2);
    let state = store.snapshot();
    assert_eq!(state.stage("J1", 5).unwrap().seconds, 1);
    assert_eq!(state.stage("J2", 1).unwrap().seconds, 101);
}

#[test]
fn test_tick_mode_first_advances_only_first_running_stage() {
    let mut config = config();
    config.tick_mode = TickMode::First;
    let (store, _) = store_with(config, |state| ghost_running(state, "J2", 1));
    store.unlock();
    store.clock_on();
    store.start_stage("J1", 5).unwrap();

    let report = store.tick();
    assert_eq!(report.stages_advanced.len(), 1);
    assert_eq!(report.stages_advanced[0].job_id, "J1");
    let state = store.snapshot();
    assert_eq!(state.stage("J1", 5).unwrap().seconds, 1);
    assert_eq!(state.stage("J2", 1).unwrap().seconds, 100);
}

#[test]
fn test_overdue_chip_after_allocation() {
    let (store, _) = store_with(config(), |state| {
        let s = state.stage_mut("J1", 4).unwrap();
        s.started = true;
        s.seconds = 360;
        s.owner = Some(Owner::current_user());
    });
    store.unlock();
    store.clock_on();
    assert_eq!(store.snapshot().stage("J1", 4).unwrap().chip_state(), ChipState::Paused);

    store.start_stage("J1", 4).unwrap();
    assert_eq!(store.snapshot().stage("J1", 4).unwrap().chip_state(), ChipState::InProgress);
    store.tick();
    assert_eq!(store.snapshot().stage("J1", 4).unwrap().chip_state(), ChipState::Overdue);
}
