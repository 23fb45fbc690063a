// Versioned application store and its command interface.
//
// `StateStore` owns the current snapshot and commits replacements atomically.
// `Store` is the cloneable handle that commands, the tick driver and the lock
// watchdog share.

pub mod clock;
pub mod persist;
pub mod storage;

pub use clock::*;
pub use storage::*;

use crate::config::Config;
use crate::engine::{self, ShiftAction, StageResult, TickReport};
use crate::models::{AppState, Owner, SessionState, Timestamp};
use persist::STORAGE_KEY;
use rand::Rng;
use std::sync::{Arc, Mutex, MutexGuard};

/// Current snapshot plus a monotonically increasing version
pub struct StateStore {
    state: AppState,
    version: u64,
    storage: Box<dyn Storage>,
}

impl StateStore {
    pub fn new(state: AppState, storage: Box<dyn Storage>) -> Self {
        Self { state, version: 0, storage }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Replace the snapshot. Returns false (and does nothing) when `next` is identical.
    pub fn commit(&mut self, next: AppState) -> bool {
        if next == self.state {
            return false;
        }
        let durable_changed = !next.same_persisted(&self.state);
        self.state = next;
        self.version += 1;
        if durable_changed {
            self.persist();
        }
        true
    }

    /// Mutate only the session. Never touches storage.
    fn update_session(&mut self, f: impl FnOnce(&mut SessionState) -> bool) -> bool {
        let changed = f(&mut self.state.session);
        if changed {
            self.version += 1;
        }
        changed
    }

    /// Write the durable part. A failed write is logged and the in-memory state kept.
    pub fn persist(&mut self) {
        let result = persist::encode(&self.state).and_then(|raw| self.storage.save(STORAGE_KEY, &raw));
        if let Err(e) = result {
            log::warn!("Failed to save state: {:#}", e);
        }
    }

    /// Drop persisted state and install `fresh`
    fn replace_with(&mut self, fresh: AppState) {
        if let Err(e) = self.storage.remove(STORAGE_KEY) {
            log::warn!("Failed to clear stored state: {:#}", e);
        }
        self.state = fresh;
        self.version += 1;
        self.persist();
    }
}

/// Shared handle to the store
#[derive(Clone)]
pub struct Store {
    inner: Arc<Mutex<StateStore>>,
    clock: Arc<dyn Clock>,
    config: Config,
    user: Owner,
    job_ids: Vec<String>,
}

impl Store {
    /// Load state from `storage` (or seed a fresh one) and wrap it
    pub fn open(storage: Box<dyn Storage>, clock: Arc<dyn Clock>, config: Config, job_ids: Vec<String>) -> Self {
        Self::open_with_rng(storage, clock, config, job_ids, &mut rand::rng())
    }

    pub fn open_with_rng<R: Rng + ?Sized>(
        storage: Box<dyn Storage>,
        clock: Arc<dyn Clock>,
        config: Config,
        job_ids: Vec<String>,
        rng: &mut R,
    ) -> Self {
        let now = clock.now_ms();
        let state = persist::load_state(storage.as_ref(), &job_ids, rng, now);
        let mut inner = StateStore::new(state, storage);
        // Backfilled or freshly seeded contents become the stored document
        inner.persist();

        Self {
            inner: Arc::new(Mutex::new(inner)),
            clock,
            config,
            user: Owner::current_user(),
            job_ids,
        }
    }

    fn guard(&self) -> MutexGuard<'_, StateStore> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now_ms()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn user(&self) -> &Owner {
        &self.user
    }

    pub fn job_ids(&self) -> &[String] {
        &self.job_ids
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> AppState {
        self.guard().state.clone()
    }

    pub fn version(&self) -> u64 {
        self.guard().version
    }

    pub fn is_locked(&self) -> bool {
        self.guard().state.session.ui_locked
    }

    // Shift

    /// Apply a shift action. Returns true if the shift changed.
    pub fn shift_action(&self, action: ShiftAction) -> bool {
        let now = self.now();
        let mut inner = self.guard();
        let state = &inner.state;
        let Some(shift) = engine::shift::apply_shift_action(&state.session, &state.shift, action, now) else {
            log::debug!("Shift action '{}' ignored in {}", action.as_str(), state.shift.status.as_str());
            return false;
        };
        let mut next = state.clone();
        next.shift = shift;
        let changed = inner.commit(next);
        if changed {
            log::debug!("Shift is now {} (v{})", inner.state.shift.status.as_str(), inner.version);
        }
        changed
    }

    pub fn clock_on(&self) -> bool {
        self.shift_action(ShiftAction::ClockOn)
    }

    pub fn pause_shift(&self) -> bool {
        self.shift_action(ShiftAction::Pause)
    }

    pub fn resume_shift(&self) -> bool {
        self.shift_action(ShiftAction::Resume)
    }

    pub fn clock_off(&self) -> bool {
        self.shift_action(ShiftAction::ClockOff)
    }

    // Stages

    fn apply_stage(
        &self,
        label: &str,
        job_id: &str,
        stage_id: u32,
        op: impl FnOnce(&AppState, &Owner, Timestamp) -> StageResult<AppState>,
    ) -> StageResult<()> {
        let now = self.now();
        let mut inner = self.guard();
        match op(&inner.state, &self.user, now) {
            Ok(next) => {
                inner.commit(next);
                log::debug!("{} {}/{} committed (v{})", label, job_id, stage_id, inner.version);
                Ok(())
            }
            Err(e) => {
                log::debug!("{} {}/{} rejected: {}", label, job_id, stage_id, e.code());
                Err(e)
            }
        }
    }

    pub fn start_stage(&self, job_id: &str, stage_id: u32) -> StageResult<()> {
        self.apply_stage("start", job_id, stage_id, |state, user, now| {
            engine::stage::start_stage(state, user, job_id, stage_id, now)
        })
    }

    pub fn switch_and_start(&self, job_id: &str, stage_id: u32) -> StageResult<()> {
        self.apply_stage("switch", job_id, stage_id, |state, user, now| {
            engine::stage::switch_and_start(state, user, job_id, stage_id, now)
        })
    }

    pub fn pause_stage(&self, job_id: &str, stage_id: u32) -> StageResult<()> {
        self.apply_stage("pause", job_id, stage_id, |state, _, _| {
            engine::stage::pause_stage(state, job_id, stage_id)
        })
    }

    pub fn complete_stage(&self, job_id: &str, stage_id: u32) -> StageResult<()> {
        self.apply_stage("complete", job_id, stage_id, |state, _, now| {
            engine::stage::complete_stage(state, job_id, stage_id, now)
        })
    }

    // Session

    pub fn lock(&self) {
        let now = self.now();
        if self.guard().update_session(|s| {
            let was_locked = s.ui_locked;
            s.lock(now);
            !was_locked
        }) {
            log::info!("UI locked");
        }
    }

    pub fn unlock(&self) {
        let now = self.now();
        self.guard().update_session(|s| {
            s.unlock(now);
            true
        });
        log::info!("UI unlocked");
    }

    /// Record user activity. Returns true if it was recorded.
    pub fn register_interaction(&self) -> bool {
        let now = self.now();
        let policy = self.config.lock;
        self.guard().update_session(|s| s.register_interaction(now, &policy))
    }

    pub fn set_drawer_open(&self, open: bool) -> bool {
        self.guard().update_session(|s| s.set_drawer_open(open))
    }

    /// One watchdog poll. Returns true if the UI was relocked.
    pub fn watchdog_poll(&self) -> bool {
        let now = self.now();
        let policy = self.config.lock;
        let relocked = self.guard().update_session(|s| s.watchdog_poll(now, &policy));
        if relocked {
            log::info!("UI relocked after {} ms idle", policy.timeout_ms);
        }
        relocked
    }

    // Timers and maintenance

    /// Advance counters by one second
    pub fn tick(&self) -> TickReport {
        let mut inner = self.guard();
        let mut next = inner.state.clone();
        let report = engine::tick::tick(&mut next, self.config.tick_mode);
        if report.changed() {
            inner.commit(next);
            log::debug!(
                "Tick: shift {}, {} stage(s) advanced",
                if report.shift_advanced { "advanced" } else { "idle" },
                report.stages_advanced.len()
            );
        }
        report
    }

    /// Discard persisted state and reseed
    pub fn reset(&self) {
        self.reset_with(&mut rand::rng());
    }

    pub fn reset_with<R: Rng + ?Sized>(&self, rng: &mut R) {
        let now = self.now();
        let fresh = persist::fresh_state(&self.job_ids, rng, now);
        self.guard().replace_with(fresh);
        log::info!("State reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::StageError;
    use crate::models::ShiftStatus;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::path::PathBuf;

    const T0: Timestamp = 1_700_000_000_000;

    fn job_ids() -> Vec<String> {
        vec!["J1".to_string(), "J2".to_string()]
    }

    /// Store over shared memory storage with no ghosts on stages 4..10
    fn open(storage: &MemoryStorage, clock: &Arc<ManualClock>) -> Store {
        Store::open_with_rng(
            Box::new(storage.clone()),
            clock.clone(),
            Config::with_data_location(PathBuf::from("unused.db")),
            job_ids(),
            &mut StdRng::seed_from_u64(7),
        )
    }

    #[test]
    fn test_open_persists_seeded_state() {
        let storage = MemoryStorage::new();
        let clock = Arc::new(ManualClock::new(T0));
        let store = open(&storage, &clock);
        assert!(store.is_locked());
        let saved = storage.get(STORAGE_KEY).unwrap();
        assert_eq!(persist::decode(&saved, T0).unwrap().stages, store.snapshot().stages);
    }

    #[test]
    fn test_commands_need_unlock() {
        let storage = MemoryStorage::new();
        let clock = Arc::new(ManualClock::new(T0));
        let store = open(&storage, &clock);

        assert!(!store.clock_on());
        assert_eq!(store.start_stage("J1", 5), Err(StageError::Locked));

        store.unlock();
        assert!(store.clock_on());
        assert!(!store.clock_on());
        assert_eq!(store.start_stage("J1", 5), Ok(()));
        assert_eq!(store.snapshot().shift.status, ShiftStatus::On);
    }

    #[test]
    fn test_failed_command_leaves_version() {
        let storage = MemoryStorage::new();
        let clock = Arc::new(ManualClock::new(T0));
        let store = open(&storage, &clock);
        store.unlock();
        let before = store.version();
        assert_eq!(store.start_stage("J1", 5), Err(StageError::ShiftOff));
        assert_eq!(store.start_stage("NOPE", 5), Err(StageError::NotFound));
        assert_eq!(store.version(), before);
    }

    #[test]
    fn test_session_changes_are_not_saved() {
        let storage = MemoryStorage::new();
        let clock = Arc::new(ManualClock::new(T0));
        let store = open(&storage, &clock);
        let saved = storage.get(STORAGE_KEY);

        store.unlock();
        clock.advance(1_000);
        assert!(store.register_interaction());
        assert!(store.set_drawer_open(true));
        assert_eq!(storage.get(STORAGE_KEY), saved);
    }

    #[test]
    fn test_tick_commits_and_saves() {
        let storage = MemoryStorage::new();
        let clock = Arc::new(ManualClock::new(T0));
        let store = open(&storage, &clock);
        store.unlock();
        store.clock_on();
        store.start_stage("J2", 6).unwrap();

        for _ in 0..3 {
            store.tick();
        }
        let state = store.snapshot();
        assert_eq!(state.shift.worked_seconds, 3);
        assert_eq!(state.stage("J2", 6).unwrap().seconds, 3);

        let saved = persist::decode(&storage.get(STORAGE_KEY).unwrap(), T0).unwrap();
        assert_eq!(saved.stage("J2", 6).unwrap().seconds, 3);
    }

    #[test]
    fn test_watchdog_relocks_after_timeout() {
        let storage = MemoryStorage::new();
        let clock = Arc::new(ManualClock::new(T0));
        let store = open(&storage, &clock);
        store.unlock();
        store.set_drawer_open(true);

        clock.advance(29_999);
        assert!(!store.watchdog_poll());
        clock.advance(1);
        assert!(store.watchdog_poll());
        let session = store.snapshot().session;
        assert!(session.ui_locked);
        assert!(!session.drawer_open);
    }

    #[test]
    fn test_reload_keeps_durable_state() {
        let storage = MemoryStorage::new();
        let clock = Arc::new(ManualClock::new(T0));
        let store = open(&storage, &clock);
        store.unlock();
        store.clock_on();
        store.start_stage("J1", 4).unwrap();
        store.tick();

        let reopened = open(&storage, &clock);
        assert!(reopened.is_locked());
        assert_eq!(reopened.snapshot().shift, store.snapshot().shift);
        assert_eq!(reopened.snapshot().stages, store.snapshot().stages);
    }

    #[test]
    fn test_reset_rebuilds_fresh_state() {
        let storage = MemoryStorage::new();
        let clock = Arc::new(ManualClock::new(T0));
        let store = open(&storage, &clock);
        store.unlock();
        store.clock_on();
        store.start_stage("J1", 4).unwrap();

        store.reset_with(&mut StdRng::seed_from_u64(11));
        let state = store.snapshot();
        assert!(state.session.ui_locked);
        assert_eq!(state.shift.status, ShiftStatus::Off);
        assert!(!state.stage("J1", 4).unwrap().started);
        assert!(storage.get(STORAGE_KEY).is_some());
    }

    #[test]
    fn test_clones_share_state() {
        let storage = MemoryStorage::new();
        let clock = Arc::new(ManualClock::new(T0));
        let store = open(&storage, &clock);
        let other = store.clone();
        store.unlock();
        assert!(!other.is_locked());
    }
}
