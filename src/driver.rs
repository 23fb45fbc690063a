// Background timers: the one-second tick and the lock watchdog.
//
// Each timer is a thread that holds a `Store` handle and wakes on a fixed
// period. Dropping the returned `PeriodicTask` stops and joins the thread.

use crate::store::Store;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::JoinHandle;
use std::time::Duration;

/// A named thread running `job` once per period until stopped
pub struct PeriodicTask {
    name: &'static str,
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl PeriodicTask {
    pub fn spawn(name: &'static str, period: Duration, mut job: impl FnMut() + Send + 'static) -> Self {
        let (stop, stop_rx) = mpsc::channel::<()>();
        let handle = std::thread::spawn(move || loop {
            match stop_rx.recv_timeout(period) {
                Err(RecvTimeoutError::Timeout) => job(),
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        });
        log::debug!("Started {} timer ({} ms)", name, period.as_millis());

        Self { name, stop: Some(stop), handle: Some(handle) }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Stop the timer and wait for its thread to exit
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::warn!("{} timer panicked", self.name);
            }
            log::debug!("Stopped {} timer", self.name);
        }
    }
}

impl Drop for PeriodicTask {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Advance the store once per configured tick period
pub fn spawn_tick_driver(store: Store) -> PeriodicTask {
    let period = Duration::from_millis(store.config().tick_ms.max(1));
    PeriodicTask::spawn("tick", period, move || {
        store.tick();
    })
}

/// Relock the UI once it has been idle for the configured timeout
pub fn spawn_lock_watchdog(store: Store) -> PeriodicTask {
    let period = Duration::from_millis(store.config().lock.poll_ms.max(1));
    PeriodicTask::spawn("lock watchdog", period, move || {
        store.watchdog_poll();
    })
}

/// Both timers, stopped together when dropped
pub struct Timers {
    pub tick: PeriodicTask,
    pub watchdog: PeriodicTask,
}

impl Timers {
    pub fn start(store: &Store) -> Self {
        Self {
            tick: spawn_tick_driver(store.clone()),
            watchdog: spawn_lock_watchdog(store.clone()),
        }
    }
}
