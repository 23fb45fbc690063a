// Session coordinator: UI lock, activity tracking and the auto-relock watchdog

use crate::models::{SessionState, Timestamp};

/// Default idle time before the UI relocks itself
pub const DEFAULT_LOCK_TIMEOUT_MS: i64 = 30_000;
/// Default watchdog poll period
pub const DEFAULT_LOCK_POLL_MS: u64 = 500;
/// Default minimum gap between recorded interactions
pub const DEFAULT_INTERACTION_THROTTLE_MS: i64 = 200;

/// Timing policy for the lock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockPolicy {
    pub timeout_ms: i64,
    pub poll_ms: u64,
    pub throttle_ms: i64,
}

impl Default for LockPolicy {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
            poll_ms: DEFAULT_LOCK_POLL_MS,
            throttle_ms: DEFAULT_INTERACTION_THROTTLE_MS,
        }
    }
}

impl SessionState {
    /// Lock the UI. The drawer is never visible while locked.
    pub fn lock(&mut self, now: Timestamp) {
        self.ui_locked = true;
        self.drawer_open = false;
        self.last_interaction_at = now;
    }

    pub fn unlock(&mut self, now: Timestamp) {
        self.ui_locked = false;
        self.last_interaction_at = now;
    }

    /// Record user activity. Ignored while locked and throttled while unlocked.
    /// Returns true if the timestamp moved.
    pub fn register_interaction(&mut self, now: Timestamp, policy: &LockPolicy) -> bool {
        if self.ui_locked {
            return false;
        }
        if now - self.last_interaction_at < policy.throttle_ms {
            return false;
        }
        self.last_interaction_at = now;
        true
    }

    /// Milliseconds since the last recorded interaction
    pub fn idle_ms(&self, now: Timestamp) -> i64 {
        now - self.last_interaction_at
    }

    /// One watchdog poll. Returns true if it relocked the UI.
    pub fn watchdog_poll(&mut self, now: Timestamp, policy: &LockPolicy) -> bool {
        if self.ui_locked || self.idle_ms(now) < policy.timeout_ms {
            return false;
        }
        self.lock(now);
        true
    }

    /// Open or close the shift drawer. Opening is refused while locked.
    /// Returns true if the flag changed.
    pub fn set_drawer_open(&mut self, open: bool) -> bool {
        if open && self.ui_locked {
            return false;
        }
        if self.drawer_open == open {
            return false;
        }
        self.drawer_open = open;
        true
    }
}
