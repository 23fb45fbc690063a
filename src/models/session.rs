use super::Timestamp;

/// In-memory UI session state. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub ui_locked: bool,
    pub last_interaction_at: Timestamp,
    pub drawer_open: bool,
}

impl SessionState {
    /// State every load starts from: locked, drawer closed
    pub fn fresh(now: Timestamp) -> Self {
        Self {
            ui_locked: true,
            last_interaction_at: now,
            drawer_open: false,
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::fresh(0)
    }
}
