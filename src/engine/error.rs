// Guard failures returned by stage operations

use crate::models::StageRef;
use serde::Serialize;
use thiserror::Error;

/// Why a stage operation was refused.
///
/// Returned as a value; the store is left untouched whenever one of these is produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StageError {
    #[error("Controls are locked (READ ONLY).")]
    Locked,
    #[error("Stage not found.")]
    NotFound,
    #[error("Locked – {owner} is working on this stage.")]
    GhostOwned { owner: String },
    #[error("Clock on to start or sign off stages.")]
    ShiftOff,
    #[error("This stage is already signed off and can't be started again.")]
    AlreadyComplete,
    #[error("{0} is already running. Switch to continue.")]
    OtherRunning(StageRef),
    #[error("Stage is not running.")]
    NotRunning,
    #[error("Start the stage before signing off.")]
    NotStarted,
}

impl StageError {
    /// Stable machine-readable reason code
    pub fn code(&self) -> &'static str {
        match self {
            StageError::Locked => "LOCKED",
            StageError::NotFound => "NOT_FOUND",
            StageError::GhostOwned { .. } => "GHOST_OWNED",
            StageError::ShiftOff => "SHIFT_OFF",
            StageError::AlreadyComplete => "ALREADY_COMPLETE",
            StageError::OtherRunning(_) => "OTHER_RUNNING",
            StageError::NotRunning => "NOT_RUNNING",
            StageError::NotStarted => "NOT_STARTED",
        }
    }

    /// The conflicting stage, for the switch confirmation flow
    pub fn conflict(&self) -> Option<&StageRef> {
        match self {
            StageError::OtherRunning(running) => Some(running),
            _ => None,
        }
    }
}

pub type StageResult<T> = Result<T, StageError>;

/// Flattened outcome for display and JSON output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub ok: bool,
    pub code: Option<&'static str>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub running: Option<StageRef>,
}

impl<T> From<&StageResult<T>> for Outcome {
    fn from(result: &StageResult<T>) -> Self {
        match result {
            Ok(_) => Outcome { ok: true, code: None, message: String::new(), running: None },
            Err(e) => Outcome {
                ok: false,
                code: Some(e.code()),
                message: e.to_string(),
                running: e.conflict().cloned(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_and_messages() {
        let e = StageError::GhostOwned { owner: "Dave Jones".to_string() };
        assert_eq!(e.code(), "GHOST_OWNED");
        assert_eq!(e.to_string(), "Locked – Dave Jones is working on this stage.");
        assert_eq!(StageError::Locked.code(), "LOCKED");
        assert_eq!(StageError::NotStarted.to_string(), "Start the stage before signing off.");
    }

    #[test]
    fn test_outcome_carries_conflict() {
        let running = StageRef { job_id: "J1".to_string(), stage_id: 2, name: "Mechanical".to_string() };
        let result: StageResult<()> = Err(StageError::OtherRunning(running.clone()));
        let outcome = Outcome::from(&result);
        assert!(!outcome.ok);
        assert_eq!(outcome.code, Some("OTHER_RUNNING"));
        assert_eq!(outcome.running, Some(running));
        assert!(outcome.message.contains("Mechanical (J1, stage 2)"));

        let ok: StageResult<()> = Ok(());
        assert!(Outcome::from(&ok).ok);
    }
}
