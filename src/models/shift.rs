use serde::{Deserialize, Serialize};
use super::Timestamp;

/// Shift clock status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ShiftStatus {
    #[default]
    Off,
    On,
    Paused,
}

impl ShiftStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShiftStatus::Off => "OFF",
            ShiftStatus::On => "ON",
            ShiftStatus::Paused => "PAUSED",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "OFF" => Some(ShiftStatus::Off),
            "ON" => Some(ShiftStatus::On),
            "PAUSED" => Some(ShiftStatus::Paused),
            _ => None,
        }
    }
}

/// Shift clock state (persisted)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftState {
    pub status: ShiftStatus,
    pub worked_seconds: u64,
    pub started_at: Option<Timestamp>,
}

impl ShiftState {
    /// Stage work is only permitted while clocked on
    pub fn can_work(&self) -> bool {
        self.status == ShiftStatus::On
    }
}
