//! Save status machine

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Progress of the last persist
///
/// `Idle → Saving → Saved → Idle` on success, `Saving → Error` on failure.
/// `Error` sticks until the next successful save.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveStatus {
    #[default]
    Idle,
    Saving,
    Saved,
    Error,
}

impl std::fmt::Display for SaveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaveStatus::Idle => write!(f, "idle"),
            SaveStatus::Saving => write!(f, "saving"),
            SaveStatus::Saved => write!(f, "saved"),
            SaveStatus::Error => write!(f, "error"),
        }
    }
}

/// Save status plus the details shown next to it
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SaveState {
    pub status: SaveStatus,
    /// Message of the last failure, cleared when a save starts
    pub error: Option<String>,
    pub last_saved_at: Option<DateTime<Utc>>,
}
