use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::session::result::SessionResult;

pub const SCHEMA_VERSION: u32 = 1;

/// Sessions kept on disk; older ones are dropped first.
pub const MAX_HISTORY: usize = 500;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProfileData {
    pub schema_version: u32,
    pub total_score: f64,
    pub total_sessions: u32,
    pub streak_days: u32,
    pub best_streak: u32,
    pub last_practice_date: Option<String>,
}

impl Default for ProfileData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            total_score: 0.0,
            total_sessions: 0,
            streak_days: 0,
            best_streak: 0,
            last_practice_date: None,
        }
    }
}

impl ProfileData {
    /// Check if loaded data has a stale schema version and needs reset.
    pub fn needs_reset(&self) -> bool {
        self.schema_version != SCHEMA_VERSION
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionHistoryData {
    pub schema_version: u32,
    pub sessions: Vec<SessionResult>,
}

impl Default for SessionHistoryData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            sessions: Vec::new(),
        }
    }
}

impl SessionHistoryData {
    pub fn new(sessions: Vec<SessionResult>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            sessions,
        }
    }
}

pub const EXPORT_VERSION: u32 = 1;

/// Profile totals are derived data but travel with the export so a restore
/// does not depend on replaying history.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExportData {
    pub mathdr_export_version: u32,
    pub exported_at: DateTime<Utc>,
    pub config: Config,
    pub profile: ProfileData,
    pub history: SessionHistoryData,
}
