use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::util;

/// Best score persisted between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreRecord {
    pub high_score: u64,
    /// When the score was set (ISO 8601 format)
    pub updated_at: DateTime<Utc>,
}

impl HighScoreRecord {
    #[must_use]
    pub fn now(high_score: u64) -> Self {
        Self {
            high_score,
            updated_at: Utc::now(),
        }
    }

    /// Reads the record, or returns `None` if the file does not exist yet.
    pub fn load(path: &Path) -> anyhow::Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        util::read_json_file("high score", path).map(Some)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        util::save_json(self, Some(path))
    }
}
