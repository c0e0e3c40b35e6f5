use std::path::PathBuf;

use chrono::{DateTime, Utc};
use chromatris_engine::{GameStats, PieceSeed, SessionSnapshot, SessionState};
use serde::{Deserialize, Serialize};

/// Summary of one headless run, written as JSON when the run ends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationReport {
    /// Timestamp when the run started (ISO 8601 format)
    pub started_at: DateTime<Utc>,
    /// Session seed; every game's bag seed derives from it
    pub seed: PieceSeed,
    pub player: PlayerInfo,
    pub fps: u32,
    /// Frames ticked before the game ended or the frame limit was hit
    pub frames: u64,
    pub actions_applied: u64,
    pub actions_rejected: u64,
    pub final_stats: GameStats,
    pub state: SessionState,
    pub high_score: u64,
    pub high_score_beaten: bool,
    pub final_snapshot: SessionSnapshot,
}

/// Where the run's input came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum PlayerInfo {
    /// Actions replayed from a script file
    Script { path: PathBuf, entries: usize },
    /// Actions chosen by a seeded random player
    Random { actions_per_second: f64 },
}
