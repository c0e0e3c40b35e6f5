use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Board, Piece, PieceKind};

use super::game_session::SessionState;

/// Read-only copy of everything a renderer needs for one frame.
///
/// The active piece is reported separately from the board; it is not
/// written into `board` until it locks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub board: Board,
    pub active: Piece,
    pub ghost_y: i32,
    pub next: PieceKind,
    pub score: u64,
    pub rows: usize,
    pub level: usize,
    #[serde(with = "crate::serde_millis")]
    pub step: Duration,
    pub high_score: u64,
    pub state: SessionState,
}
