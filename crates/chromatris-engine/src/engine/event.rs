use serde::{Deserialize, Serialize};

use crate::Piece;

use super::{action::Action, game_field::TopOutReason, game_session::SessionState};

/// Notifications a session raises while it runs.
///
/// Events accumulate inside the session until the host takes them with
/// [`GameSession::drain_events`](super::GameSession::drain_events).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum GameEvent {
    /// A queued action was processed. `accepted` is false when the move
    /// was blocked and nothing changed.
    ActionApplied { action: Action, accepted: bool },
    PieceLocked { piece: Piece },
    LinesCleared { count: usize },
    GameOver { score: u64, reason: TopOutReason },
    HighScoreBeaten { previous: u64, score: u64 },
    StateChanged { from: SessionState, to: SessionState },
}
