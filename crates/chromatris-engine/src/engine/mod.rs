//! Game engine logic and state management.
//!
//! This module builds the rules of play on top of the core data structures:
//!
//! - [`GameField`] - Board, falling piece, next piece and ghost row
//! - [`GameSession`] - Menu/play/pause/game-over state machine driven by ticks
//! - [`GameStats`] - Score, cleared rows and level
//! - [`PieceBag`] - 7-bag piece generation system
//! - [`FallClock`] - Fixed-accumulator timer for natural fall
//! - [`GameConfig`] - Speed curve, scoring and input queue policy
//!
//! # Game Flow
//!
//! 1. The host creates a [`GameSession`] and calls [`GameSession::start`]
//! 2. Input becomes [`Action`]s queued with [`GameSession::enqueue_action`]
//! 3. Every frame the host calls [`GameSession::tick`] with the elapsed time
//! 4. Locks, clears and top-out are reported as [`GameEvent`]s
//! 5. The host renders from [`GameSession::snapshot`]
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use chromatris_engine::{Action, GameConfig, GameEvent, GameSession};
//!
//! let mut session = GameSession::new(GameConfig::default()).unwrap();
//! session.start();
//!
//! session.enqueue_action(Action::HardDrop);
//! session.tick(Duration::from_millis(16));
//!
//! let locked = session
//!     .drain_events()
//!     .into_iter()
//!     .any(|event| matches!(event, GameEvent::PieceLocked { .. }));
//! assert!(locked);
//! assert_eq!(session.stats().completed_pieces(), 1);
//! ```

pub use self::{
    action::*, config::*, event::*, fall_clock::*, game_field::*, game_session::*, game_stats::*,
    piece_bag::*, snapshot::*,
};

mod action;
mod config;
mod event;
mod fall_clock;
mod game_field;
mod game_session;
mod game_stats;
mod piece_bag;
mod snapshot;
