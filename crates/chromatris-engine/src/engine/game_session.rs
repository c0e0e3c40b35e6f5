use std::{mem, time::Duration};

use rand::Rng as _;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::{PieceCollisionError, core::piece::Piece};

use super::{
    action::{Action, ActionQueue},
    config::{ConfigError, GameConfig},
    event::GameEvent,
    fall_clock::FallClock,
    game_field::{DropOutcome, GameField, LockOutcome, TopOutReason},
    game_stats::GameStats,
    piece_bag::PieceSeed,
    snapshot::SessionSnapshot,
};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    derive_more::Display,
    derive_more::IsVariant,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum SessionState {
    #[display("menu")]
    Menu,
    #[display("playing")]
    Playing,
    #[display("paused")]
    Paused,
    #[display("game-over")]
    GameOver,
}

/// Why [`GameSession::set_falling_piece`] refused a piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum SetFallingPieceError {
    #[display("no game is being played")]
    NotPlaying,
    #[display("{_0}")]
    Collision(#[error(source)] PieceCollisionError),
}

/// A game from the menu to game over and back, driven by the host's frame
/// loop.
///
/// The host feeds player input with [`enqueue_action`](Self::enqueue_action)
/// and elapsed time with [`tick`](Self::tick). Within a tick, queued actions
/// are applied first (as many as the [`QueuePolicy`](super::QueuePolicy)
/// allows), then the fall clock performs every natural drop that is due.
/// Nothing moves outside `Playing`.
///
/// Each new game draws its bag seed from the session's own generator, so a
/// session built with [`with_seed`](Self::with_seed) replays identically.
#[derive(Debug, Clone)]
pub struct GameSession {
    config: GameConfig,
    field: GameField,
    stats: GameStats,
    clock: FallClock,
    step: Duration,
    state: SessionState,
    queue: ActionQueue,
    events: Vec<GameEvent>,
    high_score: u64,
    seed_source: Pcg32,
    current_seed: PieceSeed,
}

impl GameSession {
    /// Creates a session in the menu with a random seed.
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        Self::with_seed(config, rand::rng().random())
    }

    /// Like [`Self::new`], but every game's pieces derive from `seed`.
    pub fn with_seed(config: GameConfig, seed: PieceSeed) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut seed_source = seed.rng();
        let current_seed = seed_source.random();
        Ok(Self {
            field: GameField::with_seed(current_seed),
            stats: GameStats::with_scoring(config.scoring),
            clock: FallClock::new(),
            step: config.step_for(0),
            state: SessionState::Menu,
            queue: ActionQueue::new(),
            events: Vec::new(),
            high_score: 0,
            seed_source,
            current_seed,
            config,
        })
    }

    /// Sets the best score loaded by the host.
    #[must_use]
    pub fn with_high_score(mut self, high_score: u64) -> Self {
        self.high_score = high_score;
        self
    }

    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn field(&self) -> &GameField {
        &self.field
    }

    #[must_use]
    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    /// Current natural-fall interval.
    #[must_use]
    pub fn step(&self) -> Duration {
        self.step
    }

    #[must_use]
    pub fn high_score(&self) -> u64 {
        self.high_score
    }

    /// Seed of the bag used by the current game.
    #[must_use]
    pub fn current_seed(&self) -> PieceSeed {
        self.current_seed
    }

    /// Number of actions waiting for the next tick.
    #[must_use]
    pub fn pending_actions(&self) -> usize {
        self.queue.len()
    }

    /// Takes every event raised since the last call.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        mem::take(&mut self.events)
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            board: self.field.board().clone(),
            active: self.field.falling_piece(),
            ghost_y: self.field.ghost_y(),
            next: self.field.next_kind(),
            score: self.stats.score(),
            rows: self.stats.total_cleared_lines(),
            level: self.stats.level(),
            step: self.step,
            high_score: self.high_score,
            state: self.state,
        }
    }

    fn set_state(&mut self, to: SessionState) {
        let from = self.state;
        if from == to {
            return;
        }
        self.state = to;
        self.events.push(GameEvent::StateChanged { from, to });
    }

    /// Starts a new game with a fresh board and bag.
    ///
    /// Does nothing while a game is being played.
    pub fn start(&mut self) {
        if self.state.is_playing() {
            return;
        }
        self.current_seed = self.seed_source.random();
        self.start_with_field(GameField::with_seed(self.current_seed));
    }

    /// Starts a new game on a prepared field, discarding any game in
    /// progress.
    ///
    /// A field that has already topped out ends the game immediately.
    pub fn start_with_field(&mut self, field: GameField) {
        self.field = field;
        self.stats = GameStats::with_scoring(self.config.scoring);
        self.step = self.config.step_for(0);
        self.clock.reset();
        self.queue.clear();
        self.set_state(SessionState::Playing);
        if let Some(reason) = self.field.top_out() {
            self.game_over(reason);
        }
    }

    pub fn pause(&mut self) {
        if self.state.is_playing() {
            self.set_state(SessionState::Paused);
        }
    }

    pub fn resume(&mut self) {
        if self.state.is_paused() {
            self.set_state(SessionState::Playing);
        }
    }

    pub fn toggle_pause(&mut self) {
        match self.state {
            SessionState::Playing => self.pause(),
            SessionState::Paused => self.resume(),
            SessionState::Menu | SessionState::GameOver => {}
        }
    }

    /// Returns to the menu. The game underneath stays frozen until the
    /// next [`start`](Self::start).
    pub fn show_menu(&mut self) {
        self.queue.clear();
        self.set_state(SessionState::Menu);
    }

    /// Queues an action for the next tick. Returns `false` and drops the
    /// action unless a game is being played.
    pub fn enqueue_action(&mut self, action: Action) -> bool {
        if !self.state.is_playing() {
            return false;
        }
        self.queue.push(action);
        true
    }

    /// Replaces the falling piece of the running game.
    pub fn set_falling_piece(&mut self, piece: Piece) -> Result<(), SetFallingPieceError> {
        if !self.state.is_playing() {
            return Err(SetFallingPieceError::NotPlaying);
        }
        self.field
            .set_falling_piece(piece)
            .map_err(SetFallingPieceError::Collision)
    }

    /// Advances the game by `delta`.
    pub fn tick(&mut self, delta: Duration) {
        if !self.state.is_playing() {
            return;
        }

        let budget = self.queue.budget(self.config.queue_policy);
        for _ in 0..budget {
            let Some(action) = self.queue.pop() else {
                break;
            };
            self.apply_action(action);
            if !self.state.is_playing() {
                return;
            }
        }

        self.clock.accumulate(delta);
        while self.state.is_playing() && self.clock.take_due(self.step) {
            if let DropOutcome::Landed { lock, .. } = self.field.soft_drop() {
                self.handle_lock(lock);
            }
        }
    }

    /// Like [`Self::tick`], with the delta in seconds. Negative, NaN and
    /// infinite deltas count as zero.
    pub fn tick_secs(&mut self, secs: f64) {
        let delta = if secs.is_finite() && secs > 0.0 {
            Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO)
        } else {
            Duration::ZERO
        };
        self.tick(delta);
    }

    fn apply_action(&mut self, action: Action) {
        let (accepted, outcome) = match action {
            Action::MoveLeft => (self.field.try_move_left(), None),
            Action::MoveRight => (self.field.try_move_right(), None),
            Action::Rotate => (self.field.try_rotate(), None),
            Action::SoftDrop => {
                let outcome = self.field.soft_drop();
                (!outcome.is_inactive(), Some(outcome))
            }
            Action::HardDrop => {
                let outcome = self.field.hard_drop();
                (!outcome.is_inactive(), Some(outcome))
            }
        };
        self.events
            .push(GameEvent::ActionApplied { action, accepted });

        if let Some(DropOutcome::Landed { distance, lock }) = outcome {
            if action == Action::HardDrop {
                self.stats
                    .add_hard_drop(distance, self.config.hard_drop_points_per_cell);
            }
            self.handle_lock(lock);
        }
    }

    fn handle_lock(&mut self, lock: LockOutcome) {
        self.stats.complete_piece_drop(lock.cleared_lines);
        self.events.push(GameEvent::PieceLocked { piece: lock.piece });
        if lock.cleared_lines > 0 {
            self.events.push(GameEvent::LinesCleared {
                count: lock.cleared_lines,
            });
            self.step = self.config.step_for(self.stats.total_cleared_lines());
        }
        if let Some(reason) = lock.top_out {
            self.game_over(reason);
        }
    }

    fn game_over(&mut self, reason: TopOutReason) {
        self.queue.clear();
        let score = self.stats.score();
        self.events.push(GameEvent::GameOver { score, reason });
        if score > self.high_score {
            let previous = mem::replace(&mut self.high_score, score);
            self.events
                .push(GameEvent::HighScoreBeaten { previous, score });
        }
        self.set_state(SessionState::GameOver);
    }
}
