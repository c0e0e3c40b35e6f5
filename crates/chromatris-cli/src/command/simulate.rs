use std::{path::PathBuf, time::Duration};

use anyhow::Context as _;
use chrono::Utc;
use chromatris_engine::{Action, GameConfig, GameEvent, GameSession, PieceSeed};
use rand::{Rng as _, SeedableRng as _, seq::IndexedRandom as _};
use rand_pcg::Pcg32;

use crate::{
    schema::{
        high_score::HighScoreRecord,
        report::{PlayerInfo, SimulationReport},
        script::ActionScript,
    },
    util,
};

const DEFAULT_FPS: u32 = 60;
const DEFAULT_MAX_FRAMES: u64 = 36_000;
const DEFAULT_ACTIONS_PER_SECOND: f64 = 4.0;
const PROGRESS_INTERVAL_SECS: u64 = 60;
/// Mixed into the session seed so the random player does not replay the
/// stream that deals the pieces.
const PLAYER_SEED_MASK: u8 = 0xa5;

#[derive(Debug, Clone, PartialEq, clap::Args)]
pub(crate) struct SimulateArg {
    /// Session seed as 32 hexadecimal digits (random if omitted)
    #[arg(long)]
    seed: Option<PieceSeed>,
    /// Frames per second of simulated time
    #[arg(long, default_value_t = DEFAULT_FPS, value_parser = clap::value_parser!(u32).range(1..))]
    fps: u32,
    /// Stop after this many frames even if the game is still running
    #[arg(long, default_value_t = DEFAULT_MAX_FRAMES)]
    max_frames: u64,
    /// Average input rate of the random player
    #[arg(long, default_value_t = DEFAULT_ACTIONS_PER_SECOND)]
    actions_per_second: f64,
    /// Game configuration JSON file
    #[arg(long)]
    config: Option<PathBuf>,
    /// High score JSON file, created or updated when the score is beaten
    #[arg(long)]
    high_score_file: Option<PathBuf>,
    /// JSON array of `[frame, action]` pairs to play instead of the random player
    #[arg(long)]
    script: Option<PathBuf>,
    /// Report output file (stdout if omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

impl Default for SimulateArg {
    fn default() -> Self {
        Self {
            seed: None,
            fps: DEFAULT_FPS,
            max_frames: DEFAULT_MAX_FRAMES,
            actions_per_second: DEFAULT_ACTIONS_PER_SECOND,
            config: None,
            high_score_file: None,
            script: None,
            output: None,
        }
    }
}

#[derive(Debug, Clone)]
enum Player {
    Script(ActionScript),
    Random { rng: Pcg32, probability: f64 },
}

impl Player {
    fn random(seed: PieceSeed, actions_per_second: f64, fps: u32) -> Self {
        Player::Random {
            rng: Pcg32::from_seed(seed.to_bytes().map(|byte| byte ^ PLAYER_SEED_MASK)),
            probability: (actions_per_second / f64::from(fps)).clamp(0.0, 1.0),
        }
    }

    fn actions_at(&mut self, frame: u64) -> Vec<Action> {
        match self {
            Player::Script(script) => script.actions_at(frame).collect(),
            Player::Random { rng, probability } => {
                if !rng.random_bool(*probability) {
                    return vec![];
                }
                Action::ALL.choose(rng).copied().into_iter().collect()
            }
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct Tally {
    frames: u64,
    actions_applied: u64,
    actions_rejected: u64,
    high_score_beaten: bool,
}

impl Tally {
    fn record(&mut self, event: &GameEvent) {
        let frame = self.frames;
        match event {
            GameEvent::ActionApplied { accepted: true, .. } => self.actions_applied += 1,
            GameEvent::ActionApplied {
                accepted: false, ..
            } => self.actions_rejected += 1,
            GameEvent::LinesCleared { count } => {
                eprintln!("Frame {frame}: cleared {count} rows");
            }
            GameEvent::GameOver { score, reason } => {
                eprintln!("Frame {frame}: game over, {reason} (score {score})");
            }
            GameEvent::HighScoreBeaten { previous, score } => {
                eprintln!("Frame {frame}: new high score {score} (was {previous})");
                self.high_score_beaten = true;
            }
            GameEvent::PieceLocked { .. } | GameEvent::StateChanged { .. } => {}
        }
    }
}

/// Ticks `session` one frame at a time until the game ends or `max_frames`
/// have passed.
fn play(session: &mut GameSession, player: &mut Player, fps: u32, max_frames: u64) -> Tally {
    let frame_time = Duration::from_secs(1) / fps;
    let progress_interval = u64::from(fps) * PROGRESS_INTERVAL_SECS;
    let mut tally = Tally::default();

    while tally.frames < max_frames && session.state().is_playing() {
        for action in player.actions_at(tally.frames) {
            session.enqueue_action(action);
        }
        session.tick(frame_time);
        tally.frames += 1;

        for event in session.drain_events() {
            tally.record(&event);
        }
        if tally.frames % progress_interval == 0 {
            let stats = session.stats();
            eprintln!(
                "Frame {}: score {}, rows {}, level {}",
                tally.frames,
                stats.score(),
                stats.total_cleared_lines(),
                stats.level()
            );
        }
    }
    tally
}

pub(crate) fn run(arg: &SimulateArg) -> anyhow::Result<()> {
    anyhow::ensure!(
        arg.actions_per_second.is_finite() && arg.actions_per_second >= 0.0,
        "--actions-per-second must be a non-negative number"
    );

    let config: GameConfig = match &arg.config {
        Some(path) => util::read_json_file("game config", path)?,
        None => GameConfig::default(),
    };
    let stored_high_score = match &arg.high_score_file {
        Some(path) => HighScoreRecord::load(path)?.map_or(0, |record| record.high_score),
        None => 0,
    };
    let seed = arg.seed.unwrap_or_else(|| rand::rng().random());

    let (mut player, player_info) = match &arg.script {
        Some(path) => {
            let script = ActionScript::load(path)?;
            if script.is_empty() {
                eprintln!("Action script {} is empty", path.display());
            }
            let info = PlayerInfo::Script {
                path: path.clone(),
                entries: script.len(),
            };
            (Player::Script(script), info)
        }
        None => (
            Player::random(seed, arg.actions_per_second, arg.fps),
            PlayerInfo::Random {
                actions_per_second: arg.actions_per_second,
            },
        ),
    };

    let mut session = GameSession::with_seed(config, seed)
        .context("Invalid game configuration")?
        .with_high_score(stored_high_score);

    let started_at = Utc::now();
    eprintln!(
        "Simulating seed {seed} at {} fps (high score {stored_high_score})",
        arg.fps
    );
    session.start();
    let tally = play(&mut session, &mut player, arg.fps, arg.max_frames);
    if session.state().is_playing() {
        eprintln!("Frame limit reached after {} frames", tally.frames);
    }

    if tally.high_score_beaten
        && let Some(path) = &arg.high_score_file
    {
        HighScoreRecord::now(session.high_score()).save(path)?;
        eprintln!("High score saved to {}", path.display());
    }

    let report = SimulationReport {
        started_at,
        seed,
        player: player_info,
        fps: arg.fps,
        frames: tally.frames,
        actions_applied: tally.actions_applied,
        actions_rejected: tally.actions_rejected,
        final_stats: session.stats().clone(),
        state: session.state(),
        high_score: session.high_score(),
        high_score_beaten: tally.high_score_beaten,
        final_snapshot: session.snapshot(),
    };
    util::save_json(&report, arg.output.as_deref())?;

    Ok(())
}
