use serde::{Deserialize, Serialize};

/// Base score values for line clears.
///
/// Index corresponds to number of lines cleared simultaneously:
/// - 0 lines: 0 points
/// - 1 line: 100 points
/// - 2 lines: 300 points
/// - 3 lines: 500 points
/// - 4 lines: 800 points
pub const SCORE_TABLE: [u64; 5] = [0, 100, 300, 500, 800];

/// How line clears are turned into points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScoringPolicy {
    /// Flat [`SCORE_TABLE`] value per clear.
    #[default]
    Classic,
    /// [`SCORE_TABLE`] value multiplied by `level + 1`, where the level is
    /// taken before the clear is counted.
    Leveled,
}

impl ScoringPolicy {
    /// Points for clearing `cleared_lines` rows at once while at `level`.
    #[must_use]
    pub fn line_clear_points(self, cleared_lines: usize, level: usize) -> u64 {
        let base = SCORE_TABLE
            .get(cleared_lines)
            .copied()
            .unwrap_or(SCORE_TABLE[4]);
        match self {
            ScoringPolicy::Classic => base,
            ScoringPolicy::Leveled => {
                let multiplier = u64::try_from(level).unwrap_or(u64::MAX).saturating_add(1);
                base.saturating_mul(multiplier)
            }
        }
    }
}

/// Game statistics tracking score, lines cleared, and piece count.
///
/// - **Score**: Points earned from line clears and hard drops
/// - **Level**: Derived from total lines cleared (1 level per 10 lines)
/// - **Completed pieces**: Total number of pieces locked
/// - **Line clear distribution**: Count of zero, single, double, triple and
///   quad line clears
///
/// # Example
///
/// ```
/// use chromatris_engine::GameStats;
///
/// let mut stats = GameStats::new();
/// stats.complete_piece_drop(4);
///
/// assert_eq!(stats.score(), 800);
/// assert_eq!(stats.total_cleared_lines(), 4);
/// assert_eq!(stats.line_cleared_counter()[4], 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStats {
    scoring: ScoringPolicy,
    score: u64,
    completed_pieces: usize,
    total_cleared_lines: usize,
    line_cleared_counter: [usize; 5],
}

impl Default for GameStats {
    fn default() -> Self {
        Self::new()
    }
}

impl GameStats {
    /// Creates a tracker with all counters at zero and classic scoring.
    #[must_use]
    pub const fn new() -> Self {
        Self::with_scoring(ScoringPolicy::Classic)
    }

    #[must_use]
    pub const fn with_scoring(scoring: ScoringPolicy) -> Self {
        Self {
            scoring,
            score: 0,
            completed_pieces: 0,
            total_cleared_lines: 0,
            line_cleared_counter: [0; 5],
        }
    }

    #[must_use]
    pub const fn scoring(&self) -> ScoringPolicy {
        self.scoring
    }

    #[must_use]
    pub const fn score(&self) -> u64 {
        self.score
    }

    /// Level increases by 1 for every 10 lines cleared.
    #[must_use]
    pub const fn level(&self) -> usize {
        self.total_cleared_lines / 10
    }

    #[must_use]
    pub const fn completed_pieces(&self) -> usize {
        self.completed_pieces
    }

    #[must_use]
    pub const fn total_cleared_lines(&self) -> usize {
        self.total_cleared_lines
    }

    /// Histogram of piece locks by the number of lines they cleared.
    ///
    /// Index 0 counts locks that cleared nothing; index 4 counts quads.
    #[must_use]
    pub const fn line_cleared_counter(&self) -> &[usize; 5] {
        &self.line_cleared_counter
    }

    /// Updates statistics after a piece locks and returns the points awarded.
    pub fn complete_piece_drop(&mut self, cleared_lines: usize) -> u64 {
        let points = self
            .scoring
            .line_clear_points(cleared_lines, self.level());
        self.completed_pieces += 1;
        self.total_cleared_lines += cleared_lines;
        if let Some(count) = self.line_cleared_counter.get_mut(cleared_lines) {
            *count += 1;
        }
        self.score = self.score.saturating_add(points);
        points
    }

    /// Awards the hard-drop bonus for `distance` rows and returns it.
    pub fn add_hard_drop(&mut self, distance: usize, points_per_cell: u64) -> u64 {
        let points = u64::try_from(distance)
            .unwrap_or(u64::MAX)
            .saturating_mul(points_per_cell);
        self.score = self.score.saturating_add(points);
        points
    }
}
