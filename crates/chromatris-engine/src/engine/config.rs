use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{action::QueuePolicy, game_stats::ScoringPolicy};

/// Tunable rules of a session.
///
/// Missing fields take their defaults when deserialized, so a config file
/// only needs the values it changes. Durations are written as integer
/// milliseconds.
///
/// ```
/// use std::time::Duration;
/// use chromatris_engine::GameConfig;
///
/// let config: GameConfig = serde_json::from_str(r#"{"speed_min": 250}"#).unwrap();
/// assert_eq!(config.speed_min, Duration::from_millis(250));
/// assert_eq!(config.speed_start, Duration::from_millis(600));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Fall interval at the start of a game.
    #[serde(with = "crate::serde_millis")]
    pub speed_start: Duration,
    /// Amount the fall interval shrinks per cleared row.
    #[serde(with = "crate::serde_millis")]
    pub speed_dec: Duration,
    /// Shortest fall interval.
    #[serde(with = "crate::serde_millis")]
    pub speed_min: Duration,
    pub scoring: ScoringPolicy,
    pub hard_drop_points_per_cell: u64,
    pub queue_policy: QueuePolicy,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            speed_start: Duration::from_millis(600),
            speed_dec: Duration::from_millis(10),
            speed_min: Duration::from_millis(100),
            scoring: ScoringPolicy::Classic,
            hard_drop_points_per_cell: 0,
            queue_policy: QueuePolicy::DrainAll,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("speed_min must be greater than zero")]
    ZeroMinimumStep,
    #[display("speed_min ({min:?}) must not exceed speed_start ({start:?})")]
    MinimumAboveStart { min: Duration, start: Duration },
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.speed_min.is_zero() {
            return Err(ConfigError::ZeroMinimumStep);
        }
        if self.speed_min > self.speed_start {
            return Err(ConfigError::MinimumAboveStart {
                min: self.speed_min,
                start: self.speed_start,
            });
        }
        Ok(())
    }

    /// Fall interval after `total_rows` rows have been cleared.
    ///
    /// Shrinks linearly from `speed_start` and never goes below `speed_min`.
    #[must_use]
    pub fn step_for(&self, total_rows: usize) -> Duration {
        let rows = u32::try_from(total_rows).unwrap_or(u32::MAX);
        let decrease = self.speed_dec.checked_mul(rows).unwrap_or(Duration::MAX);
        self.speed_start
            .saturating_sub(decrease)
            .max(self.speed_min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn test_default_is_valid() {
        let config = GameConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.step_for(0), ms(600));
    }

    #[test]
    fn test_step_decreases_then_clamps() {
        let config = GameConfig::default();
        assert_eq!(config.step_for(1), ms(590));
        assert_eq!(config.step_for(10), ms(500));
        assert_eq!(config.step_for(50), ms(100));
        assert_eq!(config.step_for(51), ms(100));
        assert_eq!(config.step_for(usize::MAX), ms(100));

        let mut previous = config.step_for(0);
        for rows in 1..100 {
            let step = config.step_for(rows);
            assert!(step <= previous, "step grew at {rows} rows");
            assert!(step >= config.speed_min);
            previous = step;
        }
    }

    #[test]
    fn test_validate_rejects_bad_bounds() {
        let config = GameConfig {
            speed_min: Duration::ZERO,
            ..GameConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroMinimumStep));

        let config = GameConfig {
            speed_min: ms(700),
            ..GameConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(
            err,
            ConfigError::MinimumAboveStart {
                min: ms(700),
                start: ms(600)
            }
        );
        assert!(err.to_string().starts_with("speed_min (700ms)"));
    }

    #[test]
    fn test_serde_uses_milliseconds_and_defaults() {
        let json = serde_json::to_value(GameConfig::default()).unwrap();
        assert_eq!(json["speed_start"], 600);
        assert_eq!(json["speed_dec"], 10);
        assert_eq!(json["scoring"], "classic");
        assert_eq!(json["queue_policy"], "drain-all");

        let config: GameConfig =
            serde_json::from_str(r#"{"scoring": "leveled", "queue_policy": "one-per-tick"}"#)
                .unwrap();
        assert_eq!(config.scoring, ScoringPolicy::Leveled);
        assert_eq!(config.queue_policy, QueuePolicy::OnePerTick);
        assert_eq!(config.speed_min, ms(100));
    }
}
