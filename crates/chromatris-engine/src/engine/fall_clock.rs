use std::time::Duration;

/// Fixed-accumulator timer for natural fall.
///
/// Frames add their elapsed time with [`accumulate`](Self::accumulate); the
/// driver then calls [`take_due`](Self::take_due) in a loop, performing one
/// drop per `true`. Due time is subtracted rather than reset, so a long
/// frame pays out every drop it covered and the remainder carries over.
#[derive(Debug, Clone, Default)]
pub struct FallClock {
    accumulated: Duration,
}

impl FallClock {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            accumulated: Duration::ZERO,
        }
    }

    /// Time accumulated toward the next drop.
    #[must_use]
    pub const fn accumulated(&self) -> Duration {
        self.accumulated
    }

    pub fn accumulate(&mut self, delta: Duration) {
        self.accumulated = self.accumulated.saturating_add(delta);
    }

    /// Consumes one `step` of accumulated time if available.
    ///
    /// A zero step never fires.
    pub fn take_due(&mut self, step: Duration) -> bool {
        if step.is_zero() || self.accumulated < step {
            return false;
        }
        self.accumulated -= step;
        true
    }

    pub fn reset(&mut self) {
        self.accumulated = Duration::ZERO;
    }
}
