use std::{collections::VecDeque, str::FromStr};

use serde::{Deserialize, Serialize};

/// A player command applied to the falling piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    #[display("move-left")]
    #[serde(alias = "left")]
    MoveLeft,
    #[display("move-right")]
    #[serde(alias = "right")]
    MoveRight,
    #[display("soft-drop")]
    #[serde(alias = "down")]
    SoftDrop,
    #[display("rotate")]
    #[serde(alias = "up")]
    Rotate,
    #[display("hard-drop")]
    #[serde(alias = "drop")]
    HardDrop,
}

impl Action {
    pub const ALL: [Self; 5] = [
        Action::MoveLeft,
        Action::MoveRight,
        Action::SoftDrop,
        Action::Rotate,
        Action::HardDrop,
    ];
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("unknown action `{input}`")]
pub struct ParseActionError {
    input: String,
}

impl FromStr for Action {
    type Err = ParseActionError;

    /// Accepts the kebab-case names plus the short key names
    /// (`left`, `right`, `down`, `up`, `drop`), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let action = match s.to_ascii_lowercase().as_str() {
            "left" | "move-left" => Action::MoveLeft,
            "right" | "move-right" => Action::MoveRight,
            "down" | "soft-drop" => Action::SoftDrop,
            "up" | "rotate" => Action::Rotate,
            "drop" | "hard-drop" => Action::HardDrop,
            _ => {
                return Err(ParseActionError {
                    input: s.to_owned(),
                });
            }
        };
        Ok(action)
    }
}

/// How many queued actions a single tick consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QueuePolicy {
    /// Apply every queued action before the clock advances.
    #[default]
    DrainAll,
    /// Apply at most one action per tick; the rest wait for later ticks.
    OnePerTick,
}

/// FIFO of actions waiting for the next tick.
#[derive(Debug, Clone, Default)]
pub struct ActionQueue {
    actions: VecDeque<Action>,
}

impl ActionQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, action: Action) {
        self.actions.push_back(action);
    }

    pub fn pop(&mut self) -> Option<Action> {
        self.actions.pop_front()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn clear(&mut self) {
        self.actions.clear();
    }

    #[cfg(test)]
    fn iter(&self) -> impl Iterator<Item = Action> + '_ {
        self.actions.iter().copied()
    }

    /// Number of actions a tick may take under `policy`.
    #[must_use]
    pub fn budget(&self, policy: QueuePolicy) -> usize {
        match policy {
            QueuePolicy::DrainAll => self.len(),
            QueuePolicy::OnePerTick => self.len().min(1),
        }
    }
}
