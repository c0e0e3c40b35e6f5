use std::path::Path;

use chromatris_engine::Action;
use serde::{Deserialize, Serialize};

use crate::util;

/// Scripted input: `[frame, action]` pairs, e.g. `[[0, "rotate"], [30, "hard-drop"]]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionScript {
    entries: Vec<(u64, Action)>,
}

impl ActionScript {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut script: Self = util::read_json_file("action script", path)?;
        script.entries.sort_by_key(|(frame, _)| *frame);
        Ok(script)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Actions scheduled for `frame`, in file order.
    pub fn actions_at(&self, frame: u64) -> impl Iterator<Item = Action> + '_ {
        let start = self.entries.partition_point(|(f, _)| *f < frame);
        self.entries[start..]
            .iter()
            .take_while(move |(f, _)| *f == frame)
            .map(|(_, action)| *action)
    }
}
