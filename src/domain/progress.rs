/// Game progress (persisted) and the per-level stroke counter (transient).
///
/// The persisted record is `{"level": n, "scores": [..]}`; scores are sparse,
/// a gap is stored as `null` and means "never finished".

use serde::{Deserialize, Serialize};

use super::catalog::LevelCatalog;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameProgress {
    pub level: usize,
    #[serde(default)]
    pub scores: Vec<Option<u32>>,
}

impl GameProgress {
    /// Stored score for a level; gaps and out-of-range indices read as 0.
    pub fn score_at(&self, level: usize) -> u32 {
        self.scores.get(level).copied().flatten().unwrap_or(0)
    }

    /// Write a score, growing the sparse list with gaps as needed.
    pub fn set_score(&mut self, level: usize, strokes: u32) {
        if self.scores.len() <= level {
            self.scores.resize(level + 1, None);
        }
        self.scores[level] = Some(strokes);
    }

    /// Clamp a tampered level index into the catalog's range.
    /// Returns true if anything changed.
    pub fn sanitize(&mut self, catalog: &LevelCatalog) -> bool {
        let clamped = catalog.clamp_level(self.level);
        let changed = clamped != self.level;
        self.level = clamped;
        changed
    }
}

/// Strokes taken in the level currently being played.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunSession {
    pub strokes: u32,
}
