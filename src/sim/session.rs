/// Game-wide state shared by the runner and scoring, plus the restart flag.

use crate::domain::catalog::LevelCatalog;
use crate::domain::progress::{GameProgress, RunSession};
use crate::domain::score::{self, DisplayString, SummaryMode};

/// Everything that outlives a single tick: persisted progress, the par
/// table, and the strokes of the level in play.
#[derive(Clone, Debug)]
pub struct GameSession {
    pub progress: GameProgress,
    pub catalog: LevelCatalog,
    pub run: RunSession,
}

impl GameSession {
    pub fn new(progress: GameProgress, catalog: LevelCatalog) -> Self {
        GameSession {
            progress,
            catalog,
            run: RunSession::default(),
        }
    }

    pub fn level(&self) -> usize {
        self.progress.level
    }

    pub fn is_won(&self) -> bool {
        self.catalog.is_won(self.progress.level)
    }

    pub fn summary(&self, mode: SummaryMode) -> DisplayString {
        score::format_summary(mode, &self.progress, &self.catalog, &self.run)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Restart {
    /// Replay the current level.
    Level,
    /// Wipe progress and replay from level 0.
    Game,
}

/// Pending restart request, consumed at the top of the next tick.
/// A flag, not a counter: repeated requests collapse into one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RestartSignal(Option<Restart>);

impl RestartSignal {
    pub fn request(&mut self, kind: Restart) {
        self.0 = match (self.0, kind) {
            (Some(Restart::Game), _) | (_, Restart::Game) => Some(Restart::Game),
            _ => Some(Restart::Level),
        };
    }

    pub fn take(&mut self) -> Option<Restart> {
        self.0.take()
    }

    #[allow(dead_code)]
    pub fn is_set(&self) -> bool {
        self.0.is_some()
    }
}
