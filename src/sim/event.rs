/// Signals emitted by the level runner.
/// Sound and HUD collaborators consume these; nothing is returned to the core.

use crate::domain::score::DisplayString;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    /// Token struck wall colour and was pushed back.
    HitWall,
    /// A stroke launched the token off a wall.
    LeaveWall,
    /// Forward exit from a level that is not the last one.
    FinishLevel,
    /// Forward exit from the last level.
    FinishAll,
    /// Retreat to the previous level, or a retry.
    BackLevel,
    /// A level (or the won screen) began; carries the start summary.
    LevelStarted { level: usize, summary: DisplayString },
    /// Running stroke total changed.
    ScoreUpdated { summary: DisplayString },
}
