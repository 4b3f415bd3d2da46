/// HUD state fed by `GameEvent`s: the score summary plus a short-lived
/// status message. The renderer only reads it.

use crate::domain::score::DisplayString;
use crate::sim::event::GameEvent;

/// Ticks a status message stays on screen.
const MESSAGE_TICKS: u32 = 40;

#[derive(Debug, Default)]
pub struct Hud {
    pub summary: DisplayString,
    pub level: usize,
    message: Option<(&'static str, u32)>,
}

impl Hud {
    pub fn new() -> Self {
        Hud::default()
    }

    pub fn apply(&mut self, events: &[GameEvent]) {
        for event in events {
            match event {
                GameEvent::LevelStarted { level, summary } => {
                    self.level = *level;
                    self.summary = summary.clone();
                }
                GameEvent::ScoreUpdated { summary } => self.summary = summary.clone(),
                GameEvent::FinishLevel => self.flash("Level cleared"),
                GameEvent::FinishAll => self.flash("All levels cleared!"),
                GameEvent::BackLevel => self.flash("Back a level"),
                GameEvent::HitWall | GameEvent::LeaveWall => {}
            }
        }
    }

    /// Age the status message by one tick.
    pub fn tick(&mut self) {
        if let Some((_, left)) = &mut self.message {
            *left = left.saturating_sub(1);
        }
        if matches!(self.message, Some((_, 0))) {
            self.message = None;
        }
    }

    pub fn message(&self) -> Option<&'static str> {
        self.message.map(|(text, _)| text)
    }

    fn flash(&mut self, text: &'static str) {
        self.message = Some((text, MESSAGE_TICKS));
    }
}
