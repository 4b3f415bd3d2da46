/// Keyboard input.
///
/// Strokes are one-shot: only a fresh Press starts a stroke, so holding a
/// key (auto-repeat) never queues a second one. Release events are ignored.
///
/// Key map:
///   Arrows / WASD  →  Move
///   R              →  Retry level
///   N              →  Retry game (wipe progress)
///   Esc / Q        →  Quit  (Ctrl+C also quits)

use std::time::Duration;

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::domain::token::Direction;
use crate::sim::controller::Command;

pub struct InputState {
    /// Keys pressed during the most recent drain_events() call.
    fresh_presses: Vec<KeyCode>,

    /// Raw key events collected during drain, for meta-key handling.
    pub raw_events: Vec<KeyEvent>,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            fresh_presses: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
        }
    }

    /// Drain all pending terminal events. Call once per frame.
    pub fn drain_events(&mut self) {
        self.fresh_presses.clear();
        self.raw_events.clear();

        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.record(key);
            }
        }
    }

    fn record(&mut self, key: KeyEvent) {
        self.raw_events.push(key);
        if key.kind == KeyEventKind::Press && !key.modifiers.contains(KeyModifiers::CONTROL) {
            self.fresh_presses.push(key.code);
        }
    }

    /// Commands for this frame's presses, in arrival order.
    pub fn commands(&self) -> Vec<Command> {
        let mut out: Vec<Command> = self.fresh_presses
            .iter()
            .filter_map(|&code| command_for_key(code))
            .collect();
        if self.ctrl_c_pressed() {
            out.push(Command::Quit);
        }
        out
    }

    /// Check if any raw event this frame has Ctrl+C
    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }
}

pub fn command_for_key(code: KeyCode) -> Option<Command> {
    let cmd = match code {
        KeyCode::Up => Command::Move(Direction::Up),
        KeyCode::Right => Command::Move(Direction::Right),
        KeyCode::Down => Command::Move(Direction::Down),
        KeyCode::Left => Command::Move(Direction::Left),
        KeyCode::Esc => Command::Quit,
        KeyCode::Char(c) => match c.to_ascii_lowercase() {
            'w' => Command::Move(Direction::Up),
            'd' => Command::Move(Direction::Right),
            's' => Command::Move(Direction::Down),
            'a' => Command::Move(Direction::Left),
            'r' => Command::RetryLevel,
            'n' => Command::RetryGame,
            'q' => Command::Quit,
            _ => return None,
        },
        _ => return None,
    };
    Some(cmd)
}
