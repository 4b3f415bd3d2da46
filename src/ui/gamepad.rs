/// Gamepad input tracker using gilrs.
///
/// Button mapping comes from the `[gamepad]` section of config.toml.
/// Default mapping:
///   D-pad / Left Stick    →  Move (one stroke per push)
///   Y                     →  Retry level
///   Select                →  Retry game
///   Start                 →  Quit

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use crate::config::GamepadConfig;
use crate::domain::token::Direction;
use crate::sim::controller::Command;

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.35;

/// Logical button identifiers (one per physical button).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    A,       // South
    B,       // East
    X,       // West
    Y,       // North
    L1,
    R1,
    Start,
    Select,
}

impl Btn {
    fn from_name(s: &str) -> Option<Btn> {
        match s.trim().to_uppercase().as_str() {
            "A" | "SOUTH"  => Some(Btn::A),
            "B" | "EAST"   => Some(Btn::B),
            "X" | "WEST"   => Some(Btn::X),
            "Y" | "NORTH"  => Some(Btn::Y),
            "L1" | "LB" => Some(Btn::L1),
            "R1" | "RB" => Some(Btn::R1),
            "START" => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            _ => None,
        }
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        match btn {
            Button::South => Some(Btn::A),
            Button::East  => Some(Btn::B),
            Button::West  => Some(Btn::X),
            Button::North => Some(Btn::Y),
            Button::LeftTrigger  => Some(Btn::L1),
            Button::RightTrigger => Some(Btn::R1),
            Button::Start  => Some(Btn::Start),
            Button::Select => Some(Btn::Select),
            _ => None,
        }
    }
}

/// Action-to-button mapping (loaded from config).
#[derive(Debug, PartialEq)]
struct ActionMap {
    retry_level: Vec<Btn>,
    retry_game: Vec<Btn>,
    quit: Vec<Btn>,
}

impl Default for ActionMap {
    fn default() -> Self {
        ActionMap {
            retry_level: vec![Btn::Y],
            retry_game: vec![Btn::Select],
            quit: vec![Btn::Start],
        }
    }
}

impl ActionMap {
    /// Unknown names are skipped; an action left with no buttons keeps its default.
    fn from_config(cfg: &GamepadConfig) -> Self {
        fn parse_list(names: &[String], fallback: Vec<Btn>) -> Vec<Btn> {
            let btns: Vec<Btn> = names.iter().filter_map(|s| Btn::from_name(s)).collect();
            if btns.is_empty() { fallback } else { btns }
        }
        let defaults = ActionMap::default();
        ActionMap {
            retry_level: parse_list(&cfg.retry_level, defaults.retry_level),
            retry_game: parse_list(&cfg.retry_game, defaults.retry_game),
            quit: parse_list(&cfg.quit, defaults.quit),
        }
    }

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn command_for(&self, btn: Btn) -> Option<Command> {
        // Quit first: a button bound twice should never trap the player.
        if self.quit.contains(&btn) {
            Some(Command::Quit)
        } else if self.retry_game.contains(&btn) {
            Some(Command::RetryGame)
        } else if self.retry_level.contains(&btn) {
            Some(Command::RetryLevel)
        } else {
            None
        }
    }
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    /// Stick direction currently past the deadzone, if any.
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    stick_dir: Option<Direction>,
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    stick_x: f32,
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    stick_y: f32,

    action_map: ActionMap,
    pending: Vec<Command>,
}

impl GamepadState {
    pub fn new() -> Self {
        #[cfg(feature = "gamepad")]
        let gilrs_opt = match Gilrs::new() {
            Ok(g) => {
                if let Some((_, pad)) = g.gamepads().next() {
                    log::info!("Gamepad found: {}", pad.name());
                }
                Some(g)
            }
            Err(e) => {
                log::warn!("Gamepad support unavailable: {e}");
                None
            }
        };

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: gilrs_opt,
            stick_dir: None,
            stick_x: 0.0,
            stick_y: 0.0,
            action_map: ActionMap::default(),
            pending: Vec::with_capacity(4),
        }
    }

    pub fn load_button_config(&mut self, cfg: &GamepadConfig) {
        self.action_map = ActionMap::from_config(cfg);
    }

    /// Poll the pad and return the commands pressed since the last call.
    pub fn commands(&mut self) -> Vec<Command> {
        #[cfg(feature = "gamepad")]
        self.poll_gilrs();

        std::mem::take(&mut self.pending)
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let gilrs = match &mut self.gilrs {
            Some(g) => g,
            None => return,
        };

        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => self.press(btn),
                EventType::AxisChanged(axis, value, _) => {
                    match axis {
                        Axis::LeftStickX => self.stick_x = value,
                        Axis::LeftStickY => self.stick_y = value,
                        _ => {}
                    }
                    self.update_stick();
                }
                EventType::Connected => log::info!("Gamepad connected"),
                EventType::Disconnected => {
                    self.stick_x = 0.0;
                    self.stick_y = 0.0;
                    self.stick_dir = None;
                    log::info!("Gamepad disconnected");
                }
                _ => {}
            }
        }
    }

    #[cfg(feature = "gamepad")]
    fn press(&mut self, gilrs_btn: Button) {
        let cmd = match gilrs_btn {
            Button::DPadUp => Some(Command::Move(Direction::Up)),
            Button::DPadRight => Some(Command::Move(Direction::Right)),
            Button::DPadDown => Some(Command::Move(Direction::Down)),
            Button::DPadLeft => Some(Command::Move(Direction::Left)),
            other => Btn::from_gilrs(other).and_then(|b| self.action_map.command_for(b)),
        };
        if let Some(cmd) = cmd {
            self.pending.push(cmd);
        }
    }

    /// Edge-trigger the stick: a stroke fires when it crosses into a new direction.
    #[cfg(feature = "gamepad")]
    fn update_stick(&mut self) {
        let dir = stick_direction(self.stick_x, self.stick_y);
        if let Some(d) = dir.filter(|_| dir != self.stick_dir) {
            self.pending.push(Command::Move(d));
        }
        self.stick_dir = dir;
    }
}

/// Dominant stick axis past the deadzone. gilrs reports +Y as up.
#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
fn stick_direction(x: f32, y: f32) -> Option<Direction> {
    if x.abs() < STICK_DEADZONE && y.abs() < STICK_DEADZONE {
        return None;
    }
    let dir = if x.abs() >= y.abs() {
        if x < 0.0 { Direction::Left } else { Direction::Right }
    } else if y > 0.0 {
        Direction::Up
    } else {
        Direction::Down
    };
    Some(dir)
}
