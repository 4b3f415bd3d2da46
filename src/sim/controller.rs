/// Game controller: owns the stage, the store and the session, and turns
/// player commands into runner intents.
///
/// Input handlers only enqueue. Nothing they send takes effect until the
/// next `tick`, so a command can never land in the middle of a tick.

use crate::domain::catalog::LevelCatalog;
use crate::domain::token::Direction;
use super::event::GameEvent;
use super::runner::{LevelRunner, Tuning};
use super::save::ProgressStore;
use super::session::{GameSession, Restart, RestartSignal};
use super::stage::Stage;

/// What either input modality (keyboard or gamepad) can ask for.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Command {
    Move(Direction),
    RetryLevel,
    RetryGame,
    Quit,
}

pub struct GameController<S: Stage, P: ProgressStore> {
    stage: S,
    store: P,
    session: GameSession,
    runner: LevelRunner,
    restart: RestartSignal,
    intents: Vec<Direction>,
}

impl<S: Stage, P: ProgressStore> GameController<S, P> {
    /// Load progress (or create it) and prepare the runner.
    /// Call `start` to enter the saved level.
    pub fn new(stage: S, mut store: P, catalog: LevelCatalog, tuning: Tuning) -> Self {
        let mut progress = match store.load() {
            Some(p) => p,
            None => {
                store.reset();
                store.load().unwrap_or_default()
            }
        };
        if progress.sanitize(&catalog) {
            log::warn!("Saved level out of range, clamped to {}", progress.level);
        }
        log::info!("Resuming at level {} of {}", progress.level, catalog.highest_level());

        GameController {
            stage,
            store,
            session: GameSession::new(progress, catalog),
            runner: LevelRunner::new(tuning),
            restart: RestartSignal::default(),
            intents: Vec::new(),
        }
    }

    pub fn start(&mut self) -> Vec<GameEvent> {
        let mut events = Vec::new();
        self.runner.start(&mut self.session, &mut self.stage, &mut events);
        events
    }

    /// Queue a command for the next tick. Returns false for `Quit`, which
    /// the host loop handles itself.
    pub fn handle(&mut self, command: Command) -> bool {
        match command {
            Command::Move(dir) => self.intents.push(dir),
            Command::RetryLevel => self.restart.request(Restart::Level),
            Command::RetryGame => self.restart.request(Restart::Game),
            Command::Quit => return false,
        }
        true
    }

    pub fn tick(&mut self) -> Vec<GameEvent> {
        let intents = std::mem::take(&mut self.intents);
        self.runner.tick(
            &mut self.session,
            &mut self.stage,
            &mut self.store,
            &mut self.restart,
            &intents,
        )
    }

    pub fn stage(&self) -> &S {
        &self.stage
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn runner(&self) -> &LevelRunner {
        &self.runner
    }

    #[allow(dead_code)]
    pub fn store(&self) -> &P {
        &self.store
    }
}
