/// The level runner: one call to `tick` per engine frame.
///
/// Tick order:
///   1. Restart request (abort the level without committing strokes)
///   2. Queued movement intents
///   3. Token advance by current speed
///   4. Collision resolution: exit forward / exit backward / bounce
///
/// Transitions commit, persist, then restart the runner on the new level
/// inside the same tick.

use crate::domain::collision::{self, Probe, Resolution};
use crate::domain::progress::{GameProgress, RunSession};
use crate::domain::score::SummaryMode;
use crate::domain::token::{Direction, TokenState};
use super::event::GameEvent;
use super::save::ProgressStore;
use super::session::{GameSession, Restart, RestartSignal};
use super::stage::Stage;

/// Upper bound on bounce-back micro-steps in one tick.
const MAX_BOUNCE_STEPS: usize = 256;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RunPhase {
    /// No level started yet.
    Idle,
    /// Token resting or travelling; strokes accepted when resting on a wall.
    Running,
    /// Committing a level exit. Only observable mid-tick.
    Transitioning,
}

#[derive(Clone, Copy, Debug)]
pub struct Tuning {
    pub max_speed: i32,
    pub bounce_step: i32,
}

impl Default for Tuning {
    fn default() -> Self {
        Tuning { max_speed: 1, bounce_step: 1 }
    }
}

pub struct LevelRunner {
    phase: RunPhase,
    token: TokenState,
    tuning: Tuning,
}

impl LevelRunner {
    pub fn new(tuning: Tuning) -> Self {
        LevelRunner {
            phase: RunPhase::Idle,
            token: TokenState::at_home((0, 0)),
            tuning: Tuning {
                max_speed: tuning.max_speed.max(1),
                bounce_step: tuning.bounce_step.max(1),
            },
        }
    }

    #[allow(dead_code)]
    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn token(&self) -> &TokenState {
        &self.token
    }

    /// Enter the session's current level with a fresh token and stroke count.
    pub fn start<S: Stage>(&mut self, session: &mut GameSession, stage: &mut S, events: &mut Vec<GameEvent>) {
        let level = session.level();
        stage.switch_backdrop(level);
        let home = stage.home();
        stage.place_token(home.0, home.1);

        self.token = TokenState::at_home(home);
        stage.set_token_direction(self.token.direction);
        session.run = RunSession::default();
        self.phase = RunPhase::Running;

        log::debug!("Level {} started, scores {:?}", level, session.progress.scores);
        events.push(GameEvent::LevelStarted {
            level,
            summary: session.summary(SummaryMode::Start),
        });
    }

    /// Launch the token. Ignored unless it is resting against wall colour
    /// and under player control. Returns whether a stroke was taken.
    pub fn movement_intent<S: Stage>(
        &mut self,
        direction: Direction,
        session: &mut GameSession,
        stage: &mut S,
        events: &mut Vec<GameEvent>,
    ) -> bool {
        if self.phase != RunPhase::Running || !self.token.controllable {
            return false;
        }
        if !stage.in_contact_with_wall_color() {
            return false;
        }

        self.token.controllable = false;
        self.token.direction = direction;
        self.token.speed = self.tuning.max_speed;
        stage.set_token_direction(direction);
        session.run.strokes += 1;
        log::debug!("Stroke {} at {}°", session.run.strokes, direction.degrees());

        events.push(GameEvent::LeaveWall);
        events.push(GameEvent::ScoreUpdated {
            summary: session.summary(SummaryMode::Level),
        });
        true
    }

    pub fn tick<S: Stage, P: ProgressStore>(
        &mut self,
        session: &mut GameSession,
        stage: &mut S,
        store: &mut P,
        restart: &mut RestartSignal,
        intents: &[Direction],
    ) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if self.phase == RunPhase::Idle {
            return events;
        }

        if let Some(kind) = restart.take() {
            events.push(GameEvent::BackLevel);
            if kind == Restart::Game {
                // The wipe holds in memory even if the write failed.
                session.progress = store.reset();
                log::info!("Progress reset");
            }
            self.start(session, stage, &mut events);
            return events;
        }

        for &dir in intents {
            self.movement_intent(dir, session, stage, &mut events);
        }

        stage.move_token(self.token.speed);
        self.token.position = stage.token_position();

        let probe = Probe {
            edge: stage.touching_edge(),
            touching_wall_color: stage.touching_wall_color(),
            touching_any_edge: stage.is_touching_edge(),
        };

        match collision::resolve(probe, session.level(), &session.catalog) {
            Resolution::Clear => {}
            Resolution::Blocked => self.bounce_back(stage, &mut events),
            Resolution::ExitForward { finish_all } => {
                self.phase = RunPhase::Transitioning;
                let level = session.level();
                session.progress.set_score(level, session.run.strokes);
                session.progress.level = level + 1;
                persist(store, &session.progress);

                log::debug!("Level {} cleared in {} strokes", level, session.run.strokes);
                events.push(if finish_all { GameEvent::FinishAll } else { GameEvent::FinishLevel });
                self.start(session, stage, &mut events);
            }
            Resolution::ExitBackward => {
                self.phase = RunPhase::Transitioning;
                let level = session.level() - 1;
                session.progress.level = level;
                session.progress.set_score(level, 0);
                persist(store, &session.progress);

                log::debug!("Retreated to level {}", level);
                events.push(GameEvent::BackLevel);
                self.start(session, stage, &mut events);
            }
        }

        events
    }

    /// Step opposite to travel until clear of the wall, then hand control back.
    fn bounce_back<S: Stage>(&mut self, stage: &mut S, events: &mut Vec<GameEvent>) {
        events.push(GameEvent::HitWall);
        for _ in 0..MAX_BOUNCE_STEPS {
            if !stage.touching_wall_color() {
                break;
            }
            stage.move_token(-self.tuning.bounce_step);
        }
        self.token.position = stage.token_position();
        self.token.speed = 0;
        self.token.controllable = true;
    }
}

/// Save failures are logged; play continues on the in-memory copy.
fn persist<P: ProgressStore>(store: &mut P, progress: &GameProgress) {
    if let Err(e) = store.save(progress) {
        log::error!("Progress not saved, continuing in memory: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::LevelCatalog;
    use crate::sim::save::MemoryStore;
    use crate::sim::stage::{Backdrop, GridStage};

    // Home at (6, 2); left and right exits on row 2, walls above and below.
    const CORRIDOR: &[&str] = &[
        "##########",
        "##########",
        "......S...",
        "##########",
        "##########",
    ];

    const OPEN_ROOM: &[&str] = &[
        "#########",
        "#.......#",
        "#...S...#",
        "#.......#",
        "#########",
    ];

    struct Rig {
        runner: LevelRunner,
        session: GameSession,
        stage: GridStage,
        store: MemoryStore,
        restart: RestartSignal,
    }

    impl Rig {
        fn new(progress: GameProgress) -> Rig {
            Rig::with_map(progress, CORRIDOR)
        }

        fn with_map(progress: GameProgress, rows: &[&str]) -> Rig {
            let catalog = LevelCatalog::new(vec![1, 4, 7]);
            let backdrops = (0..=catalog.highest_level())
                .map(|i| Backdrop::from_rows(&format!("L{}", i), rows).unwrap())
                .collect();
            let mut rig = Rig {
                runner: LevelRunner::new(Tuning::default()),
                session: GameSession::new(progress, catalog),
                stage: GridStage::new(backdrops),
                store: MemoryStore::new(),
                restart: RestartSignal::default(),
            };
            let mut events = vec![];
            rig.runner.start(&mut rig.session, &mut rig.stage, &mut events);
            rig
        }

        fn tick(&mut self, intents: &[Direction]) -> Vec<GameEvent> {
            self.runner.tick(&mut self.session, &mut self.stage, &mut self.store, &mut self.restart, intents)
        }

        /// One stroke, then tick until the token rests again.
        fn stroke(&mut self, dir: Direction) -> Vec<GameEvent> {
            let mut events = self.tick(&[dir]);
            for _ in 0..50 {
                if !self.runner.token().is_moving() {
                    break;
                }
                events.extend(self.tick(&[]));
            }
            events
        }
    }

    fn at_level(level: usize, scores: Vec<Option<u32>>) -> GameProgress {
        GameProgress { level, scores }
    }

    #[test]
    fn idle_runner_ignores_ticks() {
        let mut runner = LevelRunner::new(Tuning::default());
        let catalog = LevelCatalog::new(vec![1]);
        let mut session = GameSession::new(GameProgress::default(), catalog);
        let mut stage = GridStage::new(vec![Backdrop::from_rows("a", CORRIDOR).unwrap()]);
        let mut store = MemoryStore::new();
        let mut restart = RestartSignal::default();
        let events = runner.tick(&mut session, &mut stage, &mut store, &mut restart, &[Direction::Left]);
        assert!(events.is_empty());
        assert_eq!(runner.phase(), RunPhase::Idle);
        assert_eq!(session.run.strokes, 0);
    }

    #[test]
    fn start_places_token_at_home_with_start_summary() {
        let mut rig = Rig::new(at_level(1, vec![Some(3)]));
        rig.session.run.strokes = 9;
        let mut events = vec![];
        rig.runner.start(&mut rig.session, &mut rig.stage, &mut events);

        assert_eq!(rig.runner.phase(), RunPhase::Running);
        assert_eq!(rig.runner.token(), &TokenState::at_home((6, 2)));
        assert_eq!(rig.session.run.strokes, 0);
        match &events[..] {
            [GameEvent::LevelStarted { level: 1, summary }] => {
                assert_eq!(summary.left, "PAR 4");
                assert_eq!(summary.right, "+2");
            }
            other => panic!("unexpected events {:?}", other),
        }
    }

    #[test]
    fn stroke_launches_token_and_counts_once() {
        let mut rig = Rig::new(GameProgress::default());
        let mut events = vec![];
        let took = rig.runner.movement_intent(Direction::Left, &mut rig.session, &mut rig.stage, &mut events);

        assert!(took);
        let token = rig.runner.token();
        assert!(!token.controllable);
        assert_eq!(token.direction, Direction::Left);
        assert_eq!(token.speed, 1);
        assert_eq!(rig.session.run.strokes, 1);
        assert_eq!(events[0], GameEvent::LeaveWall);
        assert!(matches!(&events[1], GameEvent::ScoreUpdated { summary } if summary.left == "1"));
    }

    #[test]
    fn stroke_ignored_while_travelling() {
        let mut rig = Rig::new(GameProgress::default());
        rig.tick(&[Direction::Left]);
        let before = rig.runner.token().clone();
        let mut events = vec![];
        let took = rig.runner.movement_intent(Direction::Up, &mut rig.session, &mut rig.stage, &mut events);

        assert!(!took);
        assert!(events.is_empty());
        assert_eq!(rig.runner.token(), &before);
        assert_eq!(rig.session.run.strokes, 1);
    }

    #[test]
    fn stroke_requires_wall_contact() {
        let mut rig = Rig::with_map(GameProgress::default(), OPEN_ROOM);
        let events = rig.tick(&[Direction::Up]);

        assert!(events.is_empty());
        assert!(rig.runner.token().controllable);
        assert_eq!(rig.session.run.strokes, 0);
        assert_eq!(rig.stage.token_position(), (4, 2));
    }

    #[test]
    fn wall_hit_bounces_back_and_returns_control() {
        let mut rig = Rig::new(GameProgress::default());
        let events = rig.stroke(Direction::Up);

        assert!(events.contains(&GameEvent::HitWall));
        let token = rig.runner.token();
        assert_eq!(token.position, (6, 2));
        assert_eq!(token.speed, 0);
        assert!(token.controllable);
        assert_eq!(rig.session.run.strokes, 1);
        assert!(!rig.stage.touching_wall_color());
    }

    #[test]
    fn bounce_steps_opposite_to_travel() {
        let mut rig = Rig::with_map(
            GameProgress::default(),
            &[
                "##########",
                "##########",
                "##.....S##",
                "##########",
                "##########",
            ],
        );
        rig.stroke(Direction::Left);
        // Slid left, entered the wall at x=1, stepped back right to x=2.
        assert_eq!(rig.runner.token().position, (2, 2));
        assert!(rig.runner.token().controllable);
    }

    #[test]
    fn forward_exit_commits_strokes_and_persists() {
        let mut rig = Rig::new(GameProgress::default());
        rig.stroke(Direction::Up);
        let events = rig.stroke(Direction::Left);

        assert!(events.contains(&GameEvent::FinishLevel));
        assert!(events.iter().any(|e| matches!(e, GameEvent::LevelStarted { level: 1, .. })));
        assert_eq!(rig.session.progress, at_level(1, vec![Some(2)]));
        assert_eq!(rig.store.load(), Some(rig.session.progress.clone()));
        assert_eq!(rig.session.run.strokes, 0);
        assert_eq!(rig.runner.token(), &TokenState::at_home((6, 2)));
        assert_eq!(rig.runner.phase(), RunPhase::Running);
    }

    #[test]
    fn final_level_exit_finishes_all_and_reaches_won_screen() {
        let mut rig = Rig::new(at_level(2, vec![Some(1), Some(4)]));
        let events = rig.stroke(Direction::Left);

        assert!(events.contains(&GameEvent::FinishAll));
        assert!(!events.contains(&GameEvent::FinishLevel));
        assert_eq!(rig.session.level(), 3);
        assert!(rig.session.is_won());
        assert_eq!(rig.session.progress.scores, vec![Some(1), Some(4), Some(1)]);
    }

    #[test]
    fn won_screen_left_exit_goes_nowhere() {
        let mut rig = Rig::new(at_level(3, vec![Some(1), Some(4), Some(7)]));
        let events = rig.stroke(Direction::Left);

        assert!(!events.iter().any(|e| matches!(e, GameEvent::LevelStarted { .. })));
        assert_eq!(rig.session.level(), 3);
        assert_eq!(rig.store.writes, 0);
    }

    #[test]
    fn retreat_from_first_level_is_a_no_op() {
        let mut rig = Rig::new(at_level(0, vec![Some(4)]));
        let events = rig.stroke(Direction::Right);

        assert_eq!(events, vec![
            GameEvent::LeaveWall,
            GameEvent::ScoreUpdated { summary: rig.session.summary(SummaryMode::Level) },
        ]);
        assert_eq!(rig.session.progress, at_level(0, vec![Some(4)]));
        assert_eq!(rig.store.writes, 0);
    }

    #[test]
    fn retreat_discards_previous_level_score() {
        let mut rig = Rig::new(at_level(2, vec![Some(2), Some(5)]));
        let events = rig.stroke(Direction::Right);

        assert!(events.contains(&GameEvent::BackLevel));
        assert_eq!(rig.session.progress, at_level(1, vec![Some(2), Some(0)]));
        assert_eq!(rig.store.load(), Some(rig.session.progress.clone()));
    }

    #[test]
    fn level_restart_drops_strokes_without_committing() {
        let mut rig = Rig::new(at_level(1, vec![Some(1)]));
        rig.stroke(Direction::Up);
        rig.tick(&[Direction::Left]);
        assert_eq!(rig.session.run.strokes, 2);

        rig.restart.request(Restart::Level);
        rig.restart.request(Restart::Level);
        let events = rig.tick(&[]);

        assert_eq!(events[0], GameEvent::BackLevel);
        assert!(matches!(events[1], GameEvent::LevelStarted { level: 1, .. }));
        assert_eq!(events.len(), 2);
        assert!(!rig.restart.is_set());
        assert_eq!(rig.session.run.strokes, 0);
        assert_eq!(rig.session.progress, at_level(1, vec![Some(1)]));
        assert_eq!(rig.runner.token(), &TokenState::at_home((6, 2)));
        assert_eq!(rig.store.writes, 0);
    }

    #[test]
    fn game_restart_wipes_progress() {
        let mut rig = Rig::new(at_level(2, vec![Some(2), Some(5)]));
        rig.restart.request(Restart::Game);
        let events = rig.tick(&[Direction::Left]);

        assert!(matches!(events[1], GameEvent::LevelStarted { level: 0, .. }));
        assert_eq!(rig.session.progress, GameProgress::default());
        assert_eq!(rig.store.load(), Some(GameProgress::default()));
        assert_eq!(rig.session.run.strokes, 0);
    }

    #[test]
    fn game_restart_wipes_progress_when_saves_fail() {
        let mut rig = Rig::new(GameProgress::default());
        rig.stroke(Direction::Left);
        assert_eq!(rig.session.progress, at_level(1, vec![Some(1)]));

        rig.store.fail_writes = true;
        rig.restart.request(Restart::Game);
        let events = rig.tick(&[]);

        assert!(matches!(events[1], GameEvent::LevelStarted { level: 0, .. }));
        assert_eq!(rig.session.progress, GameProgress::default());
        assert_eq!(rig.session.level(), 0);
        assert_eq!(rig.store.load(), Some(at_level(1, vec![Some(1)])));
    }

    #[test]
    fn failed_save_keeps_in_memory_progress() {
        let mut rig = Rig::new(GameProgress::default());
        rig.store.fail_writes = true;
        rig.stroke(Direction::Left);

        assert_eq!(rig.session.progress, at_level(1, vec![Some(1)]));
        assert!(rig.store.load().is_none());

        rig.stroke(Direction::Left);
        assert_eq!(rig.session.level(), 2);
    }

    #[test]
    fn par_scenario_two_over_after_two_levels() {
        let mut rig = Rig::new(GameProgress::default());
        // Level 0 (par 1) in 2 strokes.
        rig.stroke(Direction::Up);
        rig.stroke(Direction::Left);
        // Level 1 (par 4) in 5 strokes.
        for _ in 0..4 {
            rig.stroke(Direction::Down);
        }
        let events = rig.stroke(Direction::Left);

        assert_eq!(rig.session.progress, at_level(2, vec![Some(2), Some(5)]));
        let started = events.iter().find_map(|e| match e {
            GameEvent::LevelStarted { level: 2, summary } => Some(summary.clone()),
            _ => None,
        });
        let summary = started.expect("level 2 should start");
        assert_eq!(summary.left, "PAR 7");
        assert_eq!(summary.right, "+2");
    }
}
