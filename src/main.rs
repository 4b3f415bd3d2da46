/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::fs::OpenOptions;
use std::path::Path;
use std::time::{Duration, Instant};

use config::GameConfig;
use sim::controller::GameController;
use sim::level::load_pack;
use sim::save::{self, FileStore};
use sim::stage::GridStage;
use ui::gamepad::GamepadState;
use ui::hud::Hud;
use ui::input::InputState;
use ui::renderer::Renderer;
use ui::sound::{self, SoundEngine};

const FRAME_SLEEP: Duration = Duration::from_millis(5);
const LOG_FILE: &str = "strokemaze.log";

type Game = GameController<GridStage, FileStore>;

fn main() {
    let config = GameConfig::load();

    let dir = config.save_dir.clone().unwrap_or_else(save::save_dir);
    if let Err(e) = std::fs::create_dir_all(&dir) {
        eprintln!("Cannot create save directory {}: {e}", dir.display());
    }
    init_logging(&dir);

    match &config.source {
        Some(path) => log::info!("Config loaded from {}", path.display()),
        None => log::info!("No config.toml found, using defaults"),
    }
    for warning in &config.warnings {
        log::warn!("{warning}");
    }

    let pack = match load_pack(config.level_pack.as_deref()) {
        Ok(pack) => pack,
        Err(e) => {
            log::error!("No playable levels: {e}");
            eprintln!("No playable levels: {e}");
            return;
        }
    };
    log::info!("Pack '{}' with {} levels", pack.name, pack.catalog.highest_level());

    let store = FileStore::in_dir(Some(&dir));
    log::info!("Progress file {}", store.path().display());

    let mut game = GameController::new(
        GridStage::new(pack.backdrops),
        store,
        pack.catalog,
        config.speed.tuning(),
    );

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let audio = SoundEngine::new();
    if audio.is_none() {
        log::warn!("No audio output, playing silently");
    }

    let result = game_loop(&mut game, &mut renderer, audio.as_ref(), &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        log::error!("Game error: {e}");
        eprintln!("Game error: {e}");
    }

    let session = game.session();
    println!();
    println!("Thanks for playing Stroke Maze!");
    if session.is_won() {
        println!("All levels cleared. {}", session.summary(domain::score::SummaryMode::Start));
    } else {
        println!("Progress saved at level {}.", session.level() + 1);
    }
}

/// Route `log` output to a file in the save directory; the terminal
/// belongs to the renderer.
fn init_logging(dir: &Path) {
    let env = env_logger::Env::default().default_filter_or("info");
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join(LOG_FILE));

    match file {
        Ok(file) => {
            env_logger::Builder::from_env(env)
                .target(env_logger::Target::Pipe(Box::new(file)))
                .init();
        }
        Err(e) => {
            env_logger::Builder::new()
                .filter_level(log::LevelFilter::Warn)
                .init();
            log::warn!("Cannot open {LOG_FILE}: {e}");
        }
    }
}

fn game_loop(
    game: &mut Game,
    renderer: &mut Renderer,
    audio: Option<&SoundEngine>,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);
    let mut hud = Hud::new();
    let mut last_tick = Instant::now();
    let tick_rate = Duration::from_millis(config.speed.tick_rate_ms);

    hud.apply(&game.start());

    'frame: loop {
        kb.drain_events();

        for command in kb.commands().into_iter().chain(gp.commands()) {
            if !game.handle(command) {
                break 'frame;
            }
        }

        if last_tick.elapsed() >= tick_rate {
            let events = game.tick();
            if let Some(sfx) = audio {
                sound::play_events(sfx, &events);
            }
            hud.apply(&events);
            hud.tick();
            last_tick = Instant::now();
        }

        renderer.render(game.stage(), game.runner().token(), &game.session().catalog, &hud)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}
