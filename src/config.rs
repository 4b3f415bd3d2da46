/// `config.toml` loader: tick rate and speeds, gamepad buttons, pack and
/// save locations. Every key is optional; anything missing or unparsable
/// keeps its default.

use serde::Deserialize;
use std::path::PathBuf;

use crate::sim::runner::Tuning;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub speed: SpeedConfig,
    pub gamepad: GamepadConfig,
    /// External level pack; `None` = built-in levels.
    pub level_pack: Option<PathBuf>,
    /// Where progress and the log live; `None` = default save directory.
    pub save_dir: Option<PathBuf>,
    /// The config.toml that was used, if any.
    pub source: Option<PathBuf>,
    /// Problems met while loading; logged once the logger is up.
    pub warnings: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct SpeedConfig {
    pub tick_rate_ms: u64,
    pub max_speed: i32,    // cells per tick while travelling
    pub bounce_step: i32,  // cells per bounce-back micro-step
}

impl SpeedConfig {
    pub fn tuning(&self) -> Tuning {
        Tuning {
            max_speed: self.max_speed,
            bounce_step: self.bounce_step,
        }
    }
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub retry_level: Vec<String>,
    pub retry_game: Vec<String>,
    pub quit: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    speed: TomlSpeed,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlSpeed {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default = "default_max_speed")]
    max_speed: i32,
    #[serde(default = "default_bounce_step")]
    bounce_step: i32,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_retry_level")]
    retry_level: Vec<String>,
    #[serde(default = "default_retry_game")]
    retry_game: Vec<String>,
    #[serde(default = "default_quit")]
    quit: Vec<String>,
}

#[derive(Deserialize, Debug, Default)]
struct TomlGeneral {
    #[serde(default)]
    level_pack: String,
    #[serde(default)]
    save_dir: String,
}

// ── Defaults ──

fn default_tick_rate() -> u64 { 45 }
fn default_max_speed() -> i32 { 1 }
fn default_bounce_step() -> i32 { 1 }

fn default_retry_level() -> Vec<String> { vec!["Y".into()] }
fn default_retry_game() -> Vec<String> { vec!["Select".into()] }
fn default_quit() -> Vec<String> { vec!["Start".into()] }

impl Default for TomlSpeed {
    fn default() -> Self {
        TomlSpeed {
            tick_rate_ms: default_tick_rate(),
            max_speed: default_max_speed(),
            bounce_step: default_bounce_step(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            retry_level: default_retry_level(),
            retry_game: default_retry_game(),
            quit: default_quit(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory,
    /// (3) XDG data home, (4) system data directory.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let mut warnings = vec![];
        let (toml_cfg, source) = load_toml(&search_dirs, &mut warnings);

        // Relative pack paths resolve against the search dirs, like config.toml itself.
        let level_pack = non_empty(&toml_cfg.general.level_pack).map(|p| {
            let path = PathBuf::from(p);
            if path.is_absolute() {
                path
            } else {
                search_dirs.iter()
                    .map(|d| d.join(&path))
                    .find(|c| c.is_file())
                    .unwrap_or(path)
            }
        });

        let mut cfg = GameConfig::from_toml(toml_cfg, level_pack);
        cfg.source = source;
        cfg.warnings = warnings;
        cfg
    }

    /// Parse config text directly (no file search).
    #[allow(dead_code)]
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        let cfg: TomlConfig = toml::from_str(text)?;
        let level_pack = non_empty(&cfg.general.level_pack).map(PathBuf::from);
        Ok(GameConfig::from_toml(cfg, level_pack))
    }

    fn from_toml(cfg: TomlConfig, level_pack: Option<PathBuf>) -> Self {
        GameConfig {
            speed: SpeedConfig {
                tick_rate_ms: cfg.speed.tick_rate_ms.max(1),
                max_speed: cfg.speed.max_speed.max(1),
                bounce_step: cfg.speed.bounce_step.max(1),
            },
            gamepad: GamepadConfig {
                retry_level: cfg.gamepad.retry_level,
                retry_game: cfg.gamepad.retry_game,
                quit: cfg.gamepad.quit,
            },
            level_pack,
            save_dir: non_empty(&cfg.general.save_dir).map(PathBuf::from),
            source: None,
            warnings: vec![],
        }
    }
}

fn non_empty(s: &str) -> Option<&str> {
    let s = s.trim();
    if s.is_empty() { None } else { Some(s) }
}

/// Candidate directories to search: exe dir + CWD + system paths (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. XDG data home (~/.local/share/strokemaze)
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/strokemaze");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    // 4. System data directory
    let sys = PathBuf::from("/usr/share/strokemaze");
    if sys.is_dir() && !dirs.iter().any(|d| d == &sys) {
        dirs.push(sys);
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf], warnings: &mut Vec<String>) -> (TomlConfig, Option<PathBuf>) {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => return (cfg, Some(path)),
                    Err(e) => {
                        warnings.push(format!("{} parse error, using defaults: {e}", path.display()));
                        return (TomlConfig::default(), None);
                    }
                },
                Err(e) => {
                    warnings.push(format!("could not read {}: {e}", path.display()));
                }
            }
        }
    }
    (TomlConfig::default(), None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = GameConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.speed.tick_rate_ms, 45);
        assert_eq!(cfg.speed.max_speed, 1);
        assert_eq!(cfg.speed.bounce_step, 1);
        assert_eq!(cfg.gamepad.retry_level, vec!["Y".to_string()]);
        assert!(cfg.level_pack.is_none());
        assert!(cfg.save_dir.is_none());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = GameConfig::from_toml_str(
            "[speed]\nmax_speed = 3\n\n[general]\nlevel_pack = \"packs/hard.smp\"\n",
        ).unwrap();
        assert_eq!(cfg.speed.max_speed, 3);
        assert_eq!(cfg.speed.tick_rate_ms, 45);
        assert_eq!(cfg.level_pack, Some(PathBuf::from("packs/hard.smp")));
        assert_eq!(cfg.gamepad.quit, vec!["Start".to_string()]);
    }

    #[test]
    fn nonsensical_speeds_are_clamped() {
        let cfg = GameConfig::from_toml_str("[speed]\nmax_speed = 0\nbounce_step = -4\ntick_rate_ms = 0\n").unwrap();
        let t = cfg.speed.tuning();
        assert_eq!((t.max_speed, t.bounce_step), (1, 1));
        assert_eq!(cfg.speed.tick_rate_ms, 1);
    }

    #[test]
    fn malformed_toml_is_an_error() {
        assert!(GameConfig::from_toml_str("[speed\nmax_speed = ").is_err());
    }
}
