/// Level packs: the par table plus one backdrop per level.
///
/// ## Sources (priority order):
///   1. Pack file named by `general.level_pack` (`.smp` format)
///   2. Built-in embedded levels
///
/// ## Pack format (`.smp` — Stroke Maze Pack):
///   ```
///   ## Pack Name
///   ---
///   # Level 1 - Name
///   par 3
///   <map rows>
///   ---
///   # You Win
///   <map rows>
///   ```
///
/// Sections are separated by a line containing only `---`. Lines before the
/// first `---` are pack metadata. Every playable level carries a `par` line;
/// the final section has none and is the won screen.
///
/// ## Map legend:
///   '#' = wall colour    '.' = floor    'S' = token home
///
/// A left-edge opening advances, a right-edge opening retreats. Outer walls
/// should be two cells thick so the token hits wall colour before an edge.

use std::path::Path;

use crate::domain::catalog::LevelCatalog;
use super::stage::Backdrop;

pub struct LevelDef {
    pub name: String,
    pub par: Option<u32>,
    pub rows: Vec<String>,
}

pub struct LevelPack {
    pub name: String,
    pub catalog: LevelCatalog,
    pub backdrops: Vec<Backdrop>,
}

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

/// Load the configured pack, falling back to the built-in levels.
pub fn load_pack(pack_path: Option<&Path>) -> Result<LevelPack, String> {
    if let Some(path) = pack_path {
        match load_pack_file(path) {
            Ok(pack) => return Ok(pack),
            Err(e) => log::warn!("Level pack {} rejected: {e}; using built-in levels", path.display()),
        }
    }
    build_pack("Built-in Levels", embedded_levels())
}

pub fn load_pack_file(path: &Path) -> Result<LevelPack, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("could not read {}: {}", path.display(), e))?;
    let name = pack_name(&content).unwrap_or_else(|| {
        path.file_stem()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string()
    });
    build_pack(&name, parse_pack_levels(&content))
}

/// Validate level definitions and turn them into a catalog and backdrops.
pub fn build_pack(name: &str, defs: Vec<LevelDef>) -> Result<LevelPack, String> {
    let (won, playable) = match defs.split_last() {
        Some(split) => split,
        None => return Err("pack has no levels".to_string()),
    };
    if playable.is_empty() {
        return Err("pack needs at least one playable level before the won screen".to_string());
    }
    if won.par.is_some() {
        return Err(format!("last section '{}' must be a won screen without par", won.name));
    }

    let mut pars = Vec::with_capacity(playable.len());
    for def in playable {
        match def.par {
            Some(par) => pars.push(par),
            None => return Err(format!("level '{}' has no par", def.name)),
        }
    }

    let backdrops = defs
        .iter()
        .map(|def| {
            let rows: Vec<&str> = def.rows.iter().map(String::as_str).collect();
            Backdrop::from_rows(&def.name, &rows)
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(LevelPack {
        name: name.to_string(),
        catalog: LevelCatalog::new(pars),
        backdrops,
    })
}

// ══════════════════════════════════════════════════════════════
// Pack parsing
// ══════════════════════════════════════════════════════════════

fn pack_name(content: &str) -> Option<String> {
    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed == "---" {
            break;
        }
        if let Some(name) = trimmed.strip_prefix("##") {
            let name = name.trim();
            if !name.is_empty() {
                return Some(name.to_string());
            }
        }
    }
    None
}

fn parse_pack_levels(content: &str) -> Vec<LevelDef> {
    let mut levels = vec![];
    let mut current_section = String::new();
    let mut in_levels = false;

    for line in content.lines() {
        if line.trim() == "---" {
            if in_levels && !current_section.trim().is_empty() {
                levels.push(parse_level_section(&current_section, levels.len()));
            }
            current_section.clear();
            in_levels = true;
            continue;
        }

        // Skip pack metadata before the first ---
        if !in_levels {
            continue;
        }

        current_section.push_str(line);
        current_section.push('\n');
    }

    if !current_section.trim().is_empty() {
        levels.push(parse_level_section(&current_section, levels.len()));
    }

    levels
}

fn parse_level_section(section: &str, index: usize) -> LevelDef {
    let mut name = format!("Level {}", index + 1);
    let mut par = None;
    let mut rows = vec![];

    for line in section.lines() {
        let line = line.trim_end();
        if let Some(title) = line.strip_prefix("# ") {
            name = title.trim().to_string();
        } else if let Some(val) = line.strip_prefix("par ") {
            par = val.trim().parse().ok();
        } else if !line.is_empty() {
            rows.push(line.to_string());
        }
    }

    LevelDef { name, par, rows }
}

// ══════════════════════════════════════════════════════════════
// Embedded levels
// ══════════════════════════════════════════════════════════════

fn make_embedded(name: &str, par: Option<u32>, rows: &[&str]) -> LevelDef {
    LevelDef {
        name: name.to_string(),
        par,
        rows: rows.iter().map(|r| r.to_string()).collect(),
    }
}

fn embedded_levels() -> Vec<LevelDef> {
    vec![
        make_embedded("First Stroke", Some(1), &[
            "######################",
            "######################",
            "######################",
            "######################",
            "...................S##",
            "######################",
            "######################",
            "######################",
            "######################",
        ]),
        make_embedded("Dogleg", Some(2), &[
            "######################",
            "######################",
            "...............#######",
            "##############.#######",
            "##############.#######",
            "##############.#######",
            "##############S.......",
            "######################",
            "######################",
        ]),
        make_embedded("Switchback", Some(4), &[
            "######################",
            "######################",
            "######..........######",
            "######.########.######",
            "######.########.######",
            ".......########.######",
            "###############S......",
            "######################",
            "######################",
        ]),
        make_embedded("Detour", Some(5), &[
            "######################",
            "######################",
            "###..........#########",
            "###.########.#########",
            "###.########......S...",
            "###.##################",
            "....##################",
            "######################",
            "######################",
        ]),
        make_embedded("Long Way Round", Some(8), &[
            "######################",
            "######################",
            "###########.....##S...",
            "###########.###.##.###",
            "........###.###.##.###",
            "#######.###.###.##.###",
            "#######.....###....###",
            "######################",
            "######################",
        ]),
        make_embedded("You Win", None, &[
            "######################",
            "######################",
            "####..............####",
            "####..............####",
            "####S.................",
            "####..............####",
            "####..............####",
            "######################",
            "######################",
        ]),
    ]
}
