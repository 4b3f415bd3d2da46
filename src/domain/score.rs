/// Stroke scoring against par, and the two-field HUD summary.
///
/// Only over-par deltas are shown as numbers; at or under par the right
/// field shows a neutral `=`.

use std::fmt;

use super::catalog::LevelCatalog;
use super::progress::{GameProgress, RunSession};

pub const WIN_LABEL: &str = "WIN";
pub const NEUTRAL: &str = "=";

/// Which summary the HUD shows.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SummaryMode {
    /// Shown when a level begins: par and the running delta so far.
    Start,
    /// Shown while playing: live strokes and the delta for this level.
    Level,
}

/// Typed HUD text: rendering and spacing are left to the UI.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DisplayString {
    pub left: String,
    pub right: String,
}

impl fmt::Display for DisplayString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}  {}", self.left, self.right)
    }
}

/// Sum of stored scores for levels `0..upto`, gaps count as 0.
pub fn cumulative_score(progress: &GameProgress, upto: usize) -> i64 {
    (0..upto).map(|l| progress.score_at(l) as i64).sum()
}

/// Sum of pars for levels `0..upto`, levels past the catalog count as 0.
pub fn cumulative_par(catalog: &LevelCatalog, upto: usize) -> i64 {
    (0..upto).map(|l| catalog.par_for(l).unwrap_or(0) as i64).sum()
}

fn over_par(delta: i64) -> String {
    if delta > 0 {
        format!("+{}", delta)
    } else {
        NEUTRAL.to_string()
    }
}

pub fn format_summary(
    mode: SummaryMode,
    progress: &GameProgress,
    catalog: &LevelCatalog,
    run: &RunSession,
) -> DisplayString {
    let level = progress.level;
    let overall = cumulative_score(progress, level) - cumulative_par(catalog, level);

    // The won screen has no par of its own, so both modes fall back to the
    // whole-game delta there.
    let par = match catalog.par_for(level) {
        Some(par) if !catalog.is_won(level) => par,
        _ => {
            return DisplayString {
                left: WIN_LABEL.to_string(),
                right: over_par(overall),
            };
        }
    };

    match mode {
        SummaryMode::Start => DisplayString {
            left: format!("PAR {}", par),
            right: over_par(overall),
        },
        SummaryMode::Level => DisplayString {
            left: run.strokes.to_string(),
            right: over_par(run.strokes as i64 - par as i64),
        },
    }
}
