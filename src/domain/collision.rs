/// Per-tick collision resolution.
///
/// Priority: left edge (advance) > right edge (retreat) > wall colour (bounce).
/// Edge exits and wall bounces never both fire in one tick.

use super::catalog::LevelCatalog;

/// Boundary of the play area the token is touching.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Edge {
    Left,
    Right,
    Top,
    Bottom,
}

/// Collision probes sampled from the stage after the token moved.
#[derive(Clone, Copy, Debug, Default)]
pub struct Probe {
    pub edge: Option<Edge>,
    pub touching_wall_color: bool,
    pub touching_any_edge: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Resolution {
    /// Nothing to do this tick.
    Clear,
    /// Left edge reached: advance one level. `finish_all` on the final level.
    ExitForward { finish_all: bool },
    /// Right edge reached on a level above 0: retreat one level.
    ExitBackward,
    /// Token overlaps wall colour away from any edge: push it back out.
    Blocked,
}

pub fn resolve(probe: Probe, level: usize, catalog: &LevelCatalog) -> Resolution {
    match probe.edge {
        Some(Edge::Left) => {
            // No level beyond the won screen.
            if catalog.is_won(level) || level > catalog.highest_level() {
                Resolution::Clear
            } else {
                Resolution::ExitForward { finish_all: catalog.is_final(level) }
            }
        }
        Some(Edge::Right) => {
            if level > 0 {
                Resolution::ExitBackward
            } else {
                Resolution::Clear
            }
        }
        _ if probe.touching_wall_color && !probe.touching_any_edge => Resolution::Blocked,
        _ => Resolution::Clear,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> LevelCatalog {
        LevelCatalog::new(vec![1, 4, 7])
    }

    fn at(edge: Option<Edge>, wall: bool) -> Probe {
        Probe {
            edge,
            touching_wall_color: wall,
            touching_any_edge: edge.is_some(),
        }
    }

    #[test]
    fn left_edge_advances() {
        let r = resolve(at(Some(Edge::Left), false), 0, &catalog());
        assert_eq!(r, Resolution::ExitForward { finish_all: false });
    }

    #[test]
    fn left_edge_on_final_level_finishes_all() {
        let r = resolve(at(Some(Edge::Left), false), 2, &catalog());
        assert_eq!(r, Resolution::ExitForward { finish_all: true });
    }

    #[test]
    fn left_edge_on_won_screen_is_ignored() {
        assert_eq!(resolve(at(Some(Edge::Left), false), 3, &catalog()), Resolution::Clear);
    }

    #[test]
    fn right_edge_retreats_except_from_first_level() {
        assert_eq!(resolve(at(Some(Edge::Right), false), 2, &catalog()), Resolution::ExitBackward);
        assert_eq!(resolve(at(Some(Edge::Right), false), 0, &catalog()), Resolution::Clear);
    }

    #[test]
    fn edge_takes_precedence_over_wall() {
        let r = resolve(at(Some(Edge::Left), true), 1, &catalog());
        assert_eq!(r, Resolution::ExitForward { finish_all: false });
        let r = resolve(at(Some(Edge::Right), true), 1, &catalog());
        assert_eq!(r, Resolution::ExitBackward);
    }

    #[test]
    fn wall_blocks_only_away_from_edges() {
        assert_eq!(resolve(at(None, true), 1, &catalog()), Resolution::Blocked);
        assert_eq!(resolve(at(Some(Edge::Top), true), 1, &catalog()), Resolution::Clear);
        assert_eq!(resolve(at(None, false), 1, &catalog()), Resolution::Clear);
    }
}
