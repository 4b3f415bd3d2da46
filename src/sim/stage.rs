/// The stage: backdrops plus the token that moves over them.
///
/// `Stage` is everything the level runner needs from a render/collision
/// engine. `GridStage` is the terminal implementation: each backdrop is a
/// grid of cells painted either wall colour or floor, the token fills one cell.
///
/// Coordinates: `(x, y)` with `(0, 0)` top-left, y grows downward.

use crate::domain::collision::Edge;
use crate::domain::token::Direction;

pub trait Stage {
    /// Move the token `distance` cells along its direction (backwards if negative).
    fn move_token(&mut self, distance: i32);
    fn place_token(&mut self, x: i32, y: i32);
    fn set_token_direction(&mut self, direction: Direction);
    fn token_position(&self) -> (i32, i32);

    /// Left/right edge first, then top/bottom.
    fn touching_edge(&self) -> Option<Edge>;
    fn is_touching_edge(&self) -> bool {
        self.touching_edge().is_some()
    }
    /// Token overlaps wall colour.
    fn touching_wall_color(&self) -> bool;
    /// Token overlaps or lies flush against wall colour.
    fn in_contact_with_wall_color(&self) -> bool;

    fn switch_backdrop(&mut self, level: usize);
    /// Home position of the token on the current backdrop.
    fn home(&self) -> (i32, i32);
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Paint {
    Floor,
    Wall,
}

/// One level's backdrop.
#[derive(Clone, Debug)]
pub struct Backdrop {
    pub name: String,
    pub width: usize,
    pub height: usize,
    pub cells: Vec<Vec<Paint>>,
    pub home: (i32, i32),
}

impl Backdrop {
    /// Build from map rows. Legend: `#` wall, `.` floor, `S` home (floor).
    /// Unknown characters are floor; short rows are padded with wall.
    pub fn from_rows(name: &str, rows: &[&str]) -> Result<Backdrop, String> {
        let height = rows.len();
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
        if width == 0 || height == 0 {
            return Err(format!("{}: empty map", name));
        }

        let mut cells = vec![vec![Paint::Wall; width]; height];
        let mut home = None;
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                cells[y][x] = match ch {
                    '#' => Paint::Wall,
                    'S' => {
                        if home.is_some() {
                            return Err(format!("{}: more than one home 'S'", name));
                        }
                        home = Some((x as i32, y as i32));
                        Paint::Floor
                    }
                    _ => Paint::Floor,
                };
            }
        }

        let home = home.ok_or_else(|| format!("{}: no home 'S'", name))?;
        Ok(Backdrop {
            name: name.to_string(),
            width,
            height,
            cells,
            home,
        })
    }

    /// Paint at a cell; outside the grid reads as wall.
    pub fn paint_at(&self, x: i32, y: i32) -> Paint {
        if self.contains(x, y) {
            self.cells[y as usize][x as usize]
        } else {
            Paint::Wall
        }
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }
}

pub struct GridStage {
    backdrops: Vec<Backdrop>,
    current: usize,
    token: (i32, i32),
    direction: Direction,
}

impl GridStage {
    /// `backdrops` holds one entry per level, the won screen last.
    pub fn new(backdrops: Vec<Backdrop>) -> Self {
        let token = backdrops.first().map(|b| b.home).unwrap_or((0, 0));
        GridStage {
            backdrops,
            current: 0,
            token,
            direction: Direction::Up,
        }
    }

    pub fn backdrop(&self) -> &Backdrop {
        &self.backdrops[self.current]
    }

    pub fn current_backdrop(&self) -> usize {
        self.current
    }

    fn is_wall(&self, x: i32, y: i32) -> bool {
        self.backdrop().paint_at(x, y) == Paint::Wall
    }
}

impl Stage for GridStage {
    fn move_token(&mut self, distance: i32) {
        let dir = if distance < 0 { self.direction.reverse() } else { self.direction };
        let (dx, dy) = dir.delta();
        for _ in 0..distance.abs() {
            let (nx, ny) = (self.token.0 + dx, self.token.1 + dy);
            if !self.backdrop().contains(nx, ny) {
                break;
            }
            self.token = (nx, ny);
            // Stop inside the first wall hit so fast tokens can't tunnel.
            if distance > 0 && self.is_wall(nx, ny) {
                break;
            }
        }
    }

    fn place_token(&mut self, x: i32, y: i32) {
        self.token = (x, y);
    }

    fn set_token_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    fn token_position(&self) -> (i32, i32) {
        self.token
    }

    fn touching_edge(&self) -> Option<Edge> {
        let b = self.backdrop();
        let (x, y) = self.token;
        if x <= 0 {
            Some(Edge::Left)
        } else if x >= b.width as i32 - 1 {
            Some(Edge::Right)
        } else if y <= 0 {
            Some(Edge::Top)
        } else if y >= b.height as i32 - 1 {
            Some(Edge::Bottom)
        } else {
            None
        }
    }

    fn touching_wall_color(&self) -> bool {
        self.is_wall(self.token.0, self.token.1)
    }

    fn in_contact_with_wall_color(&self) -> bool {
        let (x, y) = self.token;
        if self.is_wall(x, y) {
            return true;
        }
        Direction::ALL.iter().any(|d| {
            let (dx, dy) = d.delta();
            let (nx, ny) = (x + dx, y + dy);
            // The grid boundary is an edge, not wall colour.
            self.backdrop().contains(nx, ny) && self.is_wall(nx, ny)
        })
    }

    fn switch_backdrop(&mut self, level: usize) {
        self.current = level.min(self.backdrops.len().saturating_sub(1));
    }

    fn home(&self) -> (i32, i32) {
        self.backdrop().home
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stage(rows: &[&str]) -> GridStage {
        GridStage::new(vec![Backdrop::from_rows("test", rows).unwrap()])
    }

    #[test]
    fn parses_home_and_walls() {
        let b = Backdrop::from_rows("t", &["#####", "#.S.#", "#####"]).unwrap();
        assert_eq!((b.width, b.height), (5, 3));
        assert_eq!(b.home, (2, 1));
        assert_eq!(b.paint_at(0, 0), Paint::Wall);
        assert_eq!(b.paint_at(1, 1), Paint::Floor);
        assert_eq!(b.paint_at(-1, 1), Paint::Wall);
    }

    #[test]
    fn rejects_missing_or_duplicate_home() {
        assert!(Backdrop::from_rows("t", &["###", "#.#"]).is_err());
        assert!(Backdrop::from_rows("t", &["#SS#"]).is_err());
        assert!(Backdrop::from_rows("t", &[]).is_err());
    }

    #[test]
    fn forward_move_stops_inside_first_wall() {
        let mut s = stage(&[
            "#######",
            "#S..#.#",
            "#######",
        ]);
        s.set_token_direction(Direction::Right);
        s.move_token(10);
        assert_eq!(s.token_position(), (4, 1));
        assert!(s.touching_wall_color());
    }

    #[test]
    fn backward_move_leaves_wall() {
        let mut s = stage(&[
            "#######",
            "#S..#.#",
            "#######",
        ]);
        s.place_token(4, 1);
        s.set_token_direction(Direction::Right);
        s.move_token(-1);
        assert_eq!(s.token_position(), (3, 1));
        assert!(!s.touching_wall_color());
        assert!(s.in_contact_with_wall_color());
    }

    #[test]
    fn movement_is_clamped_to_grid() {
        let mut s = stage(&["..S.."]);
        s.set_token_direction(Direction::Left);
        s.move_token(9);
        assert_eq!(s.token_position(), (0, 0));
        assert_eq!(s.touching_edge(), Some(Edge::Left));
    }

    #[test]
    fn edges_report_left_right_before_top_bottom() {
        let mut s = stage(&["S...", "....", "...."]);
        s.place_token(0, 0);
        assert_eq!(s.touching_edge(), Some(Edge::Left));
        s.place_token(3, 2);
        assert_eq!(s.touching_edge(), Some(Edge::Right));
        s.place_token(1, 0);
        assert_eq!(s.touching_edge(), Some(Edge::Top));
        s.place_token(2, 2);
        assert_eq!(s.touching_edge(), Some(Edge::Bottom));
        s.place_token(1, 1);
        assert_eq!(s.touching_edge(), None);
        assert!(!s.is_touching_edge());
    }

    #[test]
    fn open_floor_is_not_contact() {
        let s = stage(&[
            "#####",
            "#...#",
            "#.S.#",
            "#...#",
            "#####",
        ]);
        assert!(!s.in_contact_with_wall_color());
    }

    #[test]
    fn switch_backdrop_clamps_to_last() {
        let a = Backdrop::from_rows("a", &["S.."]).unwrap();
        let b = Backdrop::from_rows("b", &[".S."]).unwrap();
        let mut s = GridStage::new(vec![a, b]);
        s.switch_backdrop(7);
        assert_eq!(s.current_backdrop(), 1);
        assert_eq!(s.home(), (1, 0));
    }
}
