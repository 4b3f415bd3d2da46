/// The token: travel direction and per-level motion state.
/// Position lives with the stage; `TokenState` mirrors it after each tick.

/// Travel direction, in the stage's degree convention (0 = up, clockwise).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Right, Direction::Down, Direction::Left];

    /// Map 0/90/180/270 to a direction. Anything else is not a valid heading.
    #[cfg(test)]
    pub fn from_degrees(deg: u16) -> Option<Direction> {
        match deg {
            0 => Some(Direction::Up),
            90 => Some(Direction::Right),
            180 => Some(Direction::Down),
            270 => Some(Direction::Left),
            _ => None,
        }
    }

    pub fn degrees(self) -> u16 {
        match self {
            Direction::Up => 0,
            Direction::Right => 90,
            Direction::Down => 180,
            Direction::Left => 270,
        }
    }

    pub fn reverse(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Right => Direction::Left,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
        }
    }

    /// Unit step on the grid (y grows downward).
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Right => (1, 0),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
        }
    }
}

/// Transient token state, reset at the start of every level.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenState {
    pub position: (i32, i32),
    pub direction: Direction,
    /// Either 0 (resting) or the configured max speed.
    pub speed: i32,
    pub controllable: bool,
}

impl TokenState {
    /// Resting at `home`, ready for the first stroke.
    pub fn at_home(home: (i32, i32)) -> Self {
        TokenState {
            position: home,
            direction: Direction::Up,
            speed: 0,
            controllable: true,
        }
    }

    pub fn is_moving(&self) -> bool {
        self.speed != 0
    }
}
