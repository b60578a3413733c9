//! Grid coordinates and the five agent moves.

/// A move an agent can make in one time step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    East,
    South,
    West,
    /// Stay in place for one time step.
    Wait,
}

/// The four cardinal moves, in the order OSF tables are generated.
pub const CARDINALS: [Direction; 4] = [
    Direction::North,
    Direction::East,
    Direction::South,
    Direction::West,
];

impl Direction {
    /// Unit `(dx, dy)` offset. `y` grows downward (row-major grids).
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
            Direction::Wait => (0, 0),
        }
    }
}

/// A 2D grid coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coordinate {
    pub x: u32,
    pub y: u32,
}

impl Coordinate {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// The coordinate one step in `direction`.
    ///
    /// Callers must only pass moves that stay on the grid; OSF tables are
    /// built from in-bounds neighbors only, so search code never steps out.
    pub fn step(self, direction: Direction) -> Coordinate {
        let (dx, dy) = direction.offset();
        debug_assert!(self.x as i64 + dx as i64 >= 0 && self.y as i64 + dy as i64 >= 0);
        Coordinate {
            x: (self.x as i32 + dx) as u32,
            y: (self.y as i32 + dy) as u32,
        }
    }
}
