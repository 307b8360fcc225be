//! Board coordinates and move directions.

use std::fmt;

/// Width and height of the board.
pub const SIZE: usize = 4;

/// A cell coordinate. `x` runs left to right, `y` top to bottom.
///
/// Coordinates are signed so a walk can step one cell past the edge
/// and be rejected by [`Position::in_bounds`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Position { x, y }
    }

    /// The neighbouring position one step along `vector`.
    #[inline]
    pub fn step(self, vector: Vector) -> Position {
        Position {
            x: self.x + vector.dx,
            y: self.y + vector.dy,
        }
    }

    #[inline]
    pub fn in_bounds(self) -> bool {
        (0..SIZE as i32).contains(&self.x) && (0..SIZE as i32).contains(&self.y)
    }

    /// Row-major index into a flat 16-cell array, or `None` off the board.
    #[inline]
    pub fn index(self) -> Option<usize> {
        if self.in_bounds() {
            Some(self.y as usize * SIZE + self.x as usize)
        } else {
            None
        }
    }

    /// Inverse of [`Position::index`].
    #[inline]
    pub fn from_index(idx: usize) -> Position {
        Position::new((idx % SIZE) as i32, (idx / SIZE) as i32)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A unit step on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Vector {
    pub dx: i32,
    pub dy: i32,
}

/// The four possible move directions, in search order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    /// All four directions in the fixed enumeration order used by search.
    pub fn all() -> [Direction; 4] {
        [
            Direction::Up,
            Direction::Right,
            Direction::Down,
            Direction::Left,
        ]
    }

    pub fn vector(self) -> Vector {
        match self {
            Direction::Up => Vector { dx: 0, dy: -1 },
            Direction::Right => Vector { dx: 1, dy: 0 },
            Direction::Down => Vector { dx: 0, dy: 1 },
            Direction::Left => Vector { dx: -1, dy: 0 },
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Right => "right",
            Direction::Down => "down",
            Direction::Left => "left",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Cell visiting order for a move: the cells farthest along `vector` come first,
/// so a tile never slides into a cell whose tile has not been processed yet.
pub fn traversal_order(vector: Vector) -> ([i32; SIZE], [i32; SIZE]) {
    let mut xs = [0, 1, 2, 3];
    let mut ys = [0, 1, 2, 3];
    if vector.dx == 1 {
        xs.reverse();
    }
    if vector.dy == 1 {
        ys.reverse();
    }
    (xs, ys)
}
