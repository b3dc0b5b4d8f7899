//! Axes and compass directions of a 2D grid.

use std::fmt;

/// One of the two axes of a row-major 2D array.
///
/// `Y` is the slow (row) axis, `X` the fast (column) axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Dim2D {
    /// Row axis.
    Y,
    /// Column axis.
    X,
}

impl Dim2D {
    /// Both axes, slow axis first.
    pub const ALL: [Dim2D; 2] = [Dim2D::Y, Dim2D::X];

    /// The other axis.
    pub fn other(self) -> Dim2D {
        match self {
            Dim2D::Y => Dim2D::X,
            Dim2D::X => Dim2D::Y,
        }
    }
}

impl fmt::Display for Dim2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dim2D::Y => write!(f, "y"),
            Dim2D::X => write!(f, "x"),
        }
    }
}

/// A compass direction on the process grid and on a field's ghost border.
///
/// `Up` and `Down` move along [`Dim2D::Y`]; `Left` and `Right` along
/// [`Dim2D::X`]. `Up` and `Right` point towards increasing coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction2D {
    /// Towards increasing `y`.
    Up,
    /// Towards decreasing `y`.
    Down,
    /// Towards decreasing `x`.
    Left,
    /// Towards increasing `x`.
    Right,
}

impl Direction2D {
    /// All four directions, in table order.
    pub const ALL: [Direction2D; 4] = [
        Direction2D::Up,
        Direction2D::Down,
        Direction2D::Left,
        Direction2D::Right,
    ];

    /// Axis this direction moves along.
    pub fn dim(self) -> Dim2D {
        match self {
            Direction2D::Up | Direction2D::Down => Dim2D::Y,
            Direction2D::Left | Direction2D::Right => Dim2D::X,
        }
    }

    /// `+1` for `Up`/`Right`, `-1` for `Down`/`Left`.
    pub fn step(self) -> i64 {
        match self {
            Direction2D::Up | Direction2D::Right => 1,
            Direction2D::Down | Direction2D::Left => -1,
        }
    }

    /// The direction pointing the other way.
    pub fn opposite(self) -> Direction2D {
        match self {
            Direction2D::Up => Direction2D::Down,
            Direction2D::Down => Direction2D::Up,
            Direction2D::Left => Direction2D::Right,
            Direction2D::Right => Direction2D::Left,
        }
    }

    /// Position of this direction in [`Direction2D::ALL`], for table lookups.
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Direction2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction2D::Up => "up",
            Direction2D::Down => "down",
            Direction2D::Left => "left",
            Direction2D::Right => "right",
        };
        f.write_str(name)
    }
}
