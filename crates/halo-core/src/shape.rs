//! 2D shapes and coordinates.

use crate::dim::Dim2D;
use std::fmt;
use std::ops::{Index, IndexMut};

/// Extents of a 2D array or process grid, as `(y, x)`.
///
/// Used both for process-grid shapes and for local/global array shapes.
///
/// # Examples
///
/// ```
/// use halo_core::{Dim2D, Shape2D};
///
/// let s = Shape2D::new(4, 6);
/// assert_eq!(s[Dim2D::Y], 4);
/// assert_eq!(s.count(), 24);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Shape2D {
    /// Extent along [`Dim2D::Y`].
    pub y: usize,
    /// Extent along [`Dim2D::X`].
    pub x: usize,
}

impl Shape2D {
    /// Create a shape from its `y` and `x` extents.
    pub const fn new(y: usize, x: usize) -> Self {
        Self { y, x }
    }

    /// Same extent along both axes.
    pub const fn square(n: usize) -> Self {
        Self { y: n, x: n }
    }

    /// Number of elements, `y * x`.
    pub fn count(&self) -> usize {
        self.y * self.x
    }

    /// `true` if either extent is zero.
    pub fn is_empty(&self) -> bool {
        self.y == 0 || self.x == 0
    }

    /// Component-wise maximum.
    pub fn max(self, other: Shape2D) -> Shape2D {
        Shape2D::new(self.y.max(other.y), self.x.max(other.x))
    }

    /// `true` if `coord` lies inside `[0, y) x [0, x)`.
    pub fn contains(&self, coord: Coord2D) -> bool {
        coord.y < self.y && coord.x < self.x
    }
}

impl Index<Dim2D> for Shape2D {
    type Output = usize;

    fn index(&self, dim: Dim2D) -> &usize {
        match dim {
            Dim2D::Y => &self.y,
            Dim2D::X => &self.x,
        }
    }
}

impl IndexMut<Dim2D> for Shape2D {
    fn index_mut(&mut self, dim: Dim2D) -> &mut usize {
        match dim {
            Dim2D::Y => &mut self.y,
            Dim2D::X => &mut self.x,
        }
    }
}

impl fmt::Display for Shape2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.y, self.x)
    }
}

impl From<(usize, usize)> for Shape2D {
    fn from((y, x): (usize, usize)) -> Self {
        Self { y, x }
    }
}

/// A 0-based `(y, x)` position on a 2D array or process grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coord2D {
    /// Position along [`Dim2D::Y`].
    pub y: usize,
    /// Position along [`Dim2D::X`].
    pub x: usize,
}

impl Coord2D {
    /// Create a coordinate.
    pub const fn new(y: usize, x: usize) -> Self {
        Self { y, x }
    }

    /// Row-major linear index of this coordinate in an array of `shape`.
    pub fn linear(&self, shape: Shape2D) -> usize {
        self.y * shape.x + self.x
    }

    /// Inverse of [`linear`](Coord2D::linear).
    ///
    /// `shape.x` must be non-zero.
    pub fn from_linear(index: usize, shape: Shape2D) -> Self {
        Self {
            y: index / shape.x,
            x: index % shape.x,
        }
    }
}

impl Index<Dim2D> for Coord2D {
    type Output = usize;

    fn index(&self, dim: Dim2D) -> &usize {
        match dim {
            Dim2D::Y => &self.y,
            Dim2D::X => &self.x,
        }
    }
}

impl IndexMut<Dim2D> for Coord2D {
    fn index_mut(&mut self, dim: Dim2D) -> &mut usize {
        match dim {
            Dim2D::Y => &mut self.y,
            Dim2D::X => &mut self.x,
        }
    }
}

impl fmt::Display for Coord2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.y, self.x)
    }
}

impl From<(usize, usize)> for Coord2D {
    fn from((y, x): (usize, usize)) -> Self {
        Self { y, x }
    }
}
