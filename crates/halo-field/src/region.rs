//! Rectangular index regions inside a row-major buffer.

use halo_core::{Coord2D, Dim2D, Shape2D};

/// A rectangle of a row-major buffer: origin offset, extents, row stride.
///
/// Regions are plain index arithmetic and hold no reference to the
/// buffer, so they stay valid when the buffer they describe is moved or
/// swapped.
///
/// # Examples
///
/// ```
/// use halo_core::{Coord2D, Shape2D};
/// use halo_field::Region;
///
/// let whole = Region::whole(Shape2D::new(4, 5));
/// let inner = whole.sub(Coord2D::new(1, 1), Shape2D::new(2, 3));
/// assert_eq!(inner.index(0, 0), 6);
/// assert_eq!(inner.index(1, 2), 13);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Region {
    /// Buffer index of element `(0, 0)`.
    pub offset: usize,
    /// Extents `(rows, cols)`.
    pub shape: Shape2D,
    /// Buffer distance between vertically adjacent elements.
    pub stride: usize,
}

impl Region {
    /// The whole of a contiguous `shape` buffer.
    pub fn whole(shape: Shape2D) -> Self {
        Self {
            offset: 0,
            shape,
            stride: shape.x,
        }
    }

    /// A sub-rectangle at `origin` (in this region's coordinates) with
    /// extents `shape`.
    ///
    /// The sub-rectangle must lie inside `self`; this is checked in debug
    /// builds only.
    pub fn sub(&self, origin: Coord2D, shape: Shape2D) -> Region {
        debug_assert!(
            origin.y + shape.y <= self.shape.y && origin.x + shape.x <= self.shape.x,
            "sub-region {shape} at {origin} exceeds region {}",
            self.shape
        );
        Region {
            offset: self.offset + origin.y * self.stride + origin.x,
            shape,
            stride: self.stride,
        }
    }

    /// Buffer index of local element `(i, j)`.
    #[inline]
    pub fn index(&self, i: usize, j: usize) -> usize {
        self.offset + i * self.stride + j
    }

    /// Extent along `dim`.
    pub fn extent(&self, dim: Dim2D) -> usize {
        self.shape[dim]
    }

    /// Number of elements in the region.
    pub fn len(&self) -> usize {
        self.shape.count()
    }

    /// `true` if the region has no elements.
    pub fn is_empty(&self) -> bool {
        self.shape.is_empty()
    }

    /// Row/column of element `(0, 0)` within the enclosing buffer.
    ///
    /// Requires a non-zero stride.
    pub fn origin(&self) -> Coord2D {
        Coord2D::from_linear(self.offset, Shape2D::new(0, self.stride))
    }

    /// Buffer indices of every element, row by row.
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        let (h, w) = (self.shape.y, self.shape.x);
        (0..h).flat_map(move |i| (0..w).map(move |j| self.index(i, j)))
    }

    /// `true` if the two regions share an element. Both must use the same
    /// stride.
    pub fn overlaps(&self, other: &Region) -> bool {
        debug_assert_eq!(self.stride, other.stride);
        if self.is_empty() || other.is_empty() {
            return false;
        }
        let (a, b) = (self.origin(), other.origin());
        a.y < b.y + other.shape.y
            && b.y < a.y + self.shape.y
            && a.x < b.x + other.shape.x
            && b.x < a.x + self.shape.x
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_recovers_row_and_column() {
        let whole = Region::whole(Shape2D::new(6, 7));
        let r = whole.sub(Coord2D::new(2, 3), Shape2D::new(1, 1));
        assert_eq!(r.origin(), Coord2D::new(2, 3));
    }

    #[test]
    fn indices_walk_rows() {
        let whole = Region::whole(Shape2D::new(3, 4));
        let r = whole.sub(Coord2D::new(1, 1), Shape2D::new(2, 2));
        assert_eq!(r.indices().collect::<Vec<_>>(), vec![5, 6, 9, 10]);
    }

    #[test]
    fn overlap_detection() {
        let whole = Region::whole(Shape2D::new(5, 5));
        let a = whole.sub(Coord2D::new(0, 0), Shape2D::new(2, 2));
        let b = whole.sub(Coord2D::new(1, 1), Shape2D::new(2, 2));
        let c = whole.sub(Coord2D::new(2, 0), Shape2D::new(1, 5));
        let empty = whole.sub(Coord2D::new(0, 0), Shape2D::new(0, 5));
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
        assert!(b.overlaps(&c));
        assert!(!empty.overlaps(&a));
    }
}
