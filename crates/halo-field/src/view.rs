//! Borrowed strided views over a field's backing buffer.
//!
//! A [`View`] or [`ViewMut`] pairs a [`Region`] with a borrow of the
//! buffer, so a view can never outlive or dangle past its field. Views are
//! cheap to create and are re-derived on every access.
//!
//! Indexing with `(i, j)` past the view's extents is a logic error. Debug
//! builds assert; release builds either read a neighbouring element of the
//! same buffer or panic on the slice bound.

use std::ops::{Index, IndexMut};

use halo_core::{Coord2D, Dim2D, Shape2D};

use crate::region::Region;

/// Read-only rectangular view.
#[derive(Clone, Copy, Debug)]
pub struct View<'a> {
    data: &'a [f64],
    region: Region,
}

impl<'a> View<'a> {
    /// View `region` of `data`.
    pub fn new(data: &'a [f64], region: Region) -> Self {
        Self { data, region }
    }

    /// Extent along `dim`.
    pub fn extent(&self, dim: Dim2D) -> usize {
        self.region.extent(dim)
    }

    /// Extents `(rows, cols)`.
    pub fn shape(&self) -> Shape2D {
        self.region.shape
    }

    /// The described region of the backing buffer.
    pub fn region(&self) -> Region {
        self.region
    }

    /// Element `(i, j)`, or `None` outside the view.
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        if self.region.shape.contains(Coord2D::new(i, j)) {
            self.data.get(self.region.index(i, j)).copied()
        } else {
            None
        }
    }

    /// A narrower view sharing the same buffer.
    pub fn sub_view(&self, origin: Coord2D, shape: Shape2D) -> View<'a> {
        View {
            data: self.data,
            region: self.region.sub(origin, shape),
        }
    }

    /// Each row as a contiguous slice.
    pub fn rows(&self) -> impl Iterator<Item = &'a [f64]> + 'a {
        let data: &'a [f64] = self.data;
        let Region {
            offset,
            shape,
            stride,
        } = self.region;
        let h = if shape.is_empty() { 0 } else { shape.y };
        (0..h).map(move |i| {
            let start = offset + i * stride;
            &data[start..start + shape.x]
        })
    }

    /// Every element, row by row.
    pub fn iter(&self) -> impl Iterator<Item = f64> + 'a {
        self.rows().flat_map(|row| row.iter().copied())
    }

    /// Copy the viewed elements out, row by row.
    pub fn to_vec(&self) -> Vec<f64> {
        self.iter().collect()
    }
}

impl Index<(usize, usize)> for View<'_> {
    type Output = f64;

    #[inline]
    fn index(&self, (i, j): (usize, usize)) -> &f64 {
        debug_assert!(
            i < self.region.shape.y && j < self.region.shape.x,
            "({i}, {j}) outside view of shape {}",
            self.region.shape
        );
        &self.data[self.region.index(i, j)]
    }
}

/// Mutable rectangular view.
#[derive(Debug)]
pub struct ViewMut<'a> {
    data: &'a mut [f64],
    region: Region,
}

impl<'a> ViewMut<'a> {
    /// Mutably view `region` of `data`.
    pub fn new(data: &'a mut [f64], region: Region) -> Self {
        Self { data, region }
    }

    /// Extent along `dim`.
    pub fn extent(&self, dim: Dim2D) -> usize {
        self.region.extent(dim)
    }

    /// Extents `(rows, cols)`.
    pub fn shape(&self) -> Shape2D {
        self.region.shape
    }

    /// The described region of the backing buffer.
    pub fn region(&self) -> Region {
        self.region
    }

    /// Reborrow as a read-only view.
    pub fn as_view(&self) -> View<'_> {
        View {
            data: &*self.data,
            region: self.region,
        }
    }

    /// Element `(i, j)`, or `None` outside the view.
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        self.as_view().get(i, j)
    }

    /// Mutable element `(i, j)`, or `None` outside the view.
    pub fn get_mut(&mut self, i: usize, j: usize) -> Option<&mut f64> {
        if self.region.shape.contains(Coord2D::new(i, j)) {
            self.data.get_mut(self.region.index(i, j))
        } else {
            None
        }
    }

    /// A narrower mutable view, reborrowing this one.
    pub fn sub_view_mut(&mut self, origin: Coord2D, shape: Shape2D) -> ViewMut<'_> {
        ViewMut {
            data: &mut *self.data,
            region: self.region.sub(origin, shape),
        }
    }

    /// Each row as a contiguous mutable slice.
    pub fn rows_mut(&mut self) -> impl Iterator<Item = &mut [f64]> + '_ {
        let Region {
            offset,
            shape,
            stride,
        } = self.region;
        let (start, h) = if shape.is_empty() {
            (self.data.len(), 0)
        } else {
            (offset, shape.y)
        };
        self.data[start..]
            .chunks_mut(stride.max(1))
            .take(h)
            .map(move |row| &mut row[..shape.x])
    }

    /// Set every element to `value`.
    pub fn fill(&mut self, value: f64) {
        for row in self.rows_mut() {
            row.fill(value);
        }
    }

    /// Set element `(i, j)` to `f(i, j)` for every element.
    pub fn fill_with(&mut self, mut f: impl FnMut(usize, usize) -> f64) {
        for (i, row) in self.rows_mut().enumerate() {
            for (j, v) in row.iter_mut().enumerate() {
                *v = f(i, j);
            }
        }
    }

    /// Copy `src` into this view. Shapes must match.
    pub fn copy_from(&mut self, src: &View<'_>) {
        assert_eq!(
            self.shape(),
            src.shape(),
            "copy_from between views of different shapes"
        );
        for (dst, src) in self.rows_mut().zip(src.rows()) {
            dst.copy_from_slice(src);
        }
    }

    /// Copy the viewed elements out, row by row.
    pub fn to_vec(&self) -> Vec<f64> {
        self.as_view().to_vec()
    }
}

impl Index<(usize, usize)> for ViewMut<'_> {
    type Output = f64;

    #[inline]
    fn index(&self, (i, j): (usize, usize)) -> &f64 {
        debug_assert!(
            i < self.region.shape.y && j < self.region.shape.x,
            "({i}, {j}) outside view of shape {}",
            self.region.shape
        );
        &self.data[self.region.index(i, j)]
    }
}

impl IndexMut<(usize, usize)> for ViewMut<'_> {
    #[inline]
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut f64 {
        debug_assert!(
            i < self.region.shape.y && j < self.region.shape.x,
            "({i}, {j}) outside view of shape {}",
            self.region.shape
        );
        &mut self.data[self.region.index(i, j)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(shape: Shape2D) -> Vec<f64> {
        (0..shape.count()).map(|v| v as f64).collect()
    }

    #[test]
    fn indexing_follows_region() {
        let shape = Shape2D::new(4, 5);
        let data = grid(shape);
        let v = View::new(&data, Region::whole(shape)).sub_view(Coord2D::new(1, 2), Shape2D::new(2, 3));
        assert_eq!(v[(0, 0)], 7.0);
        assert_eq!(v[(1, 2)], 14.0);
        assert_eq!(v.get(2, 0), None);
        assert_eq!(v.extent(Dim2D::X), 3);
    }

    #[test]
    fn rows_are_strided() {
        let shape = Shape2D::new(3, 4);
        let data = grid(shape);
        let v = View::new(&data, Region::whole(shape).sub(Coord2D::new(0, 1), Shape2D::new(3, 2)));
        let rows: Vec<&[f64]> = v.rows().collect();
        assert_eq!(rows, vec![&[1.0, 2.0][..], &[5.0, 6.0], &[9.0, 10.0]]);
        assert_eq!(v.to_vec(), vec![1.0, 2.0, 5.0, 6.0, 9.0, 10.0]);
    }

    #[test]
    fn writes_land_in_backing_buffer() {
        let shape = Shape2D::new(3, 3);
        let mut data = vec![0.0; 9];
        let region = Region::whole(shape).sub(Coord2D::new(1, 1), Shape2D::new(2, 2));
        let mut v = ViewMut::new(&mut data, region);
        v[(1, 1)] = 5.0;
        v.sub_view_mut(Coord2D::new(0, 0), Shape2D::new(1, 2)).fill(2.0);
        assert_eq!(data, vec![0.0, 0.0, 0.0, 0.0, 2.0, 2.0, 0.0, 0.0, 5.0]);
    }

    #[test]
    fn fill_with_passes_local_coordinates() {
        let shape = Shape2D::new(4, 4);
        let mut data = vec![0.0; 16];
        let region = Region::whole(shape).sub(Coord2D::new(2, 1), Shape2D::new(2, 3));
        ViewMut::new(&mut data, region).fill_with(|i, j| (10 * i + j) as f64);
        let v = View::new(&data, region);
        assert_eq!(v.to_vec(), vec![0.0, 1.0, 2.0, 10.0, 11.0, 12.0]);
        assert_eq!(data[0..8].iter().sum::<f64>(), 0.0);
    }

    #[test]
    fn empty_regions_iterate_nothing() {
        let mut data = vec![1.0; 6];
        // A zero-height band whose offset sits past the end of the buffer.
        let region = Region {
            offset: 7,
            shape: Shape2D::new(0, 3),
            stride: 3,
        };
        assert_eq!(View::new(&data, region).rows().count(), 0);
        let mut v = ViewMut::new(&mut data, region);
        v.fill(9.0);
        assert_eq!(v.rows_mut().count(), 0);
        assert!(data.iter().all(|x| *x == 1.0));
    }

    #[test]
    fn copy_between_views() {
        let shape = Shape2D::new(2, 4);
        let src_data = grid(shape);
        let mut dst_data = vec![0.0; 8];
        let left = Region::whole(shape).sub(Coord2D::new(0, 0), Shape2D::new(2, 2));
        let right = Region::whole(shape).sub(Coord2D::new(0, 2), Shape2D::new(2, 2));
        ViewMut::new(&mut dst_data, right).copy_from(&View::new(&src_data, left));
        assert_eq!(dst_data, vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 4.0, 5.0]);
    }
}
