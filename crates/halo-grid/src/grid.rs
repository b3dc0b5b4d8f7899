//! Periodic Cartesian process grid.

use std::fmt;
use std::sync::Arc;

use halo_comm::{Communicator, Payload, Tag};
use halo_core::{Coord2D, Dim2D, Direction2D, Shape2D};
use log::debug;
use smallvec::smallvec;

use crate::error::TopologyError;

/// The ranks of a communicator arranged as a `Py x Px` torus.
///
/// Coordinates are row-major over ranks: `rank = cy * Px + cx`. Neighbour
/// lookup wraps around both axes, so along an axis of extent 1 a rank is
/// its own neighbour in both directions.
///
/// Immutable after construction. Shared between the fields of one rank
/// through an `Arc`.
pub struct ProcessGrid {
    comm: Arc<dyn Communicator>,
    shape: Shape2D,
    coords: Coord2D,
    rank: usize,
    neighbours: [usize; 4],
}

impl ProcessGrid {
    /// Establish the grid. Collective: every rank of `comm` must call this
    /// with the same `shape`.
    ///
    /// Fails with [`TopologyError::EmptyAxis`] or
    /// [`TopologyError::SizeMismatch`] before any message is sent, and
    /// with [`TopologyError::Inconsistent`] if any rank requested a
    /// different shape.
    pub fn new(comm: Arc<dyn Communicator>, shape: Shape2D) -> Result<Self, TopologyError> {
        if shape.is_empty() {
            return Err(TopologyError::EmptyAxis { requested: shape });
        }
        let size = comm.size();
        if shape.count() != size {
            return Err(TopologyError::SizeMismatch {
                requested: shape,
                size,
            });
        }

        agree_on_shape(comm.as_ref(), shape)?;

        let rank = comm.rank();
        let coords = Coord2D::from_linear(rank, shape);
        let mut grid = Self {
            comm,
            shape,
            coords,
            rank,
            neighbours: [rank; 4],
        };
        for dir in Direction2D::ALL {
            grid.neighbours[dir.index()] = grid.rank_of(grid.shifted(coords, dir));
        }
        debug!(
            "rank {rank}: process grid {shape} at {coords}, neighbours up={} down={} left={} right={}",
            grid.neighbours[0], grid.neighbours[1], grid.neighbours[2], grid.neighbours[3]
        );
        Ok(grid)
    }

    /// Rank adjacent to this one in `direction`, with wraparound.
    pub fn neighbour_rank(&self, direction: Direction2D) -> usize {
        self.neighbours[direction.index()]
    }

    /// This rank's coordinate along `dim`.
    pub fn coord(&self, dim: Dim2D) -> usize {
        self.coords[dim]
    }

    /// This rank's grid coordinate.
    pub fn coords(&self) -> Coord2D {
        self.coords
    }

    /// Number of ranks along `dim`.
    pub fn extent(&self, dim: Dim2D) -> usize {
        self.shape[dim]
    }

    /// Grid shape `(Py, Px)`.
    pub fn shape(&self) -> Shape2D {
        self.shape
    }

    /// The underlying communicator.
    pub fn communicator(&self) -> &Arc<dyn Communicator> {
        &self.comm
    }

    /// This rank's linear id.
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Total number of ranks.
    pub fn size(&self) -> usize {
        self.shape.count()
    }

    /// `true` on rank 0.
    pub fn is_root(&self) -> bool {
        self.rank == 0
    }

    /// Rank at grid coordinate `coords`.
    pub fn rank_of(&self, coords: Coord2D) -> usize {
        coords.linear(self.shape)
    }

    /// Grid coordinate of `rank`.
    pub fn coords_of(&self, rank: usize) -> Coord2D {
        Coord2D::from_linear(rank, self.shape)
    }

    /// One step from `coords` in `dir`, wrapping at the edges.
    fn shifted(&self, coords: Coord2D, dir: Direction2D) -> Coord2D {
        let dim = dir.dim();
        let n = self.shape[dim];
        let mut out = coords;
        out[dim] = match dir.step() {
            1 => (coords[dim] + 1) % n,
            _ => (coords[dim] + n - 1) % n,
        };
        out
    }
}

impl fmt::Debug for ProcessGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessGrid")
            .field("shape", &self.shape)
            .field("coords", &self.coords)
            .field("rank", &self.rank)
            .field("neighbours", &self.neighbours)
            .finish()
    }
}

/// Send our requested shape to every rank and check theirs.
///
/// All messages are drained before reporting a disagreement so the
/// channels are left empty either way.
fn agree_on_shape(comm: &dyn Communicator, shape: Shape2D) -> Result<(), TopologyError> {
    let size = comm.size();
    for peer in 0..size {
        let words = smallvec![shape.y as u64, shape.x as u64];
        comm.send(peer, Tag::TOPOLOGY, Payload::Control(words))?;
    }
    let mut first_mismatch = None;
    for peer in 0..size {
        let words = comm.receive(peer, Tag::TOPOLOGY)?.into_control()?;
        let theirs = match words.as_slice() {
            [y, x] => Shape2D::new(*y as usize, *x as usize),
            _ => {
                return Err(TopologyError::Comm(halo_comm::CommError::UnexpectedPayload {
                    expected: "process grid shape",
                }))
            }
        };
        if theirs != shape && first_mismatch.is_none() {
            first_mismatch = Some(TopologyError::Inconsistent {
                rank: peer,
                requested: shape,
                theirs,
            });
        }
    }
    match first_mismatch {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Pick a near-square `(Py, Px)` with `Py * Px == size` and `Py <= Px`.
///
/// # Examples
///
/// ```
/// use halo_core::Shape2D;
/// use halo_grid::balanced_shape;
///
/// assert_eq!(balanced_shape(12), Shape2D::new(3, 4));
/// assert_eq!(balanced_shape(7), Shape2D::new(1, 7));
/// ```
pub fn balanced_shape(size: usize) -> Shape2D {
    if size == 0 {
        return Shape2D::new(0, 0);
    }
    let mut py = (size as f64).sqrt() as usize;
    while py > 1 && size % py != 0 {
        py -= 1;
    }
    let py = py.max(1);
    Shape2D::new(py, size / py)
}
