//! Local block geometry: shapes, regions, and exchange layouts.
//!
//! Everything here is pure arithmetic on the configuration, with no
//! buffer and no communicator involved. A field re-derives its views
//! from this on every access.
//!
//! Layout of a local block with ghost widths `(gy, gx)` and interior
//! `(ny, nx)`, row 0 at the top:
//!
//! ```text
//!            gx          nx          gx
//!        +-------+---------------+-------+
//!   gy   |       |     DOWN      |       |
//!        +-------+---------------+-------+
//!        |       |               |       |
//!   ny   | LEFT  |   interior    | RIGHT |
//!        |       |               |       |
//!        +-------+---------------+-------+
//!   gy   |       |      UP       |       |
//!        +-------+---------------+-------+
//! ```
//!
//! The corners belong to no view and are never exchanged.

use halo_comm::VectorLayout;
use halo_core::{Coord2D, Dim2D, Direction2D, Shape2D};
use log::warn;

use crate::config::{FieldConfig, RemainderPolicy};
use crate::error::FieldError;
use crate::exchange::ExchangePass;
use crate::region::Region;

/// Shapes and regions of one rank's local block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldGeometry {
    dist_shape: Shape2D,
    global_shape: Shape2D,
    noghost_shape: Shape2D,
    ghost_sizes: Shape2D,
    full_shape: Shape2D,
    full: Region,
    noghost: Region,
    ghosts: [Region; 4],
}

impl FieldGeometry {
    /// Compute the local block for `config`.
    ///
    /// Fails with [`FieldError::EmptyInterior`],
    /// [`FieldError::IndivisibleShape`] (under
    /// [`RemainderPolicy::Reject`]) or [`FieldError::GhostTooWide`].
    pub fn new(config: &FieldConfig) -> Result<Self, FieldError> {
        let procs = config.dist_shape;
        let global = config.global_shape;
        let ghost = config.ghost_sizes;

        let mut noghost = Shape2D::default();
        for dim in Dim2D::ALL {
            let (g, p) = (global[dim], procs[dim]);
            let n = if p == 0 { 0 } else { g / p };
            if n == 0 {
                return Err(FieldError::EmptyInterior {
                    dim,
                    global: g,
                    procs: p,
                });
            }
            if g % p != 0 {
                match config.remainder {
                    RemainderPolicy::Reject => {
                        return Err(FieldError::IndivisibleShape {
                            dim,
                            global: g,
                            procs: p,
                        })
                    }
                    RemainderPolicy::Truncate => {
                        warn!(
                            "global extent {g} along {dim} truncated to {} ({} cells dropped)",
                            n * p,
                            g % p
                        );
                    }
                }
            }
            if ghost[dim] >= n.div_ceil(2) {
                return Err(FieldError::GhostTooWide {
                    dim,
                    ghost: ghost[dim],
                    interior: n,
                });
            }
            noghost[dim] = n;
        }

        let full_shape = Shape2D::new(noghost.y + 2 * ghost.y, noghost.x + 2 * ghost.x);
        let full = Region::whole(full_shape);
        let interior = full.sub(Coord2D::new(ghost.y, ghost.x), noghost);

        let row_band = Shape2D::new(ghost.y, noghost.x);
        let col_band = Shape2D::new(noghost.y, ghost.x);
        let mut ghosts = [full; 4];
        ghosts[Direction2D::Down.index()] = full.sub(Coord2D::new(0, ghost.x), row_band);
        ghosts[Direction2D::Up.index()] =
            full.sub(Coord2D::new(ghost.y + noghost.y, ghost.x), row_band);
        ghosts[Direction2D::Left.index()] = full.sub(Coord2D::new(ghost.y, 0), col_band);
        ghosts[Direction2D::Right.index()] =
            full.sub(Coord2D::new(ghost.y, ghost.x + noghost.x), col_band);

        Ok(Self {
            dist_shape: procs,
            global_shape: Shape2D::new(noghost.y * procs.y, noghost.x * procs.x),
            noghost_shape: noghost,
            ghost_sizes: ghost,
            full_shape,
            full,
            noghost: interior,
            ghosts,
        })
    }

    /// Process-grid shape the block was computed for.
    pub fn dist_shape(&self) -> Shape2D {
        self.dist_shape
    }

    /// Global shape actually covered by the grid of local blocks (smaller
    /// than configured only under [`RemainderPolicy::Truncate`]).
    pub fn global_shape(&self) -> Shape2D {
        self.global_shape
    }

    /// Interior extents.
    pub fn noghost_shape(&self) -> Shape2D {
        self.noghost_shape
    }

    /// Ghost widths.
    pub fn ghost_sizes(&self) -> Shape2D {
        self.ghost_sizes
    }

    /// Interior plus ghosts on both sides.
    pub fn full_shape(&self) -> Shape2D {
        self.full_shape
    }

    /// The whole local buffer.
    pub fn full_region(&self) -> Region {
        self.full
    }

    /// The interior, offset by the ghost widths.
    pub fn noghost_region(&self) -> Region {
        self.noghost
    }

    /// The ghost band on side `dir`.
    pub fn ghost_region(&self, dir: Direction2D) -> Region {
        self.ghosts[dir.index()]
    }

    /// Global coordinate of interior cell `(0, 0)` on the rank at
    /// process-grid coordinate `grid_coords`.
    pub fn global_origin(&self, grid_coords: Coord2D) -> Coord2D {
        Coord2D::new(
            grid_coords.y * self.noghost_shape.y,
            grid_coords.x * self.noghost_shape.x,
        )
    }

    /// `ghost.y` rows of `noghost.x` values, one buffer row apart.
    pub fn row_ghost_layout(&self) -> VectorLayout {
        VectorLayout::new(self.ghost_sizes.y, self.noghost_shape.x, self.full_shape.x)
    }

    /// `noghost.y` rows of `ghost.x` values, one buffer row apart.
    pub fn col_ghost_layout(&self) -> VectorLayout {
        VectorLayout::new(self.noghost_shape.y, self.ghost_sizes.x, self.full_shape.x)
    }

    /// Buffer offset of the interior band sent by `pass`.
    ///
    /// Forward passes send the first ghost-width rows/columns of the
    /// interior; backward passes send the last ones, starting at
    /// `noghost - ghost`.
    pub fn send_offset(&self, pass: ExchangePass) -> usize {
        let n = self.noghost_shape;
        let g = self.ghost_sizes;
        let origin = match pass {
            ExchangePass::YForward | ExchangePass::XForward => Coord2D::new(0, 0),
            ExchangePass::YBackward => Coord2D::new(n.y - g.y, 0),
            ExchangePass::XBackward => Coord2D::new(0, n.x - g.x),
        };
        self.noghost.index(origin.y, origin.x)
    }

    /// Buffer offset of the ghost band filled by `pass`.
    pub fn recv_offset(&self, pass: ExchangePass) -> usize {
        self.ghost_region(pass.recv_from()).offset
    }
}
