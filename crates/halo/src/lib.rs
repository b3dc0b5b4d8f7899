//! halo2d: distributed 2D fields with ghost-cell exchange.
//!
//! This is the facade crate that re-exports the public API of every
//! halo2d sub-crate. For most users, adding `halo` as a single dependency
//! is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use halo::prelude::*;
//!
//! // Copy the interior forward unchanged.
//! struct Hold;
//! impl Solver for Hold {
//!     fn required_ghosts(&self) -> Shape2D { Shape2D::new(1, 1) }
//!     fn iter(&self, cur: &DistributedField, next: &mut DistributedField) -> Result<(), StageError> {
//!         next.noghost_view_mut().copy_from(&cur.noghost_view());
//!         Ok(())
//!     }
//! }
//!
//! struct Ones;
//! impl Initializer for Ones {
//!     fn initial_condition(&mut self, field: &mut DistributedField) -> Result<(), StageError> {
//!         field.noghost_view_mut().fill(1.0);
//!         Ok(())
//!     }
//! }
//!
//! // Four ranks on a 2x2 torus, each owning a 4x4 block of an 8x8 field.
//! let field = FieldConfig::new(Shape2D::new(2, 2), Shape2D::new(8, 8), Shape2D::new(0, 0));
//! let config = SimConfig::new(field).with_dt(0.5).with_steps(3);
//! let times = LocalUniverse::run(4, |comm| {
//!     let mut sim = Simulation::new(comm.into_shared(), config.clone(), Hold).unwrap();
//!     sim.run(&mut Ones, &mut ()).unwrap().final_time
//! });
//! assert_eq!(times, vec![1.5; 4]);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `halo-core` | Shapes, coordinates, axes, directions |
//! | [`comm`] | `halo-comm` | Communicator trait, message descriptors, thread-per-rank runtime |
//! | [`grid`] | `halo-grid` | Periodic Cartesian process grid |
//! | [`field`] | `halo-field` | Distributed fields, strided views, ghost synchronization |
//! | [`sim`] | `halo-sim` | Solver/initializer/observer traits and the time-stepping driver |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Shapes, coordinates, axes and directions (`halo-core`).
pub use halo_core as types;

/// Message passing between ranks (`halo-comm`).
///
/// The [`comm::Communicator`] trait is the seam to a messaging runtime;
/// [`comm::LocalUniverse`] runs every rank as a thread in one process.
pub use halo_comm as comm;

/// Periodic Cartesian process grids (`halo-grid`).
pub use halo_grid as grid;

/// Distributed fields and ghost synchronization (`halo-field`).
///
/// [`field::DistributedField`] is the central type; its views are
/// [`field::View`] and [`field::ViewMut`].
pub use halo_field as field;

/// The time-stepping driver (`halo-sim`).
pub use halo_sim as sim;

/// Common imports for typical halo2d usage.
///
/// ```rust
/// use halo::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use halo_core::{Coord2D, Dim2D, Direction2D, Shape2D};

    // Messaging
    pub use halo_comm::{Communicator, LocalComm, LocalUniverse};

    // Topology
    pub use halo_grid::ProcessGrid;

    // Fields
    pub use halo_field::{DistributedField, FieldConfig, RemainderPolicy, View, ViewMut};

    // Driver
    pub use halo_sim::{Initializer, Observer, RunSummary, SimConfig, Simulation, Solver};

    // Errors
    pub use halo_comm::CommError;
    pub use halo_field::FieldError;
    pub use halo_grid::TopologyError;
    pub use halo_sim::{SimError, StageError};
}
