//! Benchmark profiles for halo2d.
//!
//! - [`reference_profile`]: 256x256 on a 2x2 grid, ghost width 1
//! - [`wide_ghost_profile`]: 512x512 on a 2x2 grid, ghost width 4
//! - [`single_rank_profile`]: one rank, self-exchange only

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::sync::Arc;

use halo_comm::{Communicator, LocalUniverse};
use halo_core::Shape2D;
use halo_field::{DistributedField, FieldConfig, FieldError};

/// 256x256 cells over 4 ranks with a one-cell halo (5-point stencil).
pub fn reference_profile() -> FieldConfig {
    FieldConfig::new(Shape2D::new(2, 2), Shape2D::square(256), Shape2D::square(1))
}

/// 512x512 cells over 4 ranks with a four-cell halo (high-order stencil).
pub fn wide_ghost_profile() -> FieldConfig {
    FieldConfig::new(Shape2D::new(2, 2), Shape2D::square(512), Shape2D::square(4))
}

/// `side x side` cells on a single rank with a one-cell halo.
pub fn single_rank_profile(side: usize) -> FieldConfig {
    FieldConfig::new(Shape2D::new(1, 1), Shape2D::square(side), Shape2D::square(1))
}

/// Build a field for `config` on a fresh single-rank universe.
///
/// `config.dist_shape` must be `1x1`.
pub fn single_rank_field(config: &FieldConfig) -> Result<DistributedField, FieldError> {
    let comm: Arc<dyn Communicator> = LocalUniverse::new(1)
        .into_comms()
        .remove(0)
        .into_shared();
    DistributedField::new(comm, config)
}
