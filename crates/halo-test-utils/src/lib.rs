//! Test utilities for halo2d development.
//!
//! - [`run_ranks`] / [`run_fields`]: run a closure on every rank of a
//!   fresh [`LocalUniverse`](halo_comm::LocalUniverse).
//! - [`fixtures`]: deterministic global fills and ghost checks.
//! - [`stages`]: a reference diffusion [`Solver`](halo_sim::Solver) and
//!   simple initializers and observers.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;
pub mod stages;

use std::sync::Arc;

use halo_comm::{Communicator, LocalUniverse};
use halo_field::{DistributedField, FieldConfig};

pub use fixtures::{assert_ghosts_match, fill_global, ghost_source, global_value};
pub use stages::{Diffusion, FnInitializer, Observation, RecordingObserver};

/// Run `f` once per rank on `size` threads and collect the results in
/// rank order.
pub fn run_ranks<F, R>(size: usize, f: F) -> Vec<R>
where
    F: Fn(Arc<dyn Communicator>) -> R + Sync,
    R: Send,
{
    LocalUniverse::run(size, |comm| f(comm.into_shared()))
}

/// Build a field from `config` on every rank of a universe sized to
/// `config.dist_shape` and run `f` with it.
///
/// Panics if construction fails on any rank.
pub fn run_fields<F, R>(config: &FieldConfig, f: F) -> Vec<R>
where
    F: Fn(DistributedField) -> R + Sync,
    R: Send,
{
    run_ranks(config.dist_shape.count(), |comm| {
        let rank = comm.rank();
        match DistributedField::new(comm, config) {
            Ok(field) => f(field),
            Err(e) => panic!("rank {rank}: field construction failed: {e}"),
        }
    })
}
