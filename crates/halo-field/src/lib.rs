//! Distributed 2D fields with ghost-cell synchronization.
//!
//! A [`DistributedField`] is one rank's rectangular tile of a global 2D
//! array of `f64`, stored in a single row-major buffer together with a
//! border of ghost cells. Each rank owns an equal interior block; the
//! ghosts mirror the edges of the four neighbouring blocks on a periodic
//! [`ProcessGrid`](halo_grid::ProcessGrid).
//!
//! See [`geometry`] for how the buffer is split into the interior and
//! the four ghost bands. Corner cells are never written by
//! synchronization.
//!
//! # Synchronization
//!
//! [`DistributedField::sync_ghosts`] runs four paired exchanges in a
//! fixed order ([`ExchangePass::ORDER`]): both y passes, then both x
//! passes. Every rank runs the same sequence, so each send is matched by
//! the corresponding receive on the neighbour.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod exchange;
pub mod field;
pub mod geometry;
pub mod metrics;
pub mod region;
pub mod view;

pub use config::{FieldConfig, RemainderPolicy};
pub use error::FieldError;
pub use exchange::ExchangePass;
pub use field::DistributedField;
pub use geometry::FieldGeometry;
pub use metrics::SyncMetrics;
pub use region::Region;
pub use view::{View, ViewMut};
