//! Time-stepping driver for halo2d.
//!
//! A [`Simulation`] owns two [`DistributedField`]s on one process grid,
//! the current and the next time level, and advances them with a
//! user-supplied [`Solver`]:
//!
//! ```text
//! initializer ──► cur ─┬─► sync_ghosts ─► solver.iter(cur, next) ─► swap ─► observer
//!                      └──────────────────────── steps ─────────────────────┘
//! ```
//!
//! The three collaborator traits ([`Solver`], [`Initializer`],
//! [`Observer`]) are the only extension points; numerical schemes live
//! outside this crate.
//!
//! [`DistributedField`]: halo_field::DistributedField

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod simulation;
pub mod stage;

pub use config::SimConfig;
pub use error::{SimError, StageError};
pub use simulation::{RunSummary, Simulation};
pub use stage::{Initializer, Observer, Solver};
