//! 2D Cartesian process grids for halo2d.
//!
//! A [`ProcessGrid`] arranges the ranks of a [`Communicator`] as a
//! `Py x Px` torus, row-major (`rank = cy * Px + cx`), and answers
//! neighbour queries in the four [`Direction2D`]s with periodic
//! wraparound. Every rank always has four neighbours, possibly itself.
//!
//! [`Communicator`]: halo_comm::Communicator
//! [`Direction2D`]: halo_core::Direction2D

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod grid;

pub use error::TopologyError;
pub use grid::{balanced_shape, ProcessGrid};
