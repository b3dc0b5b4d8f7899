//! Core types for the halo2d workspace.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! small value types every other crate speaks in: 2D shapes and
//! coordinates, the two axes, and the four compass directions used for
//! neighbour lookup and ghost bands.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod dim;
pub mod shape;

pub use dim::{Dim2D, Direction2D};
pub use shape::{Coord2D, Shape2D};
