//! Error types for field construction and ghost synchronization.

use std::error::Error;
use std::fmt;

use halo_comm::CommError;
use halo_core::{Dim2D, Shape2D};
use halo_grid::TopologyError;

use crate::exchange::ExchangePass;

/// Errors from building a [`DistributedField`](crate::DistributedField) or
/// synchronizing its ghosts.
///
/// Everything except [`Exchange`](FieldError::Exchange) is a
/// configuration error and is reported before the field sends any
/// message.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldError {
    /// The process grid could not be established.
    Topology(TopologyError),
    /// A message-shape descriptor could not be committed.
    Descriptor(CommError),
    /// The interior block would have no cells along `dim`.
    EmptyInterior {
        /// The empty axis.
        dim: Dim2D,
        /// Global extent along `dim`.
        global: usize,
        /// Process count along `dim`.
        procs: usize,
    },
    /// The global extent along `dim` is not a multiple of the process
    /// count and the remainder policy rejects truncation.
    IndivisibleShape {
        /// The offending axis.
        dim: Dim2D,
        /// Global extent along `dim`.
        global: usize,
        /// Process count along `dim`.
        procs: usize,
    },
    /// Ghosts along `dim` are at least half the interior extent.
    GhostTooWide {
        /// The offending axis.
        dim: Dim2D,
        /// Ghost width along `dim`.
        ghost: usize,
        /// Interior extent along `dim`.
        interior: usize,
    },
    /// Grid spacing along `dim` is not finite and positive.
    InvalidSpacing {
        /// The offending axis.
        dim: Dim2D,
        /// The rejected spacing.
        value: f64,
    },
    /// A field was placed on a grid of a different shape than configured.
    GridMismatch {
        /// Shape of the supplied grid.
        grid: Shape2D,
        /// Shape in the field configuration.
        requested: Shape2D,
    },
    /// One of the four sub-exchanges of a ghost synchronization failed.
    Exchange {
        /// The failing sub-exchange.
        pass: ExchangePass,
        /// The underlying communication failure.
        source: CommError,
    },
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Topology(e) => write!(f, "topology: {e}"),
            Self::Descriptor(e) => write!(f, "descriptor: {e}"),
            Self::EmptyInterior { dim, global, procs } => {
                write!(
                    f,
                    "global extent {global} along {dim} leaves no interior cells for {procs} processes"
                )
            }
            Self::IndivisibleShape { dim, global, procs } => {
                write!(
                    f,
                    "global extent {global} along {dim} is not divisible by {procs} processes"
                )
            }
            Self::GhostTooWide {
                dim,
                ghost,
                interior,
            } => {
                write!(
                    f,
                    "ghost width {ghost} along {dim} must be less than half the interior extent {interior}"
                )
            }
            Self::InvalidSpacing { dim, value } => {
                write!(f, "grid spacing along {dim} must be finite and positive, got {value}")
            }
            Self::GridMismatch { grid, requested } => {
                write!(f, "process grid is {grid}, field configured for {requested}")
            }
            Self::Exchange { pass, source } => {
                write!(f, "ghost exchange {pass} failed: {source}")
            }
        }
    }
}

impl Error for FieldError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Topology(e) => Some(e),
            Self::Descriptor(e) => Some(e),
            Self::Exchange { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<TopologyError> for FieldError {
    fn from(e: TopologyError) -> Self {
        Self::Topology(e)
    }
}
