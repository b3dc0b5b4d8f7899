//! Error types for process-grid construction.

use std::error::Error;
use std::fmt;

use halo_comm::CommError;
use halo_core::Shape2D;

/// Errors arising while establishing a process grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TopologyError {
    /// The requested shape has a zero extent.
    EmptyAxis {
        /// The requested shape.
        requested: Shape2D,
    },
    /// `Py * Px` does not equal the communicator size.
    SizeMismatch {
        /// The requested shape.
        requested: Shape2D,
        /// Communicator size.
        size: usize,
    },
    /// Another rank asked for a different shape.
    Inconsistent {
        /// The disagreeing rank.
        rank: usize,
        /// Shape requested locally.
        requested: Shape2D,
        /// Shape the other rank requested.
        theirs: Shape2D,
    },
    /// Shape agreement messages could not be exchanged.
    Comm(CommError),
}

impl fmt::Display for TopologyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyAxis { requested } => {
                write!(f, "process grid {requested} has an empty axis")
            }
            Self::SizeMismatch { requested, size } => {
                write!(
                    f,
                    "process grid {requested} needs {} ranks, communicator has {size}",
                    requested.count()
                )
            }
            Self::Inconsistent {
                rank,
                requested,
                theirs,
            } => {
                write!(
                    f,
                    "rank {rank} requested process grid {theirs}, this rank requested {requested}"
                )
            }
            Self::Comm(e) => write!(f, "communication: {e}"),
        }
    }
}

impl Error for TopologyError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Comm(e) => Some(e),
            _ => None,
        }
    }
}

impl From<CommError> for TopologyError {
    fn from(e: CommError) -> Self {
        Self::Comm(e)
    }
}
