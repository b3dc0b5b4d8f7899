//! Error types for message passing.

use std::error::Error;
use std::fmt;

use crate::message::{Signature, Tag};

/// Errors arising from point-to-point communication or descriptor handling.
///
/// None of these are recoverable at the call site: a failed exchange
/// leaves the partner ranks in an unknown state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommError {
    /// A rank outside `[0, size)` was addressed.
    InvalidRank {
        /// The offending rank.
        rank: usize,
        /// Communicator size.
        size: usize,
    },
    /// The partner rank has gone away (its endpoint was dropped).
    Disconnected {
        /// The unreachable rank.
        peer: usize,
    },
    /// The next message from `peer` carried a different tag than expected.
    TagMismatch {
        /// The sending rank.
        peer: usize,
        /// Tag the receiver asked for.
        expected: Tag,
        /// Tag that actually arrived.
        got: Tag,
    },
    /// The received block does not have the receiver's block shape.
    ShapeMismatch {
        /// Shape the receiving descriptor describes.
        expected: Signature,
        /// Shape of the incoming payload.
        got: Signature,
    },
    /// A control message arrived where values were expected, or vice versa.
    UnexpectedPayload {
        /// What the receiver expected.
        expected: &'static str,
    },
    /// A descriptor placed at `offset` reaches past the end of the buffer.
    OutOfBounds {
        /// Start offset in the buffer.
        offset: usize,
        /// Number of elements spanned from `offset`.
        extent: usize,
        /// Buffer length.
        len: usize,
    },
    /// A descriptor layout is malformed.
    InvalidLayout {
        /// What went wrong.
        reason: String,
    },
}

impl fmt::Display for CommError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRank { rank, size } => {
                write!(f, "rank {rank} out of range for communicator of size {size}")
            }
            Self::Disconnected { peer } => write!(f, "rank {peer} is unreachable"),
            Self::TagMismatch {
                peer,
                expected,
                got,
            } => {
                write!(
                    f,
                    "message from rank {peer} has tag {got}, expected tag {expected}"
                )
            }
            Self::ShapeMismatch { expected, got } => {
                write!(f, "message shape {got} does not match descriptor {expected}")
            }
            Self::UnexpectedPayload { expected } => {
                write!(f, "unexpected payload kind, expected {expected}")
            }
            Self::OutOfBounds {
                offset,
                extent,
                len,
            } => {
                write!(
                    f,
                    "descriptor spanning {extent} elements at offset {offset} exceeds buffer of {len}"
                )
            }
            Self::InvalidLayout { reason } => write!(f, "invalid layout: {reason}"),
        }
    }
}

impl Error for CommError {}
