//! Error types for the driver and its collaborators.

use std::error::Error;
use std::fmt;

use halo_core::Coord2D;
use halo_field::FieldError;

/// Failure reported by a [`Solver`](crate::Solver),
/// [`Initializer`](crate::Initializer) or [`Observer`](crate::Observer).
#[derive(Clone, Debug, PartialEq)]
pub enum StageError {
    /// The stage could not complete.
    ExecutionFailed {
        /// Human-readable description of the failure.
        reason: String,
    },
    /// A non-finite value appeared in the interior.
    NonFinite {
        /// Local interior coordinate of the first offending cell, if known.
        cell: Option<Coord2D>,
    },
    /// A field did not meet a precondition of the stage.
    ConstraintViolation {
        /// Description of the violated constraint.
        constraint: String,
    },
}

impl fmt::Display for StageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExecutionFailed { reason } => write!(f, "execution failed: {reason}"),
            Self::NonFinite { cell: Some(cell) } => write!(f, "non-finite value at {cell}"),
            Self::NonFinite { cell: None } => write!(f, "non-finite value in interior"),
            Self::ConstraintViolation { constraint } => {
                write!(f, "constraint violated: {constraint}")
            }
        }
    }
}

impl Error for StageError {}

/// Errors from building or running a [`Simulation`](crate::Simulation).
#[derive(Clone, Debug, PartialEq)]
pub enum SimError {
    /// The field configuration was rejected before any message was sent.
    Config(FieldError),
    /// A collective field operation failed: grid establishment or a
    /// ghost exchange.
    Field(FieldError),
    /// `dt` is NaN, infinite, zero, or negative.
    InvalidTimestep {
        /// The rejected value.
        value: f64,
    },
    /// The solver failed while advancing to `step`.
    Solver {
        /// 1-based step being computed.
        step: u64,
        /// The solver's error.
        source: StageError,
    },
    /// The initializer failed.
    Initializer(StageError),
    /// The observer failed after `step` (0 for the initial state).
    Observer {
        /// Step just completed.
        step: u64,
        /// The observer's error.
        source: StageError,
    },
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "invalid field configuration: {e}"),
            Self::Field(e) => write!(f, "field operation failed: {e}"),
            Self::InvalidTimestep { value } => {
                write!(f, "timestep must be finite and positive, got {value}")
            }
            Self::Solver { step, source } => write!(f, "solver failed at step {step}: {source}"),
            Self::Initializer(e) => write!(f, "initializer failed: {e}"),
            Self::Observer { step, source } => {
                write!(f, "observer failed after step {step}: {source}")
            }
        }
    }
}

impl Error for SimError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) | Self::Field(e) => Some(e),
            Self::Solver { source, .. } | Self::Observer { source, .. } => Some(source),
            Self::Initializer(e) => Some(e),
            Self::InvalidTimestep { .. } => None,
        }
    }
}
