//! Collaborator traits plugged into the [`Simulation`](crate::Simulation)
//! loop.

use halo_core::Shape2D;
use halo_field::DistributedField;

use crate::error::StageError;

/// A numerical scheme that advances a field by one time step.
///
/// # Contract
///
/// - `iter()` reads `cur`, ghosts included, and writes only the interior
///   of `next`. The driver synchronizes `cur`'s ghosts beforehand and sets
///   `next`'s time afterwards.
/// - `required_ghosts()` is called once, when the simulation is built.
///
/// # Examples
///
/// A solver that copies the interior unchanged:
///
/// ```
/// use halo_core::Shape2D;
/// use halo_field::DistributedField;
/// use halo_sim::{Solver, StageError};
///
/// struct Identity;
///
/// impl Solver for Identity {
///     fn required_ghosts(&self) -> Shape2D {
///         Shape2D::new(0, 0)
///     }
///
///     fn iter(&self, cur: &DistributedField, next: &mut DistributedField) -> Result<(), StageError> {
///         next.noghost_view_mut().copy_from(&cur.noghost_view());
///         Ok(())
///     }
/// }
/// ```
pub trait Solver {
    /// Minimum ghost widths the stencil reads.
    fn required_ghosts(&self) -> Shape2D;

    /// Advance `cur` by one step into `next`.
    fn iter(&self, cur: &DistributedField, next: &mut DistributedField) -> Result<(), StageError>;
}

/// Writes the initial state of a field.
pub trait Initializer {
    /// Fill `field`'s interior (and, if needed, its ghosts) and set its
    /// time to the start time.
    fn initial_condition(&mut self, field: &mut DistributedField) -> Result<(), StageError>;
}

/// Read-only hook invoked after initialization and after every step.
pub trait Observer {
    /// `field` is the newly current time level.
    fn updated(&mut self, field: &DistributedField) -> Result<(), StageError>;
}

impl<T: Solver + ?Sized> Solver for Box<T> {
    fn required_ghosts(&self) -> Shape2D {
        (**self).required_ghosts()
    }

    fn iter(&self, cur: &DistributedField, next: &mut DistributedField) -> Result<(), StageError> {
        (**self).iter(cur, next)
    }
}

/// Observer that ignores every update.
impl Observer for () {
    fn updated(&mut self, _field: &DistributedField) -> Result<(), StageError> {
        Ok(())
    }
}
