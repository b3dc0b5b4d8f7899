//! Field construction parameters.

use halo_core::{Dim2D, Shape2D};
use halo_grid::TopologyError;

use crate::error::FieldError;

/// What to do when a global extent does not divide evenly over the
/// process grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RemainderPolicy {
    /// Refuse to build the field.
    #[default]
    Reject,
    /// Give every rank `global / procs` cells and drop the remainder
    /// rows/columns from the global array.
    Truncate,
}

/// Parameters of a [`DistributedField`](crate::DistributedField).
///
/// Validated at construction; immutable afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldConfig {
    /// Number of processes along each axis.
    pub dist_shape: Shape2D,
    /// Number of grid points along each axis of the whole domain.
    pub global_shape: Shape2D,
    /// Ghost width along each axis, applied on both sides.
    pub ghost_sizes: Shape2D,
    /// Distance between two grid points along `[y, x]`.
    ///
    /// Default: `[1.0, 1.0]`.
    pub delta_space: [f64; 2],
    /// Handling of indivisible global extents. Default: `Reject`.
    pub remainder: RemainderPolicy,
}

impl FieldConfig {
    /// Default grid spacing on both axes.
    pub const DEFAULT_DELTA: f64 = 1.0;

    /// Configuration with default spacing and remainder policy.
    pub fn new(dist_shape: Shape2D, global_shape: Shape2D, ghost_sizes: Shape2D) -> Self {
        Self {
            dist_shape,
            global_shape,
            ghost_sizes,
            delta_space: [Self::DEFAULT_DELTA; 2],
            remainder: RemainderPolicy::default(),
        }
    }

    /// Replace the grid spacing.
    pub fn with_delta_space(mut self, delta_space: [f64; 2]) -> Self {
        self.delta_space = delta_space;
        self
    }

    /// Replace the remainder policy.
    pub fn with_remainder(mut self, remainder: RemainderPolicy) -> Self {
        self.remainder = remainder;
        self
    }

    /// Spacing along `dim`.
    pub fn delta(&self, dim: Dim2D) -> f64 {
        match dim {
            Dim2D::Y => self.delta_space[0],
            Dim2D::X => self.delta_space[1],
        }
    }

    /// Check the parameters that do not depend on shape arithmetic.
    ///
    /// Shape checks live in [`FieldGeometry::new`](crate::FieldGeometry::new).
    pub fn validate(&self) -> Result<(), FieldError> {
        if self.dist_shape.is_empty() {
            return Err(TopologyError::EmptyAxis {
                requested: self.dist_shape,
            }
            .into());
        }
        check_spacing(self.delta_space)
    }
}

/// Every spacing must be finite and positive.
pub(crate) fn check_spacing(delta_space: [f64; 2]) -> Result<(), FieldError> {
    for (dim, value) in Dim2D::ALL.into_iter().zip(delta_space) {
        if !value.is_finite() || value <= 0.0 {
            return Err(FieldError::InvalidSpacing { dim, value });
        }
    }
    Ok(())
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self::new(Shape2D::new(1, 1), Shape2D::new(1, 1), Shape2D::new(0, 0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let c = FieldConfig::default();
        assert!(c.validate().is_ok());
        assert_eq!(c.remainder, RemainderPolicy::Reject);
        assert_eq!(c.delta(Dim2D::X), FieldConfig::DEFAULT_DELTA);
    }

    #[test]
    fn bad_spacing_rejected() {
        let c = FieldConfig::default().with_delta_space([0.5, f64::NAN]);
        assert!(matches!(
            c.validate(),
            Err(FieldError::InvalidSpacing { dim: Dim2D::X, .. })
        ));
        let c = FieldConfig::default().with_delta_space([-1.0, 1.0]);
        assert!(matches!(
            c.validate(),
            Err(FieldError::InvalidSpacing { dim: Dim2D::Y, .. })
        ));
    }

    #[test]
    fn empty_process_grid_rejected() {
        let c = FieldConfig::new(Shape2D::new(0, 2), Shape2D::new(4, 4), Shape2D::new(1, 1));
        assert!(matches!(
            c.validate(),
            Err(FieldError::Topology(TopologyError::EmptyAxis { .. }))
        ));
    }
}
