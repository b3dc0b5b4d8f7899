//! Reference collaborators for driving a [`Simulation`](halo_sim::Simulation).

use halo_core::{Coord2D, Dim2D, Shape2D};
use halo_field::DistributedField;
use halo_sim::{Initializer, Observer, Solver, StageError};

use crate::fixtures::fill_global;

/// Explicit 5-point diffusion: `u' = u + k * laplacian(u)`.
///
/// `coefficient` folds the diffusivity and the timestep together. The
/// scheme is stable for `coefficient * (1/dy² + 1/dx²) <= 0.5`. On a
/// periodic grid it conserves the interior sum up to rounding.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Diffusion {
    pub coefficient: f64,
}

impl Diffusion {
    pub fn new(coefficient: f64) -> Self {
        Self { coefficient }
    }
}

impl Solver for Diffusion {
    fn required_ghosts(&self) -> Shape2D {
        Shape2D::new(1, 1)
    }

    fn iter(&self, cur: &DistributedField, next: &mut DistributedField) -> Result<(), StageError> {
        let g = cur.ghost_sizes();
        if g.y == 0 || g.x == 0 {
            return Err(StageError::ConstraintViolation {
                constraint: format!("diffusion needs ghosts of at least 1x1, field has {g}"),
            });
        }
        let (ky, kx) = (
            self.coefficient / (cur.delta(Dim2D::Y) * cur.delta(Dim2D::Y)),
            self.coefficient / (cur.delta(Dim2D::X) * cur.delta(Dim2D::X)),
        );
        let u = cur.full_view();
        next.noghost_view_mut().fill_with(|i, j| {
            let (y, x) = (i + g.y, j + g.x);
            let c = u[(y, x)];
            let lap_y = u[(y - 1, x)] + u[(y + 1, x)] - 2.0 * c;
            let lap_x = u[(y, x - 1)] + u[(y, x + 1)] - 2.0 * c;
            c + ky * lap_y + kx * lap_x
        });
        Ok(())
    }
}

/// Fills the interior from a function of global coordinates and sets
/// the start time.
pub struct FnInitializer<F> {
    f: F,
    start_time: f64,
}

impl<F: Fn(usize, usize) -> f64> FnInitializer<F> {
    pub fn new(f: F) -> Self {
        Self { f, start_time: 0.0 }
    }

    pub fn starting_at(mut self, start_time: f64) -> Self {
        self.start_time = start_time;
        self
    }
}

impl<F: Fn(usize, usize) -> f64> Initializer for FnInitializer<F> {
    fn initial_condition(&mut self, field: &mut DistributedField) -> Result<(), StageError> {
        fill_global(field, &self.f);
        field.set_time(self.start_time);
        Ok(())
    }
}

/// One observer callback as seen by [`RecordingObserver`].
#[derive(Clone, Debug, PartialEq)]
pub struct Observation {
    pub time: f64,
    /// Sum over this rank's interior.
    pub interior_sum: f64,
    /// This rank's interior, row-major.
    pub interior: Vec<f64>,
    pub global_origin: Coord2D,
}

/// Records every update and optionally rejects non-finite interiors.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    pub observations: Vec<Observation>,
    pub reject_non_finite: bool,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&Observation> {
        self.observations.last()
    }
}

impl Observer for RecordingObserver {
    fn updated(&mut self, field: &DistributedField) -> Result<(), StageError> {
        let view = field.noghost_view();
        let interior = view.to_vec();
        if self.reject_non_finite {
            if let Some(k) = interior.iter().position(|v| !v.is_finite()) {
                return Err(StageError::NonFinite {
                    cell: Some(Coord2D::from_linear(k, view.shape())),
                });
            }
        }
        self.observations.push(Observation {
            time: field.time(),
            interior_sum: interior.iter().sum(),
            interior,
            global_origin: field.global_origin(),
        });
        Ok(())
    }
}
