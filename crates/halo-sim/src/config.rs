//! Simulation configuration.

use halo_field::{FieldConfig, FieldGeometry};

use crate::error::SimError;

/// Default timestep.
pub const DEFAULT_DT: f64 = 0.1;

/// Default number of steps.
pub const DEFAULT_STEPS: u64 = 10;

/// Parameters of a [`Simulation`](crate::Simulation) run.
#[derive(Clone, Debug, PartialEq)]
pub struct SimConfig {
    /// Field layout. Ghost widths are widened to the solver's
    /// requirement when the simulation is built.
    pub field: FieldConfig,
    /// Simulated time advanced per step. Default: [`DEFAULT_DT`].
    pub dt: f64,
    /// Number of steps [`run`](crate::Simulation::run) performs.
    /// Default: [`DEFAULT_STEPS`].
    pub steps: u64,
}

impl SimConfig {
    /// Configuration with default `dt` and `steps`.
    pub fn new(field: FieldConfig) -> Self {
        Self {
            field,
            dt: DEFAULT_DT,
            steps: DEFAULT_STEPS,
        }
    }

    /// Set the timestep.
    pub fn with_dt(mut self, dt: f64) -> Self {
        self.dt = dt;
        self
    }

    /// Set the step count.
    pub fn with_steps(mut self, steps: u64) -> Self {
        self.steps = steps;
        self
    }

    /// Check everything that can be checked without communicating.
    pub fn validate(&self) -> Result<(), SimError> {
        self.check().map(drop)
    }

    /// [`validate`](Self::validate), keeping the derived geometry.
    pub(crate) fn check(&self) -> Result<FieldGeometry, SimError> {
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(SimError::InvalidTimestep { value: self.dt });
        }
        self.field.validate().map_err(SimError::Config)?;
        FieldGeometry::new(&self.field).map_err(SimError::Config)
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self::new(FieldConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use halo_core::Shape2D;
    use halo_field::FieldError;

    #[test]
    fn default_is_valid() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_bad_timestep() {
        for dt in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = SimConfig::default().with_dt(dt).validate().unwrap_err();
            assert!(matches!(err, SimError::InvalidTimestep { .. }), "dt={dt}");
        }
    }

    #[test]
    fn field_errors_are_config_errors() {
        let field = FieldConfig::new(Shape2D::new(1, 1), Shape2D::new(4, 4), Shape2D::new(1, 1))
            .with_delta_space([0.0, 1.0]);
        let err = SimConfig::new(field).validate().unwrap_err();
        assert!(matches!(
            err,
            SimError::Config(FieldError::InvalidSpacing { .. })
        ));
    }
}
