//! The time-stepping loop.

use std::sync::Arc;

use halo_comm::Communicator;
use halo_core::Shape2D;
use halo_field::{DistributedField, FieldConfig, FieldGeometry, SyncMetrics};
use halo_grid::ProcessGrid;
use log::{debug, info};

use crate::config::SimConfig;
use crate::error::SimError;
use crate::stage::{Initializer, Observer, Solver};

/// Outcome of a completed [`Simulation::run`].
#[derive(Clone, Debug, PartialEq)]
pub struct RunSummary {
    /// Steps taken.
    pub steps: u64,
    /// Time of the final current field.
    pub final_time: f64,
    /// Ghost synchronization counters summed over both time levels.
    pub sync: SyncMetrics,
}

/// Two time levels of one distributed field plus the solver that
/// advances them.
///
/// Construction is collective over the communicator, as is every step of
/// [`run`](Simulation::run).
#[derive(Debug)]
pub struct Simulation<S> {
    solver: S,
    config: SimConfig,
    cur: DistributedField,
    next: DistributedField,
}

impl<S: Solver> Simulation<S> {
    /// Build the grid and both fields.
    ///
    /// Ghost widths in `config.field` are widened per axis to at least
    /// `solver.required_ghosts()`.
    pub fn new(
        comm: Arc<dyn Communicator>,
        mut config: SimConfig,
        solver: S,
    ) -> Result<Self, SimError> {
        config.field.ghost_sizes = widen(config.field.ghost_sizes, solver.required_ghosts());
        let geometry = config.check()?;

        let grid = ProcessGrid::new(comm, config.field.dist_shape)
            .map_err(|e| SimError::Field(e.into()))?;
        let grid = Arc::new(grid);
        let delta_space = config.field.delta_space;
        let cur = DistributedField::with_geometry(Arc::clone(&grid), geometry.clone(), delta_space)
            .map_err(SimError::Field)?;
        let next =
            DistributedField::with_geometry(grid, geometry, delta_space).map_err(SimError::Field)?;
        debug!(
            "rank {}: simulation ready, dt={} steps={} ghosts={}",
            cur.distribution().rank(),
            config.dt,
            config.steps,
            config.field.ghost_sizes
        );
        Ok(Self {
            solver,
            config,
            cur,
            next,
        })
    }

    /// Initialize, then advance `config.steps` times.
    ///
    /// The observer sees the initial state and the new current field
    /// after each step. The first error aborts the run; as with any
    /// collective failure, the other ranks will observe it as a
    /// communication error at their next exchange.
    pub fn run<I, O>(&mut self, initializer: &mut I, observer: &mut O) -> Result<RunSummary, SimError>
    where
        I: Initializer + ?Sized,
        O: Observer + ?Sized,
    {
        initializer
            .initial_condition(&mut self.cur)
            .map_err(SimError::Initializer)?;
        observer
            .updated(&self.cur)
            .map_err(|source| SimError::Observer { step: 0, source })?;

        for step in 1..=self.config.steps {
            self.step(step)?;
            observer
                .updated(&self.cur)
                .map_err(|source| SimError::Observer { step, source })?;
        }

        let summary = RunSummary {
            steps: self.config.steps,
            final_time: self.cur.time(),
            sync: self.sync_metrics(),
        };
        if self.cur.distribution().is_root() {
            info!(
                "run finished: {} steps, t={}, {} syncs",
                summary.steps, summary.final_time, summary.sync.syncs
            );
        }
        Ok(summary)
    }

    fn step(&mut self, step: u64) -> Result<(), SimError> {
        self.cur.sync_ghosts().map_err(SimError::Field)?;
        self.solver
            .iter(&self.cur, &mut self.next)
            .map_err(|source| SimError::Solver { step, source })?;
        self.next.set_time(self.cur.time() + self.config.dt);
        self.cur.swap(&mut self.next);
        Ok(())
    }

    /// The current time level.
    pub fn current(&self) -> &DistributedField {
        &self.cur
    }

    /// Mutable current time level, for setting state outside
    /// [`run`](Simulation::run).
    pub fn current_mut(&mut self) -> &mut DistributedField {
        &mut self.cur
    }

    /// The configuration in effect, ghost widths already widened.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Field layout in effect.
    pub fn field_config(&self) -> &FieldConfig {
        &self.config.field
    }

    /// Geometry shared by both time levels.
    pub fn geometry(&self) -> &FieldGeometry {
        self.cur.geometry()
    }

    /// The solver.
    pub fn solver(&self) -> &S {
        &self.solver
    }

    /// Synchronization counters summed over both time levels.
    pub fn sync_metrics(&self) -> SyncMetrics {
        let (a, b) = (self.cur.metrics(), self.next.metrics());
        SyncMetrics {
            syncs: a.syncs + b.syncs,
            messages_sent: a.messages_sent + b.messages_sent,
            values_sent: a.values_sent + b.values_sent,
            last_sync_us: a.last_sync_us.max(b.last_sync_us),
            total_sync_us: a.total_sync_us + b.total_sync_us,
        }
    }
}

fn widen(configured: Shape2D, required: Shape2D) -> Shape2D {
    Shape2D::new(configured.y.max(required.y), configured.x.max(required.x))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StageError;
    use halo_comm::LocalUniverse;
    use halo_core::Direction2D;
    use proptest::prelude::*;

    #[derive(Debug)]
    struct Shift;

    impl Solver for Shift {
        fn required_ghosts(&self) -> Shape2D {
            Shape2D::new(0, 1)
        }

        fn iter(&self, cur: &DistributedField, next: &mut DistributedField) -> Result<(), StageError> {
            // Move every row one cell to the right, periodically.
            let full = cur.full_view();
            let g = cur.ghost_sizes();
            next.noghost_view_mut()
                .fill_with(|i, j| full[(i + g.y, j + g.x - 1)]);
            Ok(())
        }
    }

    struct Ramp;

    impl Initializer for Ramp {
        fn initial_condition(&mut self, field: &mut DistributedField) -> Result<(), StageError> {
            field.noghost_view_mut().fill_with(|_, j| j as f64);
            field.set_time(0.0);
            Ok(())
        }
    }

    fn single_comm() -> Arc<dyn Communicator> {
        LocalUniverse::new(1).into_comms().remove(0).into_shared()
    }

    fn config(steps: u64) -> SimConfig {
        let field = FieldConfig::new(Shape2D::new(1, 1), Shape2D::new(3, 4), Shape2D::new(0, 0));
        SimConfig::new(field).with_dt(0.5).with_steps(steps)
    }

    #[test]
    fn ghosts_widened_to_solver_requirement() {
        let sim = Simulation::new(single_comm(), config(1), Shift).unwrap();
        assert_eq!(sim.current().ghost_sizes(), Shape2D::new(0, 1));
        assert_eq!(sim.field_config().ghost_sizes, Shape2D::new(0, 1));
        assert_eq!(
            sim.current().ghost_view(Direction2D::Left).shape(),
            Shape2D::new(3, 1)
        );
    }

    #[test]
    fn run_advances_time_and_state() {
        let mut sim = Simulation::new(single_comm(), config(4), Shift).unwrap();
        let summary = sim.run(&mut Ramp, &mut ()).unwrap();
        assert_eq!(summary.steps, 4);
        assert_eq!(summary.final_time, 2.0);
        assert_eq!(summary.sync.syncs, 4);
        // Four shifts around a ring of four returns the ramp.
        let row: Vec<f64> = sim.current().noghost_view().rows().next().unwrap().to_vec();
        assert_eq!(row, vec![0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn one_step_shifts_right() {
        let mut sim = Simulation::new(single_comm(), config(1), Shift).unwrap();
        sim.run(&mut Ramp, &mut ()).unwrap();
        let row: Vec<f64> = sim.current().noghost_view().rows().next().unwrap().to_vec();
        assert_eq!(row, vec![3.0, 0.0, 1.0, 2.0]);
    }

    #[test]
    fn zero_steps_only_initializes() {
        let mut sim = Simulation::new(single_comm(), config(0), Shift).unwrap();
        let summary = sim.run(&mut Ramp, &mut ()).unwrap();
        assert_eq!(summary.steps, 0);
        assert_eq!(summary.sync.syncs, 0);
        assert_eq!(sim.current().noghost_view()[(2, 3)], 3.0);
    }

    #[test]
    fn invalid_timestep_rejected_before_grid() {
        let err = Simulation::new(single_comm(), config(1).with_dt(0.0), Shift).unwrap_err();
        assert_eq!(err, SimError::InvalidTimestep { value: 0.0 });
    }

    #[test]
    fn solver_widening_can_make_ghosts_too_wide() {
        #[derive(Debug)]
        struct Wide;
        impl Solver for Wide {
            fn required_ghosts(&self) -> Shape2D {
                Shape2D::new(2, 2)
            }
            fn iter(&self, _: &DistributedField, _: &mut DistributedField) -> Result<(), StageError> {
                Ok(())
            }
        }
        let err = Simulation::new(single_comm(), config(1), Wide).unwrap_err();
        assert!(matches!(
            err,
            SimError::Config(halo_field::FieldError::GhostTooWide { .. })
        ));
    }

    #[test]
    fn solver_error_carries_step() {
        #[derive(Debug)]
        struct FailSecond(std::cell::Cell<u32>);
        impl Solver for FailSecond {
            fn required_ghosts(&self) -> Shape2D {
                Shape2D::new(1, 1)
            }
            fn iter(&self, _: &DistributedField, _: &mut DistributedField) -> Result<(), StageError> {
                let n = self.0.get() + 1;
                self.0.set(n);
                if n == 2 {
                    return Err(StageError::ExecutionFailed {
                        reason: "diverged".into(),
                    });
                }
                Ok(())
            }
        }
        let mut sim =
            Simulation::new(single_comm(), config(5), FailSecond(std::cell::Cell::new(0))).unwrap();
        let err = sim.run(&mut Ramp, &mut ()).unwrap_err();
        assert!(matches!(err, SimError::Solver { step: 2, .. }));
    }

    proptest! {
        #[test]
        fn widened_ghosts_cover_both_and_validate(
            ny in 1usize..24,
            nx in 1usize..24,
            cy in 0usize..12,
            cx in 0usize..12,
            ry in 0usize..12,
            rx in 0usize..12,
        ) {
            let w = widen(Shape2D::new(cy, cx), Shape2D::new(ry, rx));
            prop_assert_eq!(w, Shape2D::new(cy.max(ry), cx.max(rx)));

            let field = FieldConfig::new(Shape2D::new(1, 1), Shape2D::new(ny, nx), w);
            let fits = 2 * w.y < ny && 2 * w.x < nx;
            prop_assert_eq!(SimConfig::new(field).validate().is_ok(), fits);
        }
    }
}
