//! The distributed 2D field.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use halo_comm::{Communicator, Datatype, Payload};
use halo_core::{Coord2D, Dim2D, Direction2D, Shape2D};
use halo_grid::ProcessGrid;
use log::{debug, trace};

use crate::config::{check_spacing, FieldConfig};
use crate::error::FieldError;
use crate::exchange::ExchangePass;
use crate::geometry::FieldGeometry;
use crate::metrics::SyncMetrics;
use crate::view::{View, ViewMut};

/// One rank's tile of a global 2D array of `f64`, with a ghost border.
///
/// The field owns a single contiguous row-major buffer of
/// `full_shape().count()` values. Six views are carved out of it: the full
/// block, the interior, and one ghost band per [`Direction2D`]. Views are
/// borrowed from the field on each call and carry only index arithmetic,
/// so moving or [swapping](DistributedField::swap) a field never leaves a
/// view pointing at the wrong buffer.
///
/// [`sync_ghosts`](DistributedField::sync_ghosts) fills the four ghost
/// bands from the neighbouring ranks' interiors, with periodic
/// wraparound.
///
/// # Examples
///
/// ```
/// use halo_comm::LocalUniverse;
/// use halo_core::{Direction2D, Shape2D};
/// use halo_field::{DistributedField, FieldConfig};
///
/// let config = FieldConfig::new(Shape2D::new(1, 1), Shape2D::new(4, 4), Shape2D::new(1, 1));
/// let comm = LocalUniverse::new(1).into_comms().remove(0).into_shared();
/// let mut field = DistributedField::new(comm, &config).unwrap();
///
/// field.noghost_view_mut().fill_with(|i, _| i as f64);
/// field.sync_ghosts().unwrap();
///
/// // The up ghost wraps around to the interior's first row.
/// assert_eq!(field.ghost_view(Direction2D::Up)[(0, 0)], 0.0);
/// // The down ghost wraps around to the interior's last row.
/// assert_eq!(field.ghost_view(Direction2D::Down)[(0, 0)], 3.0);
/// ```
pub struct DistributedField {
    grid: Arc<ProcessGrid>,
    geometry: FieldGeometry,
    data: Vec<f64>,
    time: f64,
    delta_space: [f64; 2],
    ghost_row: Datatype,
    ghost_col: Datatype,
    metrics: SyncMetrics,
}

impl DistributedField {
    /// Build a field and its process grid.
    ///
    /// Collective over `comm`. All configuration errors are reported
    /// before the grid is established, so no rank sends anything for an
    /// invalid configuration.
    pub fn new(comm: Arc<dyn Communicator>, config: &FieldConfig) -> Result<Self, FieldError> {
        config.validate()?;
        let geometry = FieldGeometry::new(config)?;
        let grid = ProcessGrid::new(comm, config.dist_shape)?;
        Self::with_geometry(Arc::new(grid), geometry, config.delta_space)
    }

    /// Build a field on an already established process grid.
    ///
    /// Lets several fields of one rank (typically the current and next
    /// time level) share a topology. Not collective.
    pub fn on_grid(grid: Arc<ProcessGrid>, config: &FieldConfig) -> Result<Self, FieldError> {
        config.validate()?;
        if grid.shape() != config.dist_shape {
            return Err(FieldError::GridMismatch {
                grid: grid.shape(),
                requested: config.dist_shape,
            });
        }
        let geometry = FieldGeometry::new(config)?;
        Self::with_geometry(grid, geometry, config.delta_space)
    }

    /// Build a field from a precomputed geometry.
    ///
    /// For callers that derive one [`FieldGeometry`] and build several
    /// fields from it. Not collective.
    pub fn with_geometry(
        grid: Arc<ProcessGrid>,
        geometry: FieldGeometry,
        delta_space: [f64; 2],
    ) -> Result<Self, FieldError> {
        check_spacing(delta_space)?;
        if grid.shape() != geometry.dist_shape() {
            return Err(FieldError::GridMismatch {
                grid: grid.shape(),
                requested: geometry.dist_shape(),
            });
        }
        let (ghost_row, ghost_col) = commit_layouts(grid.communicator().as_ref(), &geometry)?;
        debug!(
            "rank {}: field interior {} ghosts {} full {} at global {}",
            grid.rank(),
            geometry.noghost_shape(),
            geometry.ghost_sizes(),
            geometry.full_shape(),
            geometry.global_origin(grid.coords()),
        );
        Ok(Self {
            data: vec![0.0; geometry.full_shape().count()],
            grid,
            geometry,
            time: 0.0,
            delta_space,
            ghost_row,
            ghost_col,
            metrics: SyncMetrics::default(),
        })
    }

    /// Deep copy with freshly committed message descriptors.
    ///
    /// Data, time, and spacing are copied; metrics start from zero.
    pub fn try_clone(&self) -> Result<Self, FieldError> {
        let (ghost_row, ghost_col) =
            commit_layouts(self.grid.communicator().as_ref(), &self.geometry)?;
        Ok(Self {
            grid: Arc::clone(&self.grid),
            geometry: self.geometry.clone(),
            data: self.data.clone(),
            time: self.time,
            delta_space: self.delta_space,
            ghost_row,
            ghost_col,
            metrics: SyncMetrics::default(),
        })
    }

    /// Exchange everything with `other`: buffers, grids, geometry,
    /// descriptors, time, and metrics.
    ///
    /// Views hold no addresses, so afterwards each field behaves exactly
    /// as if it had been built with the other's parameters.
    pub fn swap(&mut self, other: &mut DistributedField) {
        std::mem::swap(self, other);
    }

    // ── Views ──────────────────────────────────────────────────────

    /// The whole local block, ghosts included.
    pub fn full_view(&self) -> View<'_> {
        View::new(&self.data, self.geometry.full_region())
    }

    /// Mutable whole local block.
    pub fn full_view_mut(&mut self) -> ViewMut<'_> {
        ViewMut::new(&mut self.data, self.geometry.full_region())
    }

    /// The interior (cells this rank owns).
    pub fn noghost_view(&self) -> View<'_> {
        View::new(&self.data, self.geometry.noghost_region())
    }

    /// Mutable interior.
    pub fn noghost_view_mut(&mut self) -> ViewMut<'_> {
        ViewMut::new(&mut self.data, self.geometry.noghost_region())
    }

    /// The ghost band on side `dir`.
    ///
    /// `Down` is the low-row band and `Up` the high-row band; each holds
    /// a copy of the neighbouring rank's interior in that direction.
    pub fn ghost_view(&self, dir: Direction2D) -> View<'_> {
        View::new(&self.data, self.geometry.ghost_region(dir))
    }

    /// Mutable ghost band on side `dir`.
    pub fn ghost_view_mut(&mut self, dir: Direction2D) -> ViewMut<'_> {
        ViewMut::new(&mut self.data, self.geometry.ghost_region(dir))
    }

    // ── Shapes and metadata ────────────────────────────────────────

    /// Interior extents.
    pub fn noghost_shape(&self) -> Shape2D {
        self.geometry.noghost_shape()
    }

    /// Interior plus ghosts.
    pub fn full_shape(&self) -> Shape2D {
        self.geometry.full_shape()
    }

    /// Ghost widths.
    pub fn ghost_sizes(&self) -> Shape2D {
        self.geometry.ghost_sizes()
    }

    /// Global shape covered by all ranks' interiors.
    pub fn global_shape(&self) -> Shape2D {
        self.geometry.global_shape()
    }

    /// Global coordinate of this rank's interior cell `(0, 0)`.
    pub fn global_origin(&self) -> Coord2D {
        self.geometry.global_origin(self.grid.coords())
    }

    /// Local geometry.
    pub fn geometry(&self) -> &FieldGeometry {
        &self.geometry
    }

    /// The simulated time this data is valid for.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Set the simulated time this data is valid for.
    pub fn set_time(&mut self, time: f64) {
        self.time = time;
    }

    /// Grid spacing along `[y, x]`.
    pub fn delta_space(&self) -> [f64; 2] {
        self.delta_space
    }

    /// Grid spacing along `dim`.
    pub fn delta(&self, dim: Dim2D) -> f64 {
        match dim {
            Dim2D::Y => self.delta_space[0],
            Dim2D::X => self.delta_space[1],
        }
    }

    /// The process grid this field is distributed over.
    pub fn distribution(&self) -> &ProcessGrid {
        &self.grid
    }

    /// Shared handle to the process grid, for building sibling fields.
    pub fn grid(&self) -> &Arc<ProcessGrid> {
        &self.grid
    }

    /// Synchronization counters.
    pub fn metrics(&self) -> &SyncMetrics {
        &self.metrics
    }

    // ── Ghost synchronization ──────────────────────────────────────

    /// Fill the four ghost bands from the neighbours' interiors.
    ///
    /// Collective with the four neighbours: blocks until each paired
    /// exchange has been matched. Writes only inside the ghost views.
    /// Any failure is fatal for the run; ghost bands may be partially
    /// updated when an error is returned.
    pub fn sync_ghosts(&mut self) -> Result<(), FieldError> {
        let started = Instant::now();
        let mut values = 0u64;
        for pass in ExchangePass::ORDER {
            values += self.exchange(pass)? as u64;
        }
        let elapsed = started.elapsed().as_micros() as u64;
        self.metrics.syncs += 1;
        self.metrics.messages_sent += ExchangePass::ORDER.len() as u64;
        self.metrics.values_sent += values;
        self.metrics.last_sync_us = elapsed;
        self.metrics.total_sync_us += elapsed;
        trace!(
            "rank {}: ghosts synced at t={} ({values} values, {elapsed}us)",
            self.grid.rank(),
            self.time
        );
        Ok(())
    }

    /// Run one pass; returns the number of values sent.
    fn exchange(&mut self, pass: ExchangePass) -> Result<usize, FieldError> {
        let fail = |source| FieldError::Exchange { pass, source };
        let datatype = match pass.dim() {
            Dim2D::Y => &self.ghost_row,
            Dim2D::X => &self.ghost_col,
        };
        let dest = self.grid.neighbour_rank(pass.send_to());
        let source = self.grid.neighbour_rank(pass.recv_from());

        let outgoing = datatype
            .pack(&self.data, self.geometry.send_offset(pass))
            .map_err(fail)?;
        let sent = match &outgoing {
            Payload::Values { data, .. } => data.len(),
            Payload::Control(_) => 0,
        };
        trace!(
            "rank {}: {pass} sends {sent} values to {dest}, receives from {source}",
            self.grid.rank()
        );
        let incoming = self
            .grid
            .communicator()
            .send_receive(dest, pass.tag(), outgoing, source, pass.tag())
            .map_err(fail)?;
        datatype
            .unpack(&incoming, &mut self.data, self.geometry.recv_offset(pass))
            .map_err(fail)?;
        Ok(sent)
    }
}

fn commit_layouts(
    comm: &dyn Communicator,
    geometry: &FieldGeometry,
) -> Result<(Datatype, Datatype), FieldError> {
    let row = comm
        .commit(geometry.row_ghost_layout())
        .map_err(FieldError::Descriptor)?;
    let col = comm
        .commit(geometry.col_ghost_layout())
        .map_err(FieldError::Descriptor)?;
    Ok((row, col))
}

impl fmt::Debug for DistributedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DistributedField")
            .field("rank", &self.grid.rank())
            .field("noghost_shape", &self.geometry.noghost_shape())
            .field("ghost_sizes", &self.geometry.ghost_sizes())
            .field("time", &self.time)
            .field("delta_space", &self.delta_space)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use halo_comm::LocalUniverse;

    fn single(global: Shape2D, ghost: Shape2D) -> DistributedField {
        let comm = LocalUniverse::new(1).into_comms().remove(0).into_shared();
        let config = FieldConfig::new(Shape2D::new(1, 1), global, ghost);
        DistributedField::new(comm, &config).unwrap()
    }

    #[test]
    fn construction_shapes() {
        let f = single(Shape2D::new(6, 8), Shape2D::new(2, 1));
        assert_eq!(f.noghost_shape(), Shape2D::new(6, 8));
        assert_eq!(f.full_shape(), Shape2D::new(10, 10));
        assert_eq!(f.full_view().shape(), f.full_shape());
        assert_eq!(f.ghost_view(Direction2D::Up).shape(), Shape2D::new(2, 8));
        assert_eq!(f.ghost_view(Direction2D::Left).shape(), Shape2D::new(6, 1));
        assert_eq!(f.time(), 0.0);
        assert!(f.full_view().iter().all(|v| v == 0.0));
    }

    #[test]
    fn interior_writes_visible_in_full_view() {
        let mut f = single(Shape2D::new(4, 4), Shape2D::new(1, 1));
        f.noghost_view_mut()[(0, 0)] = 3.5;
        assert_eq!(f.full_view()[(1, 1)], 3.5);
    }

    #[test]
    fn time_and_spacing() {
        let comm = LocalUniverse::new(1).into_comms().remove(0).into_shared();
        let config = FieldConfig::new(Shape2D::new(1, 1), Shape2D::new(4, 4), Shape2D::new(1, 1))
            .with_delta_space([0.25, 0.5]);
        let mut f = DistributedField::new(comm, &config).unwrap();
        f.set_time(1.5);
        assert_eq!(f.time(), 1.5);
        assert_eq!(f.delta(Dim2D::Y), 0.25);
        assert_eq!(f.delta(Dim2D::X), 0.5);
        assert_eq!(f.delta_space(), [0.25, 0.5]);
    }

    #[test]
    fn configuration_errors_surface_at_construction() {
        let comm = LocalUniverse::new(1).into_comms().remove(0).into_shared();
        let config = FieldConfig::new(Shape2D::new(1, 1), Shape2D::new(4, 4), Shape2D::new(2, 0));
        assert!(matches!(
            DistributedField::new(Arc::clone(&comm), &config),
            Err(FieldError::GhostTooWide { .. })
        ));
        // Geometry is valid for two ranks; only the rank count is wrong.
        let config = FieldConfig::new(Shape2D::new(2, 1), Shape2D::new(8, 4), Shape2D::new(1, 1));
        assert!(matches!(
            DistributedField::new(comm, &config),
            Err(FieldError::Topology(halo_grid::TopologyError::SizeMismatch { .. }))
        ));
    }

    #[test]
    fn on_grid_checks_shape() {
        let f = single(Shape2D::new(4, 4), Shape2D::new(1, 1));
        let config = FieldConfig::new(Shape2D::new(2, 1), Shape2D::new(4, 4), Shape2D::new(1, 1));
        assert!(matches!(
            DistributedField::on_grid(Arc::clone(f.grid()), &config),
            Err(FieldError::GridMismatch { .. })
        ));
    }

    #[test]
    fn with_geometry_checks_grid_and_spacing() {
        let f = single(Shape2D::new(4, 4), Shape2D::new(1, 1));
        let two = FieldConfig::new(Shape2D::new(2, 1), Shape2D::new(8, 4), Shape2D::new(1, 1));
        let geometry = FieldGeometry::new(&two).unwrap();
        assert!(matches!(
            DistributedField::with_geometry(Arc::clone(f.grid()), geometry, [1.0, 1.0]),
            Err(FieldError::GridMismatch { requested, .. }) if requested == Shape2D::new(2, 1)
        ));

        let geometry = f.geometry().clone();
        assert!(matches!(
            DistributedField::with_geometry(Arc::clone(f.grid()), geometry.clone(), [1.0, 0.0]),
            Err(FieldError::InvalidSpacing { dim: Dim2D::X, .. })
        ));
        let g = DistributedField::with_geometry(Arc::clone(f.grid()), geometry, [0.5, 2.0]).unwrap();
        assert_eq!(g.full_shape(), f.full_shape());
        assert_eq!(g.delta_space(), [0.5, 2.0]);
    }

    #[test]
    fn try_clone_copies_data_not_descriptors() {
        let universe = LocalUniverse::new(1);
        let registry = universe.registry();
        let comm = universe.into_comms().remove(0).into_shared();
        let config = FieldConfig::new(Shape2D::new(1, 1), Shape2D::new(4, 4), Shape2D::new(1, 1));
        let mut a = DistributedField::new(comm, &config).unwrap();
        a.noghost_view_mut().fill(2.0);
        a.set_time(0.75);
        assert_eq!(registry.live_count(), 2);

        let b = a.try_clone().unwrap();
        assert_eq!(registry.live_count(), 4);
        assert_eq!(b.full_view().to_vec(), a.full_view().to_vec());
        assert_eq!(b.time(), 0.75);

        drop(a);
        drop(b);
        assert_eq!(registry.live_count(), 0);
    }

    #[test]
    fn swap_trades_contents() {
        let mut a = single(Shape2D::new(4, 4), Shape2D::new(1, 1));
        let mut b = single(Shape2D::new(6, 8), Shape2D::new(2, 2));
        a.noghost_view_mut().fill(1.0);
        b.noghost_view_mut().fill(2.0);
        a.set_time(1.0);
        b.set_time(2.0);

        a.swap(&mut b);
        assert_eq!(a.noghost_shape(), Shape2D::new(6, 8));
        assert_eq!(b.noghost_shape(), Shape2D::new(4, 4));
        assert!(a.noghost_view().iter().all(|v| v == 2.0));
        assert!(b.noghost_view().iter().all(|v| v == 1.0));
        assert_eq!((a.time(), b.time()), (2.0, 1.0));

        // Both still synchronize against their own geometry.
        a.sync_ghosts().unwrap();
        b.sync_ghosts().unwrap();
        assert!(a.ghost_view(Direction2D::Right).iter().all(|v| v == 2.0));
        assert!(b.ghost_view(Direction2D::Down).iter().all(|v| v == 1.0));
    }

    #[test]
    fn metrics_count_syncs() {
        let mut f = single(Shape2D::new(4, 6), Shape2D::new(1, 1));
        f.sync_ghosts().unwrap();
        f.sync_ghosts().unwrap();
        let m = f.metrics();
        assert_eq!(m.syncs, 2);
        assert_eq!(m.messages_sent, 8);
        // Per sync: two row bands of 6 and two column bands of 4.
        assert_eq!(m.values_sent, 2 * (6 + 6 + 4 + 4));
    }
}
