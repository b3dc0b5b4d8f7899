//! Deterministic fills and ghost-cell expectations.

use halo_core::{Coord2D, Direction2D};
use halo_field::DistributedField;

/// A value unique to each global cell for grids up to 1000 columns.
pub fn global_value(gy: usize, gx: usize) -> f64 {
    (gy * 1000 + gx) as f64 + 0.5
}

/// Fill the interior of `field` with `f(global_y, global_x)`.
pub fn fill_global(field: &mut DistributedField, f: impl Fn(usize, usize) -> f64) {
    let origin = field.global_origin();
    field
        .noghost_view_mut()
        .fill_with(|i, j| f(origin.y + i, origin.x + j));
}

/// Global coordinate of the interior cell mirrored by cell `(i, j)` of
/// `field`'s ghost band `dir`, with periodic wraparound.
pub fn ghost_source(field: &DistributedField, dir: Direction2D, i: usize, j: usize) -> Coord2D {
    let band = field.geometry().ghost_region(dir).origin();
    let ghost = field.ghost_sizes();
    let origin = field.global_origin();
    let global = field.global_shape();
    let wrap = |origin: usize, local: usize, ghost: usize, extent: usize| {
        let g = origin as i64 + local as i64 - ghost as i64;
        g.rem_euclid(extent as i64) as usize
    };
    Coord2D::new(
        wrap(origin.y, band.y + i, ghost.y, global.y),
        wrap(origin.x, band.x + j, ghost.x, global.x),
    )
}

/// Assert every ghost cell of `field` holds `f` at its mirrored global
/// coordinate.
pub fn assert_ghosts_match(field: &DistributedField, f: impl Fn(usize, usize) -> f64) {
    let rank = field.distribution().rank();
    for dir in Direction2D::ALL {
        let view = field.ghost_view(dir);
        let shape = view.shape();
        for i in 0..shape.y {
            for j in 0..shape.x {
                let src = ghost_source(field, dir, i, j);
                let expected = f(src.y, src.x);
                assert_eq!(
                    view[(i, j)],
                    expected,
                    "rank {rank}: {dir} ghost ({i}, {j}) should mirror global {src}"
                );
            }
        }
    }
}
