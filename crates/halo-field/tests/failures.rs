//! Integration tests: descriptor lifecycle and exchange failures.

use halo_comm::{CommError, Communicator, LocalUniverse, Signature};
use halo_core::{Direction2D, Shape2D};
use halo_field::{DistributedField, ExchangePass, FieldConfig, FieldError};
use halo_grid::TopologyError;

#[test]
fn descriptors_released_with_fields() {
    let universe = LocalUniverse::new(4);
    let registry = universe.registry();
    let cfg = FieldConfig::new(Shape2D::new(2, 2), Shape2D::new(8, 8), Shape2D::new(1, 1));
    let observed = universe.execute(|comm| {
        let field = DistributedField::new(comm.into_shared(), &cfg).unwrap();
        let comm = field.distribution().communicator();
        comm.barrier().unwrap();
        let built = registry.live_count();
        comm.barrier().unwrap();

        let copy = field.try_clone().unwrap();
        comm.barrier().unwrap();
        let cloned = registry.live_count();
        comm.barrier().unwrap();
        drop(copy);
        (built, cloned)
    });
    for (built, cloned) in observed {
        assert_eq!(built, 8);
        assert_eq!(cloned, 16);
    }
    assert_eq!(registry.live_count(), 0);
}

#[test]
fn mismatched_extents_fail_in_x_pass() {
    // Both ranks agree on a 1x2 grid but disagree on the global height,
    // so their column bands differ in length.
    let out = LocalUniverse::run(2, |comm| {
        let height = if comm.rank() == 0 { 4 } else { 6 };
        let cfg = FieldConfig::new(Shape2D::new(1, 2), Shape2D::new(height, 8), Shape2D::new(1, 1));
        let mut field = DistributedField::new(comm.into_shared(), &cfg).unwrap();
        field.noghost_view_mut().fill(1.0);
        let err = field.sync_ghosts().unwrap_err();
        let right_untouched = field.ghost_view(Direction2D::Right).iter().all(|v| v == 0.0);
        (height, err, right_untouched)
    });
    for (height, err, right_untouched) in out {
        let other = if height == 4 { 6 } else { 4 };
        assert_eq!(
            err,
            FieldError::Exchange {
                pass: ExchangePass::XForward,
                source: CommError::ShapeMismatch {
                    expected: Signature {
                        count: height,
                        block_len: 1
                    },
                    got: Signature {
                        count: other,
                        block_len: 1
                    },
                },
            }
        );
        assert!(right_untouched);
    }
}

#[test]
fn departed_peer_is_disconnected() {
    let cfg = FieldConfig::new(Shape2D::new(1, 2), Shape2D::new(4, 8), Shape2D::new(1, 1));
    let out = LocalUniverse::run(2, |comm| {
        let rank = comm.rank();
        let mut field = DistributedField::new(comm.into_shared(), &cfg).unwrap();
        if rank == 1 {
            drop(field);
            return None;
        }
        Some(field.sync_ghosts().unwrap_err())
    });
    assert_eq!(
        out[0],
        Some(FieldError::Exchange {
            pass: ExchangePass::XForward,
            source: CommError::Disconnected { peer: 1 },
        })
    );
}

#[test]
fn grid_shape_must_match_communicator() {
    let cfg = FieldConfig::new(Shape2D::new(2, 2), Shape2D::new(8, 8), Shape2D::new(1, 1));
    let out = LocalUniverse::run(3, |comm| DistributedField::new(comm.into_shared(), &cfg).err());
    for err in out {
        assert!(matches!(
            err,
            Some(FieldError::Topology(TopologyError::SizeMismatch { .. }))
        ));
    }
}

#[test]
fn invalid_configuration_reported_without_messages() {
    // Only one rank of two calls the constructor; the other never answers,
    // so any attempt to communicate would fail or hang.
    let universe = LocalUniverse::new(2);
    let mut comms = universe.into_comms();
    let lonely = comms.remove(0).into_shared();
    let cfg = FieldConfig::new(Shape2D::new(1, 2), Shape2D::new(4, 7), Shape2D::new(1, 1));
    assert!(matches!(
        DistributedField::new(lonely, &cfg),
        Err(FieldError::IndivisibleShape { .. })
    ));
}
