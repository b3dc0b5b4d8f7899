//! The four-pass nearest-neighbour ghost exchange.
//!
//! Each pass is one paired send/receive per rank:
//!
//! | pass        | sends (interior band) | to     | fills ghost | from   |
//! |-------------|-----------------------|--------|-------------|--------|
//! | `YForward`  | first `gy` rows       | down   | up          | up     |
//! | `YBackward` | last `gy` rows        | up     | down        | down   |
//! | `XForward`  | first `gx` columns    | left   | right       | right  |
//! | `XBackward` | last `gx` columns     | right  | left        | left   |
//!
//! Every rank runs the passes in [`ExchangePass::ORDER`]; a rank that
//! reorders them cross-wires its neighbours.

use std::fmt;

use halo_comm::Tag;
use halo_core::{Dim2D, Direction2D};

/// One of the four sub-exchanges of a ghost synchronization.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExchangePass {
    /// Rows travel towards decreasing `y`.
    YForward,
    /// Rows travel towards increasing `y`.
    YBackward,
    /// Columns travel towards decreasing `x`.
    XForward,
    /// Columns travel towards increasing `x`.
    XBackward,
}

impl ExchangePass {
    /// Execution order, identical on every rank.
    pub const ORDER: [ExchangePass; 4] = [
        ExchangePass::YForward,
        ExchangePass::YBackward,
        ExchangePass::XForward,
        ExchangePass::XBackward,
    ];

    /// Axis the pass moves data along.
    pub fn dim(self) -> Dim2D {
        match self {
            ExchangePass::YForward | ExchangePass::YBackward => Dim2D::Y,
            ExchangePass::XForward | ExchangePass::XBackward => Dim2D::X,
        }
    }

    /// Neighbour the interior band is sent to.
    pub fn send_to(self) -> Direction2D {
        self.recv_from().opposite()
    }

    /// Neighbour the ghost band is received from; also the side of the
    /// ghost band being filled.
    pub fn recv_from(self) -> Direction2D {
        match self {
            ExchangePass::YForward => Direction2D::Up,
            ExchangePass::YBackward => Direction2D::Down,
            ExchangePass::XForward => Direction2D::Right,
            ExchangePass::XBackward => Direction2D::Left,
        }
    }

    /// Message tag. Sender and receiver of a pass use the same tag.
    pub fn tag(self) -> Tag {
        Tag(0x4841_4c00 + self as u32)
    }
}

impl fmt::Display for ExchangePass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExchangePass::YForward => "y-forward",
            ExchangePass::YBackward => "y-backward",
            ExchangePass::XForward => "x-forward",
            ExchangePass::XBackward => "x-backward",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passes_pair_opposite_directions() {
        for pass in ExchangePass::ORDER {
            assert_eq!(pass.send_to().dim(), pass.dim());
            assert_eq!(pass.recv_from().dim(), pass.dim());
            assert_eq!(pass.send_to(), pass.recv_from().opposite());
        }
        assert_eq!(ExchangePass::YForward.send_to(), Direction2D::Down);
        assert_eq!(ExchangePass::XBackward.send_to(), Direction2D::Right);
    }

    #[test]
    fn tags_are_distinct_and_unreserved() {
        let tags: Vec<Tag> = ExchangePass::ORDER.iter().map(|p| p.tag()).collect();
        for (i, a) in tags.iter().enumerate() {
            for b in &tags[i + 1..] {
                assert_ne!(a, b);
            }
            assert_ne!(*a, Tag::BARRIER);
            assert_ne!(*a, Tag::TOPOLOGY);
        }
    }

    #[test]
    fn y_passes_run_first() {
        let dims: Vec<Dim2D> = ExchangePass::ORDER.iter().map(|p| p.dim()).collect();
        assert_eq!(dims, vec![Dim2D::Y, Dim2D::Y, Dim2D::X, Dim2D::X]);
    }
}
