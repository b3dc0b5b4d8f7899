//! Message tags and payloads.

use smallvec::SmallVec;
use std::fmt;

/// Matches a send with its receive.
///
/// Tags at the top of the `u32` range are reserved for the runtime's own
/// collectives (see [`Tag::BARRIER`] and [`Tag::TOPOLOGY`]).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(pub u32);

impl Tag {
    /// Reserved for [`Communicator::barrier`](crate::Communicator::barrier).
    pub const BARRIER: Tag = Tag(u32::MAX);
    /// Reserved for process-grid shape agreement.
    pub const TOPOLOGY: Tag = Tag(u32::MAX - 1);
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for Tag {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Block shape of a strided payload: `count` blocks of `block_len` values.
///
/// Sender and receiver descriptors must agree on this for a transfer to
/// be accepted. Strides are local to each side and are not compared.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Signature {
    /// Number of blocks.
    pub count: usize,
    /// Values per block.
    pub block_len: usize,
}

impl Signature {
    /// Total number of values described.
    pub fn len(&self) -> usize {
        self.count * self.block_len
    }

    /// `true` if no values are described.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.count, self.block_len)
    }
}

/// Body of a message.
#[derive(Clone, Debug, PartialEq)]
pub enum Payload {
    /// Packed `f64` values gathered through a descriptor.
    Values {
        /// Block shape of the descriptor that packed `data`.
        signature: Signature,
        /// Packed values, block after block.
        data: Vec<f64>,
    },
    /// Small integer control data (collective bookkeeping).
    Control(SmallVec<[u64; 4]>),
}

impl Payload {
    /// Unwrap a control payload, or report what arrived instead.
    pub fn into_control(self) -> Result<SmallVec<[u64; 4]>, crate::CommError> {
        match self {
            Payload::Control(words) => Ok(words),
            Payload::Values { .. } => Err(crate::CommError::UnexpectedPayload {
                expected: "control",
            }),
        }
    }
}

/// A payload in flight, stamped with its origin and tag.
#[derive(Clone, Debug, PartialEq)]
pub struct Message {
    /// Rank that sent the message.
    pub source: usize,
    /// Tag given at the send.
    pub tag: Tag,
    /// Message body.
    pub payload: Payload,
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    #[test]
    fn reserved_tags_are_distinct() {
        assert_ne!(Tag::BARRIER, Tag::TOPOLOGY);
        assert!(Tag(0) < Tag::TOPOLOGY);
    }

    #[test]
    fn signature_len() {
        let s = Signature {
            count: 3,
            block_len: 4,
        };
        assert_eq!(s.len(), 12);
        assert!(!s.is_empty());
        assert_eq!(s.to_string(), "3x4");
    }

    #[test]
    fn into_control_rejects_values() {
        let p = Payload::Values {
            signature: Signature {
                count: 1,
                block_len: 1,
            },
            data: vec![1.0],
        };
        assert!(matches!(
            p.into_control(),
            Err(crate::CommError::UnexpectedPayload { .. })
        ));
        let c = Payload::Control(smallvec![7, 9]);
        assert_eq!(c.into_control().unwrap().as_slice(), &[7, 9]);
    }
}
