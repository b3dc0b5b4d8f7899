//! The communicator trait.

use log::trace;
use smallvec::smallvec;

use crate::datatype::{Datatype, VectorLayout};
use crate::error::CommError;
use crate::message::{Payload, Tag};

/// Blocking point-to-point messaging between the ranks of a group.
///
/// Every rank holds its own communicator endpoint. Implementations must
/// deliver messages between any ordered pair of ranks in send order, and
/// must buffer sends: `send` returns without waiting for the matching
/// `receive`, so a rank may send to itself and then receive.
///
/// Implementations: [`LocalComm`](crate::LocalComm) (threads in one
/// process).
pub trait Communicator: Send + Sync {
    /// This endpoint's rank, in `[0, size)`.
    fn rank(&self) -> usize;

    /// Number of ranks in the group.
    fn size(&self) -> usize;

    /// Queue `payload` for `dest` under `tag`.
    fn send(&self, dest: usize, tag: Tag, payload: Payload) -> Result<(), CommError>;

    /// Block until the next message from `source` arrives and return its
    /// payload. The message must carry `tag`.
    fn receive(&self, source: usize, tag: Tag) -> Result<Payload, CommError>;

    /// Validate and register a strided layout, returning the owning
    /// descriptor.
    fn commit(&self, layout: VectorLayout) -> Result<Datatype, CommError>;

    /// Send one message and receive one message as a single step.
    ///
    /// The send goes to `dest`, the receive comes from `source`; they may
    /// be the same rank or this rank.
    fn send_receive(
        &self,
        dest: usize,
        send_tag: Tag,
        payload: Payload,
        source: usize,
        recv_tag: Tag,
    ) -> Result<Payload, CommError> {
        trace!(
            "rank {}: sendrecv to {dest} (tag {send_tag}), from {source} (tag {recv_tag})",
            self.rank()
        );
        self.send(dest, send_tag, payload)?;
        self.receive(source, recv_tag)
    }

    /// Block until every rank has entered the barrier.
    fn barrier(&self) -> Result<(), CommError> {
        let size = self.size();
        if self.rank() == 0 {
            for peer in 1..size {
                self.receive(peer, Tag::BARRIER)?.into_control()?;
            }
            for peer in 1..size {
                self.send(peer, Tag::BARRIER, Payload::Control(smallvec![]))?;
            }
        } else {
            self.send(0, Tag::BARRIER, Payload::Control(smallvec![]))?;
            self.receive(0, Tag::BARRIER)?.into_control()?;
        }
        Ok(())
    }
}
