//! In-process communicator: one thread per rank, crossbeam channels between them.

use std::sync::Arc;
use std::thread;

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::debug;

use crate::communicator::Communicator;
use crate::datatype::{Datatype, DatatypeRegistry, VectorLayout};
use crate::error::CommError;
use crate::message::{Message, Payload, Tag};

/// A group of in-process ranks wired together.
///
/// Construction builds the full mesh of channels up front; the
/// per-rank endpoints are handed out with
/// [`into_comms`](LocalUniverse::into_comms) or consumed by
/// [`execute`](LocalUniverse::execute).
///
/// # Examples
///
/// ```
/// use halo_comm::{Communicator, LocalUniverse};
///
/// let ranks = LocalUniverse::run(3, |comm| comm.rank() * 10);
/// assert_eq!(ranks, vec![0, 10, 20]);
/// ```
pub struct LocalUniverse {
    comms: Vec<LocalComm>,
    registry: Arc<DatatypeRegistry>,
}

impl LocalUniverse {
    /// Wire up `size` ranks.
    pub fn new(size: usize) -> Self {
        let registry = Arc::new(DatatypeRegistry::new());

        // senders[src][dst], receivers[dst][src]
        let mut senders: Vec<Vec<Sender<Message>>> =
            (0..size).map(|_| Vec::with_capacity(size)).collect();
        let mut receivers: Vec<Vec<Receiver<Message>>> =
            (0..size).map(|_| Vec::with_capacity(size)).collect();
        for outboxes in senders.iter_mut() {
            for inboxes in receivers.iter_mut() {
                let (tx, rx) = unbounded();
                outboxes.push(tx);
                inboxes.push(rx);
            }
        }

        let comms = senders
            .into_iter()
            .zip(receivers)
            .enumerate()
            .map(|(rank, (outboxes, inboxes))| LocalComm {
                rank,
                outboxes,
                inboxes,
                registry: Arc::clone(&registry),
            })
            .collect();
        debug!("local universe of {size} ranks created");
        Self { comms, registry }
    }

    /// Convenience for `LocalUniverse::new(size).execute(f)`.
    pub fn run<F, R>(size: usize, f: F) -> Vec<R>
    where
        F: Fn(LocalComm) -> R + Sync,
        R: Send,
    {
        Self::new(size).execute(f)
    }

    /// Number of ranks.
    pub fn size(&self) -> usize {
        self.comms.len()
    }

    /// The descriptor registry shared by every rank of this universe.
    pub fn registry(&self) -> Arc<DatatypeRegistry> {
        Arc::clone(&self.registry)
    }

    /// Hand out the per-rank endpoints, in rank order.
    pub fn into_comms(self) -> Vec<LocalComm> {
        self.comms
    }

    /// Run `f` once per rank, each on its own scoped thread, and collect
    /// the results in rank order.
    ///
    /// If any rank panics the panic is re-raised here after all threads
    /// have finished. Ranks blocked on a peer that panicked observe
    /// [`CommError::Disconnected`] rather than hanging.
    pub fn execute<F, R>(self, f: F) -> Vec<R>
    where
        F: Fn(LocalComm) -> R + Sync,
        R: Send,
    {
        let f = &f;
        thread::scope(|scope| {
            let handles: Vec<_> = self
                .comms
                .into_iter()
                .map(|comm| {
                    let rank = comm.rank;
                    thread::Builder::new()
                        .name(format!("rank-{rank}"))
                        .spawn_scoped(scope, move || f(comm))
                })
                .collect();

            let mut results = Vec::with_capacity(handles.len());
            let mut panic: Option<Box<dyn std::any::Any + Send>> = None;
            for handle in handles {
                match handle {
                    Ok(h) => match h.join() {
                        Ok(r) => results.push(r),
                        Err(payload) => {
                            panic.get_or_insert(payload);
                        }
                    },
                    Err(e) => {
                        panic.get_or_insert(Box::new(format!("failed to spawn rank thread: {e}")));
                    }
                }
            }
            if let Some(payload) = panic {
                std::panic::resume_unwind(payload);
            }
            results
        })
    }
}

/// One rank's endpoint in a [`LocalUniverse`].
///
/// Holds a sender to every rank and a receiver from every rank. Dropping
/// it disconnects the rank: peers waiting on it get
/// [`CommError::Disconnected`].
pub struct LocalComm {
    rank: usize,
    outboxes: Vec<Sender<Message>>,
    inboxes: Vec<Receiver<Message>>,
    registry: Arc<DatatypeRegistry>,
}

impl LocalComm {
    /// Wrap this endpoint for sharing between several fields on one rank.
    pub fn into_shared(self) -> Arc<dyn Communicator> {
        Arc::new(self)
    }

    fn check_rank(&self, rank: usize) -> Result<(), CommError> {
        if rank >= self.outboxes.len() {
            return Err(CommError::InvalidRank {
                rank,
                size: self.outboxes.len(),
            });
        }
        Ok(())
    }
}

impl std::fmt::Debug for LocalComm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalComm")
            .field("rank", &self.rank)
            .field("size", &self.outboxes.len())
            .finish()
    }
}

impl Communicator for LocalComm {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.outboxes.len()
    }

    fn send(&self, dest: usize, tag: Tag, payload: Payload) -> Result<(), CommError> {
        self.check_rank(dest)?;
        let message = Message {
            source: self.rank,
            tag,
            payload,
        };
        self.outboxes[dest]
            .send(message)
            .map_err(|_| CommError::Disconnected { peer: dest })
    }

    fn receive(&self, source: usize, tag: Tag) -> Result<Payload, CommError> {
        self.check_rank(source)?;
        let message = self.inboxes[source]
            .recv()
            .map_err(|_| CommError::Disconnected { peer: source })?;
        if message.tag != tag {
            return Err(CommError::TagMismatch {
                peer: source,
                expected: tag,
                got: message.tag,
            });
        }
        Ok(message.payload)
    }

    fn commit(&self, layout: VectorLayout) -> Result<Datatype, CommError> {
        self.registry.register(layout)
    }
}
