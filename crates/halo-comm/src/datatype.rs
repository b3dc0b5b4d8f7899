//! Strided message-shape descriptors.
//!
//! A [`VectorLayout`] is plain geometry: `count` blocks of `block_len`
//! contiguous values whose starts are `stride` apart. Committing a layout
//! through [`Communicator::commit`](crate::Communicator::commit) produces
//! a [`Datatype`], the resource the runtime moves data with. Datatypes are
//! registered for as long as they live and deregister themselves on drop;
//! they cannot be cloned.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use indexmap::IndexMap;
use log::debug;

use crate::error::CommError;
use crate::message::{Payload, Signature};

/// Geometry of a strided block inside a flat buffer.
///
/// # Examples
///
/// ```
/// use halo_comm::VectorLayout;
///
/// // Two rows of three values out of a buffer with rows of length 5.
/// let layout = VectorLayout::new(2, 3, 5);
/// assert_eq!(layout.extent(), 8);
/// assert_eq!(layout.len(), 6);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VectorLayout {
    /// Number of blocks.
    pub count: usize,
    /// Contiguous values per block.
    pub block_len: usize,
    /// Distance in values between the starts of consecutive blocks.
    pub stride: usize,
}

impl VectorLayout {
    /// Create a layout. Validation happens at commit time.
    pub const fn new(count: usize, block_len: usize, stride: usize) -> Self {
        Self {
            count,
            block_len,
            stride,
        }
    }

    /// Number of values described.
    pub fn len(&self) -> usize {
        self.count * self.block_len
    }

    /// `true` if the layout describes no values.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Span in the buffer from the first to one past the last value.
    pub fn extent(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            (self.count - 1) * self.stride + self.block_len
        }
    }

    /// Block shape, compared between sender and receiver.
    pub fn signature(&self) -> Signature {
        Signature {
            count: self.count,
            block_len: self.block_len,
        }
    }

    /// Check that consecutive blocks do not overlap.
    pub fn validate(&self) -> Result<(), CommError> {
        if self.count > 1 && self.stride < self.block_len {
            return Err(CommError::InvalidLayout {
                reason: format!(
                    "stride {} is shorter than block length {}",
                    self.stride, self.block_len
                ),
            });
        }
        Ok(())
    }

    fn check_bounds(&self, offset: usize, len: usize) -> Result<(), CommError> {
        let extent = self.extent();
        if extent > 0 && offset.checked_add(extent).is_none_or(|end| end > len) {
            return Err(CommError::OutOfBounds {
                offset,
                extent,
                len,
            });
        }
        Ok(())
    }
}

impl fmt::Display for VectorLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} blocks of {} (stride {})",
            self.count, self.block_len, self.stride
        )
    }
}

/// Bookkeeping for committed descriptors.
///
/// Every [`Datatype`] holds an entry here from commit until drop, so
/// [`live_count`](DatatypeRegistry::live_count) reaching zero means every
/// descriptor has been released.
#[derive(Debug, Default)]
pub struct DatatypeRegistry {
    next_id: AtomicU64,
    live: Mutex<IndexMap<u64, VectorLayout>>,
}

impl DatatypeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate `layout` and register it, returning the owning handle.
    pub fn register(self: &Arc<Self>, layout: VectorLayout) -> Result<Datatype, CommError> {
        layout.validate()?;
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.entries().insert(id, layout);
        debug!("committed datatype {id}: {layout}");
        Ok(Datatype {
            id,
            layout,
            registry: Arc::clone(self),
        })
    }

    /// Number of descriptors committed and not yet dropped.
    pub fn live_count(&self) -> usize {
        self.entries().len()
    }

    /// Layouts of the live descriptors, oldest first.
    pub fn live_layouts(&self) -> Vec<VectorLayout> {
        self.entries().values().copied().collect()
    }

    fn release(&self, id: u64) {
        if self.entries().shift_remove(&id).is_some() {
            debug!("released datatype {id}");
        }
    }

    fn entries(&self) -> MutexGuard<'_, IndexMap<u64, VectorLayout>> {
        // The map stays consistent even if a holder panicked mid-insert.
        self.live.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// A committed message-shape descriptor.
///
/// Moves values between a flat `f64` buffer and a [`Payload`] without an
/// intermediate packing step on the caller's side. Not `Clone`: a field
/// that needs another descriptor commits a new one.
#[derive(Debug)]
pub struct Datatype {
    id: u64,
    layout: VectorLayout,
    registry: Arc<DatatypeRegistry>,
}

impl Datatype {
    /// The committed geometry.
    pub fn layout(&self) -> VectorLayout {
        self.layout
    }

    /// Block shape of this descriptor.
    pub fn signature(&self) -> Signature {
        self.layout.signature()
    }

    /// Gather the block starting at `buffer[offset]` into a payload.
    pub fn pack(&self, buffer: &[f64], offset: usize) -> Result<Payload, CommError> {
        let l = self.layout;
        l.check_bounds(offset, buffer.len())?;
        let mut data = Vec::with_capacity(l.len());
        if l.block_len > 0 {
            for b in 0..l.count {
                let start = offset + b * l.stride;
                data.extend_from_slice(&buffer[start..start + l.block_len]);
            }
        }
        Ok(Payload::Values {
            signature: l.signature(),
            data,
        })
    }

    /// Scatter `payload` into the block starting at `buffer[offset]`.
    ///
    /// The buffer is untouched unless the payload's signature matches and
    /// the block fits.
    pub fn unpack(
        &self,
        payload: &Payload,
        buffer: &mut [f64],
        offset: usize,
    ) -> Result<(), CommError> {
        let (signature, data) = match payload {
            Payload::Values { signature, data } => (*signature, data),
            Payload::Control(_) => {
                return Err(CommError::UnexpectedPayload { expected: "values" })
            }
        };
        let l = self.layout;
        if signature != l.signature() || data.len() != l.len() {
            return Err(CommError::ShapeMismatch {
                expected: l.signature(),
                got: signature,
            });
        }
        l.check_bounds(offset, buffer.len())?;
        if l.block_len > 0 {
            for (b, block) in data.chunks_exact(l.block_len).enumerate() {
                let start = offset + b * l.stride;
                buffer[start..start + l.block_len].copy_from_slice(block);
            }
        }
        Ok(())
    }
}

impl Drop for Datatype {
    fn drop(&mut self) {
        self.registry.release(self.id);
    }
}
