//! Message passing for halo2d.
//!
//! This crate is the host runtime the distributed field talks to. It
//! defines the [`Communicator`] trait (blocking point-to-point messages
//! between ranks), the strided message-shape descriptors ([`VectorLayout`]
//! committed into an owning [`Datatype`]), and an in-process
//! implementation where every rank is a thread.
//!
//! # Architecture
//!
//! ```text
//! LocalUniverse (size N)
//! ├── N×N unbounded crossbeam channels, one per (source, dest) pair
//! ├── DatatypeRegistry (shared, tracks committed descriptors)
//! └── LocalComm × N (one per rank thread)
//! ```
//!
//! Sends are buffered: a rank can always send and then receive, including
//! to and from itself, without deadlocking.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod communicator;
pub mod datatype;
pub mod error;
pub mod local;
pub mod message;

pub use communicator::Communicator;
pub use datatype::{Datatype, DatatypeRegistry, VectorLayout};
pub use error::CommError;
pub use local::{LocalComm, LocalUniverse};
pub use message::{Message, Payload, Signature, Tag};
