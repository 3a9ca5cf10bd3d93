//! Core engine for a Chord-style distributed hash table storing DICT3
//! `(key, relationship) -> value` triples.
//!
//! This crate has no notion of wire formats or sockets: it owns the ring
//! directory, finger-table routing, stabilization, and the DICT3 operation
//! semantics, and is driven entirely through [`Cluster`].

pub mod cluster;
pub mod error;
pub mod hash;
pub mod node;
pub mod record;
pub mod ring;

pub use cluster::Cluster;
pub use error::{Error, Result};
pub use node::NodeId;
pub use record::{DataKey, Permission, ValueRecord};
