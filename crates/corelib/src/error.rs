//! Error taxonomy for the core DHT engine.

use std::fmt;

/// Result type alias for the core library.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the ring and the DICT3 operation layer.
///
/// Every variant maps to exactly one of the `error` strings a DICT3
/// operation is allowed to return; there is no partial-success state.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// `lookup` called with both `key` and `relationship` empty.
    #[error("key/relationship cannot both be null")]
    KeyAndRelationshipEmpty,

    /// `insert`/`insertOrUpdate`/`delete` requires both `key` and `relationship`.
    #[error("key or relationship cannot be empty")]
    InputError,

    /// The requested row does not exist on the owning node.
    #[error("key/relationship not found")]
    NotFound,

    /// `insert` attempted on an existing `(key, relationship)`.
    #[error("key and relationship already present")]
    AlreadyPresent,

    /// `insertOrUpdate`/`delete` attempted against a read-only row.
    #[error("read-only")]
    ReadOnly,

    /// The ring directory has no free slot left for a new node.
    #[error("ring is full: all 128 slots are occupied")]
    RingFull,

    /// The ring holds no live node to route to.
    #[error("ring is empty")]
    EmptyRing,

    /// A node id referenced by a caller is not a live member of the ring.
    #[error("unknown node {0}")]
    UnknownNode(u32),
}

/// Renders `error: "null"` on success, the error's message otherwise.
pub struct WireError<'a>(pub Option<&'a Error>);

impl fmt::Display for WireError<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(err) => write!(f, "{err}"),
            None => write!(f, "null"),
        }
    }
}
