//! Node identity.

use std::fmt;

/// Identifies a node by the port it listens on.
///
/// The TCP port a node listens on doubles as its address and its stable
/// identity; a newtype keeps that choice explicit instead of passing bare
/// `u32`s through the ring and cluster APIs.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct NodeId(pub u32);

impl NodeId {
    /// The string form hashed by [`crate::hash::node_hash`].
    pub fn port_string(self) -> String {
        self.0.to_string()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for NodeId {
    fn from(port: u32) -> Self {
        NodeId(port)
    }
}
