//! `Cluster`: the single process-wide value owning the ring directory,
//! per-node topology, and per-node data maps, plus the membership manager.
//!
//! Keeping the ring's global mutable state in one value owned by the
//! process entry point, rather than scattered across module-level statics,
//! means handlers just need a shared reference to it.

pub mod dict3;
pub mod membership;

use crate::error::{Error, Result};
use crate::hash::node_hash;
use crate::node::NodeId;
use crate::record::{DataKey, ValueRecord};
use crate::ring::{find_successor, stabilize, NodeTopology, RingDirectory, Slot};
use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// A node's data map, behind its own lock so DICT3 mutations on one node
/// never contend with operations routed to a different node.
pub type DataMap = Arc<Mutex<HashMap<DataKey, ValueRecord>>>;

struct ClusterState {
    directory: RingDirectory,
    topology: HashMap<NodeId, NodeTopology>,
    data: HashMap<NodeId, DataMap>,
    closed: HashSet<NodeId>,
    nodes_ever_created: usize,
}

impl ClusterState {
    fn new() -> Self {
        Self {
            directory: RingDirectory::new(),
            topology: HashMap::new(),
            data: HashMap::new(),
            closed: HashSet::new(),
            nodes_ever_created: 0,
        }
    }

    fn restabilize(&mut self) {
        self.topology = stabilize(&self.directory);
    }
}

/// Owns the ring and all node data for one process.
///
/// Ring-directory and finger-table mutations (join, leave, stabilize) take
/// the write side of the single `RwLock`, since they need exclusive access
/// to the entire ring state. DICT3
/// operations take only the read side to resolve routing and fetch a
/// node's `DataMap` handle, then lock that node's map independently — so
/// two operations against different nodes' data never block each other.
pub struct Cluster {
    state: RwLock<ClusterState>,
}

impl Default for Cluster {
    fn default() -> Self {
        Self::new()
    }
}

impl Cluster {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(ClusterState::new()),
        }
    }

    /// Number of live nodes in the ring.
    pub fn node_count(&self) -> usize {
        self.state.read().directory.len()
    }

    /// Total nodes ever created, including ones that have since shut down.
    pub fn nodes_ever_created(&self) -> usize {
        self.state.read().nodes_ever_created
    }

    /// Whether every node ever created has since been closed.
    pub fn all_closed(&self) -> bool {
        let state = self.state.read();
        !state.closed.is_empty() && state.closed.len() == state.nodes_ever_created
    }

    /// Routes `hash` to its owning node, starting the walk at `from`.
    pub fn route(&self, hash: Slot, from: NodeId) -> Result<NodeId> {
        let state = self.state.read();
        find_successor(&state.topology, hash, from)
    }

    /// Clones the shared handle to a node's data map.
    pub fn data_handle(&self, node_id: NodeId) -> Result<DataMap> {
        let state = self.state.read();
        state
            .data
            .get(&node_id)
            .cloned()
            .ok_or(Error::UnknownNode(node_id.0))
    }

    /// Snapshot of every live node's topology (for introspection / admin menu).
    pub fn topology_of(&self, node_id: NodeId) -> Result<NodeTopology> {
        let state = self.state.read();
        state
            .topology
            .get(&node_id)
            .cloned()
            .ok_or(Error::UnknownNode(node_id.0))
    }

    /// The slot a live node occupies.
    pub fn slot_of(&self, node_id: NodeId) -> Result<Slot> {
        let state = self.state.read();
        state.directory.slot_of(node_id).ok_or(Error::UnknownNode(node_id.0))
    }

    /// All live node ids, in no particular order.
    pub fn node_ids(&self) -> Vec<NodeId> {
        self.state.read().directory.node_ids().collect()
    }

    /// All `(node_id, data_handle)` pairs, for operations that must sweep
    /// every node (`listKeys`, `listIDs`, `purge`, final persistence).
    pub fn all_data_handles(&self) -> Vec<(NodeId, DataMap)> {
        self.state
            .read()
            .data
            .iter()
            .map(|(&id, handle)| (id, Arc::clone(handle)))
            .collect()
    }
}

pub(crate) fn hash_of_port(node_id: NodeId) -> Slot {
    node_hash(&node_id.port_string())
}
