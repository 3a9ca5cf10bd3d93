//! Join and leave: the only operations allowed to mutate ring topology.

use super::{hash_of_port, Cluster, DataMap};
use crate::error::{Error, Result};
use crate::hash::data_hash;
use crate::node::NodeId;
use crate::record::DataKey;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// Outcome of a `shutdown`/leave call, so the caller (the server binary)
/// knows whether to run the final persistence dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShutdownOutcome {
    /// Whether every node ever created by this process has now closed.
    pub all_nodes_closed: bool,
}

impl Cluster {
    /// Creates a new, empty node, places it on the ring, stabilizes, and
    /// rebalances the data of its successor (the only node whose ownership
    /// can have changed).
    pub fn join(&self, node_id: NodeId) -> Result<()> {
        let hash = hash_of_port(node_id);

        let mut state = self.state.write();
        if state.data.contains_key(&node_id) {
            return Err(Error::UnknownNode(node_id.0)); // already a member
        }

        state.directory.add(node_id, hash)?;
        state.data.insert(node_id, Arc::new(Mutex::new(HashMap::new())));
        state.nodes_ever_created += 1;
        state.restabilize();

        info!(node = node_id.0, slot = hash, "node joined the ring");

        if state.directory.len() > 1 {
            let successor = state
                .topology
                .get(&node_id)
                .map(|t| t.successor)
                .expect("just-stabilized topology contains the new node");
            rebalance_node(&mut state, successor);
        }

        Ok(())
    }

    /// Removes `origin` from the ring, migrating its data to its successor
    /// first (unless it is its own successor, i.e. the last node), then
    /// re-stabilizes. Marks `origin` closed and reports whether every node
    /// ever created has now closed.
    pub fn shutdown(&self, origin: NodeId) -> Result<ShutdownOutcome> {
        let mut state = self.state.write();

        if !state.directory.contains(origin) {
            return Err(Error::UnknownNode(origin.0));
        }

        let successor = state.topology.get(&origin).map(|t| t.successor);

        if let Some(successor) = successor {
            if successor != origin {
                let departing = state
                    .data
                    .remove(&origin)
                    .expect("live node has a data handle");
                let successor_map = Arc::clone(
                    state
                        .data
                        .get(&successor)
                        .expect("successor is a live node"),
                );
                let rows: Vec<(DataKey, crate::record::ValueRecord)> =
                    departing.lock().drain().collect();
                successor_map.lock().extend(rows);
            } else {
                state.data.remove(&origin);
            }
        }

        state.directory.remove(origin);
        state.restabilize();
        state.closed.insert(origin);

        info!(node = origin.0, "node left the ring");

        Ok(ShutdownOutcome {
            all_nodes_closed: !state.closed.is_empty() && state.closed.len() == state.nodes_ever_created,
        })
    }
}

/// Recomputes ownership for every row on `node_id` and moves any row whose
/// owner changed. Called only with the successor of a just-joined node,
/// since only rows hashing between the predecessor and the new node can
/// have moved.
fn rebalance_node(state: &mut super::ClusterState, node_id: NodeId) {
    let Some(map) = state.data.get(&node_id).cloned() else {
        return;
    };
    let rows: Vec<(DataKey, crate::record::ValueRecord)> = map.lock().drain().collect();

    for (key, value) in rows {
        let hash = data_hash(&key.key, &key.relationship);
        let owner = crate::ring::find_successor(&state.topology, hash, node_id)
            .unwrap_or(node_id);
        let target: DataMap = state
            .data
            .get(&owner)
            .cloned()
            .unwrap_or_else(|| Arc::clone(&map));
        target.lock().insert(key, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::dict3;
    use crate::record::Permission;

    #[test]
    fn join_places_node_and_stabilizes() {
        let cluster = Cluster::new();
        cluster.join(NodeId(8000)).unwrap();
        assert_eq!(cluster.node_count(), 1);
        cluster.join(NodeId(8001)).unwrap();
        assert_eq!(cluster.node_count(), 2);
    }

    #[test]
    fn join_rebalances_rows_that_now_belong_elsewhere() {
        let cluster = Cluster::new();
        cluster.join(NodeId(8000)).unwrap();
        dict3::insert(&cluster, "a", "b", "v1", Permission::ReadWrite, NodeId(8000)).unwrap();
        dict3::insert(&cluster, "c", "d", "v2", Permission::ReadWrite, NodeId(8000)).unwrap();

        cluster.join(NodeId(8001)).unwrap();

        // Every inserted row must still be reachable after rebalancing,
        // regardless of which node now owns it (P1).
        let found = dict3::lookup(&cluster, "a", "b", NodeId(8001)).unwrap();
        assert_eq!(found, vec![("a".into(), "b".into(), "v1".into())]);
        let found = dict3::lookup(&cluster, "c", "d", NodeId(8000)).unwrap();
        assert_eq!(found, vec![("c".into(), "d".into(), "v2".into())]);
    }

    #[test]
    fn shutdown_migrates_data_to_successor() {
        let cluster = Cluster::new();
        cluster.join(NodeId(8000)).unwrap();
        cluster.join(NodeId(8001)).unwrap();
        dict3::insert(&cluster, "a", "b", "v1", Permission::ReadWrite, NodeId(8000)).unwrap();

        let outcome = cluster.shutdown(NodeId(8001)).unwrap();
        assert!(!outcome.all_nodes_closed);
        assert_eq!(cluster.node_count(), 1);

        let found = dict3::lookup(&cluster, "a", "b", NodeId(8000)).unwrap();
        assert_eq!(found, vec![("a".into(), "b".into(), "v1".into())]);
    }

    #[test]
    fn shutdown_of_every_node_is_reported() {
        let cluster = Cluster::new();
        cluster.join(NodeId(8000)).unwrap();
        let outcome = cluster.shutdown(NodeId(8000)).unwrap();
        assert!(outcome.all_nodes_closed);
    }
}
