//! Recomputes successor, predecessor, and finger tables for every node.

use super::topology::{NodeTopology, FINGER_COUNT};
use super::{slot_add, RingDirectory, Slot, RING_SIZE};
use crate::node::NodeId;
use std::collections::HashMap;

/// Recomputes routing state for every live node in `directory`.
///
/// Invoked synchronously on every join and leave; re-establishes I1-I3
/// before returning. With a single node in the ring, that node is its own
/// successor and predecessor and every finger points back at itself.
pub fn stabilize(directory: &RingDirectory) -> HashMap<NodeId, NodeTopology> {
    let mut topology = HashMap::with_capacity(directory.len());

    for (slot, node_id) in directory.entries() {
        let successor = next_occupied(directory, slot_add(slot, 1));
        let predecessor = previous_occupied(directory, slot);

        let mut finger_table = std::collections::BTreeMap::new();
        for i in 0..FINGER_COUNT {
            let target = slot_add(slot, 1u16 << i);
            finger_table.insert(target, next_occupied(directory, target));
        }

        topology.insert(
            node_id,
            NodeTopology {
                slot,
                successor,
                predecessor,
                finger_table,
            },
        );
    }

    topology
}

/// Walks forward from `start` (inclusive) until an occupied slot is found.
///
/// With only one node in the ring this always returns that node, since its
/// own slot is occupied.
fn next_occupied(directory: &RingDirectory, start: Slot) -> NodeId {
    let mut pos = start;
    loop {
        if let Some(node_id) = directory.node_at(pos) {
            return node_id;
        }
        pos = slot_add(pos, 1);
    }
}

/// Walks backward from `start` (exclusive) until an occupied slot is found,
/// wrapping from 0 to `RING_SIZE - 1`.
fn previous_occupied(directory: &RingDirectory, start: Slot) -> NodeId {
    let mut pos = start;
    loop {
        pos = slot_add(pos, RING_SIZE - 1); // step -1 mod RING_SIZE
        if let Some(node_id) = directory.node_at(pos) {
            return node_id;
        }
    }
}
