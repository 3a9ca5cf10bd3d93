//! `find_successor`: finger-table routing with hop-cycle detection.

use super::topology::NodeTopology;
use super::Slot;
use crate::error::{Error, Result};
use crate::node::NodeId;
use std::collections::{HashMap, HashSet};

/// Routes `target` to its owning node by walking finger tables from `from`.
///
/// A single `diff -> node` candidate map is accumulated over the whole
/// walk (never reset between hops): at each hop, every finger entry
/// `(t, n)` with `target >= t` is folded in under key `diff = target - t`,
/// so a later hop can overwrite an earlier candidate that happens to share
/// the same diff. After folding in a hop's entries, the walk follows
/// `candidates[min_diff]` — the smallest diff seen across the whole walk so
/// far, not just this hop. If no entry at a hop satisfies the predicate,
/// the walk advances to that node's successor without touching the
/// candidate map; that successor-only path is cycle-checked on its own
/// (`successor_trail`), since `target` can be below every finger slot in
/// the ring (any route to slot `0`, for instance), in which case the walk
/// would otherwise circle the successor chain forever without ever
/// populating `candidates`. The walk terminates either when it is about to
/// revisit a node reached via a candidate jump, returning the best
/// candidate accumulated so far, or when the successor-only path completes
/// a full lap with no candidate ever found, in which case `target` sits
/// below every finger in the ring and the answer is the node holding the
/// smallest occupied slot (Chord's wrap-around case). Termination is
/// guaranteed by the finite node count plus both revisit checks.
///
/// A ring with a single node is handled as a special case: its finger
/// table points entirely at itself, so the general loop would immediately
/// revisit it with an empty candidate map.
pub fn find_successor(
    topology: &HashMap<NodeId, NodeTopology>,
    target: Slot,
    from: NodeId,
) -> Result<NodeId> {
    if topology.is_empty() {
        return Err(Error::EmptyRing);
    }
    if topology.len() == 1 {
        return Ok(*topology.keys().next().unwrap());
    }

    let mut port = from;
    let mut visited: HashSet<NodeId> = HashSet::new();
    let mut successor_trail: HashSet<NodeId> = HashSet::new();
    let mut candidates: HashMap<u16, NodeId> = HashMap::new();

    loop {
        let node = topology.get(&port).ok_or(Error::UnknownNode(port.0))?;

        let mut used = false;
        for (&finger_slot, &owner) in &node.finger_table {
            if target >= finger_slot {
                let diff = u16::from(target) - u16::from(finger_slot);
                candidates.insert(diff, owner);
                used = true;
            }
        }

        if !used {
            if !successor_trail.insert(port) {
                return Ok(wraparound_owner(topology));
            }
            port = node.successor;
            continue;
        }

        let &min_diff = candidates.keys().min().expect("used implies non-empty");
        let next = candidates[&min_diff];

        if visited.contains(&next) {
            return Ok(next);
        }
        visited.insert(next);
        port = next;
    }
}

/// The node holding the smallest occupied slot in the ring: the answer
/// when `target` is below every finger slot anywhere, so the plain
/// successor walk laps the whole ring without ever finding a candidate.
fn wraparound_owner(topology: &HashMap<NodeId, NodeTopology>) -> NodeId {
    *topology
        .iter()
        .min_by_key(|(_, topo)| topo.slot)
        .map(|(id, _)| id)
        .expect("non-empty topology checked by caller")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ring::{stabilize, RingDirectory};

    fn ring(pairs: &[(u32, Slot)]) -> (RingDirectory, HashMap<NodeId, NodeTopology>) {
        let mut dir = RingDirectory::new();
        for &(port, slot) in pairs {
            dir.add(NodeId(port), slot).unwrap();
        }
        let topo = stabilize(&dir);
        (dir, topo)
    }

    #[test]
    fn single_node_owns_every_slot() {
        let (_dir, topo) = ring(&[(8000, 10)]);
        for target in [0, 1, 64, 127] {
            assert_eq!(find_successor(&topo, target, NodeId(8000)).unwrap(), NodeId(8000));
        }
    }

    #[test]
    fn routes_to_the_node_owning_the_exact_slot() {
        let (_dir, topo) = ring(&[(1, 0), (2, 64)]);
        assert_eq!(find_successor(&topo, 64, NodeId(1)).unwrap(), NodeId(2));
        assert_eq!(find_successor(&topo, 0, NodeId(2)).unwrap(), NodeId(1));
    }

    #[test]
    fn routes_to_the_next_occupied_slot_when_target_is_unoccupied() {
        let (_dir, topo) = ring(&[(1, 0), (2, 64)]);
        // Slot 70 is unowned directly; its successor is node 1 (wraps to 0).
        assert_eq!(find_successor(&topo, 70, NodeId(2)).unwrap(), NodeId(1));
    }

    #[test]
    fn routing_is_consistent_regardless_of_entry_node() {
        let (_dir, topo) = ring(&[(1, 0), (2, 32), (3, 64), (4, 96)]);
        for target in [5, 40, 70, 100, 127] {
            let from_one = find_successor(&topo, target, NodeId(1)).unwrap();
            let from_three = find_successor(&topo, target, NodeId(3)).unwrap();
            assert_eq!(from_one, from_three, "target {target} routed inconsistently");
        }
    }

    #[test]
    fn target_below_every_finger_slot_terminates_at_the_smallest_slot_owner() {
        // Mirrors the five-node ring from the DICT3 integration tests
        // (ports 9000-9004 hash to slots 8, 45, 63, 100, 118): routing
        // target 0 finds no finger entry anywhere with `finger_slot <= 0`,
        // so the walk must fall back to the wrap-around case instead of
        // cycling the successor chain forever.
        let (_dir, topo) = ring(&[(9000, 8), (9001, 45), (9002, 63), (9003, 100), (9004, 118)]);
        for &from in &[9000, 9001, 9002, 9003, 9004] {
            assert_eq!(find_successor(&topo, 0, NodeId(from)).unwrap(), NodeId(9000));
        }
    }

    #[test]
    fn empty_ring_is_an_error() {
        let topo: HashMap<NodeId, NodeTopology> = HashMap::new();
        assert!(matches!(
            find_successor(&topo, 5, NodeId(1)),
            Err(Error::EmptyRing)
        ));
    }
}
