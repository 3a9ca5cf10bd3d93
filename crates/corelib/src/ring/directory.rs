//! The ring directory: `slot -> NodeId`, with the reverse lookup.

use super::{slot_add, Slot, RING_SIZE};
use crate::error::{Error, Result};
use crate::node::NodeId;
use std::collections::HashMap;

/// Mapping `slot -> node_id` representing current ring membership.
///
/// Invariant: the domain of `slots` is exactly the set of live nodes. At
/// most one node occupies a slot.
#[derive(Debug, Default)]
pub struct RingDirectory {
    slots: HashMap<Slot, NodeId>,
    reverse: HashMap<NodeId, Slot>,
    /// Monotonic probe cursor used by [`RingDirectory::add`]; wraps modulo
    /// `RING_SIZE` so a long-lived process cycling many joins and leaves
    /// cannot exhaust slots spuriously.
    cursor: Slot,
}

impl RingDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Places `node_id` on the ring at `hash`, linear-probing upward from
    /// the cursor on collision.
    ///
    /// If `hash` is free, the node lands exactly there. Otherwise the
    /// lowest free slot at or after the cursor is used, and the cursor
    /// itself wraps rather than running off the end of the slot space.
    /// Returns the slot the node was actually placed at.
    pub fn add(&mut self, node_id: NodeId, hash: Slot) -> Result<Slot> {
        if self.place_if_vacant(node_id, hash) {
            return Ok(hash);
        }
        for step in 0..RING_SIZE {
            let candidate = slot_add(self.cursor, step);
            if self.place_if_vacant(node_id, candidate) {
                self.cursor = candidate;
                return Ok(candidate);
            }
        }
        Err(Error::RingFull)
    }

    fn place_if_vacant(&mut self, node_id: NodeId, slot: Slot) -> bool {
        if self.slots.contains_key(&slot) {
            return false;
        }
        self.slots.insert(slot, node_id);
        self.reverse.insert(node_id, slot);
        true
    }

    /// Removes a node from the ring, if present.
    pub fn remove(&mut self, node_id: NodeId) -> Option<Slot> {
        let slot = self.reverse.remove(&node_id)?;
        self.slots.remove(&slot);
        Some(slot)
    }

    pub fn slot_of(&self, node_id: NodeId) -> Option<Slot> {
        self.reverse.get(&node_id).copied()
    }

    pub fn node_at(&self, slot: Slot) -> Option<NodeId> {
        self.slots.get(&slot).copied()
    }

    pub fn contains(&self, node_id: NodeId) -> bool {
        self.reverse.contains_key(&node_id)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// All live nodes paired with their slot, in no particular order.
    pub fn entries(&self) -> impl Iterator<Item = (Slot, NodeId)> + '_ {
        self.slots.iter().map(|(&slot, &node)| (slot, node))
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.reverse.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_places_node_at_free_hash() {
        let mut dir = RingDirectory::new();
        let slot = dir.add(NodeId(8000), 10).unwrap();
        assert_eq!(slot, 10);
        assert_eq!(dir.node_at(10), Some(NodeId(8000)));
        assert_eq!(dir.slot_of(NodeId(8000)), Some(10));
    }

    #[test]
    fn add_probes_upward_on_collision() {
        let mut dir = RingDirectory::new();
        dir.add(NodeId(1), 5).unwrap();
        let slot = dir.add(NodeId(2), 5).unwrap();
        assert_eq!(slot, 6);
    }

    #[test]
    fn add_wraps_the_cursor_past_the_top_slot() {
        let mut dir = RingDirectory::new();
        dir.add(NodeId(1), 127).unwrap();
        // Collides at 127, the last slot; the probe must wrap to slot 0
        // instead of scanning off the end of the space.
        let slot = dir.add(NodeId(2), 127).unwrap();
        assert_eq!(slot, 0);
    }

    #[test]
    fn remove_frees_the_slot() {
        let mut dir = RingDirectory::new();
        dir.add(NodeId(1), 5).unwrap();
        assert_eq!(dir.remove(NodeId(1)), Some(5));
        assert!(dir.node_at(5).is_none());
        assert!(!dir.contains(NodeId(1)));
    }

    #[test]
    fn ring_full_is_reported_rather_than_panicking() {
        let mut dir = RingDirectory::new();
        for port in 0..RING_SIZE as u32 {
            dir.add(NodeId(port), port as Slot).unwrap();
        }
        assert!(matches!(dir.add(NodeId(9999), 0), Err(Error::RingFull)));
    }
}
