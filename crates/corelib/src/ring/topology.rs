//! Per-node routing state: successor, predecessor, and finger table.

use super::Slot;
use crate::node::NodeId;
use std::collections::BTreeMap;

/// Number of finger-table entries: offsets `2^0 .. 2^6` from a node's slot.
pub const FINGER_COUNT: u32 = 7;

/// The neighbour and shortcut information the stabilizer maintains for one node.
#[derive(Clone, Debug)]
pub struct NodeTopology {
    pub slot: Slot,
    pub successor: NodeId,
    pub predecessor: NodeId,
    /// `target_slot -> owner`, exactly [`FINGER_COUNT`] entries.
    pub finger_table: BTreeMap<Slot, NodeId>,
}

impl NodeTopology {
    pub fn new(slot: Slot, self_id: NodeId) -> Self {
        Self {
            slot,
            successor: self_id,
            predecessor: self_id,
            finger_table: BTreeMap::new(),
        }
    }
}
