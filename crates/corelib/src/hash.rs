//! The two deterministic hash functions that place nodes and rows on the ring.
//!
//! Both functions are pure byte arithmetic, not a cryptographic digest: the
//! ring's placement contract depends on reproducing the exact sums below,
//! nonce bytes and all.

use crate::ring::{Slot, RING_SIZE};

const NODE_HASH_NONCE: &[u8] = b"8757";
const DATA_HASH_NONCE: &[u8] = b"875";

/// Hashes a node's port string into a ring slot.
///
/// Sums `port[i] * nonce[i]` for `i` up to `min(len(port), len(nonce))` and
/// reduces mod `M`. The cap on `i` avoids indexing the 4-byte nonce past
/// its end when the port string is longer than the nonce.
pub fn node_hash(port: &str) -> Slot {
    let bytes = port.as_bytes();
    let take = bytes.len().min(NODE_HASH_NONCE.len());
    let sum: u32 = bytes[..take]
        .iter()
        .zip(&NODE_HASH_NONCE[..take])
        .map(|(b, n)| u32::from(*b) * u32::from(*n))
        .sum();
    (sum % u32::from(RING_SIZE)) as Slot
}

/// Hashes a `(key, relationship)` pair into a ring slot.
///
/// The high nibble of the key's weighted byte sum and the low nibble of the
/// relationship's weighted byte sum are concatenated, giving a value in
/// `[0, 128)`. This layout is what makes the wildcard lookups in
/// [`crate::cluster::dict3`] sweep 16 consecutive slots (fixed key, varying
/// relationship) or 8 slots spaced 16 apart (fixed relationship, varying key).
pub fn data_hash(key: &str, relationship: &str) -> Slot {
    let sk = weighted_sum(key.as_bytes());
    let sr = weighted_sum(relationship.as_bytes());
    (((sk >> 4) << 4) | (sr & 0x0F)) as Slot
}

fn weighted_sum(bytes: &[u8]) -> u32 {
    let sum: u32 = bytes
        .iter()
        .enumerate()
        .map(|(i, b)| u32::from(*b) * u32::from(DATA_HASH_NONCE[i % DATA_HASH_NONCE.len()]))
        .sum();
    sum % 128
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_hash_is_in_range() {
        for port in ["8000", "8001", "65535", "1"] {
            assert!(node_hash(port) < RING_SIZE as Slot);
        }
    }

    #[test]
    fn node_hash_caps_nonce_read_for_long_ports() {
        // A 6-digit port must not panic indexing a 4-byte nonce.
        assert!(node_hash("123456") < RING_SIZE as Slot);
    }

    #[test]
    fn node_hash_is_deterministic() {
        assert_eq!(node_hash("8000"), node_hash("8000"));
    }

    #[test]
    fn data_hash_is_in_range() {
        assert!(data_hash("a", "b") < RING_SIZE as Slot);
        assert!(data_hash("", "") < RING_SIZE as Slot);
        assert!(data_hash("a-very-long-key-value", "rel") < RING_SIZE as Slot);
    }

    #[test]
    fn data_hash_wildcard_relationship_spans_sixteen_slots() {
        // Varying only the relationship changes just the low nibble, so
        // h, h+1, ..., h+15 (mod 16 within the low nibble) cover every
        // possible relationship hash for a fixed key.
        let h = data_hash("alpha", "");
        assert_eq!(h & 0x0F, 0);
    }

    #[test]
    fn data_hash_wildcard_key_spans_eight_slots_of_sixteen() {
        let h = data_hash("", "r1");
        assert_eq!(h & 0xF0, 0);
    }
}
