//! The 128-slot identifier space: ring directory, per-node topology,
//! stabilization, and `find_successor` routing.

pub mod directory;
pub mod router;
pub mod stabilizer;
pub mod topology;

pub use directory::RingDirectory;
pub use router::find_successor;
pub use stabilizer::stabilize;
pub use topology::NodeTopology;

/// Size of the identifier space.
pub const RING_SIZE: u16 = 128;

/// A position in `[0, RING_SIZE)`.
pub type Slot = u8;

/// Advances a slot by `delta`, wrapping modulo [`RING_SIZE`].
pub fn slot_add(slot: Slot, delta: u16) -> Slot {
    ((u16::from(slot) + delta) % RING_SIZE) as Slot
}
