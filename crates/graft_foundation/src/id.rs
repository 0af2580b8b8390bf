//! Live object handles with generational indices.

use std::fmt;

/// Handle to a live entity or behavior-object in a host scene.
///
/// The generation counter changes when a slot is reused after destruction,
/// so a handle held across a destroy is detectably stale. Handles are never
/// written to persistent payloads; GUIDs are.
///
/// # Layout
/// - `index`: 64-bit slot index in the host arena
/// - `generation`: 32-bit generation counter
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ObjectId {
    /// Slot index in the host arena.
    pub index: u64,
    /// Generation counter for stale handle detection.
    pub generation: u32,
}

impl ObjectId {
    /// Creates a handle with the given index and generation.
    #[must_use]
    pub const fn new(index: u64, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Packs the handle into the 12-byte form used by foreign references.
    #[must_use]
    pub fn to_le_bytes(self) -> [u8; 12] {
        let mut out = [0u8; 12];
        out[..8].copy_from_slice(&self.index.to_le_bytes());
        out[8..].copy_from_slice(&self.generation.to_le_bytes());
        out
    }

    /// Unpacks a handle written by [`ObjectId::to_le_bytes`].
    #[must_use]
    pub fn from_le_bytes(bytes: [u8; 12]) -> Self {
        let mut index = [0u8; 8];
        let mut generation = [0u8; 4];
        index.copy_from_slice(&bytes[..8]);
        generation.copy_from_slice(&bytes[8..]);
        Self {
            index: u64::from_le_bytes(index),
            generation: u32::from_le_bytes(generation),
        }
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({}v{})", self.index, self.generation)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Object({})", self.index)
    }
}
