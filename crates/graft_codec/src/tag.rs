//! Reference tags.

use graft_foundation::{Error, Result};

/// One-byte prefix written before every reference value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ReferenceTag {
    /// Empty reference.
    None = 0,
    /// Index into the resource table.
    ExternalResource = 1,
    /// Index into the type table.
    TypeDescriptor = 2,
    /// GUID of an object in the same payload.
    ObjectReference = 3,
    /// Type index followed by a name index.
    NamedMember = 4,
    /// Raw live handle. Only valid inside one process.
    ForeignOpaque = 5,
}

impl ReferenceTag {
    /// Every tag, in wire order.
    pub const ALL: [Self; 6] = [
        Self::None,
        Self::ExternalResource,
        Self::TypeDescriptor,
        Self::ObjectReference,
        Self::NamedMember,
        Self::ForeignOpaque,
    ];

    /// Wire byte.
    #[must_use]
    pub const fn byte(self) -> u8 {
        self as u8
    }

    /// Decodes a wire byte.
    ///
    /// # Errors
    ///
    /// Returns a corrupt payload error for an unknown byte.
    pub fn from_byte(byte: u8) -> Result<Self> {
        Self::ALL
            .get(byte as usize)
            .copied()
            .ok_or_else(|| Error::corrupt(format!("unknown reference tag {byte}")))
    }
}
