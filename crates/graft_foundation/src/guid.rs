//! Globally unique identifiers for payload-owned objects.

use std::fmt;
use std::str::FromStr;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, ErrorKind};

/// A 128-bit identifier assigned to every object that participates in a payload.
///
/// GUIDs are stable across save/load round trips. The nil GUID is never
/// produced by a [`GuidGenerator`].
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "[u8; 16]", into = "[u8; 16]"))]
pub struct Guid(u128);

impl Guid {
    /// The all-zero GUID.
    pub const NIL: Guid = Guid(0);

    /// Number of bytes in the wire representation.
    pub const BYTES: usize = 16;

    /// Creates a GUID from its raw integer form.
    #[must_use]
    pub const fn from_u128(raw: u128) -> Self {
        Self(raw)
    }

    /// Returns the raw integer form.
    #[must_use]
    pub const fn as_u128(self) -> u128 {
        self.0
    }

    /// Returns true if this is the nil GUID.
    #[must_use]
    pub const fn is_nil(self) -> bool {
        self.0 == 0
    }

    /// Little-endian wire bytes.
    #[must_use]
    pub const fn to_le_bytes(self) -> [u8; 16] {
        self.0.to_le_bytes()
    }

    /// Reads a GUID from little-endian wire bytes.
    #[must_use]
    pub const fn from_le_bytes(bytes: [u8; 16]) -> Self {
        Self(u128::from_le_bytes(bytes))
    }
}

impl From<[u8; 16]> for Guid {
    fn from(bytes: [u8; 16]) -> Self {
        Self::from_le_bytes(bytes)
    }
}

impl From<Guid> for [u8; 16] {
    fn from(guid: Guid) -> Self {
        guid.to_le_bytes()
    }
}

impl fmt::Debug for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Guid({self})")
    }
}

impl fmt::Display for Guid {
    #[allow(clippy::cast_possible_truncation)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let raw = self.0;
        write!(
            f,
            "{:08x}-{:04x}-{:04x}-{:04x}-{:012x}",
            (raw >> 96) as u32,
            (raw >> 80) as u16,
            (raw >> 64) as u16,
            (raw >> 48) as u16,
            raw & 0xffff_ffff_ffff
        )
    }
}

impl FromStr for Guid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex: String = s.chars().filter(|c| *c != '-').collect();
        if hex.len() != 32 {
            return Err(Error::new(ErrorKind::CorruptPayload(format!(
                "malformed guid: {s}"
            ))));
        }
        u128::from_str_radix(&hex, 16)
            .map(Self)
            .map_err(|e| Error::new(ErrorKind::CorruptPayload(format!("malformed guid {s}: {e}"))))
    }
}

/// Source of fresh GUIDs.
///
/// Backed by a ChaCha stream so that a seeded generator yields the same
/// sequence on every platform.
#[derive(Clone, Debug)]
pub struct GuidGenerator {
    rng: ChaCha8Rng,
}

impl GuidGenerator {
    /// Creates a generator seeded from the operating system.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            rng: ChaCha8Rng::from_entropy(),
        }
    }

    /// Creates a deterministic generator.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Produces the next GUID. Never returns [`Guid::NIL`].
    pub fn next_guid(&mut self) -> Guid {
        loop {
            let raw: u128 = self.rng.r#gen();
            if raw != 0 {
                return Guid(raw);
            }
        }
    }
}

impl Default for GuidGenerator {
    fn default() -> Self {
        Self::from_entropy()
    }
}
