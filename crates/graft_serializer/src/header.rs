//! Fixed payload header.
//!
//! Layout: `[magic "GRFT"] [version u16] [stamp length u16] [stamp bytes] [body]`.
//! The version sits at a fixed offset so a reader can dispatch before
//! looking at anything else.

use graft_foundation::{Error, Result};

/// Magic bytes identifying a Graft payload.
pub const MAGIC: [u8; 4] = *b"GRFT";

/// Byte offset of the version field.
pub const VERSION_OFFSET: usize = 4;

const STAMP_OFFSET: usize = VERSION_OFFSET + 2;

/// Decoded header fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Header {
    /// Format version.
    pub version: u16,
    /// Opaque engine stamp.
    pub stamp: String,
}

impl Header {
    /// Creates a header.
    #[must_use]
    pub fn new(version: u16, stamp: impl Into<String>) -> Self {
        Self {
            version,
            stamp: stamp.into(),
        }
    }

    /// Writes the header followed by `body`.
    ///
    /// # Errors
    ///
    /// Returns an error if the stamp is longer than `u16::MAX` bytes.
    pub fn encode(&self, body: &[u8]) -> Result<Vec<u8>> {
        let stamp_len = u16::try_from(self.stamp.len())
            .map_err(|_| Error::serialization("engine stamp too long"))?;
        let mut out = Vec::with_capacity(STAMP_OFFSET + 2 + self.stamp.len() + body.len());
        out.extend_from_slice(&MAGIC);
        out.extend_from_slice(&self.version.to_le_bytes());
        out.extend_from_slice(&stamp_len.to_le_bytes());
        out.extend_from_slice(self.stamp.as_bytes());
        out.extend_from_slice(body);
        Ok(out)
    }

    /// Splits a payload into its header and body.
    ///
    /// # Errors
    ///
    /// Returns a corrupt payload error if the magic is wrong or the header is
    /// truncated.
    pub fn decode(payload: &[u8]) -> Result<(Self, &[u8])> {
        let version = peek_version(payload)?;
        let len_bytes = payload
            .get(STAMP_OFFSET..STAMP_OFFSET + 2)
            .ok_or_else(|| Error::corrupt("header truncated before stamp length"))?;
        let stamp_len = usize::from(u16::from_le_bytes([len_bytes[0], len_bytes[1]]));
        let body_start = STAMP_OFFSET + 2 + stamp_len;
        let stamp = payload
            .get(STAMP_OFFSET + 2..body_start)
            .ok_or_else(|| Error::corrupt("header truncated inside stamp"))?;
        let stamp = String::from_utf8_lossy(stamp).into_owned();
        Ok((Self { version, stamp }, &payload[body_start..]))
    }
}

/// Reads only the version field.
///
/// # Errors
///
/// Returns a corrupt payload error if the magic is wrong or the payload is
/// too short.
pub fn peek_version(payload: &[u8]) -> Result<u16> {
    if payload.get(..MAGIC.len()) != Some(&MAGIC[..]) {
        return Err(Error::corrupt("not a graft payload (bad magic)"));
    }
    let bytes = payload
        .get(VERSION_OFFSET..VERSION_OFFSET + 2)
        .ok_or_else(|| Error::corrupt("header truncated before version"))?;
    Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
}
