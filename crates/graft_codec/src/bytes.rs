//! Little-endian byte primitives.
//!
//! Everything the codec writes is built from these: fixed-width integers,
//! IEEE floats, length-prefixed strings, GUIDs (16 bytes), and live handles
//! (12 bytes). Reading past the end is a corrupt payload, never a panic.

use graft_foundation::{Error, Guid, ObjectId, Result};

/// Growable output buffer.
#[derive(Clone, Debug, Default)]
pub struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    /// Creates an empty writer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes one byte.
    pub fn write_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    /// Writes a bool as one byte.
    pub fn write_bool(&mut self, value: bool) {
        self.buf.push(u8::from(value));
    }

    /// Writes a u16.
    pub fn write_u16(&mut self, value: u16) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes a u32.
    pub fn write_u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes an i64.
    pub fn write_i64(&mut self, value: i64) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes an f64.
    pub fn write_f64(&mut self, value: f64) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes a collection length.
    ///
    /// # Errors
    ///
    /// Returns an error if the length does not fit in a u32.
    pub fn write_len(&mut self, len: usize) -> Result<()> {
        let len = u32::try_from(len).map_err(|_| Error::serialization("length exceeds u32"))?;
        self.write_u32(len);
        Ok(())
    }

    /// Writes a length-prefixed UTF-8 string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is longer than `u32::MAX` bytes.
    pub fn write_str(&mut self, value: &str) -> Result<()> {
        self.write_len(value.len())?;
        self.buf.extend_from_slice(value.as_bytes());
        Ok(())
    }

    /// Writes a GUID.
    pub fn write_guid(&mut self, guid: Guid) {
        self.buf.extend_from_slice(&guid.to_le_bytes());
    }

    /// Writes a live handle.
    pub fn write_object_id(&mut self, id: ObjectId) {
        self.buf.extend_from_slice(&id.to_le_bytes());
    }

    /// Number of bytes written so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns true if nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Consumes the writer, returning the bytes.
    #[must_use]
    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}

/// Cursor over a borrowed byte slice.
#[derive(Clone, Debug)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    /// Creates a reader positioned at the start of `data`.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|end| *end <= self.data.len())
            .ok_or_else(|| {
                Error::corrupt(format!(
                    "unexpected end of buffer at byte {} (wanted {n})",
                    self.pos
                ))
            })?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    /// Reads one byte.
    ///
    /// # Errors
    ///
    /// Returns a corrupt payload error at end of input.
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    /// Reads a bool.
    ///
    /// # Errors
    ///
    /// Returns a corrupt payload error at end of input or for a byte other
    /// than 0 or 1.
    pub fn read_bool(&mut self) -> Result<bool> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            b => Err(Error::corrupt(format!("invalid bool byte {b}"))),
        }
    }

    /// Reads a u16.
    ///
    /// # Errors
    ///
    /// Returns a corrupt payload error at end of input.
    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.take_array()?))
    }

    /// Reads a u32.
    ///
    /// # Errors
    ///
    /// Returns a corrupt payload error at end of input.
    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.take_array()?))
    }

    /// Reads an i64.
    ///
    /// # Errors
    ///
    /// Returns a corrupt payload error at end of input.
    pub fn read_i64(&mut self) -> Result<i64> {
        Ok(i64::from_le_bytes(self.take_array()?))
    }

    /// Reads an f64.
    ///
    /// # Errors
    ///
    /// Returns a corrupt payload error at end of input.
    pub fn read_f64(&mut self) -> Result<f64> {
        Ok(f64::from_le_bytes(self.take_array()?))
    }

    /// Reads a length-prefixed UTF-8 string.
    ///
    /// # Errors
    ///
    /// Returns a corrupt payload error at end of input or on invalid UTF-8.
    pub fn read_str(&mut self) -> Result<&'a str> {
        let len = self.read_u32()? as usize;
        let bytes = self.take(len)?;
        std::str::from_utf8(bytes).map_err(|e| Error::corrupt(format!("invalid utf-8: {e}")))
    }

    /// Reads a GUID.
    ///
    /// # Errors
    ///
    /// Returns a corrupt payload error at end of input.
    pub fn read_guid(&mut self) -> Result<Guid> {
        Ok(Guid::from_le_bytes(self.take_array()?))
    }

    /// Reads a live handle.
    ///
    /// # Errors
    ///
    /// Returns a corrupt payload error at end of input.
    pub fn read_object_id(&mut self) -> Result<ObjectId> {
        Ok(ObjectId::from_le_bytes(self.take_array()?))
    }

    /// Current offset.
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left to read.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Returns true if every byte has been consumed.
    #[must_use]
    pub fn is_at_end(&self) -> bool {
        self.pos >= self.data.len()
    }
}
