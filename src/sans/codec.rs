//! Bounds-checked integer and string extraction from byte slices.

use thiserror::Error;

/// A read reaching past the end of a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Read of {width} bytes at offset {offset} exceeds a {len}-byte buffer.")]
pub struct OutOfBounds {
    pub offset: usize,
    pub width: usize,
    pub len: usize,
}

/// Take an exact number of bytes from an offset in a slice.
fn take<const N: usize>(r: &[u8], offset: usize) -> Result<[u8; N], OutOfBounds> {
    let err = OutOfBounds {
        offset,
        width: N,
        len: r.len(),
    };

    let end = offset.checked_add(N).ok_or(err)?;
    let bytes = r.get(offset..end).ok_or(err)?;

    bytes.try_into().map_err(|_| err)
}

/// Read a big-endian `u16` at an offset.
pub fn be16(r: &[u8], offset: usize) -> Result<u16, OutOfBounds> {
    take(r, offset).map(u16::from_be_bytes)
}

/// Read a little-endian `u16` at an offset.
pub fn le16(r: &[u8], offset: usize) -> Result<u16, OutOfBounds> {
    take(r, offset).map(u16::from_le_bytes)
}

/// Read a big-endian, 24-bit unsigned integer at an offset.
///
/// Only three bytes are combined. The result always fits in the low 24 bits.
pub fn be24(r: &[u8], offset: usize) -> Result<u32, OutOfBounds> {
    let [a, b, c] = take(r, offset)?;
    Ok(u32::from_be_bytes([0, a, b, c]))
}

/// Convert a fixed-width, NUL-padded text field to a string.
///
/// The field ends at its first NUL byte, or at its full width if it has none.
/// Invalid UTF-8 is replaced rather than rejected.
pub fn fixed_str(r: &[u8]) -> String {
    let end = r.iter().position(|&b| b == 0).unwrap_or(r.len());
    String::from_utf8_lossy(&r[..end]).into_owned()
}

/// A read position in a record body.
///
/// Every read is checked against the end of the body before any byte is
/// touched, and advances the position by the width of the field read.
#[derive(Debug)]
pub struct Cursor<'a> {
    r: &'a [u8],
    i: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(r: &'a [u8]) -> Self {
        Self { r, i: 0 }
    }

    /// Number of bytes consumed so far.
    pub fn position(&self) -> usize {
        self.i
    }

    /// Take an exact number of bytes, advancing the position.
    pub fn take<const N: usize>(&mut self) -> Result<[u8; N], OutOfBounds> {
        let bytes = take(self.r, self.i)?;
        self.i += N;
        Ok(bytes)
    }

    /// Take a run of `n` bytes, advancing the position.
    pub fn take_slice(&mut self, n: usize) -> Result<&'a [u8], OutOfBounds> {
        let err = OutOfBounds {
            offset: self.i,
            width: n,
            len: self.r.len(),
        };

        let end = self.i.checked_add(n).ok_or(err)?;
        let bytes = self.r.get(self.i..end).ok_or(err)?;
        self.i = end;

        Ok(bytes)
    }

    pub fn u8(&mut self) -> Result<u8, OutOfBounds> {
        let [b] = self.take()?;
        Ok(b)
    }

    pub fn be16(&mut self) -> Result<u16, OutOfBounds> {
        let x = be16(self.r, self.i)?;
        self.i += 2;
        Ok(x)
    }

    pub fn be24(&mut self) -> Result<u32, OutOfBounds> {
        let x = be24(self.r, self.i)?;
        self.i += 3;
        Ok(x)
    }

    /// Take a fixed-width text field. See [`fixed_str`].
    pub fn fixed_str(&mut self, width: usize) -> Result<String, OutOfBounds> {
        self.take_slice(width).map(fixed_str)
    }

    /// Take every remaining byte, possibly none.
    pub fn rest(&mut self) -> &'a [u8] {
        let rest = &self.r[self.i.min(self.r.len())..];
        self.i = self.r.len();
        rest
    }
}
