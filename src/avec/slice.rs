//! Slice-based decoder implementation.

use std::io;

use crate::catalog::Catalog;

use super::{Cancel, Error, FileId, FileInfo, Options, Session, Source, assemble};

struct SliceSource<'a> {
    r: &'a [u8],
    i: usize,
}

impl SliceSource<'_> {
    /// Take an exact number of bytes from the tip, advancing it.
    fn take(&mut self, n: usize) -> io::Result<&[u8]> {
        let (r, s) = (self.r, self.i);
        let bytes = s
            .checked_add(n)
            .and_then(|e| r.get(s..e))
            .ok_or(io::ErrorKind::UnexpectedEof)?;
        self.i += n;

        Ok(bytes)
    }
}

impl Source for SliceSource<'_> {
    fn prefix(&mut self) -> io::Result<[u8; 4]> {
        let bytes = self.take(4)?;
        bytes.try_into().map_err(|_| io::ErrorKind::UnexpectedEof.into())
    }

    fn body(&mut self, size: usize) -> io::Result<&[u8]> {
        self.take(size)
    }
}

/// Decode the records of a whole file held in a slice.
///
/// `name` is attached to the header of the session. The file is identified
/// as [`FileId`] zero.
///
/// This method is also re-exported as `ctrace::avec::decode_slice`.
pub fn decode(
    r: &[u8],
    name: impl Into<String>,
    catalog: &Catalog,
    options: &Options,
) -> Result<Session, Error> {
    let file = FileInfo::new(FileId(0), name, r.len() as u64);
    assemble(&mut SliceSource { r, i: 0 }, file, catalog, options, &Cancel::new())
}
