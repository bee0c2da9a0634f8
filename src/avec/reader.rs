//! Reader-based decoder implementation.

use std::io::{self, Read};

use crate::catalog::Catalog;

use super::{Cancel, Error, FileInfo, Options, Session, Source, assemble};

struct ReaderSource<'r, R> {
    r: &'r mut R,
    // Reused across records. Never grows past the largest record length.
    buf: Vec<u8>,
}

impl<R: Read> Source for ReaderSource<'_, R> {
    fn prefix(&mut self) -> io::Result<[u8; 4]> {
        let mut buf = [0; 4];
        self.r.read_exact(&mut buf)?;
        Ok(buf)
    }

    fn body(&mut self, size: usize) -> io::Result<&[u8]> {
        self.buf.resize(size, 0);
        self.r.read_exact(&mut self.buf)?;
        Ok(&self.buf)
    }
}

/// Decode the records of a file from a reader, publishing a session.
///
/// Exactly `file.size` bytes are decoded from the reader, unless the record
/// cap in `options` is reached first. A reader ending early fails with
/// [`ErrorKind::Truncated`](super::ErrorKind::Truncated). The `cancel` token
/// is checked before each record.
///
/// This method is also re-exported as `ctrace::avec::decode_reader`.
pub fn decode(
    r: &mut impl Read,
    file: FileInfo,
    catalog: &Catalog,
    options: &Options,
    cancel: &Cancel,
) -> Result<Session, Error> {
    let mut src = ReaderSource { r, buf: Vec::new() };
    assemble(&mut src, file, catalog, options, cancel)
}
