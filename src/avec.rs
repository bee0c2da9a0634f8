//! Convenience interfaces for common decoding patterns.
//!
//! The functions in this module decode whole files into a [`Session`]: the
//! ordered records of the file, beginning with its header. Files can be
//! decoded from slices, from readers, or in batches from a list of paths,
//! publishing to the [`FromSessions`] trait.
//!
//! # Example
//!
//! ```
//! use ctrace::{avec::Options, catalog::Catalog};
//!
//! let catalog = Catalog::builtin();
//! let data = std::fs::read("trace.bin")?;
//!
//! let session = ctrace::avec::decode_slice(&data, "trace.bin", &catalog, &Options::default())?;
//!
//! for (file, index, record) in session.rows() {
//!     println!("{file} #{index:03} {} bytes {}", record.length(), record.kind());
//! }
//! ```
//!
//! Decoding of a file stops at its first invalid record, and the error
//! carries the file, byte offset and record index at which it occurred.
//! Batches record the failure and move on to the next file, unless
//! [`OnError::Abort`] is set. A [`Batch`] keeps the decoded files along with
//! the failures.

pub mod files;
pub mod reader;
pub mod slice;

pub use files::decode_files;
pub use reader::decode as decode_reader;
pub use slice::decode as decode_slice;

use core::fmt;
use std::{
    io,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::SystemTime,
};

use either::Either::{Left, Right};
use thiserror::Error;

use crate::{
    catalog::Catalog,
    record::{HeaderRecord, Record, RecordKind},
    sans::{
        Decoder,
        body::RecordDecodeError,
        frame::{End, FrameError, PREFIX_LEN, PrefixError},
    },
};

use files::Failure;

/// Default cap on the number of records decoded from one file.
pub const DEFAULT_MAX_RECORDS: u32 = 1_000_000;

/// What a batch does when a file fails to decode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OnError {
    /// Record the failure, and continue with the next file.
    #[default]
    Continue,
    /// Stop the batch, returning the failure.
    Abort,
}

/// Options for decoding files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// Maximum number of records to decode from each file, or zero for no
    /// limit. A file holding more records is cut short without error.
    pub max_records: u32,
    pub on_error: OnError,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            max_records: DEFAULT_MAX_RECORDS,
            on_error: OnError::default(),
        }
    }
}

/// A token abandoning the decoding of a file.
///
/// Clones share their state. Decoding checks the token before each record,
/// and fails with [`ErrorKind::Cancelled`] once it is set.
#[derive(Debug, Clone, Default)]
pub struct Cancel(Arc<AtomicBool>);

impl Cancel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Position of a file within a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FileId(pub usize);

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "file {}", self.0)
    }
}

/// A file being decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub id: FileId,
    pub name: String,
    /// Length of the file in bytes.
    pub size: u64,
}

impl FileInfo {
    pub fn new(id: FileId, name: impl Into<String>, size: u64) -> Self {
        Self {
            id,
            name: name.into(),
            size,
        }
    }
}

/// The records decoded from one file, in file order.
///
/// The first record is always the header of the file, carrying the name of
/// the file and the number of records decoded. The header is also kept on
/// its own, see [`Session::header`].
#[derive(Debug, Clone)]
pub struct Session {
    file: FileInfo,
    header: HeaderRecord,
    records: Vec<Record>,
    consumed: u64,
    end: End,
}

impl Session {
    pub fn file(&self) -> &FileInfo {
        &self.file
    }

    pub fn header(&self) -> &HeaderRecord {
        &self.header
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    /// Iterate over records along with the file they came from and their
    /// position in it.
    pub fn rows(&self) -> impl Iterator<Item = (FileId, usize, &Record)> {
        let id = self.file.id;
        self.records.iter().enumerate().map(move |(i, r)| (id, i, r))
    }

    /// Total length of the decoded records, in bytes.
    pub fn consumed(&self) -> u64 {
        self.consumed
    }

    pub fn end(&self) -> End {
        self.end
    }

    pub fn summary(&self) -> Summary<'_> {
        Summary {
            file: &self.file,
            header: self.header(),
            record_count: self.end.count(),
            consumed: self.consumed,
            capped: self.end.capped(),
        }
    }
}

/// Per-file figures for reporting.
#[derive(Debug, Clone, Copy)]
pub struct Summary<'a> {
    pub file: &'a FileInfo,
    pub header: &'a HeaderRecord,
    pub record_count: u32,
    pub consumed: u64,
    /// Whether decoding stopped at the record cap.
    pub capped: bool,
}

/// Receive the results of decoding a batch of files.
///
/// The default implementation of each optional method ignores its input.
#[allow(unused_variables)]
pub trait FromSessions {
    /// Called before a file is opened, with a token that abandons it.
    fn begin_file(&mut self, file: &FileInfo, cancel: &Cancel) {}
    /// Add a decoded file.
    fn add_session(&mut self, session: Session);
    /// Add a file that failed to decode.
    fn add_failure(&mut self, failure: Failure) {}
}

impl FromSessions for Vec<Session> {
    fn add_session(&mut self, session: Session) {
        self.push(session);
    }
}

/// Everything published by a batch: decoded files and failed files, each in
/// batch order.
#[derive(Debug, Default)]
pub struct Batch {
    pub sessions: Vec<Session>,
    pub failures: Vec<Failure>,
}

impl FromSessions for Batch {
    fn add_session(&mut self, session: Session) {
        self.sessions.push(session);
    }

    fn add_failure(&mut self, failure: Failure) {
        self.failures.push(failure);
    }
}

/// An error decoding a file, and where it occurred.
#[derive(Debug, Error)]
#[error("{file}, record {index} at byte {offset}: {kind}")]
pub struct Error {
    pub file: FileId,
    /// Offset of the prefix of the failing record.
    pub offset: u64,
    /// Zero-based index of the failing record.
    pub index: u32,
    #[source]
    pub kind: ErrorKind,
}

/// Errors occurring while decoding a file.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// Invalid record prefix.
    #[error("Invalid record prefix: {0}")]
    Frame(#[from] FrameError),
    /// A record runs past the end of the file.
    #[error("Record of {declared} bytes exceeds the {remaining} bytes left in the file.")]
    Truncated { declared: u16, remaining: u64 },
    /// First record is not a header.
    #[error("Expected a header as the first record, found a {0} record.")]
    Sequence(RecordKind),
    /// File too short to hold a header prefix.
    #[error("File ends before its header.")]
    Empty,
    /// Invalid record body.
    #[error("Invalid record body: {0}")]
    Decode(#[from] RecordDecodeError),
    /// An error from the underlying reader.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// Decoding was abandoned through a [`Cancel`] token.
    #[error("Decoding was cancelled.")]
    Cancelled,
}

impl From<PrefixError> for ErrorKind {
    fn from(err: PrefixError) -> Self {
        match err {
            PrefixError::Frame(err) => Self::Frame(err),
            PrefixError::Truncated {
                declared,
                remaining,
            } => Self::Truncated {
                declared,
                remaining,
            },
            PrefixError::Sequence(kind) => Self::Sequence(kind),
        }
    }
}

/// A source of record bytes.
pub(crate) trait Source {
    fn prefix(&mut self) -> io::Result<[u8; 4]>;
    /// Read exactly `size` bytes.
    fn body(&mut self, size: usize) -> io::Result<&[u8]>;
}

/// Map a short read to a truncated record.
fn short_read(err: io::Error, declared: u16, remaining: u64) -> ErrorKind {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        ErrorKind::Truncated {
            declared,
            remaining,
        }
    } else {
        ErrorKind::Io(err)
    }
}

fn trace_record(index: u32, record: &Record) {
    match record {
        Record::Event(event) => log::trace!(
            "#{index:03} {:5} bytes {} -> {} ({})",
            event.length,
            record.kind(),
            event.name,
            event.id
        ),
        _ => log::trace!("#{index:03} {:5} bytes {}", record.length(), record.kind()),
    }
}

/// Drive the finite-state machine over one file.
pub(crate) fn assemble(
    src: &mut impl Source,
    file: FileInfo,
    catalog: &Catalog,
    options: &Options,
    cancel: &Cancel,
) -> Result<Session, Error> {
    let id = file.id;
    let fail = move |offset: u64, index: u32, kind: ErrorKind| Error {
        file: id,
        offset,
        index,
        kind,
    };

    if cancel.is_cancelled() {
        Err(fail(0, 0, ErrorKind::Cancelled))?;
    }

    let start = Decoder::new(file.size, options.max_records);
    let remaining = start.remaining();

    if remaining < u64::from(PREFIX_LEN) {
        Err(fail(0, 0, ErrorKind::Empty))?;
    }

    let r = src
        .prefix()
        .map_err(|e| fail(0, 0, short_read(e, PREFIX_LEN, remaining)))?;
    let (frame, state) = start.advance(r).map_err(|e| fail(0, 0, e.into()))?;

    let r = src
        .body(state.size())
        .map_err(|e| fail(0, 0, short_read(e, frame.length(), remaining)))?;
    let (mut header, mut successor) =
        state.advance(r, catalog).map_err(|e| fail(0, 0, e.into()))?;

    let mut records = vec![Record::Header(header.clone())];
    trace_record(0, &records[0]);

    // Offset of the next record prefix.
    let mut offset = u64::from(frame.length());

    let end = loop {
        let state = match successor {
            Left(state) => state,
            Right(end) => break end,
        };

        let index = state.count();
        let remaining = state.remaining();

        if cancel.is_cancelled() {
            Err(fail(offset, index, ErrorKind::Cancelled))?;
        }

        if remaining < u64::from(PREFIX_LEN) {
            log::warn!("{}: ignoring {remaining} trailing bytes.", file.name);
            break state.finish();
        }

        let r = src
            .prefix()
            .map_err(|e| fail(offset, index, short_read(e, PREFIX_LEN, remaining)))?;
        let (frame, state) = state
            .advance(r)
            .map_err(|e| fail(offset, index, e.into()))?;

        let r = src
            .body(state.size())
            .map_err(|e| fail(offset, index, short_read(e, frame.length(), remaining)))?;
        let (record, s) = state
            .advance(r, catalog)
            .map_err(|e| fail(offset, index, e.into()))?;

        trace_record(index, &record);
        records.push(record);

        offset += u64::from(frame.length());
        successor = s;
    };

    if end.capped() {
        log::info!(
            "{}: stopped after {} records, leaving {} bytes undecoded.",
            file.name,
            end.count(),
            end.trailing()
        );
    }

    // Attach what is only known once the whole file has been read.
    header.file_name = file.name.clone();
    header.record_count = end.count();
    header.decoded_at = Some(SystemTime::now());

    if let Some(first) = records.first_mut() {
        *first = Record::Header(header.clone());
    }

    log::debug!(
        "{}: {} records processed, {offset} of {} bytes.",
        file.name,
        end.count(),
        file.size
    );

    Ok(Session {
        file,
        header,
        records,
        consumed: offset,
        end,
    })
}
