//! Batch decoding of trace files.

use std::{
    fs::File,
    io::{self, BufReader},
    path::PathBuf,
};

use crate::catalog::Catalog;

use super::{Cancel, Error, ErrorKind, FileId, FileInfo, FromSessions, OnError, Options, reader};

/// A file to decode, as listed by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: PathBuf,
    /// Length of the file in bytes.
    pub size: u64,
}

impl FileEntry {
    pub fn new(path: impl Into<PathBuf>, size: u64) -> Self {
        Self {
            path: path.into(),
            size,
        }
    }

    /// Describe a file by reading its length from the file system.
    pub fn stat(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let size = path.metadata()?.len();
        Ok(Self { path, size })
    }

    fn name(&self) -> String {
        self.path.file_name().map_or_else(
            || self.path.display().to_string(),
            |name| name.to_string_lossy().into_owned(),
        )
    }
}

/// A file that failed to decode.
#[derive(Debug, thiserror::Error)]
#[error("{}: {error}", .path.display())]
pub struct Failure {
    pub path: PathBuf,
    #[source]
    pub error: Error,
}

/// Counts of the outcomes of a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub sessions: usize,
    pub failures: usize,
    /// Records decoded across all sessions.
    pub records: u64,
}

/// Decode a batch of files in order, publishing to a receiver.
///
/// Files are numbered from zero in the order given. Each file is decoded to
/// completion before the next is opened.
///
/// A file that fails to decode is passed to
/// [`FromSessions::add_failure`], and the batch moves on to the next file.
/// Under [`OnError::Abort`], the batch instead stops and returns the
/// failure. A file abandoned through its [`Cancel`] token never stops the
/// batch.
///
/// This method is also re-exported as `ctrace::avec::decode_files`.
pub fn decode_files(
    entries: impl IntoIterator<Item = FileEntry>,
    catalog: &Catalog,
    options: &Options,
    o: &mut impl FromSessions,
) -> Result<Tally, Failure> {
    let mut tally = Tally::default();

    for (n, entry) in entries.into_iter().enumerate() {
        let file = FileInfo::new(FileId(n), entry.name(), entry.size);
        let id = file.id;

        log::info!("Processing {} ({} bytes).", entry.path.display(), entry.size);

        let cancel = Cancel::new();
        o.begin_file(&file, &cancel);

        let result = File::open(&entry.path)
            .map_err(|e| Error {
                file: id,
                offset: 0,
                index: 0,
                kind: ErrorKind::Io(e),
            })
            .and_then(|f| reader::decode(&mut BufReader::new(f), file, catalog, options, &cancel));

        match result {
            Ok(session) => {
                tally.sessions += 1;
                tally.records += u64::from(session.end().count());
                o.add_session(session);
            }
            Err(error) => {
                log::warn!("Failed to decode {}: {error}", entry.path.display());

                tally.failures += 1;

                let cancelled = matches!(error.kind, ErrorKind::Cancelled);
                let failure = Failure {
                    path: entry.path,
                    error,
                };

                if options.on_error == OnError::Abort && !cancelled {
                    return Err(failure);
                }

                o.add_failure(failure);
            }
        }
    }

    Ok(tally)
}
