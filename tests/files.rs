mod support;

use std::path::PathBuf;

use ctrace::{
    avec::{
        self, Batch, Cancel, ErrorKind, FileId, FileInfo, FromSessions, OnError, Options, Session,
        files::{FileEntry, Failure},
    },
    catalog::Catalog,
    sans::frame::FrameError,
};

/// Collects everything a batch publishes, optionally cancelling some files.
#[derive(Default)]
struct Collector {
    begun: Vec<FileInfo>,
    sessions: Vec<Session>,
    failures: Vec<Failure>,
    cancel: Vec<FileId>,
}

impl FromSessions for Collector {
    fn begin_file(&mut self, file: &FileInfo, cancel: &Cancel) {
        if self.cancel.contains(&file.id) {
            cancel.cancel();
        }
        self.begun.push(file.clone());
    }

    fn add_session(&mut self, session: Session) {
        self.sessions.push(session);
    }

    fn add_failure(&mut self, failure: Failure) {
        self.failures.push(failure);
    }
}

fn entries() -> Vec<FileEntry> {
    vec![
        FileEntry::stat("fixtures/sample.bin").unwrap(),
        FileEntry::stat("fixtures/unknown-type.bin").unwrap(),
        FileEntry::new("fixtures/missing.bin", 100),
        FileEntry::stat("fixtures/sample.bin").unwrap(),
    ]
}

#[test]
fn stat_file() {
    let entry = FileEntry::stat("fixtures/sample.bin").unwrap();
    assert_eq!(entry.size, 469);
    assert_eq!(entry.path, PathBuf::from("fixtures/sample.bin"));

    assert!(FileEntry::stat("fixtures/missing.bin").is_err());
}

#[test]
fn continue_past_failures() {
    support::init();

    let mut o = Collector::default();
    let tally = avec::decode_files(entries(), &Catalog::builtin(), &Options::default(), &mut o)
        .unwrap();

    assert_eq!(tally.sessions, 2);
    assert_eq!(tally.failures, 2);
    assert_eq!(tally.records, 10);

    let ids: Vec<_> = o.begun.iter().map(|f| f.id).collect();
    assert_eq!(ids, [FileId(0), FileId(1), FileId(2), FileId(3)]);
    assert_eq!(o.begun[1].name, "unknown-type.bin");
    assert_eq!(o.begun[1].size, 437);

    assert_eq!(o.sessions[0].file().id, FileId(0));
    assert_eq!(o.sessions[1].file().id, FileId(3));
    assert_eq!(o.sessions[1].header().file_name, "sample.bin");

    let unknown = &o.failures[0];
    assert_eq!(unknown.error.file, FileId(1));
    assert_eq!(unknown.error.offset, 417);
    assert!(matches!(
        unknown.error.kind,
        ErrorKind::Frame(FrameError::UnknownType(9))
    ));

    let missing = &o.failures[1];
    assert_eq!(missing.error.file, FileId(2));
    assert_eq!(missing.path, PathBuf::from("fixtures/missing.bin"));
    assert!(matches!(missing.error.kind, ErrorKind::Io(_)));
    assert!(missing.to_string().starts_with("fixtures/missing.bin: file 2"));
}

#[test]
fn abort_at_first_failure() {
    let options = Options {
        on_error: OnError::Abort,
        ..Options::default()
    };

    let mut o = Collector::default();
    let failure = avec::decode_files(entries(), &Catalog::builtin(), &options, &mut o)
        .unwrap_err();

    assert_eq!(failure.error.file, FileId(1));
    assert_eq!(o.sessions.len(), 1);
    assert!(o.failures.is_empty());
    assert_eq!(o.begun.len(), 2);
}

#[test]
fn cancelled_file_does_not_stop_batch() {
    let options = Options {
        on_error: OnError::Abort,
        ..Options::default()
    };
    let entries = vec![
        FileEntry::stat("fixtures/sample.bin").unwrap(),
        FileEntry::stat("fixtures/sample.bin").unwrap(),
    ];

    let mut o = Collector {
        cancel: vec![FileId(0)],
        ..Collector::default()
    };
    let tally = avec::decode_files(entries, &Catalog::builtin(), &options, &mut o).unwrap();

    assert_eq!(tally.sessions, 1);
    assert_eq!(tally.failures, 1);
    assert!(matches!(o.failures[0].error.kind, ErrorKind::Cancelled));
    assert_eq!(o.sessions[0].file().id, FileId(1));
}

#[test]
fn sessions_into_vec() {
    let entries = [
        FileEntry::stat("fixtures/sample.bin").unwrap(),
        FileEntry::stat("fixtures/unknown-type.bin").unwrap(),
    ];

    let mut sessions: Vec<Session> = Vec::new();
    let tally =
        avec::decode_files(entries, &Catalog::new(), &Options::default(), &mut sessions).unwrap();

    assert_eq!(tally.failures, 1);
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].summary().record_count, 5);
    assert_eq!(sessions[0].summary().consumed, 469);
}

#[test]
fn batch_keeps_failures() {
    let entries = [
        FileEntry::stat("fixtures/unknown-type.bin").unwrap(),
        FileEntry::stat("fixtures/sample.bin").unwrap(),
        FileEntry::new("fixtures/missing.bin", 100),
    ];

    let mut batch = Batch::default();
    let tally =
        avec::decode_files(entries, &Catalog::new(), &Options::default(), &mut batch).unwrap();

    assert_eq!(tally.sessions, 1);
    assert_eq!(tally.failures, 2);
    assert_eq!(batch.sessions.len(), 1);
    assert_eq!(batch.sessions[0].file().id, FileId(1));

    let unknown = &batch.failures[0];
    assert_eq!(unknown.path, PathBuf::from("fixtures/unknown-type.bin"));
    assert_eq!(unknown.error.file, FileId(0));
    assert_eq!(unknown.error.offset, 417);
    assert_eq!(unknown.error.index, 1);
    assert!(matches!(
        unknown.error.kind,
        ErrorKind::Frame(FrameError::UnknownType(9))
    ));

    let missing = &batch.failures[1];
    assert_eq!(missing.error.file, FileId(2));
    assert_eq!(missing.error.offset, 0);
    assert_eq!(missing.error.index, 0);
    assert!(matches!(missing.error.kind, ErrorKind::Io(_)));
}
