use std::{fs::File, path::Path};

use csv::ReaderBuilder;
use ctrace::{
    avec::{self, ErrorKind, FromSessions, OnError, Options, Session, files::Failure},
    catalog::Catalog,
    record::Record,
    sans::frame::FrameError,
};

mod support;

#[test]
fn decode_slice_sample() {
    const PATH: &str = "fixtures/sample.bin";
    let data = std::fs::read(PATH).unwrap();
    let mut validator = Validator::new(PATH);

    let session =
        avec::decode_slice(&data, "sample.bin", &Catalog::builtin(), &Options::default()).unwrap();
    validator.add_session(session);
    validator.finish();
}

#[test]
fn decode_reader_sample() {
    const PATH: &str = "fixtures/sample.bin";
    let mut file = File::open(PATH).unwrap();
    let info = avec::FileInfo::new(avec::FileId(0), "sample.bin", file.metadata().unwrap().len());
    let mut validator = Validator::new(PATH);

    let session = avec::decode_reader(
        &mut file,
        info,
        &Catalog::builtin(),
        &Options::default(),
        &avec::Cancel::new(),
    )
    .unwrap();
    validator.add_session(session);
    validator.finish();
}

#[test]
fn decode_files_sample() {
    support::init();

    const PATH: &str = "fixtures/sample.bin";
    let entry = avec::files::FileEntry::stat(PATH).unwrap();
    let mut validator = Validator::new(PATH);

    let tally =
        avec::decode_files([entry], &Catalog::builtin(), &Options::default(), &mut validator)
            .unwrap();
    validator.finish();

    assert_eq!(tally.sessions, 1);
    assert_eq!(tally.failures, 0);
    assert_eq!(tally.records, 5);
}

#[test]
fn decode_unknown_type() {
    const PATH: &str = "fixtures/unknown-type.bin";
    let data = std::fs::read(PATH).unwrap();

    let err = avec::decode_slice(&data, "unknown-type.bin", &Catalog::builtin(), &Options::default())
        .unwrap_err();

    assert!(matches!(err.kind, ErrorKind::Frame(FrameError::UnknownType(9))));
    assert_eq!(err.index, 1);
    assert_eq!(err.offset, 417);
}

#[test]
fn abort_on_unknown_type() {
    let entry = avec::files::FileEntry::stat("fixtures/unknown-type.bin").unwrap();
    let options = Options {
        on_error: OnError::Abort,
        ..Options::default()
    };
    let mut sessions: Vec<Session> = Vec::new();

    let failure = avec::decode_files([entry], &Catalog::builtin(), &options, &mut sessions)
        .unwrap_err();

    assert!(sessions.is_empty());
    assert_eq!(failure.path, Path::new("fixtures/unknown-type.bin"));
    assert!(matches!(
        failure.error.kind,
        ErrorKind::Frame(FrameError::UnknownType(9))
    ));
}

/// Checks decoded records against the rows of a CSV file.
struct Validator(Vec<Vec<String>>);

impl Validator {
    fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().with_extension("csv");

        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .has_headers(false)
            .from_path(path)
            .unwrap();

        let expected = reader
            .records()
            .map(|r| r.unwrap().iter().map(|f| f.to_string()).collect())
            .collect();

        Self(expected)
    }

    fn finish(&self) {
        assert!(self.0.is_empty(), "{} rows not decoded", self.0.len());
    }
}

fn hex(r: &[u8]) -> String {
    r.iter().map(|b| format!("{b:02x}")).collect()
}

fn row(index: usize, record: &Record) -> Vec<String> {
    let mut row = vec![
        index.to_string(),
        record.kind().to_string(),
        record.length().to_string(),
    ];

    match record {
        Record::Header(r) => row.extend([
            r.file_version.clone(),
            r.pm_version.clone(),
            r.pm_revision.clone(),
            r.date_time.to_string(),
            r.ne_user_label.clone(),
            r.ne_logical_label.clone(),
            r.record_count.to_string(),
            r.file_name.clone(),
        ]),
        Record::Scanner(r) => row.extend([
            r.timestamp.to_string(),
            hex(&r.scanner_id),
            r.status.to_string(),
            hex(&r.padding),
        ]),
        Record::Event(r) => row.extend([r.id.to_string(), r.name.clone(), hex(&r.parameters)]),
        Record::Footer(r) => row.extend([r.date_time.to_string(), r.padding.to_string()]),
    }

    row
}

impl FromSessions for Validator {
    fn add_session(&mut self, session: Session) {
        for (_, index, record) in session.rows() {
            assert!(!self.0.is_empty(), "unexpected record {index}");
            assert_eq!(row(index, record), self.0.remove(0));
        }
    }

    fn add_failure(&mut self, failure: Failure) {
        panic!("{failure}");
    }
}
