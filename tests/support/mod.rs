#![allow(dead_code)]

//! Synthetic record encoders shared by the integration tests.

use ctrace::record::{DateTime, ScannerTime};

pub const HEADER: u16 = 0;
pub const SCANNER: u16 = 3;
pub const EVENT: u16 = 4;
pub const FOOTER: u16 = 5;

pub const START: DateTime = DateTime {
    year: 2023,
    month: 12,
    day: 7,
    hour: 17,
    minute: 15,
    second: 0,
};

pub const STOP: DateTime = DateTime {
    year: 2023,
    month: 12,
    day: 7,
    hour: 17,
    minute: 30,
    second: 0,
};

pub fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Prefix a body with its length and type.
pub fn frame(kind: u16, body: &[u8]) -> Vec<u8> {
    let length = u16::try_from(body.len() + 4).unwrap();

    let mut r = Vec::with_capacity(body.len() + 4);
    r.extend_from_slice(&length.to_be_bytes());
    r.extend_from_slice(&kind.to_be_bytes());
    r.extend_from_slice(body);
    r
}

/// A NUL-padded text field.
pub fn fixed(s: &str, width: usize) -> Vec<u8> {
    let mut r = s.as_bytes().to_vec();
    r.resize(width, 0);
    r
}

pub fn date_time(t: DateTime) -> Vec<u8> {
    let mut r = t.year.to_be_bytes().to_vec();
    r.extend_from_slice(&[t.month, t.day, t.hour, t.minute, t.second]);
    r
}

pub fn header_body(
    file_version: &str,
    pm_version: &str,
    pm_revision: &str,
    t: DateTime,
    ne_user_label: &str,
    ne_logical_label: &str,
) -> Vec<u8> {
    [
        fixed(file_version, 5),
        fixed(pm_version, 13),
        fixed(pm_revision, 5),
        date_time(t),
        fixed(ne_user_label, 128),
        fixed(ne_logical_label, 255),
    ]
    .concat()
}

/// A 417-byte header record.
pub fn header() -> Vec<u8> {
    frame(
        HEADER,
        &header_body("01.00", "LTE-22.Q4.101", "R1A01", START, "NAV002B2", "MeContext=NAV002B2"),
    )
}

pub fn scanner(t: ScannerTime, id: [u8; 3], status: u8, padding: &[u8]) -> Vec<u8> {
    let mut body = vec![t.hour, t.minute, t.second];
    body.extend_from_slice(&t.millisecond.to_be_bytes());
    body.extend_from_slice(&id);
    body.push(status);
    body.extend_from_slice(padding);
    frame(SCANNER, &body)
}

pub fn event(id: u32, parameters: &[u8]) -> Vec<u8> {
    let mut body = id.to_be_bytes()[1..].to_vec();
    body.extend_from_slice(parameters);
    frame(EVENT, &body)
}

/// A 12-byte footer record.
pub fn footer(t: DateTime, padding: u8) -> Vec<u8> {
    let mut body = date_time(t);
    body.push(padding);
    frame(FOOTER, &body)
}
