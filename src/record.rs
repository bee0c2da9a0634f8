//! Decoded records.
//!
//! Text fields are stored as owned strings, cut at the first NUL of their
//! fixed-width field on the wire. Raw fields (identifiers, padding, event
//! parameters) are kept byte-for-byte.

use core::fmt;
use std::time::SystemTime;

pub use crate::sans::frame::RecordKind;

/// A calendar timestamp, as stored in header and footer records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

/// A time of day with millisecond precision, as stored in scanner records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScannerTime {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub millisecond: u16,
}

impl fmt::Display for ScannerTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}:{:03}",
            self.hour, self.minute, self.second, self.millisecond
        )
    }
}

/// The first record of a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderRecord {
    pub length: u16,
    pub file_version: String,
    pub pm_version: String,
    pub pm_revision: String,
    pub date_time: DateTime,
    pub ne_user_label: String,
    pub ne_logical_label: String,

    /// Name of the file this header was read from.
    ///
    /// This and the following fields are not part of the record on the wire,
    /// and are attached once the whole file has been decoded.
    pub file_name: String,
    /// Number of records decoded from the file, this header included.
    pub record_count: u32,
    pub decoded_at: Option<SystemTime>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannerRecord {
    pub length: u16,
    pub timestamp: ScannerTime,
    pub scanner_id: [u8; 3],
    pub status: u8,
    /// Every byte following the status byte.
    pub padding: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    pub length: u16,
    /// A 24-bit event identifier.
    pub id: u32,
    /// Name of the event in the catalog, or empty if it has no entry.
    pub name: String,
    /// Undecoded event parameters.
    pub parameters: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FooterRecord {
    pub length: u16,
    pub date_time: DateTime,
    pub padding: u8,
}

/// A decoded record of any kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Header(HeaderRecord),
    Scanner(ScannerRecord),
    Event(EventRecord),
    Footer(FooterRecord),
}

impl Record {
    pub fn kind(&self) -> RecordKind {
        match self {
            Self::Header(_) => RecordKind::Header,
            Self::Scanner(_) => RecordKind::Scanner,
            Self::Event(_) => RecordKind::Event,
            Self::Footer(_) => RecordKind::Footer,
        }
    }

    /// Total size of the record on the wire, including its prefix.
    pub fn length(&self) -> u16 {
        match self {
            Self::Header(r) => r.length,
            Self::Scanner(r) => r.length,
            Self::Event(r) => r.length,
            Self::Footer(r) => r.length,
        }
    }
}

impl From<HeaderRecord> for Record {
    fn from(r: HeaderRecord) -> Self {
        Self::Header(r)
    }
}

impl From<ScannerRecord> for Record {
    fn from(r: ScannerRecord) -> Self {
        Self::Scanner(r)
    }
}

impl From<EventRecord> for Record {
    fn from(r: EventRecord) -> Self {
        Self::Event(r)
    }
}

impl From<FooterRecord> for Record {
    fn from(r: FooterRecord) -> Self {
        Self::Footer(r)
    }
}
