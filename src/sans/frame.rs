//! States processing record prefixes.

use core::fmt;

use either::Either::{self, Left, Right};
use thiserror::Error;
use zerocopy::{FromBytes, byteorder::big_endian::U16};

use super::body::{AnyBody, Body, Header};

/// Size of the length/type prefix opening every record.
pub const PREFIX_LEN: u16 = 4;

/// The kind of a record, as given by the type field of its prefix.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Header = 0,
    Scanner = 3,
    Event = 4,
    Footer = 5,
}

impl RecordKind {
    /// The type code of this kind on the wire.
    pub fn code(self) -> u16 {
        self as u16
    }
}

impl TryFrom<u16> for RecordKind {
    type Error = FrameError;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Header),
            3 => Ok(Self::Scanner),
            4 => Ok(Self::Event),
            5 => Ok(Self::Footer),
            _ => Err(FrameError::UnknownType(code)),
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Header => "Header",
            Self::Scanner => "Scanner",
            Self::Event => "Event",
            Self::Footer => "Footer",
        })
    }
}

/// An invalid record prefix.
///
/// The alignment of everything after a bad prefix is unknown, so decoding of
/// the file cannot continue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FrameError {
    /// Declared length shorter than the prefix itself.
    #[error("Record length {0} is shorter than its prefix.")]
    InvalidLength(u16),
    /// Unknown record type.
    #[error("Unknown record type ({0}).")]
    UnknownType(u16),
}

/// A validated record prefix.
///
/// Only [`Frame::parse`] builds a frame, so its length always covers the
/// prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    length: u16,
    kind: RecordKind,
}

impl Frame {
    /// Decode and validate a record prefix.
    pub fn parse(r: [u8; 4]) -> Result<Self, FrameError> {
        #[repr(C, packed)]
        #[derive(FromBytes)]
        struct Prefix {
            length: U16,
            kind: U16,
        }

        let Prefix { length, kind } = zerocopy::transmute!(r);
        let length = length.get();

        if length < PREFIX_LEN {
            Err(FrameError::InvalidLength(length))?;
        }

        let kind = RecordKind::try_from(kind.get())?;

        Ok(Self { length, kind })
    }

    /// Total record size, including the prefix.
    pub fn length(&self) -> u16 {
        self.length
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    /// Number of bytes following the prefix.
    pub fn body_len(&self) -> usize {
        usize::from(self.length - PREFIX_LEN)
    }
}

/// An error advancing over a record prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PrefixError {
    /// Invalid length or type.
    #[error(transparent)]
    Frame(#[from] FrameError),
    /// Declared length runs past the end of the file.
    #[error("Record of {declared} bytes exceeds the {remaining} bytes left in the file.")]
    Truncated { declared: u16, remaining: u64 },
    /// First record of a file is not a header.
    #[error("Expected a header as the first record, found a {0} record.")]
    Sequence(RecordKind),
}

/// Byte budget and record count carried between states.
#[derive(Debug)]
pub(super) struct Budget {
    remaining: u64,
    count: u32,
    max_records: u32,
}

impl Budget {
    fn check(&self, frame: Frame) -> Result<(), PrefixError> {
        if u64::from(frame.length) > self.remaining {
            Err(PrefixError::Truncated {
                declared: frame.length,
                remaining: self.remaining,
            })?;
        }

        Ok(())
    }

    /// Account for a decoded record, choosing the successor state.
    pub(super) fn consume(mut self, frame: Frame) -> Either<RecordPrefix, End> {
        self.remaining -= u64::from(frame.length);
        self.count = self.count.saturating_add(1);

        // A count that can no longer grow ends the session like a cap.
        let capped = (self.max_records != 0 && self.count >= self.max_records)
            || self.count == u32::MAX;

        if self.remaining == 0 || capped {
            Right(End {
                count: self.count,
                remaining: self.remaining,
                capped: capped && self.remaining != 0,
            })
        } else {
            Left(RecordPrefix(self))
        }
    }
}

/// State token to decode the prefix of the first record of a file.
#[derive(Debug)]
pub struct SessionStart(Budget);

impl SessionStart {
    /// Begin a session over a file of `length` bytes, decoding at most
    /// `max_records` records (or without limit, if zero).
    pub fn new(length: u64, max_records: u32) -> Self {
        Self(Budget {
            remaining: length,
            count: 0,
            max_records,
        })
    }

    /// Bytes left in the file.
    pub fn remaining(&self) -> u64 {
        self.0.remaining
    }

    /// Transition to another state by decoding the prefix of a header.
    ///
    /// Any other record kind is rejected before its body is read.
    ///
    /// Returns the frame, and a successor state token for the header body.
    pub fn advance(self, r: [u8; 4]) -> Result<(Frame, Body<Header>), PrefixError> {
        let frame = Frame::parse(r)?;

        if frame.kind != RecordKind::Header {
            Err(PrefixError::Sequence(frame.kind))?;
        }

        self.0.check(frame)?;

        Ok((frame, Body::new(frame, self.0)))
    }
}

/// State token to decode the prefix of a subsequent record.
#[derive(Debug)]
pub struct RecordPrefix(Budget);

impl RecordPrefix {
    /// Bytes left in the file.
    pub fn remaining(&self) -> u64 {
        self.0.remaining
    }

    /// Number of records decoded so far.
    pub fn count(&self) -> u32 {
        self.0.count
    }

    /// Transition to another state by decoding a record prefix.
    ///
    /// Returns the frame, and a successor state token for the record body.
    pub fn advance(self, r: [u8; 4]) -> Result<(Frame, AnyBody), PrefixError> {
        let frame = Frame::parse(r)?;
        self.0.check(frame)?;

        Ok((frame, AnyBody::new(frame, self.0)))
    }

    /// End the session early, when too few bytes remain to hold a prefix.
    pub fn finish(self) -> End {
        End {
            count: self.0.count,
            remaining: self.0.remaining,
            capped: false,
        }
    }
}

/// Final state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct End {
    count: u32,
    remaining: u64,
    capped: bool,
}

impl End {
    /// Number of records decoded.
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Bytes of the file left undecoded.
    pub fn trailing(&self) -> u64 {
        self.remaining
    }

    /// Whether the session stopped at the record cap with bytes remaining.
    pub fn capped(&self) -> bool {
        self.capped
    }
}
