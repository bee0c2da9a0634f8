//! States processing record bodies.

use core::marker::PhantomData;

use either::Either;
use thiserror::Error;
use zerocopy::{FromBytes, byteorder::big_endian::U16};

use crate::{
    catalog::Catalog,
    record::{DateTime, EventRecord, FooterRecord, HeaderRecord, Record, ScannerRecord, ScannerTime},
};

use super::{
    codec::{Cursor, OutOfBounds},
    frame::{Budget, End, Frame, RecordKind, RecordPrefix},
};

/// An error advancing over a record body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RecordDecodeError {
    /// The supplied body is not the size given by the record prefix.
    #[error("Expected a body of {expected} bytes, found {found}.")]
    BodyLength { expected: usize, found: usize },
    /// A field reaches past the end of the body.
    #[error("{kind} record is too short: {source}")]
    OutOfBounds {
        kind: RecordKind,
        #[source]
        source: OutOfBounds,
    },
}

/// State token to decode the body of a record of kind `T`.
#[derive(Debug)]
pub struct Body<T> {
    frame: Frame,
    budget: Budget,
    _phantom: PhantomData<T>,
}

impl<T: BodyInner> Body<T> {
    pub(super) fn new(frame: Frame, budget: Budget) -> Self {
        Self {
            frame,
            budget,
            _phantom: PhantomData,
        }
    }

    /// Number of bytes to pass to [`advance`](Self::advance).
    pub fn size(&self) -> usize {
        self.frame.body_len()
    }

    /// Transition to another state by decoding a record body.
    ///
    /// `r` must hold exactly [`size`](Self::size) bytes. Fields are read in
    /// order, and a field running past the end of `r` fails the record.
    ///
    /// Returns the record, and either a successor state token for the next
    /// prefix, or the end of the session if the file is exhausted or the
    /// record cap has been reached.
    pub fn advance(
        self,
        r: &[u8],
        catalog: &Catalog,
    ) -> Result<(T::Record, Either<RecordPrefix, End>), RecordDecodeError> {
        let expected = self.size();

        if r.len() != expected {
            Err(RecordDecodeError::BodyLength {
                expected,
                found: r.len(),
            })?;
        }

        let record = T::decode(&mut Cursor::new(r), self.frame.length(), catalog)
            .map_err(|source| RecordDecodeError::OutOfBounds { kind: T::KIND, source })?;

        Ok((record, self.budget.consume(self.frame)))
    }
}

pub trait BodyInner {
    /// The kind of record decoded.
    const KIND: RecordKind;
    /// The record produced.
    type Record: Into<Record>;

    /// Decode the fields of a record from its body.
    fn decode(r: &mut Cursor<'_>, length: u16, catalog: &Catalog) -> Result<Self::Record, OutOfBounds>;
}

fn date_time(r: &mut Cursor<'_>) -> Result<DateTime, OutOfBounds> {
    #[repr(C, packed)]
    #[derive(FromBytes)]
    struct Layout {
        year: U16,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
    }

    let Layout {
        year,
        month,
        day,
        hour,
        minute,
        second,
    } = zerocopy::transmute!(r.take::<7>()?);

    Ok(DateTime {
        year: year.get(),
        month,
        day,
        hour,
        minute,
        second,
    })
}

/// Header record body.
#[derive(Debug)]
pub struct Header;

impl BodyInner for Header {
    const KIND: RecordKind = RecordKind::Header;
    type Record = HeaderRecord;

    fn decode(r: &mut Cursor<'_>, length: u16, _: &Catalog) -> Result<Self::Record, OutOfBounds> {
        Ok(HeaderRecord {
            length,
            file_version: r.fixed_str(5)?,
            pm_version: r.fixed_str(13)?,
            pm_revision: r.fixed_str(5)?,
            date_time: date_time(r)?,
            ne_user_label: r.fixed_str(128)?,
            ne_logical_label: r.fixed_str(255)?,
            file_name: String::new(),
            record_count: 0,
            decoded_at: None,
        })
    }
}

/// Scanner record body.
#[derive(Debug)]
pub struct Scanner;

impl BodyInner for Scanner {
    const KIND: RecordKind = RecordKind::Scanner;
    type Record = ScannerRecord;

    fn decode(r: &mut Cursor<'_>, length: u16, _: &Catalog) -> Result<Self::Record, OutOfBounds> {
        let timestamp = ScannerTime {
            hour: r.u8()?,
            minute: r.u8()?,
            second: r.u8()?,
            millisecond: r.be16()?,
        };

        Ok(ScannerRecord {
            length,
            timestamp,
            scanner_id: r.take()?,
            status: r.u8()?,
            padding: r.rest().to_vec(),
        })
    }
}

/// Event record body.
#[derive(Debug)]
pub struct Event;

impl BodyInner for Event {
    const KIND: RecordKind = RecordKind::Event;
    type Record = EventRecord;

    fn decode(r: &mut Cursor<'_>, length: u16, catalog: &Catalog) -> Result<Self::Record, OutOfBounds> {
        let id = r.be24()?;

        Ok(EventRecord {
            length,
            id,
            name: catalog.name(id).to_owned(),
            parameters: r.rest().to_vec(),
        })
    }
}

/// Footer record body.
#[derive(Debug)]
pub struct Footer;

impl BodyInner for Footer {
    const KIND: RecordKind = RecordKind::Footer;
    type Record = FooterRecord;

    fn decode(r: &mut Cursor<'_>, length: u16, _: &Catalog) -> Result<Self::Record, OutOfBounds> {
        Ok(FooterRecord {
            length,
            date_time: date_time(r)?,
            padding: r.u8()?,
        })
    }
}

/// A `Body` state token for any record kind.
#[derive(Debug)]
pub enum AnyBody {
    Header(Body<Header>),
    Scanner(Body<Scanner>),
    Event(Body<Event>),
    Footer(Body<Footer>),
}

impl AnyBody {
    pub(super) fn new(frame: Frame, budget: Budget) -> Self {
        match frame.kind() {
            RecordKind::Header => Self::Header(Body::new(frame, budget)),
            RecordKind::Scanner => Self::Scanner(Body::new(frame, budget)),
            RecordKind::Event => Self::Event(Body::new(frame, budget)),
            RecordKind::Footer => Self::Footer(Body::new(frame, budget)),
        }
    }

    /// Number of bytes to pass to [`advance`](Self::advance).
    pub fn size(&self) -> usize {
        match self {
            Self::Header(s) => s.size(),
            Self::Scanner(s) => s.size(),
            Self::Event(s) => s.size(),
            Self::Footer(s) => s.size(),
        }
    }

    /// Transition to another state by decoding a record body of any kind.
    ///
    /// See [`Body::advance`].
    pub fn advance(
        self,
        r: &[u8],
        catalog: &Catalog,
    ) -> Result<(Record, Either<RecordPrefix, End>), RecordDecodeError> {
        fn decode_body<T: BodyInner>(
            state: Body<T>,
            r: &[u8],
            catalog: &Catalog,
        ) -> Result<(Record, Either<RecordPrefix, End>), RecordDecodeError> {
            let (record, successor) = state.advance(r, catalog)?;
            Ok((record.into(), successor))
        }

        match self {
            Self::Header(s) => decode_body(s, r, catalog),
            Self::Scanner(s) => decode_body(s, r, catalog),
            Self::Event(s) => decode_body(s, r, catalog),
            Self::Footer(s) => decode_body(s, r, catalog),
        }
    }
}
