//! Internal finite-state machine for implementing decoders.
//!
//! This module is intended for applications that need fine control over how
//! bytes reach the decoder. See [`crate::avec`] for implementations covering
//! common decoding patterns.
//!
//! # Architecture
//!
//! All states are represented by a non-copy token. Once enough bytes are
//! ready, transition to another state by calling the token's `advance`
//! method. This will return a successor state token, along with any extracted
//! data.
//!
//! A session begins at [`Decoder`], which accepts only a header record. Each
//! prefix state consumes the four prefix bytes of a record and yields a body
//! state sized to the rest of the record. Body states consume exactly that
//! many bytes and yield the decoded record, together with either the next
//! prefix state or the [`End`](frame::End) of the session. The byte budget of
//! the file and the record cap are tracked by the tokens themselves.
//!
//! Only the initial state, re-exported for convenience as [`Decoder`], can be
//! constructed.
//!
//! Some areas of the decoding process are not represented in the
//! finite-state machine and must be carefully written:
//!
//! - Reading bytes from the correct place in the file, including buffering as
//! necessary.
//!
//! - Stopping with [`RecordPrefix::finish`](frame::RecordPrefix::finish) once
//! fewer than four bytes remain.
//!
//! Implementers are recommended to begin by studying the session assembler in
//! the [`crate::avec`] module.

pub mod body;
pub mod codec;
pub mod frame;

/// Entrypoint to the finite-state machine.
pub type Decoder = frame::SessionStart;
