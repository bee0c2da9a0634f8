//! A bounds-checked decoder for binary cell trace record (CTR) files.
//!
//! A CTR file is a stream of length/type-prefixed records: a header, any
//! number of scanner and event records, and a footer. Ctrace frames each
//! record, decodes it into a typed [`record::Record`], resolves event
//! identifiers against an [`catalog::Catalog`], and assembles the records of
//! each file into an ordered session for downstream reporting.
//!
//! Most users should begin with the functions in the [`avec`] module. These
//! decode whole files from slices, readers, or lists of paths. If these prove
//! insufficient, the finite-state machine driving them is exposed in the
//! [`sans`] module.
//!
//! Diagnostics are emitted through the [`log`] facade. No logger is installed
//! by this crate.

pub mod avec;
pub mod catalog;
pub mod record;
pub mod sans;
