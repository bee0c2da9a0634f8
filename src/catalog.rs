//! Event catalog, mapping event identifiers to names, types and parameters.
//!
//! A catalog is read from line-oriented text. Blank lines and lines starting
//! with `#` are ignored. Every other line is split on whitespace and holds
//! either an event alone, or an event followed by one of its parameters:
//!
//! ```text
//! # name                   id    type
//! S1_INITIAL_UE_MESSAGE    1040  S1
//! # name                   id    type  param_name     availability  param_type  param_size
//! INTERNAL_PROC_ERAB_SETUP 4099  PROC  EVENT_PARAM_A  1             UINT        4
//! INTERNAL_PROC_ERAB_SETUP 4099  PROC  EVENT_PARAM_B  0             ENUM        1
//! ```
//!
//! An event is created by the first line naming its identifier. Later lines
//! for the same identifier append parameters in the order they are declared.
//!
//! Once built, a catalog is only read from, and can be shared by every file
//! decoded in a run.

use std::{collections::HashMap, fs, io, path::Path};

use thiserror::Error;

/// The standard LTE cell trace event table.
const BUILTIN: &str = include_str!("../data/events.txt");

/// The declaration of an event parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterDef {
    pub name: String,
    pub availability: String,
    pub kind: String,
    pub size: u32,
}

/// An event known to the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventEntry {
    pub id: u32,
    pub name: String,
    pub kind: String,
    /// Parameters, in declaration order.
    pub parameters: Vec<ParameterDef>,
}

/// What to do with a malformed catalog line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Policy {
    /// Report the line in [`Loaded::skipped`] and continue.
    #[default]
    Skip,
    /// Fail the whole load.
    Abort,
}

/// Why a catalog line was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Reason {
    #[error("expected 3 or 7 fields, found {0}")]
    FieldCount(usize),
    #[error("invalid event id '{0}'")]
    InvalidId(String),
    #[error("invalid parameter size '{0}'")]
    InvalidSize(String),
}

/// A malformed catalog line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Line {line}: {reason}.")]
pub struct LineError {
    /// One-based line number.
    pub line: usize,
    pub reason: Reason,
}

/// An error loading a catalog from a file.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// An error reading the file.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// A malformed line, under [`Policy::Abort`].
    #[error("Malformed catalog: {0}")]
    Line(#[from] LineError),
}

/// A catalog, along with any lines skipped while building it.
#[derive(Debug, Default)]
pub struct Loaded {
    pub catalog: Catalog,
    pub skipped: Vec<LineError>,
}

/// A read-only table of events by identifier.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    events: HashMap<u32, EventEntry>,
}

impl Catalog {
    /// An empty catalog, resolving no event.
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard LTE cell trace event table.
    pub fn builtin() -> Self {
        let mut catalog = Self::new();

        for (n, line) in BUILTIN.lines().enumerate() {
            if let Err(err) = catalog.add_line(n + 1, line) {
                log::warn!("Skipping built-in catalog entry: {err}");
            }
        }

        catalog
    }

    /// Build a catalog from text.
    pub fn parse(text: &str, policy: Policy) -> Result<Loaded, LineError> {
        let mut loaded = Loaded::default();

        for (n, line) in text.lines().enumerate() {
            if let Err(err) = loaded.catalog.add_line(n + 1, line) {
                match policy {
                    Policy::Abort => Err(err)?,
                    Policy::Skip => {
                        log::warn!("Skipping catalog entry: {err}");
                        loaded.skipped.push(err);
                    }
                }
            }
        }

        Ok(loaded)
    }

    /// Build a catalog from a text file.
    pub fn load(path: impl AsRef<Path>, policy: Policy) -> Result<Loaded, CatalogError> {
        let text = fs::read_to_string(path)?;
        Ok(Self::parse(&text, policy)?)
    }

    /// Find an event by identifier.
    pub fn find(&self, id: u32) -> Option<&EventEntry> {
        self.events.get(&id)
    }

    /// Name of an event, or an empty string if it is not in the catalog.
    pub fn name(&self, id: u32) -> &str {
        self.find(id).map_or("", |e| e.name.as_str())
    }

    /// Number of events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Iterate over events, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &EventEntry> {
        self.events.values()
    }

    fn add_line(&mut self, line: usize, text: &str) -> Result<(), LineError> {
        let text = text.trim();

        if text.is_empty() || text.starts_with('#') {
            return Ok(());
        }

        let err = |reason| LineError { line, reason };

        let fields: Vec<&str> = text.split_whitespace().collect();

        let (event, parameter) = match fields.as_slice() {
            [name, id, kind] => ((*name, *id, *kind), None),
            [name, id, kind, p_name, p_availability, p_kind, p_size] => (
                (*name, *id, *kind),
                Some((*p_name, *p_availability, *p_kind, *p_size)),
            ),
            _ => Err(err(Reason::FieldCount(fields.len())))?,
        };

        let (name, id, kind) = event;
        let id: u32 = id.parse().map_err(|_| err(Reason::InvalidId(id.to_owned())))?;

        let parameter = match parameter {
            Some((name, availability, kind, size)) => Some(ParameterDef {
                name: name.to_owned(),
                availability: availability.to_owned(),
                kind: kind.to_owned(),
                size: size
                    .parse()
                    .map_err(|_| err(Reason::InvalidSize(size.to_owned())))?,
            }),
            None => None,
        };

        let entry = self.events.entry(id).or_insert_with(|| EventEntry {
            id,
            name: name.to_owned(),
            kind: kind.to_owned(),
            parameters: Vec::new(),
        });

        if entry.name != name {
            log::warn!(
                "Line {line}: event {id} is already named {}, ignoring name {name}.",
                entry.name
            );
        }

        entry.parameters.extend(parameter);

        Ok(())
    }
}
