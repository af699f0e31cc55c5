//! Append-only record logs that can be replayed in append order.

use std::fmt;
use std::path::PathBuf;

use smallvec::SmallVec;

pub mod file;
pub mod memory;
mod record;

#[cfg(feature = "fjall")]
pub mod fjall;

#[derive(Debug)]
pub enum StoreError {
    /// The log is already held open by this or another handle.
    AlreadyOpen(PathBuf),
    Io(std::io::Error),
    Corrupt(&'static str),
    /// A key or value longer than a record can carry.
    RecordTooLarge(usize),
    Backend(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::AlreadyOpen(path) => write!(f, "{} is already open", path.display()),
            StoreError::Io(err) => write!(f, "{err}"),
            StoreError::Corrupt(message) => write!(f, "corrupt record log: {message}"),
            StoreError::RecordTooLarge(len) => {
                write!(f, "record field of {len} bytes is too large")
            }
            StoreError::Backend(message) => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RecordMode {
    Write = 1,
    Erase = 2,
}

impl RecordMode {
    pub fn from_u8(raw: u8) -> Option<Self> {
        match raw {
            1 => Some(RecordMode::Write),
            2 => Some(RecordMode::Erase),
            _ => None,
        }
    }
}

/// One replayed record, borrowed from the backend for the duration of a visit.
#[derive(Clone, Copy, Debug)]
pub struct LogRecord<'a> {
    pub mode: RecordMode,
    pub key: &'a [u8],
    pub value: &'a [u8],
}

/// Record keys are a short ASCII tag followed by a fixed-width hash.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct RecordKey(SmallVec<[u8; 40]>);

impl RecordKey {
    pub fn tagged(tag: &[u8], payload: &[u8]) -> Self {
        let mut key = SmallVec::with_capacity(tag.len() + payload.len());
        key.extend_from_slice(tag);
        key.extend_from_slice(payload);
        Self(key)
    }

    pub fn as_slice(&self) -> &[u8] {
        self.0.as_slice()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for RecordKey {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl From<&[u8]> for RecordKey {
    fn from(value: &[u8]) -> Self {
        Self(SmallVec::from_slice(value))
    }
}

impl From<Vec<u8>> for RecordKey {
    fn from(value: Vec<u8>) -> Self {
        Self(SmallVec::from_vec(value))
    }
}

impl<const N: usize> From<&[u8; N]> for RecordKey {
    fn from(value: &[u8; N]) -> Self {
        Self(SmallVec::from_slice(value))
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ReplayStats {
    pub writes: u64,
    pub erases: u64,
    /// Records with a mode this build does not understand.
    pub skipped: u64,
    /// Bytes dropped from a torn tail.
    pub truncated_bytes: u64,
}

impl ReplayStats {
    fn count(&mut self, mode: RecordMode) {
        match mode {
            RecordMode::Write => self.writes += 1,
            RecordMode::Erase => self.erases += 1,
        }
    }
}

pub type RecordVisitor<'a> = dyn FnMut(LogRecord<'_>) -> Result<(), StoreError> + 'a;

/// A durable append-only log of (mode, key, value) records.
///
/// `replay` hands every historical record to the visitor in the order it was
/// appended. Appends are visible to later replays once they return `Ok`;
/// `flush` forces them to stable storage and may be called at any time.
pub trait RecordStore: Send {
    fn replay(&mut self, visitor: &mut RecordVisitor<'_>) -> Result<ReplayStats, StoreError>;
    fn append(&mut self, key: &[u8], value: &[u8]) -> Result<(), StoreError>;
    fn erase(&mut self, key: &[u8]) -> Result<(), StoreError>;
    fn flush(&mut self) -> Result<(), StoreError>;
}

impl<T: RecordStore + ?Sized> RecordStore for Box<T> {
    fn replay(&mut self, visitor: &mut RecordVisitor<'_>) -> Result<ReplayStats, StoreError> {
        self.as_mut().replay(visitor)
    }

    fn append(&mut self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.as_mut().append(key, value)
    }

    fn erase(&mut self, key: &[u8]) -> Result<(), StoreError> {
        self.as_mut().erase(key)
    }

    fn flush(&mut self) -> Result<(), StoreError> {
        self.as_mut().flush()
    }
}
