use std::sync::{Arc, Mutex, MutexGuard};

use crate::record::check_lengths;
use crate::{LogRecord, RecordKey, RecordMode, RecordStore, RecordVisitor, ReplayStats, StoreError};

#[derive(Clone, Debug)]
struct StoredRecord {
    mode: RecordMode,
    key: RecordKey,
    value: Vec<u8>,
}

#[derive(Default)]
struct MemoryLogInner {
    records: Vec<StoredRecord>,
    fail_appends: bool,
    fail_flushes: bool,
    flushes: u64,
}

/// In-memory record log. Clones share the same records, so a log can be
/// handed to one wallet, dropped, and replayed into another.
#[derive(Clone, Default)]
pub struct MemoryRecordLog {
    inner: Arc<Mutex<MemoryLogInner>>,
}

impl MemoryRecordLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryLogInner>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Backend("memory record log lock poisoned".to_string()))
    }

    pub fn len(&self) -> usize {
        self.lock().map(|inner| inner.records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn flush_count(&self) -> u64 {
        self.lock().map(|inner| inner.flushes).unwrap_or(0)
    }

    /// Pushes a record verbatim, bypassing `append`.
    pub fn push_raw(&self, mode: RecordMode, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.lock()?.records.push(StoredRecord {
            mode,
            key: RecordKey::from(key),
            value: value.to_vec(),
        });
        Ok(())
    }

    /// While set, `append` and `erase` fail without recording anything.
    pub fn set_fail_appends(&self, fail: bool) {
        if let Ok(mut inner) = self.lock() {
            inner.fail_appends = fail;
        }
    }

    /// While set, `flush` fails; appended records are kept.
    pub fn set_fail_flushes(&self, fail: bool) {
        if let Ok(mut inner) = self.lock() {
            inner.fail_flushes = fail;
        }
    }

    fn push(&mut self, mode: RecordMode, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        check_lengths(key, value)?;
        let mut inner = self.lock()?;
        if inner.fail_appends {
            return Err(StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "append rejected",
            )));
        }
        inner.records.push(StoredRecord {
            mode,
            key: RecordKey::from(key),
            value: value.to_vec(),
        });
        Ok(())
    }
}

impl RecordStore for MemoryRecordLog {
    fn replay(&mut self, visitor: &mut RecordVisitor<'_>) -> Result<ReplayStats, StoreError> {
        let records = self.lock()?.records.clone();
        let mut stats = ReplayStats::default();
        for record in &records {
            stats.count(record.mode);
            visitor(LogRecord {
                mode: record.mode,
                key: record.key.as_slice(),
                value: &record.value,
            })?;
        }
        Ok(stats)
    }

    fn append(&mut self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.push(RecordMode::Write, key, value)
    }

    fn erase(&mut self, key: &[u8]) -> Result<(), StoreError> {
        self.push(RecordMode::Erase, key, &[])
    }

    fn flush(&mut self) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        if inner.fail_flushes {
            return Err(StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "flush rejected",
            )));
        }
        inner.flushes += 1;
        Ok(())
    }
}
