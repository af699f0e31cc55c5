//! Record log kept in a fjall keyspace under monotonically increasing keys.

use std::path::Path;

use fjall::{Config, Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use logwallet_primitives::encoding::Decoder;

use crate::record::{check_lengths, decode_body, encode_body};
use crate::{LogRecord, RecordMode, RecordStore, RecordVisitor, ReplayStats, StoreError};

const PARTITION: &str = "records";

pub struct FjallRecordLog {
    keyspace: Keyspace,
    records: PartitionHandle,
    next_seq: u64,
}

impl FjallRecordLog {
    pub fn open(path: impl AsRef<Path>, create_if_missing: bool) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if !create_if_missing && !path.exists() {
            return Err(StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} does not exist", path.display()),
            )));
        }
        let keyspace = Config::new(path).open().map_err(map_err)?;
        let records = keyspace
            .open_partition(PARTITION, PartitionCreateOptions::default())
            .map_err(map_err)?;
        // Big-endian sequence keys sort in append order.
        let next_seq = match records.last_key_value().map_err(map_err)? {
            Some((key, _)) => decode_seq(&key)? + 1,
            None => 0,
        };
        Ok(Self {
            keyspace,
            records,
            next_seq,
        })
    }

    fn push(&mut self, mode: RecordMode, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        check_lengths(key, value)?;
        self.records
            .insert(self.next_seq.to_be_bytes(), encode_body(mode, key, value))
            .map_err(map_err)?;
        self.next_seq += 1;
        Ok(())
    }
}

impl RecordStore for FjallRecordLog {
    fn replay(&mut self, visitor: &mut RecordVisitor<'_>) -> Result<ReplayStats, StoreError> {
        let mut stats = ReplayStats::default();
        for entry in self.records.iter() {
            let (_, value) = entry.map_err(map_err)?;
            let mut decoder = Decoder::new(&value);
            let raw = decode_body(&mut decoder)
                .map_err(|_| StoreError::Corrupt("malformed fjall record"))?;
            let Some(mode) = RecordMode::from_u8(raw.mode) else {
                stats.skipped += 1;
                continue;
            };
            stats.count(mode);
            visitor(LogRecord {
                mode,
                key: raw.key,
                value: raw.value,
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
        self.keyspace
            .persist(PersistMode::SyncAll)
            .map_err(map_err)
    }
}

fn decode_seq(key: &[u8]) -> Result<u64, StoreError> {
    let bytes: [u8; 8] = key
        .try_into()
        .map_err(|_| StoreError::Corrupt("bad fjall sequence key"))?;
    Ok(u64::from_be_bytes(bytes))
}

fn map_err(err: fjall::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}
