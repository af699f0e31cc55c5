//! Single-file append-only record log.

use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::record::{check_lengths, decode_frame, encode_frame, FrameError};
use crate::{LogRecord, RecordMode, RecordStore, RecordVisitor, ReplayStats, StoreError};

const MAGIC: &[u8; 6] = b"LWLOG\0";
const FORMAT_VERSION: u16 = 1;
const HEADER_LEN: u64 = 8;

/// A log file holding an 8-byte header followed by checksummed record frames.
///
/// The file is locked exclusively for the lifetime of the handle.
pub struct FileRecordLog {
    path: PathBuf,
    file: File,
    len: u64,
}

impl FileRecordLog {
    pub fn open(path: impl AsRef<Path>, create_if_missing: bool) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(create_if_missing)
            .open(&path)?;

        if let Err(err) = file.try_lock_exclusive() {
            let contended = err.kind() == ErrorKind::WouldBlock
                || err.raw_os_error() == fs2::lock_contended_error().raw_os_error();
            return Err(if contended {
                StoreError::AlreadyOpen(path)
            } else {
                StoreError::Io(err)
            });
        }

        let mut len = file.metadata()?.len();
        if len == 0 {
            let mut header = [0u8; HEADER_LEN as usize];
            header[..6].copy_from_slice(MAGIC);
            header[6..].copy_from_slice(&FORMAT_VERSION.to_le_bytes());
            file.write_all(&header)?;
            file.sync_data()?;
            len = HEADER_LEN;
        } else {
            let mut header = [0u8; HEADER_LEN as usize];
            file.seek(SeekFrom::Start(0))?;
            file.read_exact(&mut header).map_err(|err| match err.kind() {
                ErrorKind::UnexpectedEof => StoreError::Corrupt("truncated header"),
                _ => StoreError::Io(err),
            })?;
            if &header[..6] != MAGIC {
                return Err(StoreError::Corrupt("bad magic"));
            }
            if u16::from_le_bytes([header[6], header[7]]) != FORMAT_VERSION {
                return Err(StoreError::Corrupt("unsupported format version"));
            }
        }

        Ok(Self { path, file, len })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn truncate_tail(
        &mut self,
        offset: usize,
        end: usize,
        stats: &mut ReplayStats,
        reason: &str,
    ) -> Result<(), StoreError> {
        let good_len = HEADER_LEN + offset as u64;
        stats.truncated_bytes = (end - offset) as u64;
        logwallet_log::log_warn!(
            "Truncating {} byte torn tail of {} at offset {} ({reason})",
            stats.truncated_bytes,
            self.path.display(),
            good_len
        );
        self.file.set_len(good_len)?;
        self.file.sync_data()?;
        Ok(())
    }

    fn append_frame(&mut self, frame: &[u8]) -> Result<(), StoreError> {
        self.file.seek(SeekFrom::Start(self.len))?;
        if let Err(err) = self.file.write_all(frame) {
            // Drop whatever part of the frame made it out.
            let _ = self.file.set_len(self.len);
            return Err(StoreError::Io(err));
        }
        self.len += frame.len() as u64;
        Ok(())
    }
}

impl RecordStore for FileRecordLog {
    fn replay(&mut self, visitor: &mut RecordVisitor<'_>) -> Result<ReplayStats, StoreError> {
        let mut bytes = Vec::new();
        self.file.seek(SeekFrom::Start(HEADER_LEN))?;
        self.file.read_to_end(&mut bytes)?;

        let mut stats = ReplayStats::default();
        let mut offset = 0usize;
        while offset < bytes.len() {
            let (raw, used) = match decode_frame(&bytes[offset..]) {
                Ok(decoded) => decoded,
                Err(FrameError::Truncated) => {
                    self.truncate_tail(offset, bytes.len(), &mut stats, "incomplete frame")?;
                    break;
                }
                // Only the final frame can be a torn write.
                Err(FrameError::Checksum { frame_len }) if offset + frame_len == bytes.len() => {
                    self.truncate_tail(offset, bytes.len(), &mut stats, "checksum mismatch")?;
                    break;
                }
                Err(FrameError::Checksum { .. }) => {
                    logwallet_log::log_error!(
                        "Record checksum mismatch in {} at offset {}",
                        self.path.display(),
                        HEADER_LEN + offset as u64
                    );
                    return Err(StoreError::Corrupt("record checksum mismatch"));
                }
                Err(FrameError::Malformed(_)) => {
                    return Err(StoreError::Corrupt("malformed record frame"))
                }
            };
            offset += used;

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

        self.len = HEADER_LEN + offset as u64;
        Ok(stats)
    }

    fn append(&mut self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        check_lengths(key, value)?;
        self.append_frame(&encode_frame(RecordMode::Write, key, value))
    }

    fn erase(&mut self, key: &[u8]) -> Result<(), StoreError> {
        check_lengths(key, &[])?;
        self.append_frame(&encode_frame(RecordMode::Erase, key, &[]))
    }

    fn flush(&mut self) -> Result<(), StoreError> {
        self.file.flush()?;
        self.file.sync_data()?;
        Ok(())
    }
}
