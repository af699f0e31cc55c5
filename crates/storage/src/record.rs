//! Shared on-disk framing of a single record.

use logwallet_primitives::encoding::{DecodeError, Decoder, Encoder, MAX_COMPACT_SIZE};
use logwallet_primitives::sha256d;

use crate::{RecordMode, StoreError};

pub(crate) const CHECKSUM_LEN: usize = 4;

/// Refuses keys or values whose length prefix replay would reject.
pub(crate) fn check_lengths(key: &[u8], value: &[u8]) -> Result<(), StoreError> {
    let longest = key.len().max(value.len());
    if longest as u64 > MAX_COMPACT_SIZE {
        return Err(StoreError::RecordTooLarge(longest));
    }
    Ok(())
}

/// mode || varbytes(key) || varbytes(value)
pub(crate) fn encode_body(mode: RecordMode, key: &[u8], value: &[u8]) -> Vec<u8> {
    let mut encoder = Encoder::with_capacity(1 + 9 + key.len() + 9 + value.len() + CHECKSUM_LEN);
    encoder.write_u8(mode as u8);
    encoder.write_var_bytes(key);
    encoder.write_var_bytes(value);
    encoder.into_inner()
}

/// The body followed by the first four bytes of its double SHA-256.
pub(crate) fn encode_frame(mode: RecordMode, key: &[u8], value: &[u8]) -> Vec<u8> {
    let mut frame = encode_body(mode, key, value);
    let checksum = sha256d(&frame);
    frame.extend_from_slice(&checksum[..CHECKSUM_LEN]);
    frame
}

pub(crate) struct RawRecord<'a> {
    pub mode: u8,
    pub key: &'a [u8],
    pub value: &'a [u8],
}

pub(crate) fn decode_body<'a>(decoder: &mut Decoder<'a>) -> Result<RawRecord<'a>, DecodeError> {
    let mode = decoder.read_u8()?;
    let key = decoder.read_var_slice()?;
    let value = decoder.read_var_slice()?;
    Ok(RawRecord { mode, key, value })
}

#[derive(Debug, Eq, PartialEq)]
pub(crate) enum FrameError {
    /// The input ends before the frame does.
    Truncated,
    /// The frame is complete but its checksum does not match.
    Checksum { frame_len: usize },
    Malformed(DecodeError),
}

impl From<DecodeError> for FrameError {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::UnexpectedEof => FrameError::Truncated,
            other => FrameError::Malformed(other),
        }
    }
}

/// Decodes one checksummed frame from the front of `input`, returning the
/// record and the number of bytes it occupied.
pub(crate) fn decode_frame(input: &[u8]) -> Result<(RawRecord<'_>, usize), FrameError> {
    let mut decoder = Decoder::new(input);
    let record = decode_body(&mut decoder)?;
    let body_len = decoder.position();
    let checksum = decoder.read_fixed::<CHECKSUM_LEN>()?;
    let frame_len = body_len + CHECKSUM_LEN;
    if checksum[..] != sha256d(&input[..body_len])[..CHECKSUM_LEN] {
        return Err(FrameError::Checksum { frame_len });
    }
    Ok((record, frame_len))
}
