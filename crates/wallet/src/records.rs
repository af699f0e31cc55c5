//! Record keys and values written to the wallet log.
//!
//! A key is an ASCII tag followed by a fixed-width hash:
//!
//! | tag      | payload                          | value                         |
//! |----------|----------------------------------|-------------------------------|
//! | `mstkey` | sha256d of the master public key | xprv text of the master node  |
//! | `hdkey`  | hash160 of the derived key       | xpub text of the derived node |
//! | `tx`     | sha256d of the record value      | height (u32 LE) ++ transaction |

use logwallet_consensus::{Hash160, Hash256};
use logwallet_primitives::encoding::{DecodeError, Decoder, Encodable, Encoder};
use logwallet_primitives::{sha256d, Transaction};
use logwallet_storage::RecordKey;

pub const MASTER_KEY_TAG: &[u8] = b"mstkey";
pub const HD_KEY_TAG: &[u8] = b"hdkey";
pub const TX_TAG: &[u8] = b"tx";

/// A transaction together with the block height it was observed at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WalletTransaction {
    pub height: u32,
    pub tx: Transaction,
}

impl WalletTransaction {
    pub fn new(height: u32, tx: Transaction) -> Self {
        Self { height, tx }
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut encoder = Encoder::new();
        encoder.write_u32_le(self.height);
        Encodable::consensus_encode(&self.tx, &mut encoder);
        encoder.into_inner()
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut decoder = Decoder::new(bytes);
        let height = decoder.read_u32_le()?;
        let tx = Transaction::decode_from(&mut decoder)?;
        if !decoder.is_empty() {
            return Err(DecodeError::TrailingBytes);
        }
        Ok(Self { height, tx })
    }

    /// Hash of the serialized record; the transaction index key.
    ///
    /// Differs from [`Self::txid`] because the height is part of the record.
    pub fn record_hash(&self) -> Hash256 {
        sha256d(&self.serialize())
    }

    /// Canonical transaction hash, as referenced by spending inputs.
    pub fn txid(&self) -> Hash256 {
        self.tx.txid()
    }
}

pub fn master_key_record(pubkey_hash: &Hash256) -> RecordKey {
    RecordKey::tagged(MASTER_KEY_TAG, pubkey_hash)
}

pub fn hd_key_record(key_hash: &Hash160) -> RecordKey {
    RecordKey::tagged(HD_KEY_TAG, key_hash)
}

pub fn tx_record(record_hash: &Hash256) -> RecordKey {
    RecordKey::tagged(TX_TAG, record_hash)
}

/// A record key sorted by tag.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RecordKind {
    MasterKey(Hash256),
    HdKey(Hash160),
    Transaction(Hash256),
    Unknown,
}

impl RecordKind {
    /// Matches on tag and exact payload width; anything else is `Unknown`.
    pub fn classify(key: &[u8]) -> Self {
        if let Some(payload) = tagged_payload::<32>(key, MASTER_KEY_TAG) {
            RecordKind::MasterKey(payload)
        } else if let Some(payload) = tagged_payload::<20>(key, HD_KEY_TAG) {
            RecordKind::HdKey(payload)
        } else if let Some(payload) = tagged_payload::<32>(key, TX_TAG) {
            RecordKind::Transaction(payload)
        } else {
            RecordKind::Unknown
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            RecordKind::MasterKey(_) => "mstkey",
            RecordKind::HdKey(_) => "hdkey",
            RecordKind::Transaction(_) => "tx",
            RecordKind::Unknown => "unknown",
        }
    }
}

fn tagged_payload<const N: usize>(key: &[u8], tag: &[u8]) -> Option<[u8; N]> {
    if key.len() != tag.len() + N || !key.starts_with(tag) {
        return None;
    }
    key[tag.len()..].try_into().ok()
}
