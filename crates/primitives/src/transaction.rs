//! Transparent transaction types and their consensus serialization.

use logwallet_consensus::money::Amount;
use logwallet_consensus::Hash256;

use crate::encoding::{read_vec, write_vec, Decodable, DecodeError, Decoder, Encodable, Encoder};
use crate::hash::sha256d;
use crate::outpoint::OutPoint;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxIn {
    pub prevout: OutPoint,
    pub script_sig: Vec<u8>,
    pub sequence: u32,
}

impl Encodable for TxIn {
    fn consensus_encode(&self, encoder: &mut Encoder) {
        self.prevout.consensus_encode(encoder);
        encoder.write_var_bytes(&self.script_sig);
        encoder.write_u32_le(self.sequence);
    }
}

impl Decodable for TxIn {
    fn consensus_decode(decoder: &mut Decoder) -> Result<Self, DecodeError> {
        let prevout = OutPoint::consensus_decode(decoder)?;
        let script_sig = decoder.read_var_bytes()?;
        let sequence = decoder.read_u32_le()?;
        Ok(Self {
            prevout,
            script_sig,
            sequence,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxOut {
    pub value: Amount,
    pub script_pubkey: Vec<u8>,
}

impl Encodable for TxOut {
    fn consensus_encode(&self, encoder: &mut Encoder) {
        encoder.write_i64_le(self.value);
        encoder.write_var_bytes(&self.script_pubkey);
    }
}

impl Decodable for TxOut {
    fn consensus_decode(decoder: &mut Decoder) -> Result<Self, DecodeError> {
        let value = decoder.read_i64_le()?;
        let script_pubkey = decoder.read_var_bytes()?;
        Ok(Self {
            value,
            script_pubkey,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub version: i32,
    pub vin: Vec<TxIn>,
    pub vout: Vec<TxOut>,
    pub lock_time: u32,
}

impl Transaction {
    /// A block reward transaction: a single input spending the null outpoint.
    pub fn is_coinbase(&self) -> bool {
        self.vin.len() == 1 && self.vin[0].prevout.is_null()
    }

    pub fn consensus_encode(&self) -> Vec<u8> {
        let mut encoder = Encoder::new();
        Encodable::consensus_encode(self, &mut encoder);
        encoder.into_inner()
    }

    /// Canonical transaction hash (double SHA-256 of the serialization).
    pub fn txid(&self) -> Hash256 {
        sha256d(&self.consensus_encode())
    }

    pub fn consensus_decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut decoder = Decoder::new(bytes);
        let tx = Self::decode_from(&mut decoder)?;
        if !decoder.is_empty() {
            return Err(DecodeError::TrailingBytes);
        }
        Ok(tx)
    }

    pub fn decode_from(decoder: &mut Decoder) -> Result<Self, DecodeError> {
        let version = decoder.read_i32_le()?;
        let vin = read_vec(decoder)?;
        let vout = read_vec(decoder)?;
        let lock_time = decoder.read_u32_le()?;
        Ok(Self {
            version,
            vin,
            vout,
            lock_time,
        })
    }
}

impl Encodable for Transaction {
    fn consensus_encode(&self, encoder: &mut Encoder) {
        encoder.write_i32_le(self.version);
        write_vec(encoder, &self.vin);
        write_vec(encoder, &self.vout);
        encoder.write_u32_le(self.lock_time);
    }
}

impl Decodable for Transaction {
    fn consensus_decode(decoder: &mut Decoder) -> Result<Self, DecodeError> {
        Self::decode_from(decoder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spend(prevouts: &[OutPoint]) -> Transaction {
        Transaction {
            version: 2,
            vin: prevouts
                .iter()
                .map(|prevout| TxIn {
                    prevout: *prevout,
                    script_sig: vec![0xab; 3],
                    sequence: 7,
                })
                .collect(),
            vout: vec![TxOut {
                value: -1,
                script_pubkey: vec![0x51],
            }],
            lock_time: 99,
        }
    }

    #[test]
    fn serialization_layout() {
        let tx = spend(&[OutPoint::new([0x11; 32], 2)]);
        let bytes = tx.consensus_encode();
        assert_eq!(&bytes[..4], &2i32.to_le_bytes());
        assert_eq!(bytes[4], 1);
        assert_eq!(&bytes[5..37], &[0x11; 32]);
        assert_eq!(&bytes[37..41], &2u32.to_le_bytes());
        assert_eq!(&bytes[bytes.len() - 4..], &99u32.to_le_bytes());
        assert_eq!(bytes.len(), 4 + 1 + 36 + 1 + 3 + 4 + 1 + 8 + 1 + 1 + 4);

        assert_eq!(Transaction::consensus_decode(&bytes), Ok(tx.clone()));
        assert_eq!(tx.txid(), sha256d(&bytes));

        let mut padded = bytes;
        padded.push(0);
        assert_eq!(
            Transaction::consensus_decode(&padded),
            Err(DecodeError::TrailingBytes)
        );
    }

    #[test]
    fn coinbase_is_single_null_input() {
        assert!(spend(&[OutPoint::null()]).is_coinbase());
        assert!(!spend(&[OutPoint::new([0u8; 32], 0)]).is_coinbase());
        assert!(!spend(&[OutPoint::null(), OutPoint::null()]).is_coinbase());
        assert!(!spend(&[]).is_coinbase());
    }
}
