//! Pay-to-pubkey-hash address text and script construction.

use logwallet_consensus::Hash160;

use crate::base58;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressError {
    InvalidLength,
    InvalidCharacter,
    InvalidChecksum,
    UnknownPrefix,
}

impl std::fmt::Display for AddressError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AddressError::InvalidLength => write!(f, "invalid address length"),
            AddressError::InvalidCharacter => write!(f, "invalid base58 character"),
            AddressError::InvalidChecksum => write!(f, "invalid base58 checksum"),
            AddressError::UnknownPrefix => write!(f, "unknown address version"),
        }
    }
}

impl std::error::Error for AddressError {}

const OP_DUP: u8 = 0x76;
const OP_HASH160: u8 = 0xa9;
const OP_EQUALVERIFY: u8 = 0x88;
const OP_CHECKSIG: u8 = 0xac;

/// base58-check(version || hash160).
pub fn encode_p2pkh_address(hash: &Hash160, version: u8) -> String {
    let mut payload = [0u8; 21];
    payload[0] = version;
    payload[1..].copy_from_slice(hash);
    base58::encode_check(&payload)
}

pub fn decode_p2pkh_address(address: &str, version: u8) -> Result<Hash160, AddressError> {
    let payload = base58::decode_check(address)?;
    if payload.len() != 21 {
        return Err(AddressError::InvalidLength);
    }
    if payload[0] != version {
        return Err(AddressError::UnknownPrefix);
    }
    let mut hash = [0u8; 20];
    hash.copy_from_slice(&payload[1..]);
    Ok(hash)
}

pub fn p2pkh_script(hash: &Hash160) -> Vec<u8> {
    let mut script = Vec::with_capacity(25);
    script.push(OP_DUP);
    script.push(OP_HASH160);
    script.push(0x14);
    script.extend_from_slice(hash);
    script.push(OP_EQUALVERIFY);
    script.push(OP_CHECKSIG);
    script
}
