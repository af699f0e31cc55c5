//! Base58 and base58-check text encoding.

use crate::address::AddressError;
use crate::hash::sha256d;

const ALPHABET: &[u8; 58] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";
const CHECKSUM_LEN: usize = 4;

pub fn encode(data: &[u8]) -> String {
    let mut digits: Vec<u8> = Vec::with_capacity(data.len() * 138 / 100 + 1);
    for byte in data {
        let mut carry = u32::from(*byte);
        for digit in digits.iter_mut() {
            let value = u32::from(*digit) * 256 + carry;
            *digit = (value % 58) as u8;
            carry = value / 58;
        }
        while carry > 0 {
            digits.push((carry % 58) as u8);
            carry /= 58;
        }
    }
    let leading_zeros = data.iter().take_while(|b| **b == 0).count();
    let mut out = String::with_capacity(leading_zeros + digits.len());
    out.extend(std::iter::repeat('1').take(leading_zeros));
    out.extend(digits.iter().rev().map(|d| ALPHABET[*d as usize] as char));
    out
}

pub fn decode(input: &str) -> Result<Vec<u8>, AddressError> {
    if input.is_empty() {
        return Err(AddressError::InvalidLength);
    }
    // Little-endian accumulator; reversed once at the end.
    let mut bytes: Vec<u8> = Vec::with_capacity(input.len());
    for ch in input.bytes() {
        let mut carry = u32::from(value_of(ch).ok_or(AddressError::InvalidCharacter)?);
        for byte in bytes.iter_mut() {
            let value = u32::from(*byte) * 58 + carry;
            *byte = (value & 0xff) as u8;
            carry = value >> 8;
        }
        while carry > 0 {
            bytes.push((carry & 0xff) as u8);
            carry >>= 8;
        }
    }
    let leading_zeros = input.bytes().take_while(|b| *b == b'1').count();
    let mut out = vec![0u8; leading_zeros];
    out.extend(bytes.iter().rev());
    Ok(out)
}

pub fn encode_check(payload: &[u8]) -> String {
    let mut data = Vec::with_capacity(payload.len() + CHECKSUM_LEN);
    data.extend_from_slice(payload);
    data.extend_from_slice(&sha256d(payload)[..CHECKSUM_LEN]);
    encode(&data)
}

pub fn decode_check(input: &str) -> Result<Vec<u8>, AddressError> {
    let mut bytes = decode(input)?;
    if bytes.len() < CHECKSUM_LEN {
        return Err(AddressError::InvalidLength);
    }
    let payload_len = bytes.len() - CHECKSUM_LEN;
    if bytes[payload_len..] != sha256d(&bytes[..payload_len])[..CHECKSUM_LEN] {
        return Err(AddressError::InvalidChecksum);
    }
    bytes.truncate(payload_len);
    Ok(bytes)
}

fn value_of(byte: u8) -> Option<u8> {
    ALPHABET
        .iter()
        .position(|value| *value == byte)
        .map(|pos| pos as u8)
}
